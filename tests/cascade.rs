use pptx_cascade::{
    color::SystemColor,
    model::{MasterId, ShapeId},
    Attribute, Baseline, CascadeResolver, CascadeStep, ColorError, ColorKind, ColorReference,
    ColorRole, ColorSlotMap, ColorTable, Deck, Level, LevelStyleTable, Master, PlaceholderRole,
    ResolveError, ResolvedStyle, Rgb, RunId, SchemeColor, Shape, StyleRecord, Theme, ThemeColor,
    ThemeFault, ThemeSlot, Underline,
};
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

const NEAR_BLACK: Rgb = Rgb::new(0x1F, 0x1F, 0x1F);

fn level(n: u8) -> Level {
    Level::new(n).unwrap()
}

fn text1() -> ColorReference {
    ColorReference::Scheme(SchemeColor::Role(ColorRole::Text1))
}

fn theme() -> Theme {
    let mut colors = ColorTable::office();
    colors.set(ThemeSlot::Dark1, ThemeColor::rgb(NEAR_BLACK));
    let mut theme = Theme {
        name: "Test".to_string(),
        colors,
        ..Default::default()
    };
    theme.fonts.major.latin = Some("Calibri Light".to_string());
    theme.fonts.minor.latin = Some("Aptos".to_string());
    theme
}

fn record(size: u32) -> StyleRecord {
    StyleRecord {
        size: Some(size),
        ..Default::default()
    }
}

/// A master with title and body tables that only define level 1, a layout
/// and a slide placeholder of each kind, and a loose text box.
struct Hierarchy {
    deck: Deck,
    master: MasterId,
    title: ShapeId,
    body: ShapeId,
    text_box: ShapeId,
}

impl Hierarchy {
    fn run(&mut self, shape: ShapeId, level: Level, explicit: Option<StyleRecord>) -> RunId {
        let paragraph = self.deck.add_paragraph(shape, level);
        self.deck.add_run(paragraph, "text", explicit)
    }

    fn resolve(&self, run: RunId) -> ResolvedStyle {
        CascadeResolver::new(&self.deck).resolve(run).unwrap()
    }
}

fn placeholder(
    deck: &mut Deck,
    master: MasterId,
    role: PlaceholderRole,
    parent: Option<ShapeId>,
    list_style: Option<LevelStyleTable>,
) -> ShapeId {
    deck.add_shape(Shape {
        name: format!("{} placeholder", role.as_str()),
        master: Some(master),
        placeholder: Some(role),
        placeholder_parent: parent,
        list_style,
        ..Default::default()
    })
}

#[fixture]
fn hierarchy() -> Hierarchy {
    let mut deck = Deck::new();
    let theme = deck.add_theme(theme());
    let master = deck.add_master(Master {
        name: "slideMaster1".to_string(),
        theme: Some(theme),
        color_map: Some(ColorSlotMap::default()),
        title_style: Some(LevelStyleTable::new().with(
            Level::FIRST,
            StyleRecord {
                typeface: Some("+mj-lt".to_string()),
                size: Some(4400),
                color: Some(text1()),
                ..Default::default()
            },
        )),
        body_style: Some(LevelStyleTable::new().with(Level::FIRST, record(2800))),
        other_style: Some(
            LevelStyleTable::new()
                .with(Level::FIRST, record(1800))
                .with(level(3), record(1600)),
        ),
    });
    deck.set_default_theme(Some(theme));
    deck.set_default_text_style(Some(
        LevelStyleTable::new()
            .with(level(3), record(1500))
            .with(level(4), record(1400)),
    ));

    let master_title = placeholder(&mut deck, master, PlaceholderRole::Title, None, None);
    let master_body = placeholder(&mut deck, master, PlaceholderRole::Body, None, None);
    let layout_title = placeholder(
        &mut deck,
        master,
        PlaceholderRole::Title,
        Some(master_title),
        None,
    );
    let layout_body = placeholder(
        &mut deck,
        master,
        PlaceholderRole::Object,
        Some(master_body),
        Some(LevelStyleTable::new().with(
            Level::FIRST,
            StyleRecord {
                italic: Some(true),
                ..Default::default()
            },
        )),
    );
    let title = placeholder(
        &mut deck,
        master,
        PlaceholderRole::Title,
        Some(layout_title),
        None,
    );
    let body = placeholder(
        &mut deck,
        master,
        PlaceholderRole::Object,
        Some(layout_body),
        None,
    );
    let text_box = deck.add_shape(Shape {
        name: "TextBox 3".to_string(),
        master: Some(master),
        ..Default::default()
    });

    Hierarchy {
        deck,
        master,
        title,
        body,
        text_box,
    }
}

#[rstest]
#[case::title(|h: &Hierarchy| h.title)]
#[case::body(|h: &Hierarchy| h.body)]
#[case::text_box(|h: &Hierarchy| h.text_box)]
fn explicit_attributes_always_win(
    mut hierarchy: Hierarchy,
    #[case] shape: fn(&Hierarchy) -> ShapeId,
) {
    let shape = shape(&hierarchy);
    let explicit = StyleRecord {
        typeface: Some("Georgia".to_string()),
        size: Some(1100),
        bold: Some(false),
        italic: Some(false),
        underline: Some(Underline::Wavy),
        baseline: Some(30),
        color: Some(ColorReference::Rgb(Rgb::new(0x12, 0x34, 0x56))),
    };
    let run = hierarchy.run(shape, Level::FIRST, Some(explicit));

    assert_eq!(
        hierarchy.resolve(run),
        ResolvedStyle {
            typeface: "Georgia".to_string(),
            size: 1100,
            bold: false,
            italic: false,
            underline: Underline::Wavy,
            baseline: 30,
            color: Rgb::new(0x12, 0x34, 0x56),
            color_kind: ColorKind::Rgb,
        }
    );
}

#[test]
fn empty_chain_resolves_to_documented_defaults() {
    let mut deck = Deck::new();
    let theme = deck.add_theme(theme());
    deck.set_default_theme(Some(theme));
    let shape = deck.add_shape(Shape::default());
    let paragraph = deck.add_paragraph(shape, level(5));
    let run = deck.add_run(paragraph, "loose", None);

    let style = CascadeResolver::new(&deck).resolve(run).unwrap();
    let baseline = Baseline::default();
    assert_eq!(
        style,
        ResolvedStyle {
            typeface: "Aptos".to_string(),
            size: baseline.size,
            bold: baseline.bold,
            italic: baseline.italic,
            underline: baseline.underline,
            baseline: baseline.baseline,
            color: NEAR_BLACK,
            color_kind: ColorKind::Scheme,
        }
    );
}

#[test]
fn baseline_typeface_when_theme_has_no_minor_font() {
    let mut deck = Deck::new();
    let mut bare = theme();
    bare.fonts = Default::default();
    let theme = deck.add_theme(bare);
    deck.set_default_theme(Some(theme));
    let shape = deck.add_shape(Shape::default());
    let paragraph = deck.add_paragraph(shape, Level::FIRST);
    let run = deck.add_run(paragraph, "loose", None);

    let resolver = CascadeResolver::with_baseline(
        &deck,
        Baseline {
            typeface: "Arial".to_string(),
            size: 1200,
            ..Default::default()
        },
    );
    let style = resolver.resolve(run).unwrap();
    assert_eq!(style.typeface, "Arial");
    assert_eq!(style.size, 1200);
}

#[rstest]
fn attributes_resolve_independently(mut hierarchy: Hierarchy) {
    let list_style = LevelStyleTable::new().with(
        Level::FIRST,
        StyleRecord {
            size: Some(2000),
            color: Some(ColorReference::Scheme(SchemeColor::Slot(ThemeSlot::Accent1))),
            ..Default::default()
        },
    );
    let shape = hierarchy.deck.add_shape(Shape {
        master: Some(hierarchy.master),
        list_style: Some(list_style),
        ..Default::default()
    });
    let run = hierarchy.run(shape, Level::FIRST, Some(record(900)));

    let resolver = CascadeResolver::new(&hierarchy.deck);
    let chain = resolver.chain(run);
    assert_eq!(chain.first(|r| r.size), Some((CascadeStep::RunProperties, 900)));
    assert_eq!(
        chain.first(|r| r.color.as_ref()).map(|(step, _)| step),
        Some(CascadeStep::ListStyle)
    );

    let style = resolver.resolve(run).unwrap();
    assert_eq!(style.size, 900);
    assert_eq!(style.color, Rgb::new(0x4F, 0x81, 0xBD));
    // other_style supplies nothing but the size, which the run already has
    assert_eq!(style.typeface, "Aptos");
}

#[rstest]
fn title_placeholder_falls_back_to_level_one(mut hierarchy: Hierarchy) {
    let run = hierarchy.run(hierarchy.title, level(3), None);
    let style = hierarchy.resolve(run);
    assert_eq!(style.size, 4400);
    assert_eq!(style.typeface, "Calibri Light");
    assert_eq!(style.color, NEAR_BLACK);
}

#[rstest]
fn body_placeholder_does_not_fall_back_to_level_one(mut hierarchy: Hierarchy) {
    let run = hierarchy.run(hierarchy.body, level(3), None);
    let resolver = CascadeResolver::new(&hierarchy.deck);

    assert!(resolver.chain(run).records(CascadeStep::Placeholder).is_empty());
    // master other_style at level 3
    assert_eq!(resolver.resolve(run).unwrap().size, 1600);

    let run = hierarchy.run(hierarchy.body, level(4), None);
    // neither the body table nor other_style: the document default
    assert_eq!(hierarchy.resolve(run).size, 1400);
}

#[rstest]
fn placeholder_chain_reads_layout_before_master(mut hierarchy: Hierarchy) {
    let first = hierarchy.run(hierarchy.body, Level::FIRST, None);
    let style = hierarchy.resolve(first);
    assert!(style.italic);
    assert_eq!(style.size, 2800);

    let second = hierarchy.run(hierarchy.body, level(2), None);
    assert!(!hierarchy.resolve(second).italic);
}

#[rstest]
fn font_reference_only_applies_outside_placeholders(mut hierarchy: Hierarchy) {
    let accent = ColorReference::Scheme(SchemeColor::Slot(ThemeSlot::Accent2));
    let styled_box = hierarchy.deck.add_shape(Shape {
        master: Some(hierarchy.master),
        font_reference: Some(accent.clone()),
        ..Default::default()
    });
    let styled_title = hierarchy.deck.add_shape(Shape {
        master: Some(hierarchy.master),
        placeholder: Some(PlaceholderRole::Title),
        font_reference: Some(accent),
        ..Default::default()
    });

    let run = hierarchy.run(styled_box, Level::FIRST, None);
    let style = hierarchy.resolve(run);
    assert_eq!(style.color, Rgb::new(0xC0, 0x50, 0x4D));
    assert_eq!(style.size, 1800);

    let run = hierarchy.run(styled_title, Level::FIRST, None);
    assert_eq!(hierarchy.resolve(run).color, NEAR_BLACK);
}

#[rstest]
fn master_default_reads_other_style_not_body_style(mut hierarchy: Hierarchy) {
    let text_box = hierarchy.text_box;
    let run = hierarchy.run(text_box, Level::FIRST, None);

    let resolver = CascadeResolver::new(&hierarchy.deck);
    assert_eq!(
        resolver.chain(run).records(CascadeStep::MasterDefault),
        vec![&record(1800)]
    );
    // the master body table says 2800 at level 1
    assert_eq!(resolver.resolve(run).unwrap().size, 1800);
}

#[test]
fn master_default_falls_back_to_theme_text_style() {
    let mut deck = Deck::new();
    let mut styled = theme();
    styled.default_text_style = Some(LevelStyleTable::new().with(Level::FIRST, record(2100)));
    let theme = deck.add_theme(styled);
    let master = deck.add_master(Master {
        theme: Some(theme),
        ..Default::default()
    });
    let shape = deck.add_shape(Shape {
        master: Some(master),
        ..Default::default()
    });
    let paragraph = deck.add_paragraph(shape, Level::FIRST);
    let run = deck.add_run(paragraph, "text", None);

    let resolver = CascadeResolver::new(&deck);
    assert_eq!(
        resolver.chain(run).records(CascadeStep::MasterDefault),
        vec![&record(2100)]
    );
    assert_eq!(resolver.resolve(run).unwrap().size, 2100);
}

#[rstest]
fn text1_follows_the_master_color_map(mut hierarchy: Hierarchy) {
    let dark = hierarchy.deck.add_master(Master {
        theme: Some(pptx_cascade::model::ThemeId(0)),
        color_map: Some(
            ColorSlotMap::default()
                .with(ColorRole::Text1, ThemeSlot::Light1)
                .with(ColorRole::Background1, ThemeSlot::Dark1),
        ),
        ..Default::default()
    });
    let shape = hierarchy.deck.add_shape(Shape {
        master: Some(dark),
        ..Default::default()
    });

    let light = hierarchy.run(hierarchy.text_box, Level::FIRST, None);
    let on_dark = hierarchy.run(shape, Level::FIRST, None);
    assert_eq!(hierarchy.resolve(light).color, NEAR_BLACK);
    assert_eq!(hierarchy.resolve(on_dark).color, Rgb::WHITE);
}

#[test]
fn system_color_slot_uses_cached_value() {
    let mut deck = Deck::new();
    let mut system = theme();
    system.colors.set(
        ThemeSlot::Dark1,
        ThemeColor {
            rgb: None,
            system: Some(SystemColor {
                name: "windowText".to_string(),
                last: Some(Rgb::BLACK),
            }),
        },
    );
    let theme = deck.add_theme(system);
    deck.set_default_theme(Some(theme));
    let shape = deck.add_shape(Shape::default());
    let paragraph = deck.add_paragraph(shape, Level::FIRST);
    let run = deck.add_run(paragraph, "text", None);

    let style = CascadeResolver::new(&deck).resolve(run).unwrap();
    assert_eq!(style.color, Rgb::BLACK);
    // the slot is system, the reference that reached it is a scheme color
    assert_eq!(style.color_kind, ColorKind::Scheme);
}

#[test]
fn empty_slot_is_a_malformed_theme() {
    let mut deck = Deck::new();
    let mut broken = theme();
    broken.colors.set(ThemeSlot::Dark1, ThemeColor::default());
    let theme = deck.add_theme(broken);
    deck.set_default_theme(Some(theme));
    let shape = deck.add_shape(Shape::default());
    let paragraph = deck.add_paragraph(shape, Level::FIRST);
    let run = deck.add_run(paragraph, "text", None);

    assert_eq!(
        CascadeResolver::new(&deck).resolve(run),
        Err(ResolveError {
            run,
            attribute: Attribute::Color,
            step: CascadeStep::ThemeDefault,
            source: ColorError::MalformedTheme(ThemeFault::EmptySlot(ThemeSlot::Dark1)),
        })
    );
}

#[test]
fn scheme_color_without_any_theme_is_a_malformed_theme() {
    let mut deck = Deck::new();
    let shape = deck.add_shape(Shape::default());
    let paragraph = deck.add_paragraph(shape, Level::FIRST);
    let run = deck.add_run(paragraph, "text", None);

    let err = CascadeResolver::new(&deck).resolve(run).unwrap_err();
    assert_eq!(
        err.source,
        ColorError::MalformedTheme(ThemeFault::NoColorScheme)
    );

    let explicit = deck.add_run(
        paragraph,
        "red",
        Some(StyleRecord {
            color: Some(ColorReference::Preset("red".to_string())),
            ..Default::default()
        }),
    );
    assert_eq!(
        CascadeResolver::new(&deck).resolve(explicit).unwrap().color,
        Rgb::new(0xFF, 0, 0)
    );
}

#[rstest]
fn resolution_is_idempotent(mut hierarchy: Hierarchy) {
    let run = hierarchy.run(hierarchy.body, level(2), Some(record(1300)));
    let resolver = CascadeResolver::new(&hierarchy.deck);
    assert_eq!(resolver.resolve(run), resolver.resolve(run));
}

#[rstest]
fn merged_chain_agrees_with_resolution(mut hierarchy: Hierarchy) {
    let run = hierarchy.run(
        hierarchy.body,
        Level::FIRST,
        Some(StyleRecord {
            bold: Some(true),
            ..Default::default()
        }),
    );
    let resolver = CascadeResolver::new(&hierarchy.deck);
    let merged = resolver.chain(run).merged();
    let style = resolver.resolve(run).unwrap();

    assert_eq!(merged.size, Some(style.size));
    assert_eq!(merged.bold, Some(style.bold));
    assert_eq!(merged.italic, Some(style.italic));
    assert_eq!(merged.color, Some(text1()));
}

#[rstest]
fn threads_share_one_resolver(mut hierarchy: Hierarchy) {
    let mut runs = vec![];
    for n in 1..=Level::COUNT as u8 {
        runs.push(hierarchy.run(hierarchy.title, level(n), None));
        runs.push(hierarchy.run(hierarchy.body, level(n), None));
        runs.push(hierarchy.run(hierarchy.text_box, level(n), None));
    }
    let resolver = CascadeResolver::new(&hierarchy.deck);
    let sequential: Vec<_> = runs.iter().map(|&run| resolver.resolve(run)).collect();

    let concurrent: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = runs
            .chunks(4)
            .map(|chunk| {
                let resolver = &resolver;
                scope.spawn(move || {
                    chunk
                        .iter()
                        .map(|&run| resolver.resolve(run))
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });

    assert_eq!(concurrent, sequential);
}

#[rstest]
fn shape_color_context_follows_its_master(hierarchy: Hierarchy) {
    let resolver = CascadeResolver::new(&hierarchy.deck);
    let context = resolver.color_context(hierarchy.text_box);
    let accent1 = ColorReference::Scheme(SchemeColor::Slot(ThemeSlot::Accent1));

    assert_eq!(
        pptx_cascade::resolve_color(&accent1, &context),
        Ok(Rgb::new(0x4F, 0x81, 0xBD))
    );
    assert_eq!(
        pptx_cascade::resolve_color(&text1(), &context),
        Ok(NEAR_BLACK)
    );
}
