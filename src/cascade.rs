//! Effective character formatting of a text run.
//!
//! The precedence chain is materialized as an ordered list of links, one or
//! more per [`CascadeStep`], and each attribute is read from the first link
//! that carries it. Attributes are independent: a link that supplies the size
//! but not the color does not stop the search for a color.

use std::{borrow::Cow, fmt};

use crate::{
    color::{resolve_color, ColorContext, ColorKind, ColorReference, ColorRole, Rgb, SchemeColor},
    error::ResolveError,
    model::{DeckModel, MasterId, RunId, ShapeId, TextStyleKind},
    style::{Level, StyleRecord, Underline},
    theme::{FontScheme, Theme},
};

/// Layout placeholder -> master placeholder is the deepest real chain.
const MAX_PLACEHOLDER_DEPTH: usize = 4;

static TEXT1: ColorReference = ColorReference::Scheme(SchemeColor::Role(ColorRole::Text1));

/// Sources of formatting, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeStep {
    /// the run's own `a:rPr`
    RunProperties,
    /// the owning text body's `a:lstStyle` at the paragraph level
    ListStyle,
    /// `p:style/a:fontRef` of a non-placeholder shape; color only
    FontReference,
    /// inherited placeholder list styles, then the master title or body style
    Placeholder,
    /// the master's `p:otherStyle`, or the theme's text defaults
    MasterDefault,
    /// the presentation's `p:defaultTextStyle`
    DocumentDefault,
    /// theme `tx1` color and minor latin font
    ThemeDefault,
}

impl CascadeStep {
    pub const ORDER: [CascadeStep; 7] = [
        CascadeStep::RunProperties,
        CascadeStep::ListStyle,
        CascadeStep::FontReference,
        CascadeStep::Placeholder,
        CascadeStep::MasterDefault,
        CascadeStep::DocumentDefault,
        CascadeStep::ThemeDefault,
    ];
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CascadeStep::RunProperties => "run properties",
            CascadeStep::ListStyle => "text body list style",
            CascadeStep::FontReference => "shape font reference",
            CascadeStep::Placeholder => "placeholder",
            CascadeStep::MasterDefault => "master default",
            CascadeStep::DocumentDefault => "document default",
            CascadeStep::ThemeDefault => "theme default",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Typeface,
    Size,
    Bold,
    Italic,
    Underline,
    Baseline,
    Color,
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Typeface => "typeface",
            Attribute::Size => "size",
            Attribute::Bold => "bold",
            Attribute::Italic => "italic",
            Attribute::Underline => "underline",
            Attribute::Baseline => "baseline",
            Attribute::Color => "color",
        };
        f.write_str(name)
    }
}

/// Values used for an attribute that no link of the chain supplies.
///
/// Color never reaches the baseline: the theme default always supplies `tx1`.
/// The typeface only does when the theme has no minor latin font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Baseline {
    pub typeface: String,
    /// hundredths of a point
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    pub baseline: i32,
}

impl Default for Baseline {
    /// PowerPoint's stock text defaults: 18pt Calibri, no emphasis.
    fn default() -> Self {
        Self {
            typeface: "Calibri".to_string(),
            size: 1800,
            bold: false,
            italic: false,
            underline: Underline::None,
            baseline: 0,
        }
    }
}

/// Fully resolved character formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedStyle {
    pub typeface: String,
    /// hundredths of a point
    pub size: u32,
    pub bold: bool,
    pub italic: bool,
    pub underline: Underline,
    /// percent
    pub baseline: i32,
    pub color: Rgb,
    /// how the color was written where the chain found it
    pub color_kind: ColorKind,
}

impl fmt::Display for ResolvedStyle {
    /// `Calibri 10.5pt bold u=sng +30% #1F1F1F`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.typeface, self.size / 100)?;
        if self.size % 100 != 0 {
            let fraction = format!("{:02}", self.size % 100);
            write!(f, ".{}", fraction.trim_end_matches('0'))?;
        }
        f.write_str("pt")?;
        if self.bold {
            f.write_str(" bold")?;
        }
        if self.italic {
            f.write_str(" italic")?;
        }
        if self.underline != Underline::None {
            write!(f, " u={}", self.underline.as_str())?;
        }
        if self.baseline != 0 {
            write!(f, " {:+}%", self.baseline)?;
        }
        write!(f, " {}", self.color)
    }
}

#[derive(Debug, Clone)]
pub struct Link<'a> {
    pub step: CascadeStep,
    pub record: Cow<'a, StyleRecord>,
}

/// The ordered formatting sources of one run.
#[derive(Debug, Clone, Default)]
pub struct Chain<'a> {
    links: Vec<Link<'a>>,
}

impl<'a> Chain<'a> {
    pub fn links(&self) -> &[Link<'a>] {
        &self.links
    }

    /// Records contributed by one step, in precedence order.
    pub fn records(&self, step: CascadeStep) -> Vec<&StyleRecord> {
        self.links
            .iter()
            .filter(|link| link.step == step)
            .map(|link| &*link.record)
            .collect()
    }

    /// The first value `pick` finds, with the step that supplied it.
    pub fn first<'s, T>(
        &'s self,
        pick: impl Fn(&'s StyleRecord) -> Option<T>,
    ) -> Option<(CascadeStep, T)> {
        self.links
            .iter()
            .find_map(|link| pick(&*link.record).map(|value| (link.step, value)))
    }

    /// All links folded into one record with [`StyleRecord::merge`].
    pub fn merged(&self) -> StyleRecord {
        self.links
            .iter()
            .fold(StyleRecord::default(), |acc, link| acc.merge(&link.record))
    }

    fn push(&mut self, step: CascadeStep, record: Cow<'a, StyleRecord>) {
        if !record.is_empty() {
            self.links.push(Link { step, record });
        }
    }
}

/// Where a run sits in the hierarchy.
#[derive(Debug, Clone, Copy)]
struct Site<'a> {
    run: RunId,
    level: Level,
    shape: ShapeId,
    master: Option<MasterId>,
    theme: Option<&'a Theme>,
}

/// Resolves runs of one deck snapshot.
///
/// Holds no state besides the model reference and the baseline, so one
/// resolver can be shared by several threads.
#[derive(Debug)]
pub struct CascadeResolver<'a, M: DeckModel + ?Sized> {
    model: &'a M,
    baseline: Baseline,
}

impl<'a, M: DeckModel + ?Sized> CascadeResolver<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self::with_baseline(model, Baseline::default())
    }

    pub fn with_baseline(model: &'a M, baseline: Baseline) -> Self {
        Self { model, baseline }
    }

    pub fn resolve(&self, run: RunId) -> Result<ResolvedStyle, ResolveError> {
        let site = self.site(run);
        let chain = self.chain_at(&site);

        let typeface = match chain.first(|r| r.typeface.as_deref()) {
            Some((step, typeface)) => {
                log::trace!("run {run}: typeface {typeface:?} from {step}");
                self.substitute_font(typeface, site.theme)
            }
            None => self.baseline.typeface.clone(),
        };
        let size = chain
            .first(|r| r.size)
            .map_or(self.baseline.size, |(_, size)| size);
        let bold = chain
            .first(|r| r.bold)
            .map_or(self.baseline.bold, |(_, bold)| bold);
        let italic = chain
            .first(|r| r.italic)
            .map_or(self.baseline.italic, |(_, italic)| italic);
        let underline = chain
            .first(|r| r.underline)
            .map_or(self.baseline.underline, |(_, underline)| underline);
        let baseline = chain
            .first(|r| r.baseline)
            .map_or(self.baseline.baseline, |(_, baseline)| baseline);

        let (step, reference) = chain
            .first(|r| r.color.as_ref())
            .unwrap_or((CascadeStep::ThemeDefault, &TEXT1));
        log::debug!("run {run}: color {reference:?} from {step}");
        let color = resolve_color(reference, &self.context_at(&site)).map_err(|source| {
            ResolveError {
                run,
                attribute: Attribute::Color,
                step,
                source,
            }
        })?;

        Ok(ResolvedStyle {
            typeface,
            size,
            bold,
            italic,
            underline,
            baseline,
            color,
            color_kind: reference.kind(),
        })
    }

    /// The formatting sources of `run`, most specific first.
    pub fn chain(&self, run: RunId) -> Chain<'a> {
        self.chain_at(&self.site(run))
    }

    /// Theme colors and color map in effect for a shape, for colors found
    /// outside runs such as shape fills.
    pub fn color_context(&self, shape: ShapeId) -> ColorContext<'a> {
        let master = self.model.shape_master(shape);
        self.context(master, self.theme(master))
    }

    fn site(&self, run: RunId) -> Site<'a> {
        let paragraph = self.model.run_paragraph(run);
        let shape = self.model.paragraph_shape(paragraph);
        let master = self.model.shape_master(shape);
        Site {
            run,
            level: self.model.paragraph_level(paragraph),
            shape,
            master,
            theme: self.theme(master),
        }
    }

    fn theme(&self, master: Option<MasterId>) -> Option<&'a Theme> {
        let model = self.model;
        master
            .and_then(|master| model.master_theme(master))
            .or_else(|| model.default_theme())
            .and_then(|theme| model.theme(theme))
    }

    fn context(&self, master: Option<MasterId>, theme: Option<&'a Theme>) -> ColorContext<'a> {
        let model = self.model;
        ColorContext {
            table: theme.map(|theme| &theme.colors),
            map: master.and_then(|master| model.color_map(master)),
        }
    }

    fn context_at(&self, site: &Site<'a>) -> ColorContext<'a> {
        self.context(site.master, site.theme)
    }

    fn chain_at(&self, site: &Site<'a>) -> Chain<'a> {
        let mut chain = Chain::default();
        for step in CascadeStep::ORDER {
            self.collect(step, site, &mut chain);
        }
        chain
    }

    fn collect(&self, step: CascadeStep, site: &Site<'a>, chain: &mut Chain<'a>) {
        let model = self.model;
        match step {
            CascadeStep::RunProperties => {
                if let Some(record) = model.run_properties(site.run) {
                    chain.push(step, Cow::Borrowed(record));
                }
            }
            CascadeStep::ListStyle => {
                if let Some(record) = model
                    .list_style(site.shape)
                    .and_then(|table| table.get(site.level))
                {
                    chain.push(step, Cow::Borrowed(record));
                }
            }
            CascadeStep::FontReference => {
                if model.placeholder(site.shape).is_some() {
                    return;
                }
                if let Some(color) = model.font_reference(site.shape) {
                    let record = StyleRecord {
                        color: Some(color.clone()),
                        ..Default::default()
                    };
                    chain.push(step, Cow::Owned(record));
                }
            }
            CascadeStep::Placeholder => {
                let Some(role) = model.placeholder(site.shape) else {
                    return;
                };
                let mut parent = model.placeholder_parent(site.shape);
                for _ in 0..MAX_PLACEHOLDER_DEPTH {
                    let Some(shape) = parent else { break };
                    if let Some(record) = model
                        .list_style(shape)
                        .and_then(|table| table.get(site.level))
                    {
                        chain.push(step, Cow::Borrowed(record));
                    }
                    parent = model.placeholder_parent(shape);
                }
                if parent.is_some() {
                    log::warn!(
                        "placeholder chain of shape {:?} is deeper than {MAX_PLACEHOLDER_DEPTH}",
                        site.shape
                    );
                }

                let Some(master) = site.master else { return };
                let record = if role.uses_title_style() {
                    // Title styles usually define a single level; deeper
                    // paragraphs take level 1 instead of falling through.
                    model
                        .master_text_style(master, TextStyleKind::Title)
                        .and_then(|table| table.get(site.level).or_else(|| table.get(Level::FIRST)))
                } else {
                    model
                        .master_text_style(master, TextStyleKind::Body)
                        .and_then(|table| table.get(site.level))
                };
                if let Some(record) = record {
                    chain.push(step, Cow::Borrowed(record));
                }
            }
            CascadeStep::MasterDefault => {
                let table = site
                    .master
                    .and_then(|master| model.master_text_style(master, TextStyleKind::Other))
                    .or_else(|| site.theme.and_then(|theme| theme.default_text_style.as_ref()));
                if let Some(record) = table.and_then(|table| table.get(site.level)) {
                    chain.push(step, Cow::Borrowed(record));
                }
            }
            CascadeStep::DocumentDefault => {
                if let Some(record) = model
                    .default_text_style()
                    .and_then(|table| table.get(site.level))
                {
                    chain.push(step, Cow::Borrowed(record));
                }
            }
            CascadeStep::ThemeDefault => {
                let typeface = site
                    .theme
                    .and_then(|theme| theme.fonts.minor.latin.clone())
                    .filter(|typeface| !typeface.is_empty());
                let record = StyleRecord {
                    typeface,
                    color: Some(TEXT1.clone()),
                    ..Default::default()
                };
                chain.push(step, Cow::Owned(record));
            }
        }
    }

    fn substitute_font(&self, typeface: &str, theme: Option<&Theme>) -> String {
        if !FontScheme::is_token(typeface) {
            return typeface.to_string();
        }
        match theme.and_then(|theme| theme.fonts.resolve(typeface)) {
            Some(font) => font.to_string(),
            None => {
                log::warn!("theme font {typeface:?} is not defined by the theme");
                typeface.to_string()
            }
        }
    }
}
