//! An owned, in-memory deck snapshot.
//!
//! [`Deck`] is what [`crate::package`] builds from an unpacked `.pptx`, and what
//! callers and tests build by hand. Every node is stored once in an arena and
//! addressed by the handles from [`crate::model`].

use crate::{
    color::ColorReference,
    model::{
        DeckModel, MasterId, ParagraphId, PlaceholderRole, RunId, ShapeId, TextStyleKind, ThemeId,
    },
    style::{Level, LevelStyleTable, StyleRecord},
    theme::{ColorSlotMap, Theme},
};

/// Shape-level data the cascade reads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Shape {
    /// `p:cNvPr/@name`
    pub name: String,
    pub master: Option<MasterId>,
    pub placeholder: Option<PlaceholderRole>,
    /// `p:ph/@idx`
    pub placeholder_index: Option<u32>,
    pub placeholder_parent: Option<ShapeId>,
    pub list_style: Option<LevelStyleTable>,
    pub font_reference: Option<ColorReference>,
}

/// A slide master's text styles, color map and theme.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Master {
    pub name: String,
    pub theme: Option<ThemeId>,
    pub color_map: Option<ColorSlotMap>,
    pub title_style: Option<LevelStyleTable>,
    pub body_style: Option<LevelStyleTable>,
    pub other_style: Option<LevelStyleTable>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Slide {
    pub name: String,
    pub shapes: Vec<ShapeId>,
}

#[derive(Debug, Clone)]
struct RunNode {
    paragraph: ParagraphId,
    text: String,
    properties: Option<StyleRecord>,
}

#[derive(Debug, Clone)]
struct ParagraphNode {
    shape: ShapeId,
    level: Level,
    runs: Vec<RunId>,
}

#[derive(Debug, Clone)]
struct ShapeNode {
    shape: Shape,
    paragraphs: Vec<ParagraphId>,
}

#[derive(Debug, Clone, Default)]
pub struct Deck {
    runs: Vec<RunNode>,
    paragraphs: Vec<ParagraphNode>,
    shapes: Vec<ShapeNode>,
    masters: Vec<Master>,
    themes: Vec<Theme>,
    slides: Vec<Slide>,
    default_text_style: Option<LevelStyleTable>,
    default_theme: Option<ThemeId>,
}

impl Deck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_theme(&mut self, theme: Theme) -> ThemeId {
        self.themes.push(theme);
        ThemeId(self.themes.len() - 1)
    }

    pub fn add_master(&mut self, master: Master) -> MasterId {
        self.masters.push(master);
        MasterId(self.masters.len() - 1)
    }

    pub fn add_shape(&mut self, shape: Shape) -> ShapeId {
        self.shapes.push(ShapeNode {
            shape,
            paragraphs: Vec::new(),
        });
        ShapeId(self.shapes.len() - 1)
    }

    pub fn add_paragraph(&mut self, shape: ShapeId, level: Level) -> ParagraphId {
        let id = ParagraphId(self.paragraphs.len());
        self.paragraphs.push(ParagraphNode {
            shape,
            level,
            runs: Vec::new(),
        });
        self.shapes[shape.0].paragraphs.push(id);
        id
    }

    pub fn add_run(
        &mut self,
        paragraph: ParagraphId,
        text: &str,
        properties: Option<StyleRecord>,
    ) -> RunId {
        let id = RunId(self.runs.len());
        self.runs.push(RunNode {
            paragraph,
            text: text.to_string(),
            properties,
        });
        self.paragraphs[paragraph.0].runs.push(id);
        id
    }

    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn set_default_text_style(&mut self, table: Option<LevelStyleTable>) {
        self.default_text_style = table;
    }

    pub fn set_default_theme(&mut self, theme: Option<ThemeId>) {
        self.default_theme = theme;
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn shape(&self, shape: ShapeId) -> &Shape {
        &self.shapes[shape.0].shape
    }

    pub fn master(&self, master: MasterId) -> &Master {
        &self.masters[master.0]
    }

    pub fn paragraphs(&self, shape: ShapeId) -> &[ParagraphId] {
        &self.shapes[shape.0].paragraphs
    }

    pub fn runs(&self, paragraph: ParagraphId) -> &[RunId] {
        &self.paragraphs[paragraph.0].runs
    }

    pub fn run_text(&self, run: RunId) -> &str {
        &self.runs[run.0].text
    }

    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }
}

impl DeckModel for Deck {
    fn run_properties(&self, run: RunId) -> Option<&StyleRecord> {
        self.runs[run.0].properties.as_ref()
    }

    fn run_paragraph(&self, run: RunId) -> ParagraphId {
        self.runs[run.0].paragraph
    }

    fn paragraph_level(&self, paragraph: ParagraphId) -> Level {
        self.paragraphs[paragraph.0].level
    }

    fn paragraph_shape(&self, paragraph: ParagraphId) -> ShapeId {
        self.paragraphs[paragraph.0].shape
    }

    fn list_style(&self, shape: ShapeId) -> Option<&LevelStyleTable> {
        self.shape(shape).list_style.as_ref()
    }

    fn placeholder(&self, shape: ShapeId) -> Option<PlaceholderRole> {
        self.shape(shape).placeholder
    }

    fn placeholder_parent(&self, shape: ShapeId) -> Option<ShapeId> {
        self.shape(shape).placeholder_parent
    }

    fn font_reference(&self, shape: ShapeId) -> Option<&ColorReference> {
        self.shape(shape).font_reference.as_ref()
    }

    fn shape_master(&self, shape: ShapeId) -> Option<MasterId> {
        self.shape(shape).master
    }

    fn master_text_style(
        &self,
        master: MasterId,
        kind: TextStyleKind,
    ) -> Option<&LevelStyleTable> {
        let master = self.master(master);
        match kind {
            TextStyleKind::Title => master.title_style.as_ref(),
            TextStyleKind::Body => master.body_style.as_ref(),
            TextStyleKind::Other => master.other_style.as_ref(),
        }
    }

    fn color_map(&self, master: MasterId) -> Option<&ColorSlotMap> {
        self.master(master).color_map.as_ref()
    }

    fn master_theme(&self, master: MasterId) -> Option<ThemeId> {
        self.master(master).theme
    }

    fn theme(&self, theme: ThemeId) -> Option<&Theme> {
        self.themes.get(theme.0)
    }

    fn default_text_style(&self) -> Option<&LevelStyleTable> {
        self.default_text_style.as_ref()
    }

    fn default_theme(&self) -> Option<ThemeId> {
        self.default_theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_links_nodes_both_ways() {
        let mut deck = Deck::new();
        let shape = deck.add_shape(Shape {
            name: "TextBox 1".to_string(),
            ..Default::default()
        });
        let paragraph = deck.add_paragraph(shape, Level::new(2).unwrap());
        let first = deck.add_run(paragraph, "Hello", None);
        let second = deck.add_run(
            paragraph,
            " world",
            Some(StyleRecord {
                italic: Some(true),
                ..Default::default()
            }),
        );

        assert_eq!(deck.paragraphs(shape), &[paragraph]);
        assert_eq!(deck.runs(paragraph), &[first, second]);
        assert_eq!(deck.run_paragraph(second), paragraph);
        assert_eq!(deck.paragraph_shape(paragraph), shape);
        assert_eq!(deck.paragraph_level(paragraph).get(), 2);
        assert_eq!(deck.run_text(second), " world");
        assert_eq!(deck.run_properties(first), None);
        assert_eq!(
            deck.run_properties(second).and_then(|record| record.italic),
            Some(true)
        );
    }

    #[test]
    fn master_text_styles_by_kind() {
        let mut deck = Deck::new();
        let title = LevelStyleTable::new().with(
            Level::FIRST,
            StyleRecord {
                size: Some(4400),
                ..Default::default()
            },
        );
        let master = deck.add_master(Master {
            title_style: Some(title.clone()),
            ..Default::default()
        });

        assert_eq!(
            deck.master_text_style(master, TextStyleKind::Title),
            Some(&title)
        );
        assert_eq!(deck.master_text_style(master, TextStyleKind::Body), None);
        assert_eq!(deck.theme(ThemeId(3)), None);
    }
}
