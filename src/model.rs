//! The read-only view of a parsed deck that the cascade walks.
//!
//! Nodes are addressed by small `Copy` handles handed out by the model
//! implementation. A handle from one model is meaningless in another.

use std::{fmt, str::FromStr};

use crate::{
    color::ColorReference,
    style::{Level, LevelStyleTable, StyleRecord},
    theme::{ColorSlotMap, Theme},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParagraphId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MasterId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThemeId(pub usize);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// `<p:ph type="..."/>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PlaceholderRole {
    Title,
    CenteredTitle,
    Subtitle,
    Body,
    /// the schema default when `type` is omitted
    #[default]
    Object,
    Chart,
    Table,
    ClipArt,
    Diagram,
    Media,
    SlideImage,
    Picture,
    Date,
    Footer,
    Header,
    SlideNumber,
}

impl PlaceholderRole {
    /// Title placeholders take their defaults from the master's `p:titleStyle`,
    /// everything else from `p:bodyStyle`.
    pub fn uses_title_style(&self) -> bool {
        matches!(self, PlaceholderRole::Title | PlaceholderRole::CenteredTitle)
    }

    /// The role of the master placeholder a layout placeholder of this role inherits from.
    pub fn master_counterpart(&self) -> PlaceholderRole {
        match self {
            PlaceholderRole::Title | PlaceholderRole::CenteredTitle => PlaceholderRole::Title,
            PlaceholderRole::Date
            | PlaceholderRole::Footer
            | PlaceholderRole::Header
            | PlaceholderRole::SlideNumber
            | PlaceholderRole::SlideImage => *self,
            _ => PlaceholderRole::Body,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceholderRole::Title => "title",
            PlaceholderRole::CenteredTitle => "ctrTitle",
            PlaceholderRole::Subtitle => "subTitle",
            PlaceholderRole::Body => "body",
            PlaceholderRole::Object => "obj",
            PlaceholderRole::Chart => "chart",
            PlaceholderRole::Table => "tbl",
            PlaceholderRole::ClipArt => "clipArt",
            PlaceholderRole::Diagram => "dgm",
            PlaceholderRole::Media => "media",
            PlaceholderRole::SlideImage => "sldImg",
            PlaceholderRole::Picture => "pic",
            PlaceholderRole::Date => "dt",
            PlaceholderRole::Footer => "ftr",
            PlaceholderRole::Header => "hdr",
            PlaceholderRole::SlideNumber => "sldNum",
        }
    }
}

impl FromStr for PlaceholderRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let role = match s {
            "title" => PlaceholderRole::Title,
            "ctrTitle" => PlaceholderRole::CenteredTitle,
            "subTitle" => PlaceholderRole::Subtitle,
            "body" => PlaceholderRole::Body,
            "obj" => PlaceholderRole::Object,
            "chart" => PlaceholderRole::Chart,
            "tbl" => PlaceholderRole::Table,
            "clipArt" => PlaceholderRole::ClipArt,
            "dgm" => PlaceholderRole::Diagram,
            "media" => PlaceholderRole::Media,
            "sldImg" => PlaceholderRole::SlideImage,
            "pic" => PlaceholderRole::Picture,
            "dt" => PlaceholderRole::Date,
            "ftr" => PlaceholderRole::Footer,
            "hdr" => PlaceholderRole::Header,
            "sldNum" => PlaceholderRole::SlideNumber,
            other => return Err(other.to_string()),
        };
        Ok(role)
    }
}

/// The three list styles of a master's `p:txStyles`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextStyleKind {
    /// `p:titleStyle`
    Title,
    /// `p:bodyStyle`
    Body,
    /// `p:otherStyle`, used for text outside placeholders
    Other,
}

/// Read-only queries over one immutable deck snapshot.
///
/// Implementations must return the same answer for the same handle for as long
/// as the snapshot lives; the cascade relies on that for idempotent results and
/// for sharing one model between threads.
#[cfg_attr(test, unimock::unimock(api = DeckModelMock))]
pub trait DeckModel {
    /// Explicit `a:rPr` of the run.
    fn run_properties(&self, run: RunId) -> Option<&StyleRecord>;

    fn run_paragraph(&self, run: RunId) -> ParagraphId;

    fn paragraph_level(&self, paragraph: ParagraphId) -> Level;

    /// The shape whose text body owns the paragraph.
    fn paragraph_shape(&self, paragraph: ParagraphId) -> ShapeId;

    /// `p:txBody/a:lstStyle` of the shape itself.
    fn list_style(&self, shape: ShapeId) -> Option<&LevelStyleTable>;

    fn placeholder(&self, shape: ShapeId) -> Option<PlaceholderRole>;

    /// The layout (or master) placeholder this placeholder inherits from.
    fn placeholder_parent(&self, shape: ShapeId) -> Option<ShapeId>;

    /// Color of `p:style/a:fontRef`.
    fn font_reference(&self, shape: ShapeId) -> Option<&ColorReference>;

    fn shape_master(&self, shape: ShapeId) -> Option<MasterId>;

    fn master_text_style(&self, master: MasterId, kind: TextStyleKind)
        -> Option<&LevelStyleTable>;

    fn color_map(&self, master: MasterId) -> Option<&ColorSlotMap>;

    fn master_theme(&self, master: MasterId) -> Option<ThemeId>;

    fn theme(&self, theme: ThemeId) -> Option<&Theme>;

    /// `p:presentation/p:defaultTextStyle`
    fn default_text_style(&self) -> Option<&LevelStyleTable>;

    fn default_theme(&self) -> Option<ThemeId>;
}
