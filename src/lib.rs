//! Effective text formatting for slide decks.
//!
//! A run's typeface, size, weight, slant, underline, baseline offset and color
//! come from the first of several sources that sets them: the run itself, the
//! shape's list style, the shape style, the placeholder it inherits from, the
//! master, the presentation and finally the theme. [`CascadeResolver`] walks
//! that chain over any [`DeckModel`]; [`Deck`] is the model loaded from an
//! unpacked `.pptx`.

pub mod cascade;
pub mod color;
pub mod deck;
pub mod error;
pub mod model;
pub mod ooxml;
pub mod package;
pub mod preset;
pub mod style;
pub mod tag;
pub mod theme;

pub use cascade::{Attribute, Baseline, CascadeResolver, CascadeStep, Chain, ResolvedStyle};
pub use color::{
    resolve_color, ColorContext, ColorKind, ColorReference, ColorRole, Rgb, SchemeColor, ThemeSlot,
};
pub use deck::{Deck, Master, Shape, Slide};
pub use error::{ColorError, Error, LoadError, ResolveError, ThemeFault};
pub use model::{DeckModel, PlaceholderRole, RunId, TextStyleKind};
pub use style::{Level, LevelStyleTable, StyleRecord, Underline};
pub use tag::Element;
pub use theme::{ColorSlotMap, ColorTable, FontScheme, Theme, ThemeColor};
