use std::path::PathBuf;

use thiserror::Error;

use crate::{
    cascade::{Attribute, CascadeStep},
    color::{ColorRole, ThemeSlot},
    model::RunId,
};

/// What is wrong with a theme or color map.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeFault {
    #[error("color slot {0} has neither an RGB value nor a system color fallback")]
    EmptySlot(ThemeSlot),
    #[error("color map does not map {0}")]
    UnmappedRole(ColorRole),
    #[error("no color scheme is reachable from this shape")]
    NoColorScheme,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColorError {
    #[error("malformed theme: {0}")]
    MalformedTheme(#[from] ThemeFault),
    #[error("unknown preset color {0:?}")]
    UnknownPresetColor(String),
}

/// A color fault raised while resolving one run, with the place it was found.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot resolve {attribute} of run {run} (found at {step}): {source}")]
pub struct ResolveError {
    pub run: RunId,
    pub attribute: Attribute,
    pub step: CascadeStep,
    #[source]
    pub source: ColorError,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed XML in {path:?}: {source}")]
    Xml {
        path: PathBuf,
        #[source]
        source: xml::reader::Error,
    },
    #[error("{0:?} does not contain a root element")]
    EmptyPart(PathBuf),
    #[error("package has no part {0:?}")]
    MissingPart(PathBuf),
    #[error("element {id:?} is missing attributes {missing:?}")]
    MissingAttributes {
        id: String,
        missing: Vec<&'static str>,
    },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
