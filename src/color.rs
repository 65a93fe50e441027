use std::{fmt, str::FromStr};

use crate::{
    error::{ColorError, ThemeFault},
    preset,
    theme::{ColorSlotMap, ColorTable},
};

/// A concrete 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `RRGGBB`, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self::new(r, g, b))
    }

    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// The twelve physical slots of a theme color scheme (`a:clrScheme`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeSlot {
    Dark1,
    Light1,
    Dark2,
    Light2,
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Accent5,
    Accent6,
    Hyperlink,
    FollowedHyperlink,
}

impl ThemeSlot {
    /// Document order inside `a:clrScheme`.
    pub const ALL: [ThemeSlot; 12] = [
        ThemeSlot::Dark1,
        ThemeSlot::Light1,
        ThemeSlot::Dark2,
        ThemeSlot::Light2,
        ThemeSlot::Accent1,
        ThemeSlot::Accent2,
        ThemeSlot::Accent3,
        ThemeSlot::Accent4,
        ThemeSlot::Accent5,
        ThemeSlot::Accent6,
        ThemeSlot::Hyperlink,
        ThemeSlot::FollowedHyperlink,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThemeSlot::Dark1 => "dk1",
            ThemeSlot::Light1 => "lt1",
            ThemeSlot::Dark2 => "dk2",
            ThemeSlot::Light2 => "lt2",
            ThemeSlot::Accent1 => "accent1",
            ThemeSlot::Accent2 => "accent2",
            ThemeSlot::Accent3 => "accent3",
            ThemeSlot::Accent4 => "accent4",
            ThemeSlot::Accent5 => "accent5",
            ThemeSlot::Accent6 => "accent6",
            ThemeSlot::Hyperlink => "hlink",
            ThemeSlot::FollowedHyperlink => "folHlink",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for ThemeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThemeSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for ThemeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Semantic color roles that a master remaps onto physical slots (`p:clrMap`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorRole {
    Background1,
    Text1,
    Background2,
    Text2,
}

impl ColorRole {
    pub const ALL: [ColorRole; 4] = [
        ColorRole::Background1,
        ColorRole::Text1,
        ColorRole::Background2,
        ColorRole::Text2,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorRole::Background1 => "bg1",
            ColorRole::Text1 => "tx1",
            ColorRole::Background2 => "bg2",
            ColorRole::Text2 => "tx2",
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl FromStr for ColorRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColorRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

impl fmt::Display for ColorRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<a:schemeClr val="..."/>`: either a physical slot or a semantic role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeColor {
    Slot(ThemeSlot),
    Role(ColorRole),
}

impl FromStr for SchemeColor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<ColorRole>()
            .map(SchemeColor::Role)
            .or_else(|_| s.parse::<ThemeSlot>().map(SchemeColor::Slot))
    }
}

impl fmt::Display for SchemeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemeColor::Slot(slot) => slot.fmt(f),
            SchemeColor::Role(role) => role.fmt(f),
        }
    }
}

/// A named system color together with the value it had on the authoring machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SystemColor {
    pub name: String,
    pub last: Option<Rgb>,
}

/// A color as written by the document author, before any theme indirection.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColorReference {
    Rgb(Rgb),
    Scheme(SchemeColor),
    System { name: String, fallback: Rgb },
    Preset(String),
}

impl ColorReference {
    pub fn kind(&self) -> ColorKind {
        match self {
            ColorReference::Rgb(_) => ColorKind::Rgb,
            ColorReference::Scheme(_) => ColorKind::Scheme,
            ColorReference::System { .. } => ColorKind::System,
            ColorReference::Preset(_) => ColorKind::Preset,
        }
    }
}

/// How a resolved color was written, which tells a caller whether it follows
/// the theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorKind {
    Rgb,
    Scheme,
    System,
    Preset,
}

impl fmt::Display for ColorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColorKind::Rgb => "rgb",
            ColorKind::Scheme => "scheme",
            ColorKind::System => "system",
            ColorKind::Preset => "preset",
        };
        f.write_str(name)
    }
}

/// Everything needed to turn a [`ColorReference`] into an [`Rgb`].
///
/// `map` is the master's color map. Without one, semantic roles use the
/// standard mapping (see [`ColorSlotMap::default`]).
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorContext<'a> {
    pub table: Option<&'a ColorTable>,
    pub map: Option<&'a ColorSlotMap>,
}

impl<'a> ColorContext<'a> {
    pub fn new(table: &'a ColorTable, map: &'a ColorSlotMap) -> Self {
        Self {
            table: Some(table),
            map: Some(map),
        }
    }

    /// Finds the physical slot a scheme color points at.
    pub fn slot(&self, scheme: SchemeColor) -> Result<ThemeSlot, ColorError> {
        match scheme {
            SchemeColor::Slot(slot) => Ok(slot),
            SchemeColor::Role(role) => match self.map {
                Some(map) => map.remap(role),
                None => ColorSlotMap::default().remap(role),
            },
        }
    }
}

pub fn resolve_color(
    reference: &ColorReference,
    context: &ColorContext<'_>,
) -> Result<Rgb, ColorError> {
    match reference {
        ColorReference::Rgb(rgb) => Ok(*rgb),
        ColorReference::Scheme(scheme) => {
            let slot = context.slot(*scheme)?;
            let table = context
                .table
                .ok_or(ColorError::MalformedTheme(ThemeFault::NoColorScheme))?;
            table.resolve_slot(slot)
        }
        ColorReference::System { fallback, .. } => Ok(*fallback),
        ColorReference::Preset(name) => {
            preset::lookup(name).ok_or_else(|| ColorError::UnknownPresetColor(name.clone()))
        }
    }
}
