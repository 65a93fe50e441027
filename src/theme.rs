use crate::{
    color::{ColorRole, Rgb, SystemColor, ThemeSlot},
    error::{ColorError, ThemeFault},
    style::LevelStyleTable,
};

/// One slot of a color scheme, e.g. `<a:dk1><a:sysClr val="windowText" lastClr="000000"/></a:dk1>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ThemeColor {
    pub rgb: Option<Rgb>,
    pub system: Option<SystemColor>,
}

impl ThemeColor {
    pub fn rgb(rgb: Rgb) -> Self {
        Self {
            rgb: Some(rgb),
            system: None,
        }
    }

    pub fn system(name: &str, last: Option<Rgb>) -> Self {
        Self {
            rgb: None,
            system: Some(SystemColor {
                name: name.to_string(),
                last,
            }),
        }
    }

    /// Prefers the explicit RGB, then the system color's cached value.
    pub fn value(&self) -> Option<Rgb> {
        self.rgb
            .or_else(|| self.system.as_ref().and_then(|system| system.last))
    }
}

/// The twelve slots of a theme's `a:clrScheme`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColorTable {
    slots: [ThemeColor; 12],
}

impl ColorTable {
    /// A table with every slot empty; resolving any slot fails until it is set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock "Office" scheme.
    pub fn office() -> Self {
        let mut table = Self::new();
        table.set(
            ThemeSlot::Dark1,
            ThemeColor::system("windowText", Some(Rgb::BLACK)),
        );
        table.set(
            ThemeSlot::Light1,
            ThemeColor::system("window", Some(Rgb::WHITE)),
        );
        table.set(ThemeSlot::Dark2, ThemeColor::rgb(Rgb::new(0x1F, 0x49, 0x7D)));
        table.set(ThemeSlot::Light2, ThemeColor::rgb(Rgb::new(0xEE, 0xEC, 0xE1)));
        table.set(ThemeSlot::Accent1, ThemeColor::rgb(Rgb::new(0x4F, 0x81, 0xBD)));
        table.set(ThemeSlot::Accent2, ThemeColor::rgb(Rgb::new(0xC0, 0x50, 0x4D)));
        table.set(ThemeSlot::Accent3, ThemeColor::rgb(Rgb::new(0x9B, 0xBB, 0x59)));
        table.set(ThemeSlot::Accent4, ThemeColor::rgb(Rgb::new(0x80, 0x64, 0xA2)));
        table.set(ThemeSlot::Accent5, ThemeColor::rgb(Rgb::new(0x4B, 0xAC, 0xC6)));
        table.set(ThemeSlot::Accent6, ThemeColor::rgb(Rgb::new(0xF7, 0x96, 0x46)));
        table.set(ThemeSlot::Hyperlink, ThemeColor::rgb(Rgb::new(0, 0, 0xFF)));
        table.set(
            ThemeSlot::FollowedHyperlink,
            ThemeColor::rgb(Rgb::new(0x80, 0, 0x80)),
        );
        table
    }

    pub fn get(&self, slot: ThemeSlot) -> &ThemeColor {
        &self.slots[slot.index()]
    }

    pub fn set(&mut self, slot: ThemeSlot, color: ThemeColor) {
        self.slots[slot.index()] = color;
    }

    pub fn resolve_slot(&self, slot: ThemeSlot) -> Result<Rgb, ColorError> {
        self.get(slot)
            .value()
            .ok_or(ColorError::MalformedTheme(ThemeFault::EmptySlot(slot)))
    }
}

/// A master's `p:clrMap`, restricted to the four semantic roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorSlotMap {
    slots: [Option<ThemeSlot>; 4],
}

impl Default for ColorSlotMap {
    /// `bg1=lt1 tx1=dk1 bg2=lt2 tx2=dk2`, what PowerPoint writes for a light master.
    fn default() -> Self {
        Self::empty()
            .with(ColorRole::Background1, ThemeSlot::Light1)
            .with(ColorRole::Text1, ThemeSlot::Dark1)
            .with(ColorRole::Background2, ThemeSlot::Light2)
            .with(ColorRole::Text2, ThemeSlot::Dark2)
    }
}

impl ColorSlotMap {
    pub fn empty() -> Self {
        Self { slots: [None; 4] }
    }

    pub fn with(mut self, role: ColorRole, slot: ThemeSlot) -> Self {
        self.slots[role.index()] = Some(slot);
        self
    }

    pub fn get(&self, role: ColorRole) -> Option<ThemeSlot> {
        self.slots[role.index()]
    }

    pub fn remap(&self, role: ColorRole) -> Result<ThemeSlot, ColorError> {
        self.get(role)
            .ok_or(ColorError::MalformedTheme(ThemeFault::UnmappedRole(role)))
    }
}

/// Typefaces of one `a:majorFont` or `a:minorFont`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontCollection {
    pub latin: Option<String>,
    pub east_asian: Option<String>,
    pub complex: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontScheme {
    pub major: FontCollection,
    pub minor: FontCollection,
}

impl FontScheme {
    /// Substitutes a theme font token (`+mj-lt`, `+mn-ea`, ...).
    ///
    /// Returns `None` for plain typeface names and for tokens the scheme leaves empty.
    pub fn resolve(&self, typeface: &str) -> Option<&str> {
        let (collection, script) = match typeface.strip_prefix('+')?.split_once('-')? {
            ("mj", script) => (&self.major, script),
            ("mn", script) => (&self.minor, script),
            _ => return None,
        };
        let font = match script {
            "lt" => &collection.latin,
            "ea" => &collection.east_asian,
            "cs" => &collection.complex,
            _ => return None,
        };
        font.as_deref().filter(|font| !font.is_empty())
    }

    pub fn is_token(typeface: &str) -> bool {
        typeface.starts_with("+mj-") || typeface.starts_with("+mn-")
    }
}

/// The parts of a theme the cascade reads.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Theme {
    pub name: String,
    pub colors: ColorTable,
    pub fonts: FontScheme,
    /// `a:objectDefaults/a:txDef/a:lstStyle`
    pub default_text_style: Option<LevelStyleTable>,
}
