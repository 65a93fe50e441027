use std::str::FromStr;

use crate::color::ColorReference;

/// `<a:rPr u="..."/>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Underline {
    #[default]
    None,
    Words,
    Single,
    Double,
    Heavy,
    Dotted,
    DottedHeavy,
    Dash,
    DashHeavy,
    DashLong,
    DashLongHeavy,
    DotDash,
    DotDashHeavy,
    DotDotDash,
    DotDotDashHeavy,
    Wavy,
    WavyHeavy,
    WavyDouble,
}

impl Underline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Underline::None => "none",
            Underline::Words => "words",
            Underline::Single => "sng",
            Underline::Double => "dbl",
            Underline::Heavy => "heavy",
            Underline::Dotted => "dotted",
            Underline::DottedHeavy => "dottedHeavy",
            Underline::Dash => "dash",
            Underline::DashHeavy => "dashHeavy",
            Underline::DashLong => "dashLong",
            Underline::DashLongHeavy => "dashLongHeavy",
            Underline::DotDash => "dotDash",
            Underline::DotDashHeavy => "dotDashHeavy",
            Underline::DotDotDash => "dotDotDash",
            Underline::DotDotDashHeavy => "dotDotDashHeavy",
            Underline::Wavy => "wavy",
            Underline::WavyHeavy => "wavyHeavy",
            Underline::WavyDouble => "wavyDbl",
        }
    }
}

impl FromStr for Underline {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let underline = match s {
            "none" => Underline::None,
            "words" => Underline::Words,
            "sng" => Underline::Single,
            "dbl" => Underline::Double,
            "heavy" => Underline::Heavy,
            "dotted" => Underline::Dotted,
            "dottedHeavy" => Underline::DottedHeavy,
            "dash" => Underline::Dash,
            "dashHeavy" => Underline::DashHeavy,
            "dashLong" => Underline::DashLong,
            "dashLongHeavy" => Underline::DashLongHeavy,
            "dotDash" => Underline::DotDash,
            "dotDashHeavy" => Underline::DotDashHeavy,
            "dotDotDash" => Underline::DotDotDash,
            "dotDotDashHeavy" => Underline::DotDotDashHeavy,
            "wavy" => Underline::Wavy,
            "wavyHeavy" => Underline::WavyHeavy,
            "wavyDbl" => Underline::WavyDouble,
            other => return Err(other.to_string()),
        };
        Ok(underline)
    }
}

/// One sparse set of character properties, as found on a run (`a:rPr`) or on
/// one level of a list style (`a:lvlNpPr/a:defRPr`).
///
/// Absent fields mean "no information at this node"; they are never defaulted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StyleRecord {
    /// `<a:latin typeface/>`, possibly a theme font token such as `+mn-lt`
    pub typeface: Option<String>,
    /// hundredths of a point
    pub size: Option<u32>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<Underline>,
    /// percent; negative is subscript, positive is superscript
    pub baseline: Option<i32>,
    pub color: Option<ColorReference>,
}

impl StyleRecord {
    pub fn is_empty(&self) -> bool {
        self.typeface.is_none()
            && self.size.is_none()
            && self.bold.is_none()
            && self.italic.is_none()
            && self.underline.is_none()
            && self.baseline.is_none()
            && self.color.is_none()
    }

    /// Fills every attribute missing from `self` with the one from `less_specific`.
    pub fn merge(&self, less_specific: &StyleRecord) -> StyleRecord {
        StyleRecord {
            typeface: self
                .typeface
                .clone()
                .or_else(|| less_specific.typeface.clone()),
            size: self.size.or(less_specific.size),
            bold: self.bold.or(less_specific.bold),
            italic: self.italic.or(less_specific.italic),
            underline: self.underline.or(less_specific.underline),
            baseline: self.baseline.or(less_specific.baseline),
            color: self.color.clone().or_else(|| less_specific.color.clone()),
        }
    }
}

/// A list level, `1..=9`, matching `a:lvl1pPr` through `a:lvl9pPr`.
///
/// Paragraphs store their level as a zero-based indentation (`<a:pPr lvl="0"/>`),
/// which maps to level 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u8);

impl Level {
    pub const FIRST: Level = Level(1);
    pub const COUNT: usize = 9;

    pub fn new(level: u8) -> Option<Level> {
        (1..=Self::COUNT as u8).contains(&level).then_some(Level(level))
    }

    /// Converts a paragraph indentation (`0..=8`), clamping anything deeper to level 9.
    pub fn from_indent(indent: u8) -> Level {
        Level(indent.min(Self::COUNT as u8 - 1) + 1)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl Default for Level {
    fn default() -> Self {
        Level::FIRST
    }
}

/// Per-level character defaults of one list style.
///
/// Levels never inherit from each other: a lookup at level 3 only ever sees the
/// level-3 entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LevelStyleTable {
    levels: [Option<StyleRecord>; Level::COUNT],
}

impl LevelStyleTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, level: Level) -> Option<&StyleRecord> {
        self.levels[level.index()].as_ref()
    }

    pub fn contains(&self, level: Level) -> bool {
        self.levels[level.index()].is_some()
    }

    pub fn insert(&mut self, level: Level, record: StyleRecord) -> Option<StyleRecord> {
        self.levels[level.index()].replace(record)
    }

    pub fn with(mut self, level: Level, record: StyleRecord) -> Self {
        self.insert(level, record);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.levels.iter().all(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Level, &StyleRecord)> {
        self.levels
            .iter()
            .enumerate()
            .filter_map(|(i, record)| Some((Level(i as u8 + 1), record.as_ref()?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorReference, Rgb};
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn merge_prefers_more_specific_per_attribute() {
        let run = StyleRecord {
            size: Some(2400),
            ..Default::default()
        };
        let list = StyleRecord {
            size: Some(1800),
            bold: Some(true),
            color: Some(ColorReference::Rgb(Rgb::new(0xFF, 0, 0))),
            ..Default::default()
        };

        let merged = run.merge(&list);
        assert_eq!(
            merged,
            StyleRecord {
                size: Some(2400),
                bold: Some(true),
                color: Some(ColorReference::Rgb(Rgb::new(0xFF, 0, 0))),
                ..Default::default()
            }
        );
    }

    #[test]
    fn merge_is_associative_along_a_chain() {
        let a = StyleRecord {
            italic: Some(false),
            ..Default::default()
        };
        let b = StyleRecord {
            italic: Some(true),
            typeface: Some("Arial".to_string()),
            ..Default::default()
        };
        let c = StyleRecord {
            typeface: Some("Calibri".to_string()),
            baseline: Some(-25),
            ..Default::default()
        };

        assert_eq!(a.merge(&b).merge(&c), a.merge(&b.merge(&c)));
    }

    #[test]
    fn empty_record_is_transparent() {
        let record = StyleRecord {
            underline: Some(Underline::Double),
            ..Default::default()
        };
        assert!(StyleRecord::default().is_empty());
        assert!(!record.is_empty());
        assert_eq!(StyleRecord::default().merge(&record), record);
        assert_eq!(record.merge(&StyleRecord::default()), record);
    }

    #[rstest]
    #[case("sng", Underline::Single)]
    #[case("dbl", Underline::Double)]
    #[case("none", Underline::None)]
    #[case("wavyDbl", Underline::WavyDouble)]
    #[case("dotDotDashHeavy", Underline::DotDotDashHeavy)]
    fn underline_tokens(#[case] token: &str, #[case] expected: Underline) {
        assert_eq!(token.parse::<Underline>(), Ok(expected));
        assert_eq!(expected.as_str(), token);
    }

    #[test]
    fn underline_rejects_unknown_token() {
        assert_eq!("squiggle".parse::<Underline>(), Err("squiggle".to_string()));
    }

    #[rstest]
    #[case(0, 1)]
    #[case(2, 3)]
    #[case(8, 9)]
    #[case(12, 9)]
    fn level_from_indent(#[case] indent: u8, #[case] level: u8) {
        assert_eq!(Level::from_indent(indent).get(), level);
    }

    #[test]
    fn level_bounds() {
        assert_eq!(Level::new(0), None);
        assert_eq!(Level::new(10), None);
        assert_eq!(Level::new(1), Some(Level::FIRST));
    }

    #[test]
    fn levels_do_not_inherit_from_each_other() {
        let table = LevelStyleTable::new().with(
            Level::FIRST,
            StyleRecord {
                size: Some(3200),
                ..Default::default()
            },
        );
        let third = Level::new(3).unwrap();

        assert!(table.contains(Level::FIRST));
        assert!(!table.contains(third));
        assert_eq!(table.get(third), None);
        assert_eq!(table.iter().count(), 1);
    }
}
