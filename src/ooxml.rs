//! DrawingML and PresentationML elements to model values.
//!
//! Malformed or unknown values are logged and left out of the result, so a
//! single odd attribute never hides the rest of a part.

use std::collections::HashMap;

use crate::{
    color::{ColorReference, ColorRole, Rgb, SchemeColor, ThemeSlot},
    model::PlaceholderRole,
    style::{Level, LevelStyleTable, StyleRecord, Underline},
    tag::Element,
    theme::{ColorSlotMap, ColorTable, FontCollection, FontScheme, Theme, ThemeColor},
};

/// Hundredths of a point, 1pt..=4000pt.
const SIZE_RANGE: std::ops::RangeInclusive<u32> = 100..=400_000;

/// `a:rPr`, `a:defRPr` or `a:endParaRPr`.
pub fn run_properties(element: &Element) -> StyleRecord {
    let mut record = StyleRecord::default();

    if let Some(sz) = element.attribute("sz") {
        match sz.parse::<u32>() {
            Ok(size) if SIZE_RANGE.contains(&size) => record.size = Some(size),
            _ => log::warn!("{}: ignoring font size {sz:?}", element.tag),
        }
    }
    record.bold = toggle(element, "b");
    record.italic = toggle(element, "i");
    if let Some(u) = element.attribute("u") {
        match u.parse::<Underline>() {
            Ok(underline) => record.underline = Some(underline),
            Err(value) => log::warn!("{}: unknown underline {value:?}", element.tag),
        }
    }
    if let Some(baseline) = element.attribute("baseline") {
        // thousandths of a percent
        match baseline.parse::<i32>() {
            Ok(offset) => record.baseline = Some(offset / 1000),
            Err(_) => log::warn!("{}: ignoring baseline {baseline:?}", element.tag),
        }
    }
    record.typeface = element
        .child("a:latin")
        .and_then(|latin| latin.attribute("typeface"))
        .filter(|typeface| !typeface.is_empty())
        .map(str::to_string);
    record.color = element.child("a:solidFill").and_then(color_choice);

    record
}

fn toggle(element: &Element, name: &str) -> Option<bool> {
    match element.attribute(name)? {
        "1" | "true" | "on" => Some(true),
        "0" | "false" | "off" => Some(false),
        other => {
            log::warn!("{}: {name}={other:?} is not a boolean", element.tag);
            None
        }
    }
}

/// The color inside a fill or a style reference: the first of `a:srgbClr`,
/// `a:schemeClr`, `a:sysClr` or `a:prstClr`.
pub fn color_choice(element: &Element) -> Option<ColorReference> {
    for child in &element.children {
        let value = child.attribute("val");
        let reference = match (child.tag.as_str(), value) {
            ("a:srgbClr", Some(hex)) => match Rgb::from_hex(hex) {
                Some(rgb) => ColorReference::Rgb(rgb),
                None => {
                    log::warn!("a:srgbClr: {hex:?} is not a hex color");
                    continue;
                }
            },
            ("a:schemeClr", Some(name)) => match name.parse::<SchemeColor>() {
                Ok(scheme) => ColorReference::Scheme(scheme),
                Err(name) => {
                    // phClr only has meaning inside a theme's style matrix
                    log::warn!("a:schemeClr: unsupported scheme color {name:?}");
                    continue;
                }
            },
            ("a:sysClr", Some(name)) => match last_color(child) {
                Some(fallback) => ColorReference::System {
                    name: name.to_string(),
                    fallback,
                },
                None => {
                    log::warn!("a:sysClr: {name:?} has no lastClr");
                    continue;
                }
            },
            ("a:prstClr", Some(name)) => ColorReference::Preset(name.to_string()),
            ("a:srgbClr" | "a:schemeClr" | "a:sysClr" | "a:prstClr", None) => {
                log::warn!("{} is missing attribute \"val\"", child.tag);
                continue;
            }
            (other, _) => {
                log::debug!("skipping color element {other:?}");
                continue;
            }
        };
        return Some(reference);
    }
    None
}

fn last_color(element: &Element) -> Option<Rgb> {
    element.attribute("lastClr").and_then(Rgb::from_hex)
}

/// `a:lstStyle`, `p:titleStyle`, `p:bodyStyle`, `p:otherStyle`,
/// `p:defaultTextStyle` or a theme's `a:txDef/a:lstStyle`.
pub fn level_styles(element: &Element) -> LevelStyleTable {
    let mut table = LevelStyleTable::new();
    for child in &element.children {
        let Some(level) = child
            .tag
            .strip_prefix("a:lvl")
            .and_then(|rest| rest.strip_suffix("pPr"))
            .and_then(|number| number.parse::<u8>().ok())
            .and_then(Level::new)
        else {
            if child.tag != "a:defPPr" && child.tag != "a:extLst" {
                log::debug!("{}: skipping {:?}", element.tag, child.tag);
            }
            continue;
        };
        if let Some(properties) = child.child("a:defRPr") {
            table.insert(level, run_properties(properties));
        }
    }
    table
}

/// `a:clrScheme`
pub fn color_scheme(element: &Element) -> ColorTable {
    let mut table = ColorTable::new();
    for child in &element.children {
        let Some(slot) = child
            .tag
            .strip_prefix("a:")
            .and_then(|name| name.parse::<ThemeSlot>().ok())
        else {
            if child.tag != "a:extLst" {
                log::warn!("a:clrScheme: unknown slot {:?}", child.tag);
            }
            continue;
        };
        let color = if let Some(srgb) = child.child("a:srgbClr") {
            srgb.attribute("val")
                .and_then(Rgb::from_hex)
                .map(ThemeColor::rgb)
        } else if let Some(system) = child.child("a:sysClr") {
            // without lastClr the slot stays empty and resolving it is a fault
            system
                .attribute("val")
                .map(|name| ThemeColor::system(name, last_color(system)))
        } else {
            None
        };
        match color {
            Some(color) => table.set(slot, color),
            None => log::warn!("a:clrScheme: slot {slot} has no usable color"),
        }
    }
    table
}

/// `p:clrMap`, or `p:clrMapOvr/a:overrideClrMapping` which has the same shape.
pub fn color_map(element: &Element) -> ColorSlotMap {
    let mut map = ColorSlotMap::empty();
    for role in ColorRole::ALL {
        match element.attribute(role.as_str()).map(str::parse::<ThemeSlot>) {
            Some(Ok(slot)) => map = map.with(role, slot),
            Some(Err(value)) => log::warn!("{}: {role}={value:?} is not a slot", element.tag),
            None => log::warn!("{} does not map {role}", element.tag),
        }
    }
    map
}

/// `a:fontScheme`
pub fn font_scheme(element: &Element) -> FontScheme {
    FontScheme {
        major: element
            .child("a:majorFont")
            .map(font_collection)
            .unwrap_or_default(),
        minor: element
            .child("a:minorFont")
            .map(font_collection)
            .unwrap_or_default(),
    }
}

fn font_collection(element: &Element) -> FontCollection {
    let typeface = |tag: &str| {
        element
            .child(tag)
            .and_then(|font| font.attribute("typeface"))
            .map(str::to_string)
    };
    FontCollection {
        latin: typeface("a:latin"),
        east_asian: typeface("a:ea"),
        complex: typeface("a:cs"),
    }
}

/// `a:theme`
pub fn theme(element: &Element) -> Theme {
    let elements = element.child("a:themeElements");
    let colors = match elements.and_then(|elements| elements.child("a:clrScheme")) {
        Some(scheme) => color_scheme(scheme),
        None => {
            log::warn!("theme has no a:clrScheme");
            ColorTable::new()
        }
    };
    let fonts = elements
        .and_then(|elements| elements.child("a:fontScheme"))
        .map(font_scheme)
        .unwrap_or_default();
    let default_text_style = element
        .find(&["a:objectDefaults", "a:txDef", "a:lstStyle"])
        .map(level_styles)
        .filter(|table| !table.is_empty());
    Theme {
        name: element.attribute("name").unwrap_or_default().to_string(),
        colors,
        fonts,
        default_text_style,
    }
}

/// `p:ph`
pub fn placeholder(element: &Element) -> (PlaceholderRole, Option<u32>) {
    let role = match element.attribute("type") {
        Some(value) => value.parse().unwrap_or_else(|value| {
            log::warn!("p:ph: unknown type {value:?}, treating as obj");
            PlaceholderRole::default()
        }),
        None => PlaceholderRole::default(),
    };
    let index = element.attribute("idx").and_then(|idx| idx.parse().ok());
    (role, index)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// The last segment of the relationship type URI, e.g. `slideLayout`.
    pub kind: String,
    pub target: String,
    pub external: bool,
}

/// `Relationships` root of a `.rels` part, keyed by `Id`.
pub fn relationships(element: &Element) -> HashMap<String, Relationship> {
    let mut rels = HashMap::new();
    for (count, entry) in element.children.iter().enumerate() {
        let count = count + 1;
        if entry.tag != "Relationship" {
            log::warn!("Unknown entry in Relationships: {:?}", entry.tag);
            continue;
        }
        match (entry.attribute("Id"), entry.attribute("Target")) {
            (Some(id), Some(target)) => {
                let kind = entry
                    .attribute("Type")
                    .and_then(|uri| uri.rsplit('/').next())
                    .unwrap_or_default();
                rels.insert(
                    id.to_string(),
                    Relationship {
                        kind: kind.to_string(),
                        target: target.to_string(),
                        external: entry.attribute("TargetMode") == Some("External"),
                    },
                );
            }
            (None, None) => {
                log::error!("Relationship #{count} is missing attributes 'Id' and 'Target'")
            }
            (None, _) => log::error!("Relationship #{count} is missing attribute 'Id'"),
            (_, None) => log::error!("Relationship #{count} is missing attribute 'Target'"),
        }
    }
    rels
}
