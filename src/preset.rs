//! `a:prstClr` names (ST_PresetColorVal) and their sRGB values.
//!
//! The set is closed: anything not listed here comes from a newer schema
//! revision and is rejected by the caller.

use crate::color::Rgb;

pub fn lookup(name: &str) -> Option<Rgb> {
    let rgb: u32 = match name {
        "aliceBlue" => 0xF0F8FF,
        "antiqueWhite" => 0xFAEBD7,
        "aqua" | "cyan" => 0x00FFFF,
        "aquamarine" => 0x7FFFD4,
        "azure" => 0xF0FFFF,
        "beige" => 0xF5F5DC,
        "bisque" => 0xFFE4C4,
        "black" => 0x000000,
        "blanchedAlmond" => 0xFFEBCD,
        "blue" => 0x0000FF,
        "blueViolet" => 0x8A2BE2,
        "brown" => 0xA52A2A,
        "burlyWood" => 0xDEB887,
        "cadetBlue" => 0x5F9EA0,
        "chartreuse" => 0x7FFF00,
        "chocolate" => 0xD2691E,
        "coral" => 0xFF7F50,
        "cornflowerBlue" => 0x6495ED,
        "cornsilk" => 0xFFF8DC,
        "crimson" => 0xDC143C,
        "darkBlue" | "dkBlue" => 0x00008B,
        "darkCyan" | "dkCyan" => 0x008B8B,
        "darkGoldenrod" | "dkGoldenrod" => 0xB8860B,
        "darkGray" | "darkGrey" | "dkGray" | "dkGrey" => 0xA9A9A9,
        "darkGreen" | "dkGreen" => 0x006400,
        "darkKhaki" | "dkKhaki" => 0xBDB76B,
        "darkMagenta" | "dkMagenta" => 0x8B008B,
        "darkOliveGreen" | "dkOliveGreen" => 0x556B2F,
        "darkOrange" | "dkOrange" => 0xFF8C00,
        "darkOrchid" | "dkOrchid" => 0x9932CC,
        "darkRed" | "dkRed" => 0x8B0000,
        "darkSalmon" | "dkSalmon" => 0xE9967A,
        "darkSeaGreen" | "dkSeaGreen" => 0x8FBC8F,
        "darkSlateBlue" | "dkSlateBlue" => 0x483D8B,
        "darkSlateGray" | "darkSlateGrey" | "dkSlateGray" | "dkSlateGrey" => 0x2F4F4F,
        "darkTurquoise" | "dkTurquoise" => 0x00CED1,
        "darkViolet" | "dkViolet" => 0x9400D3,
        "deepPink" => 0xFF1493,
        "deepSkyBlue" => 0x00BFFF,
        "dimGray" | "dimGrey" => 0x696969,
        "dodgerBlue" => 0x1E90FF,
        "firebrick" => 0xB22222,
        "floralWhite" => 0xFFFAF0,
        "forestGreen" => 0x228B22,
        "fuchsia" | "magenta" => 0xFF00FF,
        "gainsboro" => 0xDCDCDC,
        "ghostWhite" => 0xF8F8FF,
        "gold" => 0xFFD700,
        "goldenrod" => 0xDAA520,
        "gray" | "grey" => 0x808080,
        "green" => 0x008000,
        "greenYellow" => 0xADFF2F,
        "honeydew" => 0xF0FFF0,
        "hotPink" => 0xFF69B4,
        "indianRed" => 0xCD5C5C,
        "indigo" => 0x4B0082,
        "ivory" => 0xFFFFF0,
        "khaki" => 0xF0E68C,
        "lavender" => 0xE6E6FA,
        "lavenderBlush" => 0xFFF0F5,
        "lawnGreen" => 0x7CFC00,
        "lemonChiffon" => 0xFFFACD,
        "lightBlue" | "ltBlue" => 0xADD8E6,
        "lightCoral" | "ltCoral" => 0xF08080,
        "lightCyan" | "ltCyan" => 0xE0FFFF,
        "lightGoldenrodYellow" | "ltGoldenrodYellow" => 0xFAFAD2,
        "lightGray" | "lightGrey" | "ltGray" | "ltGrey" => 0xD3D3D3,
        "lightGreen" | "ltGreen" => 0x90EE90,
        "lightPink" | "ltPink" => 0xFFB6C1,
        "lightSalmon" | "ltSalmon" => 0xFFA07A,
        "lightSeaGreen" | "ltSeaGreen" => 0x20B2AA,
        "lightSkyBlue" | "ltSkyBlue" => 0x87CEFA,
        "lightSlateGray" | "lightSlateGrey" | "ltSlateGray" | "ltSlateGrey" => 0x778899,
        "lightSteelBlue" | "ltSteelBlue" => 0xB0C4DE,
        "lightYellow" | "ltYellow" => 0xFFFFE0,
        "lime" => 0x00FF00,
        "limeGreen" => 0x32CD32,
        "linen" => 0xFAF0E6,
        "maroon" => 0x800000,
        "medAquamarine" | "mediumAquamarine" => 0x66CDAA,
        "medBlue" | "mediumBlue" => 0x0000CD,
        "medOrchid" | "mediumOrchid" => 0xBA55D3,
        "medPurple" | "mediumPurple" => 0x9370DB,
        "medSeaGreen" | "mediumSeaGreen" => 0x3CB371,
        "medSlateBlue" | "mediumSlateBlue" => 0x7B68EE,
        "medSpringGreen" | "mediumSpringGreen" => 0x00FA9A,
        "medTurquoise" | "mediumTurquoise" => 0x48D1CC,
        "medVioletRed" | "mediumVioletRed" => 0xC71585,
        "midnightBlue" => 0x191970,
        "mintCream" => 0xF5FFFA,
        "mistyRose" => 0xFFE4E1,
        "moccasin" => 0xFFE4B5,
        "navajoWhite" => 0xFFDEAD,
        "navy" => 0x000080,
        "oldLace" => 0xFDF5E6,
        "olive" => 0x808000,
        "oliveDrab" => 0x6B8E23,
        "orange" => 0xFFA500,
        "orangeRed" => 0xFF4500,
        "orchid" => 0xDA70D6,
        "paleGoldenrod" => 0xEEE8AA,
        "paleGreen" => 0x98FB98,
        "paleTurquoise" => 0xAFEEEE,
        "paleVioletRed" => 0xDB7093,
        "papayaWhip" => 0xFFEFD5,
        "peachPuff" => 0xFFDAB9,
        "peru" => 0xCD853F,
        "pink" => 0xFFC0CB,
        "plum" => 0xDDA0DD,
        "powderBlue" => 0xB0E0E6,
        "purple" => 0x800080,
        "red" => 0xFF0000,
        "rosyBrown" => 0xBC8F8F,
        "royalBlue" => 0x4169E1,
        "saddleBrown" => 0x8B4513,
        "salmon" => 0xFA8072,
        "sandyBrown" => 0xF4A460,
        "seaGreen" => 0x2E8B57,
        "seaShell" => 0xFFF5EE,
        "sienna" => 0xA0522D,
        "silver" => 0xC0C0C0,
        "skyBlue" => 0x87CEEB,
        "slateBlue" => 0x6A5ACD,
        "slateGray" | "slateGrey" => 0x708090,
        "snow" => 0xFFFAFA,
        "springGreen" => 0x00FF7F,
        "steelBlue" => 0x4682B4,
        "tan" => 0xD2B48C,
        "teal" => 0x008080,
        "thistle" => 0xD8BFD8,
        "tomato" => 0xFF6347,
        "turquoise" => 0x40E0D0,
        "violet" => 0xEE82EE,
        "wheat" => 0xF5DEB3,
        "white" => 0xFFFFFF,
        "whiteSmoke" => 0xF5F5F5,
        "yellow" => 0xFFFF00,
        "yellowGreen" => 0x9ACD32,
        _ => return None,
    };
    Some(Rgb::new((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8))
}
