//! Mapping style variant tokens to donor sources and style metadata.

/// PANOSE proportion byte for monospaced faces.
pub const PANOSE_MONOSPACED: u8 = 9;

/// OS/2 fsSelection codes for cross-platform style recognition.
pub const STYLE_MAP_ITALIC: u16 = 0x01;
pub const STYLE_MAP_BOLD: u16 = 0x20;
pub const STYLE_MAP_BOLD_ITALIC: u16 = 0x21;
pub const STYLE_MAP_REGULAR: u16 = 0x40;

/// head.macStyle bits.
pub const MAC_STYLE_BOLD: u16 = 0x01;
pub const MAC_STYLE_ITALIC: u16 = 0x02;

/// Which of the two donor weight tiers supplies the Hangul glyphs.
///
/// The donor family ships only two weights, so every output variant draws
/// from one of them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DonorWeight {
    Regular,
    Bold,
}

/// Everything the metadata patcher needs to know about one style variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VariantSpec {
    /// The machine-readable variant token, e.g. "BoldIt".
    pub token: String,
    pub donor_weight: DonorWeight,
    pub weight_class: u16,
    pub mac_style: u16,
    /// OS/2 fsSelection value.
    pub style_map: u16,
    pub panose_proportion: u8,
    /// Human-readable subfamily label, e.g. "Bold Italic".
    pub subfamily: String,
}

/// Resolves a variant token to a fully populated [`VariantSpec`].
///
/// Total over arbitrary tokens: anything without a recognized weight word is
/// a 400-weight regular. Substring checks are case sensitive, so "Semibold"
/// does not match "Bold".
pub fn resolve(token: &str) -> VariantSpec {
    let donor_weight = if ["Bold", "Black", "Semibold"].iter().any(|w| token.contains(w)) {
        DonorWeight::Bold
    } else {
        DonorWeight::Regular
    };

    let (weight_class, bold) = if token.contains("Bold") {
        (700, true)
    } else if token.contains("Black") {
        (900, true)
    } else if token.contains("Semibold") {
        (600, false)
    } else if token.contains("Medium") {
        (500, false)
    } else if token.contains("ExtraLight") {
        (200, false)
    } else if token.contains("Light") {
        (300, false)
    } else {
        (400, false)
    };

    let italic = token.contains("It");

    let mut mac_style = 0;
    if bold {
        mac_style |= MAC_STYLE_BOLD;
    }
    if italic {
        mac_style |= MAC_STYLE_ITALIC;
    }

    let style_map = match (bold, italic) {
        (true, true) => STYLE_MAP_BOLD_ITALIC,
        (true, false) => STYLE_MAP_BOLD,
        (false, true) => STYLE_MAP_ITALIC,
        (false, false) => STYLE_MAP_REGULAR,
    };

    let subfamily = if token == "It" {
        "Italic".to_string()
    } else if italic {
        token.replace("It", " Italic")
    } else {
        token.to_string()
    };

    VariantSpec {
        token: token.to_string(),
        donor_weight,
        weight_class,
        mac_style,
        style_map,
        panose_proportion: PANOSE_MONOSPACED,
        subfamily,
    }
}
