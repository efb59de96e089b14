//! Patching naming, style, and cached-metric metadata on the merged font.

use std::cmp::Ordering;

use log::warn;
use write_fonts::read::tables::os2::OS2_UNICODE_RANGES;
use write_fonts::tables::name::NameRecord;
use write_fonts::types::NameId;

use crate::font::{FieldValue, FontDocument};
use crate::variant::VariantSpec;

const WINDOWS_PLATFORM: u16 = 3;
const UNICODE_BMP_ENCODING: u16 = 1;
const LANG_ENGLISH_US: u16 = 0x0409;
const LANG_KOREAN: u16 = 0x0412;

/// The name ids rewritten for the merged family.
const REBUILT_NAME_IDS: [NameId; 6] = [
    NameId::FAMILY_NAME,
    NameId::SUBFAMILY_NAME,
    NameId::FULL_NAME,
    NameId::POSTSCRIPT_NAME,
    NameId::TYPOGRAPHIC_FAMILY_NAME,
    NameId::TYPOGRAPHIC_SUBFAMILY_NAME,
];

/// Rewrites the merged font's identity: name records, weight and style
/// fields, the monospace markers, and the metrics the OS/2 table caches.
///
/// Metadata fields are set through their spelling chains, so a font without
/// an OS/2 or post table loses only the fields those tables carry; the build
/// itself keeps going.
pub fn patch_metadata(
    doc: &mut FontDocument,
    spec: &VariantSpec,
    family_name: &str,
    avg_char_width: u16,
) {
    rebuild_names(doc, family_name, spec);

    set_first_supported(
        doc,
        &["usWeightClass", "weightClass"],
        FieldValue::Int(spec.weight_class as i32),
    );
    set_first_supported(
        doc,
        &["fsSelection", "styleMap"],
        FieldValue::Int(spec.style_map as i32),
    );
    set_first_supported(
        doc,
        &["macStyle", "head.macStyle"],
        FieldValue::Int(spec.mac_style as i32),
    );
    set_first_supported(
        doc,
        &["panoseProportion", "panose.bProportion"],
        FieldValue::Int(spec.panose_proportion as i32),
    );
    set_first_supported(
        doc,
        &["isFixedPitch", "post.isFixedPitch", "fixedPitch"],
        FieldValue::Flag(true),
    );
    // the cell width, not a recomputed average: every glyph is expected to
    // occupy one or two of these
    set_first_supported(
        doc,
        &["xAvgCharWidth", "avgCharWidth", "os2.xAvgCharWidth"],
        FieldValue::Int(avg_char_width as i32),
    );

    refresh_char_indices(doc);
    refresh_unicode_ranges(doc);
}

/// Tries each spelling in turn; logs once if none of them is supported.
fn set_first_supported(doc: &mut FontDocument, spellings: &[&str], value: FieldValue) {
    for spelling in spellings {
        if doc.set_metadata_field(spelling, value).is_ok() {
            return;
        }
    }
    warn!("no supported spelling for '{}', field left unset", spellings[0]);
}

/// Replaces the English naming records with the merged family's identity.
///
/// Korean-language records are dropped outright: the donor-side names do not
/// describe the merged font. Records for other platforms and languages are
/// left alone.
fn rebuild_names(doc: &mut FontDocument, family_name: &str, spec: &VariantSpec) {
    let postscript_family: String = family_name.split_whitespace().collect();
    let entries = [
        (NameId::FAMILY_NAME, family_name.to_string()),
        (NameId::SUBFAMILY_NAME, spec.subfamily.clone()),
        (
            NameId::FULL_NAME,
            format!("{family_name} {}", spec.subfamily),
        ),
        (
            NameId::POSTSCRIPT_NAME,
            format!("{postscript_family}-{}", spec.token),
        ),
        (NameId::TYPOGRAPHIC_FAMILY_NAME, family_name.to_string()),
        (NameId::TYPOGRAPHIC_SUBFAMILY_NAME, spec.subfamily.clone()),
    ];

    doc.name.name_record.retain(|record| {
        if record.language_id == LANG_KOREAN {
            return false;
        }
        let replaced = record.platform_id == WINDOWS_PLATFORM
            && record.encoding_id == UNICODE_BMP_ENCODING
            && record.language_id == LANG_ENGLISH_US
            && REBUILT_NAME_IDS.contains(&record.name_id);
        !replaced
    });

    for (name_id, value) in entries {
        doc.name.name_record.push(NameRecord {
            platform_id: WINDOWS_PLATFORM,
            encoding_id: UNICODE_BMP_ENCODING,
            language_id: LANG_ENGLISH_US,
            name_id,
            string: value.into(),
        });
    }
    doc.name.name_record.sort();
}

/// Refreshes the OS/2 first/last character indices from the merged cmap.
fn refresh_char_indices(doc: &mut FontDocument) {
    let first = doc.mappings().next().map(|(cp, _)| cp);
    let last = doc.mappings().last().map(|(cp, _)| cp);
    let (Some(first), Some(last)) = (first, last) else {
        return;
    };
    if let Some(os2) = doc.os2.as_mut() {
        os2.us_first_char_index = first.min(0xFFFF) as u16;
        os2.us_last_char_index = last.min(0xFFFF) as u16;
    }
}

/// Raises the OS/2 ulUnicodeRange bits for every block the merged cmap now
/// covers. Bits already set stay set.
fn refresh_unicode_ranges(doc: &mut FontDocument) {
    if doc.os2.is_none() {
        return;
    }
    let mut ranges = [0u32; 4];
    for (cp, _) in doc.mappings() {
        if let Some(bit) = unicode_range_bit(cp) {
            if bit < 128 {
                ranges[(bit / 32) as usize] |= 1 << (bit % 32);
            }
        }
        if cp >= 0x10000 {
            // bit 57, "Non Plane 0"
            ranges[1] |= 1 << 25;
        }
    }
    if let Some(os2) = doc.os2.as_mut() {
        os2.ul_unicode_range_1 |= ranges[0];
        os2.ul_unicode_range_2 |= ranges[1];
        os2.ul_unicode_range_3 |= ranges[2];
        os2.ul_unicode_range_4 |= ranges[3];
    }
}

/// The ulUnicodeRange bit covering a code point, if any.
fn unicode_range_bit(cp: u32) -> Option<u8> {
    OS2_UNICODE_RANGES
        .binary_search_by(|&(first, last, _)| {
            if cp < first {
                Ordering::Greater
            } else if cp <= last {
                Ordering::Equal
            } else {
                Ordering::Less
            }
        })
        .ok()
        .map(|idx| OS2_UNICODE_RANGES[idx].2)
}
