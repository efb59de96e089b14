//! Bearing arithmetic and the donor-side adjustment pass.

use log::debug;
use write_fonts::read::collections::IntSet;

use crate::font::FontDocument;

/// Splits a total advance delta between the left and right side bearings.
///
/// The left side takes the floor half and the right side the remainder, so an
/// odd delta leans one unit further left. Floor division also holds for
/// negative deltas: -61 splits into (-31, -30).
pub fn split_addition(addition: i32) -> (i32, i32) {
    let left = addition.div_euclid(2);
    (left, addition - left)
}

/// The per-build advance delta and the width threshold used to recognize
/// glyphs that were already widened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BearingPlan {
    /// Total delta added to each adjusted glyph's advance.
    pub addition: i32,
    /// The donor family's native fixed advance width.
    pub donor_fixed_width: u16,
}

impl BearingPlan {
    /// The merged script renders at twice the base font's Latin cell, so the
    /// delta is the distance from the donor's native advance to that
    /// double-width target, plus the configured adjustment.
    pub fn new(base_latin_width: u16, donor_fixed_width: u16, bearing_adjustment: i32) -> Self {
        let target_width = 2 * base_latin_width as i32;
        BearingPlan {
            addition: (target_width - donor_fixed_width as i32) + bearing_adjustment,
            donor_fixed_width,
        }
    }
}

/// Adjusts the bearings of every selected glyph in `font`, in place.
///
/// Outline glyphs are adjusted directly. A composite glyph is adjusted
/// through its referenced glyphs instead. Either way, a glyph whose advance
/// already exceeds the donor's fixed width is taken to have been adjusted
/// earlier in the pass and is skipped; the width comparison is the sole
/// guard against widening a glyph twice when it is shared by several
/// composites or reachable both through its own code point and a reference.
pub fn adjust_selection(font: &mut FontDocument, selection: &IntSet<u32>, plan: BearingPlan) {
    for cp in selection.iter() {
        let Some(gid) = font.glyph_id(cp) else {
            continue;
        };
        let Some(record) = font.glyph(gid) else {
            continue;
        };
        let advance = record.advance;
        let component_ids = record.component_ids();
        if component_ids.is_empty() {
            if advance <= plan.donor_fixed_width {
                font.add_bearing(gid, plan.addition);
            }
        } else {
            for ref_gid in component_ids {
                match font.glyph(ref_gid) {
                    Some(referenced) if referenced.advance > plan.donor_fixed_width => {}
                    Some(_) => font.add_bearing(ref_gid, plan.addition),
                    None => debug!("U+{cp:04X} references missing glyph {ref_gid}"),
                }
            }
        }
    }
}
