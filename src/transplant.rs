//! Copying selected glyphs from the donor document into the base document.

use std::collections::HashMap;

use log::{debug, warn};
use write_fonts::read::collections::IntSet;
use write_fonts::tables::glyf::{Component, CompositeGlyph};
use write_fonts::types::GlyphId16;

use crate::font::{FontDocument, GlyphRecord, Outline};

/// Counters reported after a transplant pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransplantStats {
    /// Glyph records written into the base font.
    pub copied: usize,
    /// Selected code points the donor had no glyph for.
    pub skipped: usize,
    /// Unencoded component glyphs pulled in to keep composites whole.
    pub components: usize,
}

/// Copies every selected glyph from `donor` into `base`, remapping the base
/// cmap as it goes.
///
/// A code point already encoded in the base font keeps its glyph id and has
/// its glyph record overwritten in place; otherwise a fresh id is appended.
/// Composite glyphs are copied together with their referenced glyphs, even
/// ones no code point maps to, and their component references are rewritten
/// to base ids. A code point the donor does not cover is skipped and the
/// base font keeps whatever it had.
pub fn transplant_selection(
    donor: &FontDocument,
    base: &mut FontDocument,
    selection: &IntSet<u32>,
) -> TransplantStats {
    let mut stats = TransplantStats::default();
    // donor gid -> base gid, also the "already scheduled" set
    let mut gid_map: HashMap<u16, u16> = HashMap::new();
    let mut pending: Vec<u16> = Vec::new();

    for cp in selection.iter() {
        let Some(src) = donor.glyph_id(cp) else {
            debug!("donor has no glyph for U+{cp:04X}");
            stats.skipped += 1;
            continue;
        };
        let dst = match gid_map.get(&src) {
            Some(&dst) => dst,
            None => {
                let Some(dst) = base.glyph_id(cp).or_else(|| base.reserve_glyph()) else {
                    warn!("glyph id space exhausted at U+{cp:04X}");
                    stats.skipped += 1;
                    continue;
                };
                gid_map.insert(src, dst);
                pending.push(src);
                dst
            }
        };
        base.map_codepoint(cp, dst);
    }

    while let Some(src) = pending.pop() {
        let Some(&dst) = gid_map.get(&src) else {
            continue;
        };
        let Some(record) = donor.glyph(src) else {
            debug!("donor glyph {src} out of range");
            continue;
        };
        let outline = match &record.outline {
            Outline::Empty => Outline::Empty,
            Outline::Simple(glyph) => {
                let mut glyph = glyph.clone();
                // donor hinting is meaningless in the base font's context
                glyph.instructions.clear();
                Outline::Simple(glyph)
            }
            Outline::Composite(composite) => {
                remap_composite(composite, base, &mut gid_map, &mut pending, &mut stats)
            }
        };
        base.set_glyph(
            dst,
            GlyphRecord {
                advance: record.advance,
                lsb: record.lsb,
                outline,
            },
        );
        stats.copied += 1;
    }

    stats
}

/// Rewrites a composite's component references to base glyph ids, scheduling
/// any donor glyph seen for the first time.
fn remap_composite(
    composite: &CompositeGlyph,
    base: &mut FontDocument,
    gid_map: &mut HashMap<u16, u16>,
    pending: &mut Vec<u16>,
    stats: &mut TransplantStats,
) -> Outline {
    let mut remapped = Vec::new();
    for component in composite.components() {
        let child_src = component.glyph.to_u16();
        let child_dst = match gid_map.get(&child_src) {
            Some(&dst) => dst,
            None => {
                let Some(dst) = base.reserve_glyph() else {
                    warn!("glyph id space exhausted copying component {child_src}");
                    continue;
                };
                gid_map.insert(child_src, dst);
                pending.push(child_src);
                stats.components += 1;
                dst
            }
        };
        remapped.push((
            Component::new(
                GlyphId16::new(child_dst),
                component.anchor,
                component.transform.clone(),
                component.flags,
            ),
            composite.bbox,
        ));
    }
    match CompositeGlyph::try_from_iter(remapped) {
        Ok(glyph) => Outline::Composite(glyph),
        Err(_) => Outline::Empty,
    }
}
