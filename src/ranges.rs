//! Code-point ranges selecting the Hangul glyphs that take part in the merge.

use std::ops::RangeInclusive;

use write_fonts::read::collections::IntSet;

/// Hangul Compatibility Jamo, including the trailing symbol slots.
pub const COMPAT_JAMO: RangeInclusive<u32> = 0x3131..=0x318E;

/// Precomposed Hangul syllables.
pub const SYLLABLES: RangeInclusive<u32> = 0xAC00..=0xD7A3;

/// The code points participating in the merge.
///
/// The same selection is applied to the donor and the base font, so
/// code-point-to-glyph correspondence is provided by each font's own cmap
/// rather than by matching glyph ids.
pub fn hangul_selection() -> IntSet<u32> {
    let mut selection = IntSet::empty();
    selection.insert_range(COMPAT_JAMO);
    selection.insert_range(SYLLABLES);
    selection
}
