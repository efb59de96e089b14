//! An in-memory font document: the mutable handle the merge pipeline works on.
//!
//! A [`FontDocument`] owns editable copies of the tables the pipeline touches
//! (glyph outlines, metrics, cmap, and the metadata tables) and keeps the
//! original bytes around so untouched tables pass through to the output
//! unchanged.

use std::collections::BTreeMap;
use std::path::Path;

use log::warn;
use skrifa::MetadataProvider;
use thiserror::Error;
use write_fonts::{
    from_obj::ToOwnedTable,
    read::{
        tables::glyf::{CurvePoint, Glyph as ReadGlyph},
        FontRef, TableProvider, TopLevelTable,
    },
    tables::{
        cmap::Cmap,
        glyf::{
            Anchor, Bbox, Component, CompositeGlyph, Contour, GlyfLocaBuilder, Glyf, SimpleGlyph,
        },
        head::{Head, MacStyle},
        hhea::Hhea,
        hmtx::{Hmtx, LongMetric},
        loca::{Loca, LocaFormat},
        maxp::Maxp,
        name::Name,
        os2::{Os2, SelectionFlags},
        post::Post,
    },
    types::{FWord, GlyphId, Tag, UfWord, Version16Dot16},
    FontBuilder,
};

use crate::bearing::split_addition;
use crate::BuildError;

/// Composite nesting is bounded when flattening for maxp statistics.
const MAX_NESTING_LEVEL: u8 = 64;

/// Tables that would go stale once glyphs are added; they are rebuilt or
/// dropped rather than passed through.
const DROP_TABLES: [Tag; 4] = [
    Tag::new(b"DSIG"),
    Tag::new(b"hdmx"),
    Tag::new(b"LTSH"),
    Tag::new(b"VDMX"),
];

/// Glyph shape data: contours, components, or nothing at all.
#[derive(Clone, Debug, Default)]
pub enum Outline {
    #[default]
    Empty,
    Simple(SimpleGlyph),
    Composite(CompositeGlyph),
}

/// One glyph's metrics and shape.
#[derive(Clone, Debug, Default)]
pub struct GlyphRecord {
    pub advance: u16,
    pub lsb: i16,
    pub outline: Outline,
}

impl GlyphRecord {
    /// Glyph ids referenced by this glyph's components, in order. Empty for
    /// outline and empty glyphs.
    pub fn component_ids(&self) -> Vec<u16> {
        match &self.outline {
            Outline::Composite(composite) => composite
                .components()
                .iter()
                .map(|component| component.glyph.to_u16())
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn bbox(&self) -> Option<Bbox> {
        match &self.outline {
            Outline::Empty => None,
            Outline::Simple(glyph) => Some(glyph.bbox),
            Outline::Composite(glyph) => Some(glyph.bbox),
        }
    }

    /// Shifts the glyph's ink horizontally. Component placement transforms
    /// are untouched; only their offsets move.
    fn translate(&mut self, dx: i16) {
        if dx == 0 {
            return;
        }
        match &mut self.outline {
            Outline::Empty => {}
            Outline::Simple(glyph) => {
                glyph.bbox.x_min = glyph.bbox.x_min.saturating_add(dx);
                glyph.bbox.x_max = glyph.bbox.x_max.saturating_add(dx);
                let contours = std::mem::take(&mut glyph.contours);
                glyph.contours = contours
                    .into_iter()
                    .map(|contour| {
                        let mut points: Vec<CurvePoint> = contour.into();
                        for point in &mut points {
                            point.x = point.x.saturating_add(dx);
                        }
                        Contour::from(points)
                    })
                    .collect();
            }
            Outline::Composite(glyph) => {
                let bbox = Bbox {
                    x_min: glyph.bbox.x_min.saturating_add(dx),
                    x_max: glyph.bbox.x_max.saturating_add(dx),
                    ..glyph.bbox
                };
                let components = glyph.components().iter().map(|component| {
                    let anchor = match component.anchor {
                        Anchor::Offset { x, y } => Anchor::Offset {
                            x: x.saturating_add(dx),
                            y,
                        },
                        point => point,
                    };
                    (
                        Component::new(
                            component.glyph,
                            anchor,
                            component.transform.clone(),
                            component.flags,
                        ),
                        bbox,
                    )
                });
                // a composite always holds at least one component
                *glyph = CompositeGlyph::try_from_iter(components)
                    .expect("composite glyph lost its components");
            }
        }
    }
}

/// A metadata field value for [`FontDocument::set_metadata_field`].
#[derive(Clone, Copy, Debug)]
pub enum FieldValue {
    Flag(bool),
    Int(i32),
}

impl FieldValue {
    fn to_i32(self) -> i32 {
        match self {
            FieldValue::Flag(flag) => flag as i32,
            FieldValue::Int(value) => value,
        }
    }
}

/// The named metadata field is not available on this font, either because
/// the spelling is unknown or the backing table is absent.
#[derive(Debug, Error)]
#[error("unsupported metadata field '{0}'")]
pub struct UnsupportedField(pub String);

/// A mutable, in-memory font. One document is opened per donor and per base
/// font for each variant build and dropped when the variant is done.
pub struct FontDocument {
    /// Original font bytes, kept for passing through untouched tables.
    data: Vec<u8>,
    /// Indexed by glyph id.
    glyphs: Vec<GlyphRecord>,
    /// Code point to glyph id.
    charmap: BTreeMap<u32, u16>,
    pub head: Head,
    pub hhea: Hhea,
    pub maxp: Maxp,
    pub os2: Option<Os2>,
    pub post: Option<Post>,
    pub name: Name,
}

impl FontDocument {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BuildError> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .map_err(|_| BuildError::MissingInput(path.to_path_buf()))?;
        Self::from_bytes(data)
    }

    pub fn from_bytes(data: Vec<u8>) -> Result<Self, BuildError> {
        let font = FontRef::new(&data)?;

        let head: Head = font
            .head()
            .map_err(|_| BuildError::MissingTable(Head::TAG))?
            .to_owned_table();
        let hhea: Hhea = font
            .hhea()
            .map_err(|_| BuildError::MissingTable(Hhea::TAG))?
            .to_owned_table();
        let maxp: Maxp = font
            .maxp()
            .map_err(|_| BuildError::MissingTable(Maxp::TAG))?
            .to_owned_table();
        let os2: Option<Os2> = font.os2().ok().map(|table| table.to_owned_table());
        let post: Option<Post> = font.post().ok().map(|table| table.to_owned_table());
        let name: Name = font
            .name()
            .ok()
            .map(|table| table.to_owned_table())
            .unwrap_or_default();

        let hmtx = font
            .hmtx()
            .map_err(|_| BuildError::MissingTable(Hmtx::TAG))?;
        let loca = font
            .loca(None)
            .map_err(|_| BuildError::MissingTable(Loca::TAG))?;
        let glyf = font
            .glyf()
            .map_err(|_| BuildError::MissingTable(Glyf::TAG))?;

        let num_glyphs = maxp.num_glyphs;
        let mut glyphs = Vec::with_capacity(num_glyphs as usize);
        for gid in 0..num_glyphs {
            let glyph_id = GlyphId::new(gid as u32);
            let outline = match loca.get_glyf(glyph_id, &glyf) {
                Ok(Some(ReadGlyph::Simple(glyph))) => Outline::Simple(glyph.to_owned_table()),
                Ok(Some(ReadGlyph::Composite(glyph))) => {
                    Outline::Composite(glyph.to_owned_table())
                }
                Ok(None) => Outline::Empty,
                Err(err) => {
                    warn!("glyph {gid} is unreadable, treating as empty: {err}");
                    Outline::Empty
                }
            };
            glyphs.push(GlyphRecord {
                advance: hmtx.advance(glyph_id).unwrap_or_default(),
                lsb: hmtx.side_bearing(glyph_id).unwrap_or_default(),
                outline,
            });
        }

        let charmap = font
            .charmap()
            .mappings()
            .filter_map(|(cp, gid)| u16::try_from(gid.to_u32()).ok().map(|gid| (cp, gid)))
            .filter(|(_, gid)| (*gid as usize) < glyphs.len())
            .collect();

        Ok(FontDocument {
            data,
            glyphs,
            charmap,
            head,
            hhea,
            maxp,
            os2,
            post,
            name,
        })
    }

    pub fn num_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    pub fn glyph_id(&self, cp: u32) -> Option<u16> {
        self.charmap.get(&cp).copied()
    }

    pub fn glyph(&self, gid: u16) -> Option<&GlyphRecord> {
        self.glyphs.get(gid as usize)
    }

    /// All code point to glyph id mappings, ascending by code point.
    pub fn mappings(&self) -> impl Iterator<Item = (u32, u16)> + '_ {
        self.charmap.iter().map(|(&cp, &gid)| (cp, gid))
    }

    /// Advance width of the glyph mapped from `cp`, if any.
    pub fn advance_for(&self, cp: u32) -> Option<u16> {
        self.glyph_id(cp)
            .and_then(|gid| self.glyph(gid))
            .map(|record| record.advance)
    }

    /// Points `cp` at `gid`, replacing any previous mapping.
    pub fn map_codepoint(&mut self, cp: u32, gid: u16) {
        self.charmap.insert(cp, gid);
    }

    /// Appends an empty glyph slot and returns its id, or `None` if the
    /// glyph id space is exhausted.
    pub fn reserve_glyph(&mut self) -> Option<u16> {
        let gid = u16::try_from(self.glyphs.len()).ok()?;
        self.glyphs.push(GlyphRecord::default());
        Some(gid)
    }

    pub fn set_glyph(&mut self, gid: u16, record: GlyphRecord) {
        if let Some(slot) = self.glyphs.get_mut(gid as usize) {
            *slot = record;
        }
    }

    /// Rewrites a glyph's side bearings, shifting its ink so the new left
    /// bearing holds and resizing the advance to fit the new right bearing.
    /// On a glyph without ink only the bearing sum can be honored, as an
    /// advance change.
    pub fn set_bearings(&mut self, gid: u16, left: i16, right: i16) {
        let Some(record) = self.glyphs.get_mut(gid as usize) else {
            return;
        };
        match record.bbox() {
            Some(bbox) => {
                let dx = left.saturating_sub(bbox.x_min);
                record.translate(dx);
                record.lsb = left;
                let ink = bbox.x_max as i32 - bbox.x_min as i32;
                let advance = left as i32 + ink + right as i32;
                record.advance = advance.clamp(0, u16::MAX as i32) as u16;
            }
            None => {
                let advance = record.advance as i32 + left as i32 + right as i32;
                record.advance = advance.clamp(0, u16::MAX as i32) as u16;
            }
        }
    }

    /// Adds `addition` to a glyph's total advance, splitting the delta
    /// between the left and right bearings.
    pub fn add_bearing(&mut self, gid: u16, addition: i32) {
        let (left_delta, right_delta) = split_addition(addition);
        let Some(record) = self.glyph(gid) else {
            return;
        };
        match record.bbox() {
            Some(bbox) => {
                let left = bbox.x_min as i32 + left_delta;
                let right = (record.advance as i32 - bbox.x_max as i32) + right_delta;
                self.set_bearings(
                    gid,
                    left.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
                    right.clamp(i16::MIN as i32, i16::MAX as i32) as i16,
                );
            }
            None => {
                // no ink to re-center; keep the full delta in the advance
                let advance = record.advance as i32 + addition;
                self.glyphs[gid as usize].advance = advance.clamp(0, u16::MAX as i32) as u16;
            }
        }
    }

    /// Sets one logical metadata field by name. Alternate spellings are
    /// accepted for fields whose canonical name varies between font tools;
    /// an unknown name or an absent backing table reports the field as
    /// unsupported so the caller can try its next spelling.
    pub fn set_metadata_field(
        &mut self,
        field: &str,
        value: FieldValue,
    ) -> Result<(), UnsupportedField> {
        let unsupported = || UnsupportedField(field.to_string());
        match field {
            "isFixedPitch" | "post.isFixedPitch" | "fixedPitch" => {
                let post = self.post.as_mut().ok_or_else(unsupported)?;
                post.is_fixed_pitch = value.to_i32().max(0) as u32;
            }
            "xAvgCharWidth" | "avgCharWidth" | "os2.xAvgCharWidth" => {
                let os2 = self.os2.as_mut().ok_or_else(unsupported)?;
                os2.x_avg_char_width = value.to_i32() as i16;
            }
            "usWeightClass" | "weightClass" => {
                let os2 = self.os2.as_mut().ok_or_else(unsupported)?;
                os2.us_weight_class = value.to_i32() as u16;
            }
            "fsSelection" | "styleMap" => {
                let os2 = self.os2.as_mut().ok_or_else(unsupported)?;
                os2.fs_selection = SelectionFlags::from_bits_truncate(value.to_i32() as u16);
            }
            "macStyle" | "head.macStyle" => {
                self.head.mac_style = MacStyle::from_bits_truncate(value.to_i32() as u16);
            }
            "panoseProportion" | "panose.bProportion" => {
                let os2 = self.os2.as_mut().ok_or_else(unsupported)?;
                os2.panose_10[3] = value.to_i32() as u8;
            }
            _ => return Err(unsupported()),
        }
        Ok(())
    }

    /// Compiles the document to font bytes. Glyph-derived tables are rebuilt
    /// from the records; metadata tables are dumped as held; everything else
    /// passes through from the original bytes, minus [`DROP_TABLES`].
    pub fn compile(&self) -> Result<Vec<u8>, BuildError> {
        let mut builder = FontBuilder::new();

        let mut glyf_builder = GlyfLocaBuilder::new();
        for (gid, record) in self.glyphs.iter().enumerate() {
            let result = match &record.outline {
                Outline::Empty => glyf_builder.add_glyph(&SimpleGlyph::default()),
                Outline::Simple(glyph) => glyf_builder.add_glyph(glyph),
                Outline::Composite(glyph) => glyf_builder.add_glyph(glyph),
            };
            result.map_err(|err| BuildError::CompileFailed {
                table: Glyf::TAG,
                detail: format!("glyph {gid}: {err}"),
            })?;
        }
        let (glyf, loca, loca_format) = glyf_builder.build();

        let num_long_metrics = self.num_long_metrics();
        let hmtx = Hmtx {
            h_metrics: self.glyphs[..num_long_metrics]
                .iter()
                .map(|record| LongMetric {
                    advance: record.advance,
                    side_bearing: record.lsb,
                })
                .collect(),
            left_side_bearings: self.glyphs[num_long_metrics..]
                .iter()
                .map(|record| record.lsb)
                .collect(),
        };

        let mut head = self.head.clone();
        head.index_to_loc_format = match loca_format {
            LocaFormat::Short => 0,
            LocaFormat::Long => 1,
        };
        head.checksum_adjustment = 0;
        if let Some(bbox) = self.font_bbox() {
            head.x_min = bbox.x_min;
            head.y_min = bbox.y_min;
            head.x_max = bbox.x_max;
            head.y_max = bbox.y_max;
        }

        let mut hhea = self.hhea.clone();
        hhea.number_of_h_metrics = num_long_metrics as u16;
        self.refresh_hhea_extents(&mut hhea);

        let mut maxp = self.maxp.clone();
        self.refresh_maxp(&mut maxp);

        let mut cmap = None;
        if !self.charmap.is_empty() {
            let mappings = self.charmap.iter().filter_map(|(&cp, &gid)| {
                char::from_u32(cp).map(|ch| (ch, GlyphId::new(gid as u32)))
            });
            cmap = Some(Cmap::from_mappings(mappings).map_err(|err| {
                BuildError::CompileFailed {
                    table: Cmap::TAG,
                    detail: err.to_string(),
                }
            })?);
        }

        add_table(&mut builder, &glyf)?;
        add_table(&mut builder, &loca)?;
        add_table(&mut builder, &hmtx)?;
        add_table(&mut builder, &head)?;
        add_table(&mut builder, &hhea)?;
        add_table(&mut builder, &maxp)?;
        if let Some(cmap) = &cmap {
            add_table(&mut builder, cmap)?;
        }
        if let Some(os2) = &self.os2 {
            add_table(&mut builder, os2)?;
        }
        if let Some(post) = &self.post {
            // a version 2.0 name array would not cover appended glyph ids,
            // so names are dropped and the table emitted as version 3.0
            let mut post = post.clone();
            post.version = Version16Dot16::VERSION_3_0;
            post.glyph_name_index = None;
            post.string_data = None;
            add_table(&mut builder, &post)?;
        }
        if !self.name.name_record.is_empty() {
            let mut name = self.name.clone();
            name.name_record.sort();
            add_table(&mut builder, &name)?;
        }

        // untouched tables pass through from the original font
        if let Ok(original) = FontRef::new(&self.data) {
            for record in original.table_directory.table_records() {
                let tag = record.tag();
                if builder.contains(tag) || DROP_TABLES.contains(&tag) {
                    continue;
                }
                match original.data_for_tag(tag) {
                    Some(table_data) => {
                        builder.add_raw(tag, table_data.as_bytes().to_vec());
                    }
                    None => warn!("table '{tag}' is malformed and was dropped"),
                }
            }
        }

        Ok(builder.build())
    }

    /// Length of the hmtx long-metric array: the trailing run of glyphs
    /// sharing the last advance needs only one long entry.
    fn num_long_metrics(&self) -> usize {
        let Some(last) = self.glyphs.last() else {
            return 0;
        };
        let run = self
            .glyphs
            .iter()
            .rev()
            .take_while(|record| record.advance == last.advance)
            .count();
        (self.glyphs.len() - run + 1).max(1)
    }

    fn font_bbox(&self) -> Option<Bbox> {
        self.glyphs
            .iter()
            .filter_map(GlyphRecord::bbox)
            .reduce(Bbox::union)
    }

    fn refresh_hhea_extents(&self, hhea: &mut Hhea) {
        let mut advance_width_max = 0u16;
        let mut min_lsb = i16::MAX;
        let mut min_rsb = i16::MAX;
        let mut x_max_extent = i16::MIN;
        let mut has_ink = false;
        for record in &self.glyphs {
            advance_width_max = advance_width_max.max(record.advance);
            if let Some(bbox) = record.bbox() {
                has_ink = true;
                min_lsb = min_lsb.min(record.lsb);
                let rsb = record.advance as i32 - bbox.x_max as i32;
                min_rsb = min_rsb.min(rsb.clamp(i16::MIN as i32, i16::MAX as i32) as i16);
                x_max_extent = x_max_extent.max(bbox.x_max);
            }
        }
        hhea.advance_width_max = UfWord::new(advance_width_max);
        if has_ink {
            hhea.min_left_side_bearing = FWord::new(min_lsb);
            hhea.min_right_side_bearing = FWord::new(min_rsb);
            hhea.x_max_extent = FWord::new(x_max_extent);
        }
    }

    fn refresh_maxp(&self, maxp: &mut Maxp) {
        maxp.num_glyphs = self.glyphs.len() as u16;
        if maxp.max_points.is_none() {
            // version 0.5 carries no outline statistics
            return;
        }
        let mut max_points = 0u16;
        let mut max_contours = 0u16;
        let mut max_instructions = 0u16;
        let mut max_composite_points = 0u16;
        let mut max_composite_contours = 0u16;
        let mut max_component_elements = 0u16;
        let mut max_component_depth = 0u16;
        for (gid, record) in self.glyphs.iter().enumerate() {
            match &record.outline {
                Outline::Empty => {}
                Outline::Simple(glyph) => {
                    let points: usize = glyph.contours.iter().map(Contour::len).sum();
                    max_points = max_points.max(points as u16);
                    max_contours = max_contours.max(glyph.contours.len() as u16);
                    max_instructions = max_instructions.max(glyph.instructions.len() as u16);
                }
                Outline::Composite(glyph) => {
                    max_component_elements =
                        max_component_elements.max(glyph.components().len() as u16);
                    let stats = self.flatten_composite(gid as u16, 0);
                    max_composite_points = max_composite_points.max(stats.points as u16);
                    max_composite_contours = max_composite_contours.max(stats.contours as u16);
                    max_component_depth = max_component_depth.max(stats.depth as u16);
                }
            }
        }
        maxp.max_points = Some(max_points);
        maxp.max_contours = Some(max_contours);
        maxp.max_composite_points = Some(max_composite_points);
        maxp.max_composite_contours = Some(max_composite_contours);
        maxp.max_size_of_instructions = Some(max_instructions);
        maxp.max_component_elements = Some(max_component_elements);
        maxp.max_component_depth = Some(max_component_depth);
    }

    fn flatten_composite(&self, gid: u16, depth: u8) -> CompositeStats {
        let mut stats = CompositeStats {
            depth: depth as u32,
            ..Default::default()
        };
        if depth > MAX_NESTING_LEVEL {
            return stats;
        }
        let Some(record) = self.glyph(gid) else {
            return stats;
        };
        match &record.outline {
            Outline::Empty => {}
            Outline::Simple(glyph) => {
                stats.points = glyph.contours.iter().map(Contour::len).sum::<usize>() as u32;
                stats.contours = glyph.contours.len() as u32;
            }
            Outline::Composite(glyph) => {
                for component in glyph.components() {
                    let child = self.flatten_composite(component.glyph.to_u16(), depth + 1);
                    stats.points += child.points;
                    stats.contours += child.contours;
                    stats.depth = stats.depth.max(child.depth);
                }
            }
        }
        stats
    }
}

#[derive(Default)]
struct CompositeStats {
    points: u32,
    contours: u32,
    depth: u32,
}

fn add_table<T>(builder: &mut FontBuilder, table: &T) -> Result<(), BuildError>
where
    T: write_fonts::FontWrite + write_fonts::validate::Validate + TopLevelTable,
{
    builder
        .add_table(table)
        .map(|_| ())
        .map_err(|err| BuildError::CompileFailed {
            table: T::TAG,
            detail: err.inner.to_string(),
        })
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use write_fonts::tables::glyf::ComponentFlags;
    use write_fonts::types::GlyphId16;

    /// An empty glyph with the base font's Latin advance.
    pub(crate) fn spaced_record() -> GlyphRecord {
        GlyphRecord {
            advance: 600,
            lsb: 0,
            outline: Outline::Empty,
        }
    }

    /// A square outline glyph spanning `x_min..x_max`.
    pub(crate) fn outline_record(x_min: i16, x_max: i16, advance: u16) -> GlyphRecord {
        let points = vec![
            CurvePoint { x: x_min, y: 0, on_curve: true },
            CurvePoint { x: x_max, y: 0, on_curve: true },
            CurvePoint { x: x_max, y: 700, on_curve: true },
            CurvePoint { x: x_min, y: 700, on_curve: true },
        ];
        GlyphRecord {
            advance,
            lsb: x_min,
            outline: Outline::Simple(SimpleGlyph {
                bbox: Bbox { x_min, y_min: 0, x_max, y_max: 700 },
                contours: vec![Contour::from(points)],
                instructions: Vec::new(),
            }),
        }
    }

    /// A composite glyph placing `child` at the origin.
    pub(crate) fn composite_record(child: u16, advance: u16) -> GlyphRecord {
        composite_record_at(child, 0, advance)
    }

    pub(crate) fn composite_record_at(child: u16, dx: i16, advance: u16) -> GlyphRecord {
        GlyphRecord {
            advance,
            lsb: 0,
            outline: Outline::Composite(CompositeGlyph::new(
                Component::new(
                    GlyphId16::new(child),
                    Anchor::Offset { x: dx, y: 0 },
                    Default::default(),
                    ComponentFlags::default(),
                ),
                Bbox { x_min: dx, y_min: 0, x_max: dx.saturating_add(800), y_max: 700 },
            )),
        }
    }

    impl FontDocument {
        pub(crate) fn for_tests(glyphs: Vec<GlyphRecord>, mappings: &[(u32, u16)]) -> Self {
            FontDocument {
                data: Vec::new(),
                glyphs,
                charmap: mappings.iter().copied().collect(),
                head: Head::default(),
                hhea: Hhea::default(),
                maxp: Maxp::default(),
                os2: None,
                post: None,
                name: Name::default(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_bearings_moves_ink_and_resizes_advance() {
        let mut font = FontDocument::for_tests(vec![outline_record(100, 900, 1000)], &[]);
        font.set_bearings(0, 150, 200);

        let glyph = font.glyph(0).unwrap();
        assert_eq!(glyph.lsb, 150);
        // advance = left + ink + right = 150 + 800 + 200
        assert_eq!(glyph.advance, 1150);
        let bbox = glyph.bbox().unwrap();
        assert_eq!(bbox.x_min, 150);
        assert_eq!(bbox.x_max, 950);
    }

    #[test]
    fn add_bearing_preserves_ink_width() {
        let mut font = FontDocument::for_tests(vec![outline_record(100, 900, 1000)], &[]);
        font.add_bearing(0, 200);

        let glyph = font.glyph(0).unwrap();
        assert_eq!(glyph.advance, 1200);
        let bbox = glyph.bbox().unwrap();
        assert_eq!(bbox.x_max - bbox.x_min, 800);
        assert_eq!(bbox.x_min, 200);
    }

    #[test]
    fn add_bearing_on_empty_glyph_widens_advance_only() {
        let mut font = FontDocument::for_tests(vec![spaced_record()], &[]);
        font.add_bearing(0, 200);
        assert_eq!(font.glyph(0).unwrap().advance, 800);
        assert_eq!(font.glyph(0).unwrap().lsb, 0);
    }

    #[test]
    fn translate_shifts_composite_offsets_not_transforms() {
        let mut record = composite_record_at(1, 40, 1000);
        record.translate(60);
        let Outline::Composite(composite) = &record.outline else {
            panic!("expected composite");
        };
        let component = &composite.components()[0];
        assert_eq!(component.anchor, Anchor::Offset { x: 100, y: 0 });
        assert_eq!(component.transform, Default::default());
        assert_eq!(composite.bbox.x_min, 100);
    }

    #[test]
    fn metadata_fields_unsupported_without_backing_table() {
        let mut font = FontDocument::for_tests(vec![spaced_record()], &[]);
        // no OS/2 or post table in the synthetic document
        assert!(font
            .set_metadata_field("xAvgCharWidth", FieldValue::Int(600))
            .is_err());
        assert!(font
            .set_metadata_field("isFixedPitch", FieldValue::Flag(true))
            .is_err());
        assert!(font
            .set_metadata_field("noSuchField", FieldValue::Int(1))
            .is_err());
        // head is always present
        assert!(font
            .set_metadata_field("macStyle", FieldValue::Int(0x03))
            .is_ok());
        assert_eq!(font.head.mac_style, MacStyle::BOLD | MacStyle::ITALIC);
    }

    #[test]
    fn metadata_fields_with_backing_tables() {
        let mut font = FontDocument::for_tests(vec![spaced_record()], &[]);
        font.os2 = Some(Os2::default());
        font.post = Some(Post::default());

        font.set_metadata_field("usWeightClass", FieldValue::Int(700))
            .unwrap();
        font.set_metadata_field("fsSelection", FieldValue::Int(0x21))
            .unwrap();
        font.set_metadata_field("panoseProportion", FieldValue::Int(9))
            .unwrap();
        font.set_metadata_field("xAvgCharWidth", FieldValue::Int(600))
            .unwrap();
        font.set_metadata_field("isFixedPitch", FieldValue::Flag(true))
            .unwrap();

        let os2 = font.os2.as_ref().unwrap();
        assert_eq!(os2.us_weight_class, 700);
        assert_eq!(os2.fs_selection.bits(), 0x21);
        assert_eq!(os2.panose_10[3], 9);
        assert_eq!(os2.x_avg_char_width, 600);
        assert_eq!(font.post.as_ref().unwrap().is_fixed_pitch, 1);
    }

    #[test]
    fn long_metric_run_collapses() {
        let font = FontDocument::for_tests(
            vec![
                outline_record(0, 500, 600),
                outline_record(0, 500, 600),
                outline_record(0, 900, 1200),
                outline_record(0, 900, 1200),
                outline_record(0, 900, 1200),
            ],
            &[],
        );
        // one long metric must remain for the trailing 1200 run
        assert_eq!(font.num_long_metrics(), 3);
    }

    #[test]
    fn post_names_dropped_when_glyphs_are_appended() {
        let mut font = FontDocument::for_tests(
            vec![GlyphRecord::default(), outline_record(50, 550, 600)],
            &[(0x41, 1)],
        );
        font.head.units_per_em = 1000;
        font.post = Some(Post::new_v2([".notdef", "A"]));
        font.reserve_glyph().unwrap();

        let bytes = font.compile().unwrap();
        let reopened = FontDocument::from_bytes(bytes).unwrap();

        // post must agree with maxp on the glyph count; names do not survive
        assert_eq!(reopened.maxp.num_glyphs, 3);
        let post = reopened.post.as_ref().unwrap();
        assert_eq!(post.version, Version16Dot16::VERSION_3_0);
        assert!(post.glyph_name_index.is_none());
        assert!(post.string_data.is_none());
    }

    #[test]
    fn compile_round_trip() {
        let mut font = FontDocument::for_tests(
            vec![
                GlyphRecord::default(), // notdef
                outline_record(50, 550, 600),
                outline_record(100, 900, 1000),
            ],
            &[(0x20, 1), (0x41, 1), (0xAC00, 2)],
        );
        font.head.units_per_em = 1000;
        font.add_bearing(2, 200);

        let bytes = font.compile().unwrap();
        let reopened = FontDocument::from_bytes(bytes).unwrap();

        assert_eq!(reopened.num_glyphs(), 3);
        assert_eq!(reopened.glyph_id(0xAC00), Some(2));
        assert_eq!(reopened.advance_for(0x20), Some(600));

        let hangul = reopened.glyph(2).unwrap();
        assert_eq!(hangul.advance, 1200);
        assert_eq!(hangul.lsb, 200);
        let bbox = hangul.bbox().unwrap();
        assert_eq!((bbox.x_min, bbox.x_max), (200, 1000));

        assert_eq!(reopened.head.units_per_em, 1000);
        assert_eq!(reopened.maxp.num_glyphs, 3);
    }
}
