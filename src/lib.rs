//! Merge fixed-width Hangul glyphs from a donor font into a Latin code font.
//!
//! The donor's Hangul glyphs are widened to twice the base font's Latin
//! advance, transplanted into the base font, and the result is written out
//! under the merged family's identity.

pub mod bearing;
pub mod config;
pub mod font;
pub mod metadata;
pub mod ranges;
pub mod transplant;
pub mod variant;

use std::path::PathBuf;

use log::{info, warn};
use thiserror::Error;
use write_fonts::read::ReadError;
use write_fonts::types::Tag;

use crate::bearing::{adjust_selection, BearingPlan};
use crate::config::BuildConfig;
use crate::font::FontDocument;
use crate::metadata::patch_metadata;
use crate::ranges::hangul_selection;
use crate::transplant::transplant_selection;
use crate::variant::resolve;

/// Reference code point for the base font's Latin advance.
const SPACE: u32 = 0x20;
/// Reference code point for the donor's fixed advance.
const HANGUL_REFERENCE: u32 = 0xAC00;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("input font file {0:?} is missing or unreadable")]
    MissingInput(PathBuf),

    #[error("failed to parse font: {0}")]
    CorruptFont(#[from] ReadError),

    #[error("required table '{0}' is missing")]
    MissingTable(Tag),

    #[error("cannot derive a reference width from the {0}")]
    ReferenceWidth(&'static str),

    #[error("compiling table '{table}' failed: {detail}")]
    CompileFailed { table: Tag, detail: String },

    #[error("failed to write {path:?}: {source}")]
    WriteFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no variants requested")]
    NoVariants,
}

/// One variant to build: the token and the base font file it starts from.
#[derive(Clone, Debug)]
pub struct BuildJob {
    pub variant: String,
    pub base_path: PathBuf,
}

/// What came out of a run over several variants.
#[derive(Debug, Default)]
pub struct BuildSummary {
    pub built: Vec<PathBuf>,
    pub failed: Vec<(String, BuildError)>,
}

/// Builds every requested variant. A variant that fails is reported in the
/// summary and does not stop the others.
pub fn build_all(config: &BuildConfig, jobs: &[BuildJob]) -> Result<BuildSummary, BuildError> {
    if jobs.is_empty() {
        return Err(BuildError::NoVariants);
    }
    let mut summary = BuildSummary::default();
    for job in jobs {
        match build_variant(config, job) {
            Ok(path) => summary.built.push(path),
            Err(err) => {
                warn!("variant '{}' failed: {err}", job.variant);
                summary.failed.push((job.variant.clone(), err));
            }
        }
    }
    Ok(summary)
}

/// Builds one variant: open both fonts, widen the donor's Hangul glyphs,
/// transplant them, patch the metadata, and write the merged font.
pub fn build_variant(config: &BuildConfig, job: &BuildJob) -> Result<PathBuf, BuildError> {
    let spec = resolve(&job.variant);
    info!(
        "building '{}' from {}",
        job.variant,
        job.base_path.display()
    );

    let mut donor = FontDocument::open(config.donor_path(spec.donor_weight))?;
    let mut base = FontDocument::open(&job.base_path)?;

    let base_latin_width = config
        .base_latin_width
        .or_else(|| base.advance_for(SPACE))
        .ok_or(BuildError::ReferenceWidth("base font"))?;
    let donor_fixed_width = config
        .donor_fixed_width
        .or_else(|| donor.advance_for(HANGUL_REFERENCE))
        .ok_or(BuildError::ReferenceWidth("donor font"))?;

    let selection = hangul_selection();
    let plan = BearingPlan::new(base_latin_width, donor_fixed_width, config.bearing_adjustment);

    // the donor is widened first so the copied glyphs land at their final
    // metrics
    adjust_selection(&mut donor, &selection, plan);
    let stats = transplant_selection(&donor, &mut base, &selection);
    info!(
        "copied {} glyphs ({} extra components), donor missing {} code points",
        stats.copied, stats.components, stats.skipped
    );

    patch_metadata(&mut base, &spec, &config.family_name, base_latin_width);

    let bytes = base.compile()?;
    let file_name = job
        .base_path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| config.output_name(name))
        .unwrap_or_else(|| format!("{}-{}.ttf", config.merged_token, job.variant));
    let output_path = config.output_dir.join(file_name);
    std::fs::write(&output_path, bytes).map_err(|source| BuildError::WriteFailed {
        path: output_path.clone(),
        source,
    })?;
    Ok(output_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::test_support::{outline_record, spaced_record};
    use crate::font::GlyphRecord;
    use pretty_assertions::assert_eq;
    use write_fonts::tables::{os2::Os2, post::Post};

    /// The in-memory half of [`build_variant`], from widening to compile.
    fn merge_in_memory(mut donor: FontDocument, mut base: FontDocument) -> FontDocument {
        let base_latin_width = base.advance_for(SPACE).unwrap();
        let donor_fixed_width = donor.advance_for(HANGUL_REFERENCE).unwrap();
        let selection = hangul_selection();
        let plan = BearingPlan::new(base_latin_width, donor_fixed_width, 0);

        adjust_selection(&mut donor, &selection, plan);
        transplant_selection(&donor, &mut base, &selection);
        patch_metadata(&mut base, &resolve("Bold"), "Source Code Pro KR", base_latin_width);

        let bytes = base.compile().unwrap();
        FontDocument::from_bytes(bytes).unwrap()
    }

    #[test]
    fn merged_hangul_is_double_width() {
        let donor = FontDocument::for_tests(
            vec![
                GlyphRecord::default(),
                outline_record(50, 950, 1000),
                outline_record(60, 940, 1000),
            ],
            &[(0xAC00, 1), (0x3131, 2)],
        );
        let mut base = FontDocument::for_tests(
            vec![
                GlyphRecord::default(),
                spaced_record(),
                outline_record(50, 550, 600),
            ],
            &[(0x20, 1), (0x41, 2)],
        );
        base.head.units_per_em = 1000;
        base.os2 = Some(Os2::default());
        base.post = Some(Post::default());

        let merged = merge_in_memory(donor, base);

        // base glyphs untouched
        assert_eq!(merged.advance_for(0x20), Some(600));
        assert_eq!(merged.advance_for(0x41), Some(600));
        // transplanted glyphs widened to twice the Latin advance
        assert_eq!(merged.advance_for(0xAC00), Some(1200));
        assert_eq!(merged.advance_for(0x3131), Some(1200));

        let hangul = merged.glyph(merged.glyph_id(0xAC00).unwrap()).unwrap();
        // ink kept its width, re-centered by the split
        let bbox = hangul.bbox().unwrap();
        assert_eq!(bbox.x_max - bbox.x_min, 900);
        assert_eq!(hangul.lsb, 150);

        let os2 = merged.os2.as_ref().unwrap();
        assert_eq!(os2.us_weight_class, 700);
        assert_eq!(os2.x_avg_char_width, 600);
        assert_eq!(merged.post.as_ref().unwrap().is_fixed_pitch, 1);
    }

    #[test]
    fn empty_job_list_is_an_error() {
        let config = BuildConfig::default();
        assert!(matches!(
            build_all(&config, &[]),
            Err(BuildError::NoVariants)
        ));
    }

    #[test]
    fn missing_input_is_reported_per_variant() {
        let config = BuildConfig {
            donor_regular: PathBuf::from("/nonexistent/donor.ttf"),
            donor_bold: PathBuf::from("/nonexistent/donor-bold.ttf"),
            ..Default::default()
        };
        let jobs = vec![BuildJob {
            variant: "Regular".to_string(),
            base_path: PathBuf::from("/nonexistent/SourceCodePro-Regular.ttf"),
        }];

        let summary = build_all(&config, &jobs).unwrap();
        assert!(summary.built.is_empty());
        assert_eq!(summary.failed.len(), 1);
        assert!(matches!(summary.failed[0].1, BuildError::MissingInput(_)));
    }
}
