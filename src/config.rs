//! Explicit build configuration handed to the merge pipeline.

use std::path::{Path, PathBuf};

use crate::variant::DonorWeight;

/// Inputs the pipeline consumes but never looks up itself: donor sources,
/// output location, the family labels, and the bearing adjustment.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    /// Family label written into the merged font's name records.
    pub family_name: String,
    /// Filename token identifying base-family input files.
    pub source_token: String,
    /// Token substituted for `source_token` in output filenames.
    pub merged_token: String,
    /// Donor font supplying regular-tier Hangul glyphs.
    pub donor_regular: PathBuf,
    /// Donor font supplying bold-tier Hangul glyphs (Bold, Black, Semibold).
    pub donor_bold: PathBuf,
    pub output_dir: PathBuf,
    /// Extra advance delta on top of the double-width normalization; the
    /// value is split between the left and right bearings. Negative narrows.
    pub bearing_adjustment: i32,
    /// Style variant tokens to build.
    pub variants: Vec<String>,
    /// Base font reference Latin advance; derived from U+0020 when unset.
    pub base_latin_width: Option<u16>,
    /// Donor native fixed advance; derived from U+AC00 when unset.
    pub donor_fixed_width: Option<u16>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            family_name: "Source Code Pro KR".to_string(),
            source_token: "SourceCodePro".to_string(),
            merged_token: "SourceCodeProKR".to_string(),
            donor_regular: PathBuf::new(),
            donor_bold: PathBuf::new(),
            output_dir: PathBuf::from("out"),
            bearing_adjustment: 0,
            variants: vec!["Regular".to_string(), "Bold".to_string()],
            base_latin_width: None,
            donor_fixed_width: None,
        }
    }
}

impl BuildConfig {
    pub fn donor_path(&self, weight: DonorWeight) -> &Path {
        match weight {
            DonorWeight::Regular => &self.donor_regular,
            DonorWeight::Bold => &self.donor_bold,
        }
    }

    /// Output filename for a given base input filename, e.g.
    /// `SourceCodePro-Bold.ttf` becomes `SourceCodeProKR-Bold.ttf`.
    pub fn output_name(&self, base_file_name: &str) -> String {
        base_file_name.replace(&self.source_token, &self.merged_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_substitutes_token() {
        let config = BuildConfig::default();
        assert_eq!(
            config.output_name("SourceCodePro-BoldIt.ttf"),
            "SourceCodeProKR-BoldIt.ttf"
        );
        // a name without the token passes through unchanged
        assert_eq!(config.output_name("Other-Regular.ttf"), "Other-Regular.ttf");
    }

    #[test]
    fn donor_paths_by_tier() {
        let config = BuildConfig {
            donor_regular: PathBuf::from("d2.ttf"),
            donor_bold: PathBuf::from("d2-bold.ttf"),
            ..Default::default()
        };
        assert_eq!(config.donor_path(DonorWeight::Regular), Path::new("d2.ttf"));
        assert_eq!(config.donor_path(DonorWeight::Bold), Path::new("d2-bold.ttf"));
    }
}
