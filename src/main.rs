//! Binary glyph-merge tool.
//!
//! Takes a directory of base-family font files and a pair of donor fonts,
//! and writes merged fonts carrying the donor's Hangul glyphs at twice the
//! base family's Latin advance.

use std::path::{Path, PathBuf};

use clap::Parser;
use fletta::{build_all, config::BuildConfig, BuildJob};
use log::warn;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the base family's font files
    #[arg(short, long)]
    base_dir: PathBuf,

    /// Donor font supplying regular-tier Hangul glyphs
    #[arg(long)]
    donor: PathBuf,

    /// Donor font for bold-tier variants; defaults to the regular donor
    #[arg(long)]
    donor_bold: Option<PathBuf>,

    /// The output directory
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Comma separated variant tokens to build
    #[arg(long, default_value = "Regular,It,Bold,BoldIt")]
    variants: String,

    /// Extra advance delta on top of the double-width target
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    bearing_adjustment: i32,

    /// Family name written into the merged fonts
    #[arg(long, default_value = "Source Code Pro KR")]
    family_name: String,

    /// Filename token of the base family
    #[arg(long, default_value = "SourceCodePro")]
    source_token: String,

    /// Filename token of the merged family
    #[arg(long, default_value = "SourceCodeProKR")]
    merged_token: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let variants: Vec<String> = args
        .variants
        .split(',')
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
        .collect();

    let config = BuildConfig {
        family_name: args.family_name,
        source_token: args.source_token,
        merged_token: args.merged_token,
        donor_regular: args.donor.clone(),
        donor_bold: args.donor_bold.unwrap_or(args.donor),
        output_dir: args.output_dir,
        bearing_adjustment: args.bearing_adjustment,
        variants,
        base_latin_width: None,
        donor_fixed_width: None,
    };

    let jobs = collect_jobs(&config, &args.base_dir);

    if let Err(e) = std::fs::create_dir_all(&config.output_dir) {
        eprintln!("cannot create '{}': {e}", config.output_dir.display());
        std::process::exit(1);
    }

    match build_all(&config, &jobs) {
        Ok(summary) => {
            for path in &summary.built {
                println!("{}", path.display());
            }
            for (variant, err) in &summary.failed {
                eprintln!("{variant}: {err}");
            }
            if !summary.failed.is_empty() {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}

/// Pairs each requested variant with its base font file, skipping variants
/// whose input is not present.
fn collect_jobs(config: &BuildConfig, base_dir: &Path) -> Vec<BuildJob> {
    config
        .variants
        .iter()
        .filter_map(|variant| {
            let base_path = base_dir.join(format!("{}-{variant}.ttf", config.source_token));
            if base_path.is_file() {
                Some(BuildJob {
                    variant: variant.clone(),
                    base_path,
                })
            } else {
                warn!("skipping '{variant}': no input at {}", base_path.display());
                None
            }
        })
        .collect()
}
