use std::path::PathBuf;

use anyhow::{Result, ensure};
use clap::{Args, Parser, Subcommand};

use crate::toc::{CalibratorConfig, DetectorConfig, TocConfig};

#[derive(Parser, Debug)]
#[command(
    name = "tocmark",
    version,
    about = "Recover a PDF's printed table of contents as outline bookmarks"
)]
pub struct Cli {
    /// Log intermediate parsing state (raw TOC lines, classified entries).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write recovered bookmarks into each PDF.
    Bookmark(BookmarkArgs),
    /// Recover the outline and report it as JSON without touching the PDF.
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct TocArgs {
    #[arg(long, default_value_t = 0.75)]
    pub toc_line_ratio: f64,

    #[arg(long, default_value_t = 10)]
    pub min_first_page_lines: usize,

    #[arg(long, default_value_t = 3)]
    pub heading_lines: usize,

    #[arg(long)]
    pub max_pages: Option<usize>,
}

impl TocArgs {
    pub fn toc_config(&self) -> Result<TocConfig> {
        ensure!(
            (0.0..=1.0).contains(&self.toc_line_ratio),
            "--toc-line-ratio must be between 0 and 1, got {}",
            self.toc_line_ratio
        );
        ensure!(self.heading_lines > 0, "--heading-lines must be at least 1");

        Ok(TocConfig {
            detector: DetectorConfig {
                min_ratio: self.toc_line_ratio,
                min_first_page_lines: self.min_first_page_lines,
            },
            calibrator: CalibratorConfig {
                heading_lines: self.heading_lines,
            },
        })
    }
}

#[derive(Args, Debug, Clone)]
pub struct BookmarkArgs {
    #[arg(required = true)]
    pub pdfs: Vec<PathBuf>,

    /// Output path; defaults to rewriting the input in place.
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub allow_uncalibrated: bool,

    #[arg(long, default_value = "Appendices")]
    pub appendix_group_label: String,

    #[command(flatten)]
    pub toc: TocArgs,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    pub pdf: PathBuf,

    /// Write the manifest here instead of printing it.
    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[command(flatten)]
    pub toc: TocArgs,
}
