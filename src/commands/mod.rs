use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::TocArgs;
use crate::pdf::extract_pages;
use crate::toc::{PageText, TocOutcome, recover_toc};

pub mod bookmark;
pub mod inspect;

/// Extracts page text from `pdf_path` and recovers its outline.
fn load_toc(pdf_path: &Path, args: &TocArgs) -> Result<(Vec<PageText>, TocOutcome)> {
    let config = args.toc_config()?;

    info!(path = %pdf_path.display(), "reading document text");
    let pages = extract_pages(pdf_path, args.max_pages)?;
    let outcome = recover_toc(&pages, &config).with_context(|| {
        format!(
            "failed to parse table of contents of {}",
            pdf_path.display()
        )
    })?;

    Ok((pages, outcome))
}
