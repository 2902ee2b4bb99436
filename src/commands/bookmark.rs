use std::path::Path;

use anyhow::{Context, Result, bail};
use lopdf::Document;
use tracing::{error, info, warn};

use crate::cli::BookmarkArgs;
use crate::pdf::LopdfOutline;
use crate::toc::{OutlineOptions, TocOutcome, emit_outline};
use crate::util::replace_file;

use super::load_toc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BookmarkOutcome {
    Written { item_count: usize },
    NoToc,
    NoEntries,
}

pub fn run(args: BookmarkArgs) -> Result<()> {
    if args.output.is_some() && args.pdfs.len() > 1 {
        bail!("--output can only be used with a single input PDF");
    }

    let options = OutlineOptions {
        appendix_group_label: args.appendix_group_label.clone(),
    };

    let mut failed = 0usize;
    for pdf_path in &args.pdfs {
        let output_path = args.output.as_deref().unwrap_or(pdf_path.as_path());
        match bookmark_pdf(pdf_path, output_path, &args, &options) {
            Ok(BookmarkOutcome::Written { item_count }) => {
                info!(
                    path = %output_path.display(),
                    item_count,
                    "bookmarks written"
                );
            }
            Ok(BookmarkOutcome::NoToc) => {
                warn!(path = %pdf_path.display(), "document left unchanged");
            }
            Ok(BookmarkOutcome::NoEntries) => {
                warn!(
                    path = %pdf_path.display(),
                    "no toc entries recovered; document left unchanged"
                );
            }
            Err(err) => {
                failed += 1;
                error!(path = %pdf_path.display(), error = %err, "failed to bookmark document");
                for cause in err.chain().skip(1) {
                    error!(cause = %cause, "caused by");
                }
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} documents failed", args.pdfs.len());
    }
    Ok(())
}

fn bookmark_pdf(
    pdf_path: &Path,
    output_path: &Path,
    args: &BookmarkArgs,
    options: &OutlineOptions,
) -> Result<BookmarkOutcome> {
    let (_, outcome) = load_toc(pdf_path, &args.toc)?;
    let recovered = match outcome {
        TocOutcome::NotFound => return Ok(BookmarkOutcome::NoToc),
        TocOutcome::NoEntries(_) => return Ok(BookmarkOutcome::NoEntries),
        TocOutcome::Recovered(recovered) => recovered,
    };

    if !recovered.calibration.is_calibrated() {
        if !args.allow_uncalibrated {
            bail!(
                "could not align table of contents page numbers with {}; \
                 pass --allow-uncalibrated to bookmark the printed page numbers",
                pdf_path.display()
            );
        }
        warn!(
            path = %pdf_path.display(),
            "bookmarking printed page numbers; targets may be off"
        );
    }

    info!(path = %pdf_path.display(), "adding bookmarks to document");
    let mut document = Document::load(pdf_path)
        .with_context(|| format!("failed to load {}", pdf_path.display()))?;

    let mut outline = LopdfOutline::new(&document)?;
    let item_count = emit_outline(&recovered.hierarchy, &mut outline, options)?;
    outline
        .write_into(&mut document)
        .with_context(|| format!("failed to build outline for {}", pdf_path.display()))?;

    replace_file(output_path, |temp_path| {
        document
            .save(temp_path)
            .with_context(|| format!("failed to write {}", temp_path.display()))?;
        Ok(())
    })?;

    Ok(BookmarkOutcome::Written { item_count })
}
