use anyhow::{Context, Result};
use tracing::info;

use crate::cli::InspectArgs;
use crate::model::{CalibrationSummary, EntryRecord, OutlineCounts, OutlineManifest};
use crate::pdf::pdftotext_version;
use crate::toc::{Calibration, Depth, Entry, RecoveredToc, TocOutcome};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

use super::load_toc;

pub fn run(args: InspectArgs) -> Result<()> {
    let (pages, outcome) = load_toc(&args.pdf, &args.toc)?;

    let mut manifest = OutlineManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_path: args.pdf.display().to_string(),
        source_sha256: sha256_file(&args.pdf)?,
        pdftotext: pdftotext_version(),
        status: "not_found".to_string(),
        page_count: pages.len(),
        toc_pages: Vec::new(),
        calibration: None,
        counts: OutlineCounts::default(),
        entries: Vec::new(),
    };
    match &outcome {
        TocOutcome::NotFound => {}
        TocOutcome::NoEntries(toc) => {
            manifest.status = "no_entries".to_string();
            manifest.toc_pages = toc.pages.clone();
            manifest.counts.toc_line_count = toc.lines.len();
        }
        TocOutcome::Recovered(recovered) => fill_manifest(&mut manifest, recovered),
    }

    match &args.manifest_path {
        Some(path) => {
            write_json_pretty(path, &manifest)?;
            info!(
                path = %path.display(),
                entry_count = manifest.counts.entry_count,
                "wrote outline manifest"
            );
        }
        None => {
            let json = serde_json::to_string_pretty(&manifest)
                .context("failed to serialize outline manifest")?;
            println!("{json}");
        }
    }

    Ok(())
}

fn fill_manifest(manifest: &mut OutlineManifest, recovered: &RecoveredToc) {
    let entries = recovered.calibration.entries();

    manifest.status = if recovered.calibration.is_calibrated() {
        "calibrated".to_string()
    } else {
        "uncalibrated".to_string()
    };
    manifest.toc_pages = recovered.toc.pages.clone();
    manifest.calibration = Some(summarize_calibration(&recovered.calibration));
    manifest.counts = OutlineCounts {
        toc_line_count: recovered.toc.lines.len(),
        entry_count: entries.len(),
        chapter_count: count_numbered(entries, Depth::Chapter),
        section_count: count_numbered(entries, Depth::Section),
        subsection_count: count_numbered(entries, Depth::Subsection),
        appendix_count: entries.iter().filter(|entry| entry.is_appendix()).count(),
        orphan_count: recovered.hierarchy.orphans.len(),
    };
    manifest.entries = entries
        .iter()
        .map(|entry| EntryRecord {
            label: entry.to_string(),
            title: entry.title.clone(),
            page: entry.page,
            depth: entry.depth(),
            number: entry.number,
        })
        .collect();
}

fn summarize_calibration(calibration: &Calibration) -> CalibrationSummary {
    match calibration {
        Calibration::Calibrated {
            page_index, delta, ..
        } => CalibrationSummary {
            status: "calibrated".to_string(),
            page_index: Some(*page_index),
            delta: Some(*delta),
        },
        Calibration::Uncalibrated { .. } => CalibrationSummary {
            status: "uncalibrated".to_string(),
            page_index: None,
            delta: None,
        },
    }
}

fn count_numbered(entries: &[Entry], depth: Depth) -> usize {
    entries
        .iter()
        .filter(|entry| !entry.is_appendix() && entry.depth() == depth)
        .count()
}
