//! Table-of-contents recovery from extracted page text.
//!
//! Pages are scanned for the TOC, its lines are stitched into entries, printed
//! page numbers are calibrated against the page stream and the entries are
//! grouped into a chapter/section/subsection hierarchy.

use tracing::{debug, info, warn};

mod calibrate;
mod detect;
mod error;
mod hierarchy;
mod section;
mod split;
mod stitch;
#[cfg(test)]
mod tests;

pub use calibrate::{Calibration, CalibratorConfig, calibrate};
pub use detect::{DetectorConfig, PageText, TocPageDetector, TocText};
pub use error::Result;
pub use hierarchy::{Hierarchy, OutlineOptions, OutlineSink, emit_outline};
pub use section::{Depth, Entry, SectionNumber};
pub use stitch::stitch_entries;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TocConfig {
    pub detector: DetectorConfig,
    pub calibrator: CalibratorConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveredToc {
    pub toc: TocText,
    pub calibration: Calibration,
    pub hierarchy: Hierarchy,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TocOutcome {
    NotFound,
    /// TOC pages were found but none of their lines formed an entry.
    NoEntries(TocText),
    Recovered(RecoveredToc),
}

/// Runs detection, stitching, calibration and grouping over a document's pages.
///
/// A document without a detectable TOC yields `TocOutcome::NotFound`, and one
/// whose TOC lines produce no entries yields `TocOutcome::NoEntries`. An entry
/// whose section or page cannot be parsed aborts the whole document.
pub fn recover_toc(pages: &[PageText], config: &TocConfig) -> Result<TocOutcome> {
    let detector = TocPageDetector::new(config.detector)?;
    let toc = detector.detect(pages);
    if toc.is_empty() {
        return Ok(TocOutcome::NotFound);
    }

    for line in &toc.lines {
        debug!(line = %line, "toc line");
    }

    info!(line_count = toc.lines.len(), "parsing table of contents");
    let entries = stitch_entries(&toc.lines)?;
    info!(entry_count = entries.len(), "parsed table of contents");
    if entries.is_empty() {
        warn!(
            toc_pages = ?toc.pages,
            "table of contents lines did not form any entries"
        );
        return Ok(TocOutcome::NoEntries(toc));
    }

    let start_page = toc.pages.last().map_or(0, |last| last + 1);
    let calibration = calibrate(pages, &entries, start_page, &config.calibrator);
    let hierarchy = Hierarchy::build(calibration.entries());

    Ok(TocOutcome::Recovered(RecoveredToc {
        toc,
        calibration,
        hierarchy,
    }))
}
