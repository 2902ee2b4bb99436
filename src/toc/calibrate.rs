use tracing::{info, warn};

use super::detect::PageText;
use super::section::Entry;
use super::split::collapse_whitespace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibratorConfig {
    /// Leading lines of each page searched for the first entry's title.
    pub heading_lines: usize,
}

impl Default for CalibratorConfig {
    fn default() -> Self {
        Self { heading_lines: 3 }
    }
}

/// Entries with page numbers mapped to zero-based page indices, or left as printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Calibration {
    Calibrated {
        /// Page on which the first entry's title was found.
        page_index: usize,
        delta: i64,
        entries: Vec<Entry>,
    },
    Uncalibrated {
        entries: Vec<Entry>,
    },
}

impl Calibration {
    pub fn is_calibrated(&self) -> bool {
        matches!(self, Self::Calibrated { .. })
    }

    pub fn entries(&self) -> &[Entry] {
        match self {
            Self::Calibrated { entries, .. } | Self::Uncalibrated { entries } => entries,
        }
    }
}

/// Aligns printed page numbers with page indices.
///
/// Finds the first page at or after `start_page` whose leading lines contain
/// the first entry's title and shifts every entry by `page_index - 1`.
pub fn calibrate(
    pages: &[PageText],
    entries: &[Entry],
    start_page: usize,
    config: &CalibratorConfig,
) -> Calibration {
    let Some(first) = entries.first() else {
        return Calibration::Uncalibrated {
            entries: Vec::new(),
        };
    };

    let title = collapse_whitespace(&first.title);
    if title.is_empty() {
        warn!(entry = %first, "first toc entry has no title; page numbers left as printed");
        return Calibration::Uncalibrated {
            entries: entries.to_vec(),
        };
    }

    let found = pages
        .iter()
        .enumerate()
        .skip(start_page)
        .find(|(_, page)| {
            let heading = page
                .lines
                .iter()
                .take(config.heading_lines)
                .map(String::as_str)
                .collect::<Vec<&str>>()
                .join(" ");
            heading.contains(&title)
        })
        .map(|(index, _)| index);

    let Some(page_index) = found else {
        warn!(
            title = %title,
            start_page,
            "first toc entry not found in document; page numbers left as printed"
        );
        return Calibration::Uncalibrated {
            entries: entries.to_vec(),
        };
    };

    let delta = page_index as i64 - 1;
    info!(page_index, delta, "calibrated toc page numbers");

    Calibration::Calibrated {
        page_index,
        delta,
        entries: entries
            .iter()
            .map(|entry| Entry {
                page: entry.page.saturating_add(delta),
                ..entry.clone()
            })
            .collect(),
    }
}
