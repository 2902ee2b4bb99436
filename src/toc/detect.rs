use regex::Regex;
use tracing::{debug, info, warn};

use super::error::Result;
use super::split::collapse_whitespace;

/// A line that ends with a page number: a non-digit followed by a trailing digit run.
const TOC_LINE_PATTERN: &str = r"\D\d+\s*$";

/// Plain text of one physical page, already split into lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    pub lines: Vec<String>,
}

impl PageText {
    /// Builds a page from extracted text; whitespace runs are collapsed and blank lines dropped.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text
                .lines()
                .map(collapse_whitespace)
                .filter(|line| !line.is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorConfig {
    /// Fraction of page-number shaped lines a page must strictly exceed.
    pub min_ratio: f64,
    /// The first matching page is ignored when it has fewer lines than this.
    pub min_first_page_lines: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_ratio: 0.75,
            min_first_page_lines: 10,
        }
    }
}

/// Lines of the detected TOC and the zero-based pages they came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TocText {
    pub pages: Vec<usize>,
    pub lines: Vec<String>,
}

impl TocText {
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn first_page(&self) -> Option<usize> {
        self.pages.first().copied()
    }
}

#[derive(Debug, Clone)]
pub struct TocPageDetector {
    config: DetectorConfig,
    line_shape: Regex,
}

impl TocPageDetector {
    pub fn new(config: DetectorConfig) -> Result<Self> {
        Ok(Self {
            config,
            line_shape: Regex::new(TOC_LINE_PATTERN)?,
        })
    }

    pub fn is_toc_page(&self, lines: &[String]) -> bool {
        let matching = lines
            .iter()
            .filter(|line| self.line_shape.is_match(line))
            .count();
        matching as f64 > self.config.min_ratio * lines.len() as f64
    }

    /// Collects the first contiguous run of TOC-shaped pages.
    ///
    /// Scanning stops at the first non-matching page after the run starts, since
    /// indexes, reference lists and equation blocks later in a document can
    /// have the same shape.
    pub fn detect(&self, pages: &[PageText]) -> TocText {
        info!(page_count = pages.len(), "scanning for table of contents");

        let mut toc = TocText::default();
        for (index, page) in pages.iter().enumerate() {
            if !self.is_toc_page(&page.lines) {
                if !toc.is_empty() {
                    break;
                }
                continue;
            }

            if toc.is_empty() && page.lines.len() < self.config.min_first_page_lines {
                debug!(
                    page = index,
                    line_count = page.lines.len(),
                    "skipping short front-matter page"
                );
                continue;
            }

            debug!(page = index, line_count = page.lines.len(), "table of contents page");
            toc.pages.push(index);
            toc.lines.extend(page.lines.iter().cloned());
        }

        match toc.first_page() {
            None => warn!("no table of contents found"),
            Some(first_page) => info!(
                first_page,
                page_count = toc.pages.len(),
                line_count = toc.lines.len(),
                "table of contents found"
            ),
        }

        toc
    }
}
