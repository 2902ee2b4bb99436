use serde::Serialize;

use crate::toc::{Depth, SectionNumber};

#[derive(Debug, Clone, Serialize)]
pub struct OutlineManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_path: String,
    pub source_sha256: String,
    pub pdftotext: Option<String>,
    pub status: String,
    pub page_count: usize,
    pub toc_pages: Vec<usize>,
    pub calibration: Option<CalibrationSummary>,
    pub counts: OutlineCounts,
    pub entries: Vec<EntryRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalibrationSummary {
    pub status: String,
    pub page_index: Option<usize>,
    pub delta: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct OutlineCounts {
    pub toc_line_count: usize,
    pub entry_count: usize,
    pub chapter_count: usize,
    pub section_count: usize,
    pub subsection_count: usize,
    pub appendix_count: usize,
    pub orphan_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryRecord {
    pub label: String,
    pub title: String,
    pub page: i64,
    pub depth: Depth,
    pub number: SectionNumber,
}
