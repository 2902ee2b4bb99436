use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::toc::PageText;

/// Extracts per-page text with `pdftotext -layout`.
///
/// Layout mode keeps a TOC title and its page number on the same line.
pub fn extract_pages(pdf_path: &Path, max_pages: Option<usize>) -> Result<Vec<PageText>> {
    let mut command = Command::new("pdftotext");
    command
        .arg("-layout")
        .arg("-enc")
        .arg("UTF-8")
        .arg("-f")
        .arg("1");
    if let Some(max_pages) = max_pages {
        command.arg("-l").arg(max_pages.to_string());
    }
    command.arg(pdf_path).arg("-");

    let output = command
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    let pages = split_pages(&String::from_utf8_lossy(&output.stdout));
    debug!(path = %pdf_path.display(), page_count = pages.len(), "extracted page text");
    Ok(pages)
}

/// Splits pdftotext output on form feeds, dropping empty trailing pages.
pub fn split_pages(raw: &str) -> Vec<PageText> {
    let mut pages = raw
        .split('\u{000C}')
        .map(|chunk| PageText::from_text(&chunk.replace('\u{0000}', "")))
        .collect::<Vec<PageText>>();

    while pages.last().is_some_and(|page| page.lines.is_empty()) {
        pages.pop();
    }

    pages
}

/// First line of `pdftotext -v`, if the tool is installed.
pub fn pdftotext_version() -> Option<String> {
    let output = Command::new("pdftotext").arg("-v").output().ok()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let source = if stdout.trim().is_empty() {
        stderr.trim()
    } else {
        stdout.trim()
    };

    source
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
}
