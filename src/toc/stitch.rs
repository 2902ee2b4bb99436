use tracing::{debug, warn};

use super::error::Result;
use super::section::Entry;
use super::split::{SplitLine, collapse_whitespace, is_numeric, split_line, strip_nonnumeric};

/// What the stitcher does with one TOC line.
///
/// Chosen from whether an entry is buffered and whether the line's section and
/// page tokens look numeric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Section and page present: emit the line as an entry.
    Complete,
    /// Section present but no page: buffer the line.
    Open,
    /// Neither present: append the line to the buffered title.
    Continue,
    /// Page present: the line closes the buffered entry.
    Terminate,
    /// The buffer held a finished entry; repair and emit it, then emit the line.
    RepairComplete,
    /// The buffer held a finished entry; repair and emit it, then buffer the line.
    RepairOpen,
    /// Not a TOC entry.
    Skip,
}

impl Transition {
    pub fn classify(buffered: bool, section_numeric: bool, page_numeric: bool) -> Self {
        match (buffered, section_numeric, page_numeric) {
            (false, true, true) => Self::Complete,
            (false, true, false) => Self::Open,
            (true, false, false) => Self::Continue,
            (true, false, true) => Self::Terminate,
            (true, true, true) => Self::RepairComplete,
            (true, true, false) => Self::RepairOpen,
            (false, false, _) => Self::Skip,
        }
    }
}

#[derive(Debug, Default)]
pub struct EntryStitcher {
    buffer: Option<SplitLine>,
    entries: Vec<Entry>,
}

impl EntryStitcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_line(&mut self, line: &str) -> Result<Transition> {
        let split = split_line(line);
        let transition = Transition::classify(
            self.buffer.is_some(),
            is_numeric(&split.section),
            is_numeric(&split.page),
        );
        debug!(line, ?transition, "stitching toc line");

        match transition {
            Transition::Complete => self.emit(Entry::from_split(&split)?),
            Transition::Open => self.buffer = Some(split),
            Transition::Continue => {
                if let Some(buffer) = self.buffer.as_mut() {
                    buffer.title = merged_title(buffer, &split);
                    buffer.page = split.page;
                }
            }
            Transition::Terminate => {
                if let Some(buffer) = self.buffer.take() {
                    let title = merged_title(&buffer, &split);
                    self.emit(Entry::new(&buffer.section, &title, &split.page)?);
                }
            }
            Transition::RepairComplete => {
                self.flush_repaired()?;
                self.emit(Entry::from_split(&split)?);
            }
            Transition::RepairOpen => {
                self.flush_repaired()?;
                self.buffer = Some(split);
            }
            Transition::Skip => {}
        }

        Ok(transition)
    }

    /// Returns the finished entries; an unterminated buffer is discarded.
    pub fn finish(self) -> Vec<Entry> {
        if let Some(buffer) = self.buffer {
            warn!(
                text = %buffer.to_text(),
                "discarding unterminated toc entry"
            );
        }
        self.entries
    }

    fn flush_repaired(&mut self) -> Result<()> {
        if let Some(buffer) = self.buffer.take() {
            let repaired = clean_buffer(&buffer);
            debug!(
                buffered = %buffer.to_text(),
                repaired = %repaired.to_text(),
                "repaired buffered toc entry"
            );
            self.emit(Entry::from_split(&repaired)?);
        }
        Ok(())
    }

    fn emit(&mut self, entry: Entry) {
        debug!(entry = %entry, "toc entry");
        self.entries.push(entry);
    }
}

fn merged_title(buffer: &SplitLine, line: &SplitLine) -> String {
    collapse_whitespace(&format!(
        "{} {} {} {}",
        buffer.title, buffer.page, line.section, line.title
    ))
}

/// Cuts trailing non-digits off the buffered text and splits it again.
///
/// Recovers lines where a running header or footer was glued onto the last
/// entry of a page, e.g. `5.2.2 Displacement Measurement Devices 87vi Contents`.
pub fn clean_buffer(buffer: &SplitLine) -> SplitLine {
    split_line(strip_nonnumeric(&buffer.to_text(), false, true))
}

/// Runs the stitcher over every line, in order.
pub fn stitch_entries<I, S>(lines: I) -> Result<Vec<Entry>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut stitcher = EntryStitcher::new();
    for line in lines {
        stitcher.push_line(line.as_ref())?;
    }
    Ok(stitcher.finish())
}
