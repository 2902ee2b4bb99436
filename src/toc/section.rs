use std::fmt;

use serde::Serialize;

use super::error::{Result, TocError};
use super::split::{
    SplitLine, is_integer, letter_ordinal, strip_appendix_prefix, strip_nonnumeric,
};

const MAX_LEVELS: usize = 3;

/// Chapter, section and subsection numbers; missing levels are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct Levels {
    pub chapter: u32,
    pub section: u32,
    pub subsection: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    Chapter,
    Section,
    Subsection,
}

impl Levels {
    pub fn new(chapter: u32, section: u32, subsection: u32) -> Self {
        Self {
            chapter,
            section,
            subsection,
        }
    }

    fn from_components(components: &[u32]) -> Self {
        // Components past the third level are ignored.
        let mut padded = [0_u32; MAX_LEVELS];
        for (slot, value) in padded.iter_mut().zip(components) {
            *slot = *value;
        }
        Self::new(padded[0], padded[1], padded[2])
    }

    pub fn depth(&self) -> Depth {
        if self.subsection != 0 {
            Depth::Subsection
        } else if self.section != 0 {
            Depth::Section
        } else {
            Depth::Chapter
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionNumber {
    Numbered(Levels),
    Appendix { levels: Levels, lettered: bool },
}

impl SectionNumber {
    /// Parses a raw section token such as `5.2.2`, `3.` or `Appendix B.1`.
    pub fn parse(raw: &str) -> Result<Self> {
        match strip_appendix_prefix(raw) {
            Some(label) => parse_appendix(raw, label),
            None => parse_numbered(raw),
        }
    }

    pub fn levels(&self) -> Levels {
        match self {
            Self::Numbered(levels) => *levels,
            Self::Appendix { levels, .. } => *levels,
        }
    }

    pub fn is_appendix(&self) -> bool {
        matches!(self, Self::Appendix { .. })
    }
}

fn parse_numbered(raw: &str) -> Result<SectionNumber> {
    let cleaned = strip_nonnumeric(raw, true, true);
    let components = cleaned
        .split('.')
        .map(|part| parse_component(raw, part))
        .collect::<Result<Vec<u32>>>()?;
    Ok(SectionNumber::Numbered(Levels::from_components(&components)))
}

fn parse_appendix(raw: &str, label: &str) -> Result<SectionNumber> {
    let mut lettered = false;
    let mut components = Vec::new();
    for (index, part) in label.split('.').enumerate() {
        if is_integer(part) {
            components.push(parse_component(raw, part)?);
        } else if let Some(ordinal) = letter_ordinal(part) {
            if index == 0 {
                lettered = true;
            }
            components.push(ordinal);
        } else {
            return Err(TocError::parse(
                raw,
                format!("appendix component '{part}' is neither a number nor a single letter"),
            ));
        }
    }

    Ok(SectionNumber::Appendix {
        levels: Levels::from_components(&components),
        lettered,
    })
}

fn parse_component(raw: &str, part: &str) -> Result<u32> {
    if !is_integer(part) {
        return Err(TocError::parse(
            raw,
            format!("section component '{part}' is not an integer"),
        ));
    }
    part.parse::<u32>()
        .map_err(|error| TocError::parse(raw, error.to_string()))
}

/// Parses a printed page token; a single trailing dot is tolerated.
///
/// Printed pages are bounded by `u32::MAX` so calibrated offsets stay in range.
pub fn parse_page(raw: &str) -> Result<i64> {
    let trimmed = raw.strip_suffix('.').unwrap_or(raw);
    if !is_integer(trimmed) {
        return Err(TocError::parse(raw, "page is not an integer"));
    }
    trimmed
        .parse::<u32>()
        .map(i64::from)
        .map_err(|error| TocError::parse(raw, error.to_string()))
}

/// A resolved TOC line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub title: String,
    pub page: i64,
    pub number: SectionNumber,
}

impl Entry {
    pub fn new(section: &str, title: &str, page: &str) -> Result<Self> {
        Ok(Self {
            title: title.to_string(),
            page: parse_page(page)?,
            number: SectionNumber::parse(section)?,
        })
    }

    pub fn from_split(line: &SplitLine) -> Result<Self> {
        Self::new(&line.section, &line.title, &line.page)
    }

    pub fn levels(&self) -> Levels {
        self.number.levels()
    }

    pub fn is_appendix(&self) -> bool {
        self.number.is_appendix()
    }

    pub fn depth(&self) -> Depth {
        self.levels().depth()
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Levels {
            chapter,
            section,
            subsection,
        } = self.levels();
        let head = match self.number {
            SectionNumber::Numbered(_) => chapter.to_string(),
            SectionNumber::Appendix { lettered, .. } => appendix_label(chapter, lettered),
        };

        match (self.depth(), self.is_appendix()) {
            (Depth::Subsection, _) => write!(f, "{head}.{section}.{subsection}")?,
            (Depth::Section, _) => write!(f, "{head}.{section}")?,
            (Depth::Chapter, false) => write!(f, "Ch. {head}")?,
            (Depth::Chapter, true) => write!(f, "Appendix {head}")?,
        }
        write!(f, " - {} (page {})", self.title, self.page)
    }
}

fn appendix_label(chapter: u32, lettered: bool) -> String {
    match u8::try_from(chapter) {
        Ok(ordinal @ 1..=26) if lettered => char::from(b'A' + ordinal - 1).to_string(),
        _ => chapter.to_string(),
    }
}
