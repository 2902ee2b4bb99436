use tracing::{debug, warn};

use super::section::{Depth, Entry};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionNode {
    pub entry: Entry,
    pub subsections: Vec<Entry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterNode {
    pub entry: Entry,
    pub sections: Vec<SectionNode>,
}

/// Chapter, section and subsection nesting over a flat entry list.
///
/// Numbered and appendix entries form separate trees. Entries whose parent is
/// missing land in `orphans`; every input entry appears exactly once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hierarchy {
    pub chapters: Vec<ChapterNode>,
    pub appendices: Vec<ChapterNode>,
    pub orphans: Vec<Entry>,
}

impl Hierarchy {
    pub fn build(entries: &[Entry]) -> Self {
        let (appendix, numbered): (Vec<(usize, &Entry)>, Vec<(usize, &Entry)>) =
            entries.iter().enumerate().partition(|(_, entry)| entry.is_appendix());

        let mut orphans = Vec::new();
        let chapters = build_tree(&numbered, &mut orphans);
        let appendices = build_tree(&appendix, &mut orphans);
        orphans.sort_by_key(|(index, _)| *index);

        if !orphans.is_empty() {
            warn!(
                orphan_count = orphans.len(),
                "toc entries without a parent will be placed at the top level"
            );
        }

        Self {
            chapters,
            appendices,
            orphans: orphans.into_iter().map(|(_, entry)| entry).collect(),
        }
    }

    pub fn entry_count(&self) -> usize {
        tree_count(&self.chapters) + tree_count(&self.appendices) + self.orphans.len()
    }
}

fn tree_count(chapters: &[ChapterNode]) -> usize {
    chapters
        .iter()
        .map(|chapter| {
            1 + chapter
                .sections
                .iter()
                .map(|section| 1 + section.subsections.len())
                .sum::<usize>()
        })
        .sum()
}

fn build_tree(
    entries: &[(usize, &Entry)],
    orphans: &mut Vec<(usize, Entry)>,
) -> Vec<ChapterNode> {
    let mut chapters = at_depth(entries, Depth::Chapter)
        .map(|(_, entry)| ChapterNode {
            entry: (*entry).clone(),
            sections: Vec::new(),
        })
        .collect::<Vec<ChapterNode>>();

    for (index, entry) in at_depth(entries, Depth::Section) {
        let levels = entry.levels();
        match chapters
            .iter_mut()
            .find(|chapter| chapter.entry.levels().chapter == levels.chapter)
        {
            Some(chapter) => chapter.sections.push(SectionNode {
                entry: (*entry).clone(),
                subsections: Vec::new(),
            }),
            None => orphans.push((*index, (*entry).clone())),
        }
    }

    for (index, entry) in at_depth(entries, Depth::Subsection) {
        let levels = entry.levels();
        let parent = chapters
            .iter_mut()
            .find(|chapter| chapter.entry.levels().chapter == levels.chapter)
            .and_then(|chapter| {
                chapter
                    .sections
                    .iter_mut()
                    .find(|section| section.entry.levels().section == levels.section)
            });
        match parent {
            Some(section) => section.subsections.push((*entry).clone()),
            None => orphans.push((*index, (*entry).clone())),
        }
    }

    chapters
}

fn at_depth<'a>(
    entries: &'a [(usize, &'a Entry)],
    depth: Depth,
) -> impl Iterator<Item = &'a (usize, &'a Entry)> {
    entries
        .iter()
        .filter(move |(_, entry)| entry.depth() == depth)
}

/// Receives outline items in display order.
pub trait OutlineSink {
    type Handle: Copy;
    type Error;

    fn add_item(
        &mut self,
        label: &str,
        page_index: usize,
        parent: Option<Self::Handle>,
    ) -> Result<Self::Handle, Self::Error>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineOptions {
    pub appendix_group_label: String,
}

impl Default for OutlineOptions {
    fn default() -> Self {
        Self {
            appendix_group_label: "Appendices".to_string(),
        }
    }
}

/// Sends the hierarchy to `sink`: chapters, then orphans, then the appendix group.
///
/// Returns the number of items added.
pub fn emit_outline<S: OutlineSink>(
    hierarchy: &Hierarchy,
    sink: &mut S,
    options: &OutlineOptions,
) -> Result<usize, S::Error> {
    let mut added = emit_tree(&hierarchy.chapters, sink, None)?;

    for entry in &hierarchy.orphans {
        add_entry(sink, entry, None)?;
        added += 1;
    }

    if let Some(first) = hierarchy.appendices.first() {
        let group = sink.add_item(
            &options.appendix_group_label,
            target_page(&first.entry),
            None,
        )?;
        added += 1 + emit_tree(&hierarchy.appendices, sink, Some(group))?;
    }

    Ok(added)
}

fn emit_tree<S: OutlineSink>(
    chapters: &[ChapterNode],
    sink: &mut S,
    parent: Option<S::Handle>,
) -> Result<usize, S::Error> {
    let mut added = 0;
    for chapter in chapters {
        let chapter_mark = add_entry(sink, &chapter.entry, parent)?;
        added += 1;
        for section in &chapter.sections {
            let section_mark = add_entry(sink, &section.entry, Some(chapter_mark))?;
            added += 1;
            for subsection in &section.subsections {
                add_entry(sink, subsection, Some(section_mark))?;
                added += 1;
            }
        }
    }
    Ok(added)
}

fn add_entry<S: OutlineSink>(
    sink: &mut S,
    entry: &Entry,
    parent: Option<S::Handle>,
) -> Result<S::Handle, S::Error> {
    debug!(entry = %entry, "adding outline item");
    sink.add_item(&entry.to_string(), target_page(entry), parent)
}

fn target_page(entry: &Entry) -> usize {
    usize::try_from(entry.page).unwrap_or_else(|_| {
        warn!(entry = %entry, "outline target before the first page; using the first page");
        0
    })
}
