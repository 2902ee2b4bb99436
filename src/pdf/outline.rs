use anyhow::{Context, Result, bail, ensure};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat, dictionary};
use tracing::{debug, warn};

use crate::toc::OutlineSink;

#[derive(Debug, Clone)]
struct OutlineItem {
    title: String,
    page_id: ObjectId,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Collects outline items for a loaded document and writes them as `/Outlines`.
#[derive(Debug)]
pub struct LopdfOutline {
    page_ids: Vec<ObjectId>,
    items: Vec<OutlineItem>,
}

impl LopdfOutline {
    pub fn new(document: &Document) -> Result<Self> {
        let page_ids = document.get_pages().into_values().collect::<Vec<ObjectId>>();
        if page_ids.is_empty() {
            bail!("document has no pages to bookmark");
        }
        Ok(Self {
            page_ids,
            items: Vec::new(),
        })
    }

    /// Replaces the document outline with the collected items.
    ///
    /// Returns the id of the new `/Outlines` dictionary, or `None` when no
    /// items were added and the document was left untouched.
    pub fn write_into(self, document: &mut Document) -> Result<Option<ObjectId>> {
        if self.items.is_empty() {
            return Ok(None);
        }

        let root_id = document.new_object_id();
        let ids = self
            .items
            .iter()
            .map(|_| document.new_object_id())
            .collect::<Vec<ObjectId>>();
        let top_level = (0..self.items.len())
            .filter(|index| self.items[*index].parent.is_none())
            .collect::<Vec<usize>>();

        for (index, item) in self.items.iter().enumerate() {
            let (parent_id, siblings) = match item.parent {
                Some(parent) => (ids[parent], &self.items[parent].children),
                None => (root_id, &top_level),
            };

            let mut dict = dictionary! {
                "Title" => text_string(&item.title),
                "Parent" => Object::Reference(parent_id),
                "Dest" => vec![Object::Reference(item.page_id), "Fit".into()],
            };
            link_siblings(&mut dict, &ids, siblings, index);

            if let (Some(first), Some(last)) = (item.children.first(), item.children.last()) {
                dict.set("First", Object::Reference(ids[*first]));
                dict.set("Last", Object::Reference(ids[*last]));
                dict.set("Count", -(item.children.len() as i64));
            }

            document.objects.insert(ids[index], Object::Dictionary(dict));
        }

        let (Some(first), Some(last)) = (top_level.first(), top_level.last()) else {
            bail!("outline has no top-level items");
        };
        document.objects.insert(
            root_id,
            Object::Dictionary(dictionary! {
                "Type" => "Outlines",
                "First" => Object::Reference(ids[*first]),
                "Last" => Object::Reference(ids[*last]),
                "Count" => top_level.len() as i64,
            }),
        );

        let catalog_id = document
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)
            .context("document trailer has no catalog reference")?;
        match document.get_object_mut(catalog_id) {
            Ok(Object::Dictionary(catalog)) => {
                catalog.set("Outlines", Object::Reference(root_id));
                catalog.set("PageMode", "UseOutlines");
            }
            _ => bail!("document catalog is not a dictionary"),
        }

        let pruned = document.prune_objects();
        debug!(
            item_count = ids.len(),
            pruned_objects = pruned.len(),
            "wrote document outline"
        );

        Ok(Some(root_id))
    }
}

impl OutlineSink for LopdfOutline {
    type Handle = usize;
    type Error = anyhow::Error;

    fn add_item(
        &mut self,
        label: &str,
        page_index: usize,
        parent: Option<usize>,
    ) -> Result<usize> {
        let last_page = self.page_ids.len() - 1;
        if page_index > last_page {
            warn!(
                label,
                page_index,
                page_count = self.page_ids.len(),
                "outline target past the last page; using the last page"
            );
        }
        let page_id = self.page_ids[page_index.min(last_page)];

        let index = self.items.len();
        if let Some(parent) = parent {
            ensure!(
                parent < index,
                "outline parent handle {parent} does not exist"
            );
            self.items[parent].children.push(index);
        }

        self.items.push(OutlineItem {
            title: label.to_string(),
            page_id,
            parent,
            children: Vec::new(),
        });
        Ok(index)
    }
}

fn link_siblings(dict: &mut Dictionary, ids: &[ObjectId], siblings: &[usize], index: usize) {
    let Some(position) = siblings.iter().position(|sibling| *sibling == index) else {
        return;
    };
    if position > 0 {
        dict.set("Prev", Object::Reference(ids[siblings[position - 1]]));
    }
    if let Some(next) = siblings.get(position + 1) {
        dict.set("Next", Object::Reference(ids[*next]));
    }
}

/// Encodes a PDF text string; non-ASCII titles use UTF-16BE with a byte order mark.
pub fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
