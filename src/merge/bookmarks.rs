//! Bookmark (outline) management for merged documents.

use crate::{MergeError, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

/// One outline entry: a title and the page it jumps to.
#[derive(Debug, Clone, PartialEq)]
pub struct Bookmark {
    pub title: String,
    pub page_id: ObjectId,
}

impl Bookmark {
    pub fn new(title: impl Into<String>, page_id: ObjectId) -> Self {
        Self {
            title: title.into(),
            page_id,
        }
    }
}

/// Manager for PDF bookmarks (outlines).
#[derive(Debug, Default)]
pub struct BookmarkManager;

impl BookmarkManager {
    pub fn new() -> Self {
        Self
    }

    /// Replace the document outline with a flat list of `bookmarks`.
    ///
    /// The catalog's previous `/Outlines` reference, if any, is overwritten.
    /// An empty list leaves the document untouched.
    pub fn replace_outline(&self, doc: &mut Document, bookmarks: &[Bookmark]) -> Result<()> {
        if bookmarks.is_empty() {
            return Ok(());
        }

        let outline_id = doc.new_object_id();

        let item_ids: Vec<ObjectId> = bookmarks.iter().map(|_| doc.new_object_id()).collect();

        for (idx, bookmark) in bookmarks.iter().enumerate() {
            // [page /XYZ null null null] keeps the reader's current zoom.
            let dest = vec![
                Object::Reference(bookmark.page_id),
                Object::Name(b"XYZ".to_vec()),
                Object::Null,
                Object::Null,
                Object::Null,
            ];

            let mut item = Dictionary::new();
            item.set("Title", encode_text_string(&bookmark.title));
            item.set("Parent", Object::Reference(outline_id));
            item.set("Dest", Object::Array(dest));
            if idx > 0 {
                item.set("Prev", Object::Reference(item_ids[idx - 1]));
            }
            if let Some(next) = item_ids.get(idx + 1) {
                item.set("Next", Object::Reference(*next));
            }

            doc.objects.insert(item_ids[idx], Object::Dictionary(item));
        }

        let mut outline = Dictionary::new();
        outline.set("Type", Object::Name(b"Outlines".to_vec()));
        outline.set("Count", Object::Integer(item_ids.len() as i64));
        outline.set("First", Object::Reference(item_ids[0]));
        outline.set("Last", Object::Reference(item_ids[item_ids.len() - 1]));
        doc.objects.insert(outline_id, Object::Dictionary(outline));

        let catalog = doc.catalog_mut().map_err(|e| MergeError::BookmarkFailed {
            reason: format!("Failed to get catalog: {e}"),
        })?;
        catalog.set("Outlines", Object::Reference(outline_id));

        Ok(())
    }

    /// Check if a document has bookmarks.
    pub fn has_bookmarks(&self, doc: &Document) -> bool {
        doc.catalog().is_ok_and(|catalog| catalog.has(b"Outlines"))
    }
}

/// Encode `text` as a PDF text string.
///
/// ASCII stays a literal string; anything else is written as UTF-16BE with a
/// byte order mark, which every reader understands.
fn encode_text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }

    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}
