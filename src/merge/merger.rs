use lopdf::{Document, Object, ObjectId, dictionary};
use std::path::Path;
use std::time::{Duration, Instant};

use crate::io::{PdfReader, PdfWriter};
use crate::merge::bookmarks::{Bookmark, BookmarkManager};
use crate::utils::format_file_size;
use crate::{MergeError, Result};

/// Page attributes a page may inherit from its ancestors in the page tree.
const INHERITABLE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Guards against cyclic `Parent` chains in malformed files.
const MAX_TREE_DEPTH: usize = 64;

/// Statistics about a merge operation.
#[derive(Debug, Clone)]
pub struct MergeStatistics {
    /// Number of input documents merged.
    pub files_merged: usize,

    /// Total number of pages in the merged document.
    pub total_pages: usize,

    /// Size of the written output in bytes.
    pub output_size: u64,

    /// Time taken to load, merge and write.
    pub merge_time: Duration,
}

impl MergeStatistics {
    pub fn format_output_size(&self) -> String {
        format_file_size(self.output_size)
    }
}

/// Concatenates PDF documents in order.
#[derive(Debug, Clone, Default)]
pub struct PdfMerger {
    /// Outline titles, one per input. `None` keeps the default outline handling.
    bookmark_titles: Option<Vec<String>>,
}

impl PdfMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give the merged document a fresh outline with one entry per input.
    ///
    /// `titles[i]` labels input `i`; inputs without a title fall back to
    /// their file name.
    pub fn with_bookmarks(mut self, titles: Vec<String>) -> Self {
        self.bookmark_titles = Some(titles);
        self
    }

    /// Merges `paths` in order and writes the result to `output`.
    ///
    /// Each input is checked for existence when the merge reaches it. Any
    /// existing file at `output` is overwritten, and the write is verified
    /// afterwards.
    ///
    /// # Errors
    ///
    /// - [`MergeError::NoFilesToMerge`] if `paths` is empty.
    /// - [`MergeError::FileNotFound`] if an input is missing.
    /// - [`MergeError::FailedToLoadPdf`] if an input is not a readable PDF.
    /// - [`MergeError::WriteFailure`] if `output` is absent after writing.
    pub fn merge<P: AsRef<Path>>(&self, paths: &[P], output: &Path) -> Result<MergeStatistics> {
        let start = Instant::now();

        let mut merged = self.merge_documents(paths)?;
        let total_pages = merged.get_pages().len();

        let output_size = PdfWriter::write(&mut merged, output)?;

        let statistics = MergeStatistics {
            files_merged: paths.len(),
            total_pages,
            output_size,
            merge_time: start.elapsed(),
        };

        tracing::debug!(
            files = statistics.files_merged,
            pages = statistics.total_pages,
            size = %statistics.format_output_size(),
            output = %output.display(),
            "Merged document written"
        );

        Ok(statistics)
    }

    /// Builds the merged document in memory without writing it.
    pub fn merge_documents<P: AsRef<Path>>(&self, paths: &[P]) -> Result<Document> {
        let (first, rest) = paths.split_first().ok_or(MergeError::NoFilesToMerge)?;

        let mut merged = PdfReader::read(first)?;

        let mut bookmarks = Vec::with_capacity(paths.len());
        self.push_bookmark(&mut bookmarks, 0, first.as_ref(), &merged);

        tracing::trace!(
            path = %first.as_ref().display(),
            pages = merged.get_pages().len(),
            "Base document loaded"
        );

        let import_outlines = self.bookmark_titles.is_none();

        for (idx, path) in rest.iter().enumerate() {
            let path = path.as_ref();
            let mut doc = PdfReader::read(path)?;

            // Avoid object id collisions by renumbering the incoming document
            doc.renumber_objects_with(merged.max_id + 1);
            merged.max_id = doc.max_id;

            self.push_bookmark(&mut bookmarks, idx + 1, path, &doc);

            let page_count = Self::append_document(&mut merged, doc, import_outlines)?;
            tracing::trace!(path = %path.display(), pages = page_count, "Document appended");
        }

        if self.bookmark_titles.is_some() {
            BookmarkManager::new().replace_outline(&mut merged, &bookmarks)?;
        }

        // Drops the catalogs and page tree nodes of appended documents.
        merged.prune_objects();
        merged.renumber_objects();

        Ok(merged)
    }

    fn push_bookmark(&self, bookmarks: &mut Vec<Bookmark>, idx: usize, path: &Path, doc: &Document) {
        let Some(titles) = &self.bookmark_titles else {
            return;
        };
        let Some(first_page) = doc.get_pages().values().next().copied() else {
            return;
        };

        let title = titles.get(idx).cloned().unwrap_or_else(|| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| crate::utils::FALLBACK_LABEL.to_string())
        });
        bookmarks.push(Bookmark::new(title, first_page));
    }

    /// Moves every page of `doc` to the end of `merged`'s page tree.
    ///
    /// Pages are re-parented onto the root `Pages` node of `merged`, so
    /// attributes they used to inherit from their own tree are copied onto
    /// the page first. With `import_outline`, the top-level entries of
    /// `doc`'s outline are linked onto the end of `merged`'s outline.
    /// Returns the number of pages appended.
    fn append_document(merged: &mut Document, mut doc: Document, import_outline: bool) -> Result<usize> {
        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();

        let target_pages_id = Self::root_pages_id(merged)?;
        let target_inherits: Vec<&[u8]> = {
            let root = merged.get_dictionary(target_pages_id)?;
            INHERITABLE_KEYS
                .iter()
                .copied()
                .filter(|key| root.has(key))
                .collect()
        };

        for &page_id in &page_ids {
            let mut resolved: Vec<(&[u8], Object)> = Vec::new();
            let page = doc.get_dictionary(page_id)?;

            for key in INHERITABLE_KEYS {
                if page.has(key) {
                    continue;
                }
                if let Some(value) = Self::inherited_attribute(&doc, page_id, key) {
                    resolved.push((key, value));
                } else if target_inherits.contains(&key) {
                    // The new parent would leak its own value onto this page.
                    if key == b"Rotate" {
                        resolved.push((key, Object::Integer(0)));
                    } else if key == b"CropBox"
                        && let Some(media_box) = resolved
                            .iter()
                            .find(|(k, _)| *k == b"MediaBox")
                            .map(|(_, v)| v.clone())
                            .or_else(|| page.get(b"MediaBox").ok().cloned())
                    {
                        resolved.push((key, media_box));
                    }
                }
            }

            let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
            for (key, value) in resolved {
                page.set(key, value);
            }
            page.set("Parent", Object::Reference(target_pages_id));
        }

        let source_outline = if import_outline {
            Self::outline_root(&doc)
        } else {
            None
        };

        // The incoming catalog must not survive as a second /Catalog.
        if let Ok(source_root) = doc.trailer.get(b"Root").and_then(Object::as_reference) {
            doc.objects.remove(&source_root);
        }

        merged.objects.extend(doc.objects);
        Self::append_pages_to_page_tree(merged, target_pages_id, &page_ids)?;

        if let Some(source_root) = source_outline {
            Self::import_outline(merged, source_root)?;
        }

        Ok(page_ids.len())
    }

    fn outline_root(doc: &Document) -> Option<ObjectId> {
        doc.catalog()
            .ok()?
            .get(b"Outlines")
            .and_then(Object::as_reference)
            .ok()
    }

    /// Moves the top-level items under `source_root` to the end of the
    /// outline of `merged`, creating the outline root if it has none.
    ///
    /// Both outlines must already live in `merged.objects`. Nested entries
    /// keep their own parents, so only the top-level chain is re-linked.
    fn import_outline(merged: &mut Document, source_root: ObjectId) -> Result<()> {
        let (first, last, source_count) = {
            let Ok(root) = merged.get_dictionary(source_root) else {
                return Ok(());
            };
            let first = root.get(b"First").and_then(Object::as_reference);
            let last = root.get(b"Last").and_then(Object::as_reference);
            let (Ok(first), Ok(last)) = (first, last) else {
                return Ok(());
            };
            (first, last, root.get(b"Count").and_then(Object::as_i64).ok())
        };

        let target_root = match Self::outline_root(merged) {
            Some(id) if merged.get_dictionary(id).is_ok() => id,
            _ => {
                let id = merged.add_object(dictionary! { "Type" => "Outlines" });
                merged.catalog_mut()?.set("Outlines", Object::Reference(id));
                id
            }
        };

        let limit = merged.objects.len();
        let mut top_level: i64 = 0;
        let mut current = Some(first);
        while let Some(item_id) = current {
            if top_level as usize >= limit {
                return Err(MergeError::merge_failed("Cyclic outline item chain"));
            }
            let item = merged.get_object_mut(item_id).and_then(Object::as_dict_mut)?;
            item.set("Parent", Object::Reference(target_root));
            top_level += 1;

            current = if item_id == last {
                None
            } else {
                item.get(b"Next").and_then(Object::as_reference).ok()
            };
        }

        let previous_last = merged
            .get_dictionary(target_root)?
            .get(b"Last")
            .and_then(Object::as_reference)
            .ok();

        if let Some(previous_last) = previous_last {
            merged
                .get_object_mut(previous_last)
                .and_then(Object::as_dict_mut)?
                .set("Next", Object::Reference(first));
            merged
                .get_object_mut(first)
                .and_then(Object::as_dict_mut)?
                .set("Prev", Object::Reference(previous_last));
        }

        let root = merged.get_object_mut(target_root).and_then(Object::as_dict_mut)?;
        if previous_last.is_none() {
            root.set("First", Object::Reference(first));
        }
        root.set("Last", Object::Reference(last));

        let existing = root.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
        let added = source_count.map_or(top_level, i64::abs);
        root.set("Count", Object::Integer(existing.abs() + added));

        Ok(())
    }

    /// Appends the given page references to the root Pages dictionary.
    fn append_pages_to_page_tree(
        merged: &mut Document,
        pages_id: ObjectId,
        page_ids: &[ObjectId],
    ) -> Result<()> {
        let pages_dict = merged
            .get_object_mut(pages_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| MergeError::merge_failed(format!("Failed to get pages object: {e}")))?;

        let kids = pages_dict
            .get_mut(b"Kids")
            .and_then(Object::as_array_mut)
            .map_err(|_| MergeError::merge_failed("Pages dictionary missing Kids array"))?;

        kids.extend(page_ids.iter().map(|id| Object::Reference(*id)));

        let current_count = pages_dict
            .get(b"Count")
            .and_then(Object::as_i64)
            .unwrap_or(0);
        pages_dict.set("Count", Object::Integer(current_count + page_ids.len() as i64));

        Ok(())
    }

    fn root_pages_id(doc: &Document) -> Result<ObjectId> {
        let catalog = doc
            .catalog()
            .map_err(|e| MergeError::merge_failed(format!("Failed to get catalog: {e}")))?;

        catalog
            .get(b"Pages")
            .and_then(Object::as_reference)
            .map_err(|e| MergeError::merge_failed(format!("Failed to get pages reference: {e}")))
    }

    /// Looks `key` up on the ancestors of `page_id`.
    fn inherited_attribute(doc: &Document, page_id: ObjectId, key: &[u8]) -> Option<Object> {
        let mut node = doc.get_dictionary(page_id).ok()?;

        for _ in 0..MAX_TREE_DEPTH {
            let parent_id = node.get(b"Parent").and_then(Object::as_reference).ok()?;
            node = doc.get_dictionary(parent_id).ok()?;
            if let Ok(value) = node.get(key) {
                return Some(value.clone());
            }
        }

        None
    }
}

/// Merges `paths` in order into `output` with default settings.
///
/// This is the merge primitive used by the HTTP handler: it accepts one or
/// more inputs and leaves the "at least two" rule to the caller.
pub fn merge_pdfs<P: AsRef<Path>>(paths: &[P], output: &Path) -> Result<MergeStatistics> {
    PdfMerger::new().merge(paths, output)
}
