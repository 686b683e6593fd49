use lopdf::Document;
use std::path::Path;

use crate::{MergeError, Result};

/// Loads PDF documents from disk.
pub struct PdfReader;

impl PdfReader {
    /// Load the document at `path`.
    ///
    /// Fails with [`MergeError::FileNotFound`] when the path does not exist at
    /// call time, and with [`MergeError::FailedToLoadPdf`] when lopdf cannot
    /// parse it.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Document> {
        let path = path.as_ref();
        Self::check_path_exists(path)?;

        let doc = Document::load(path)
            .map_err(|err| MergeError::failed_to_load_pdf(path, err.to_string()))?;
        Ok(doc)
    }

    pub fn check_path_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.try_exists()? || path.is_dir() {
            return Err(MergeError::file_not_found(path));
        }
        Ok(())
    }
}
