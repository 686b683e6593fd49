use std::io::{BufWriter, Write};
use std::path::Path;

use lopdf::Document;

use crate::{MergeError, Result};

/// Serializes a PDF document to a file.
pub struct PdfWriter;

impl PdfWriter {
    /// Writes `doc` to `path`, overwriting any existing file, and returns the
    /// size of the written file.
    ///
    /// Missing parent directories are created. After the buffered write is
    /// flushed the destination is checked again; if it is not on disk the
    /// call fails with [`MergeError::WriteFailure`].
    pub fn write<P: AsRef<Path>>(doc: &mut Document, path: P) -> Result<u64> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::File::create(path)?;
        let mut writer = BufWriter::new(file);

        doc.save_to(&mut writer)?;

        writer.flush()?;
        drop(writer);

        Self::verify_written(path)
    }

    fn verify_written(path: &Path) -> Result<u64> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.is_file() => Ok(meta.len()),
            _ => Err(MergeError::write_failure(path)),
        }
    }
}
