//! Per-request staging directories.
//!
//! Every request gets its own randomly named directory under the upload
//! directory. Uploads are staged as `000.pdf`, `001.pdf`, ... so client
//! filenames never reach the filesystem, and the merged output lands next to
//! them as `merged.pdf`.
//!
//! Creating and filling a staging area does blocking I/O and is meant to run
//! on the blocking pool. On the success path the directory is removed with
//! [`StagingArea::release`]; dropping an unreleased area removes it inline.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::Result;

/// File name of the merged output inside a staging directory.
pub const OUTPUT_FILE_NAME: &str = "merged.pdf";

const DIR_PREFIX: &str = "merge-";

/// A private scratch directory owned by one request.
#[derive(Debug)]
pub struct StagingArea {
    path: PathBuf,
    dir: Option<TempDir>,
}

impl StagingArea {
    /// Create a fresh, uniquely named directory under `upload_dir`.
    pub fn create(upload_dir: &Path) -> Result<Self> {
        fs::create_dir_all(upload_dir)?;
        let dir = tempfile::Builder::new()
            .prefix(DIR_PREFIX)
            .tempdir_in(upload_dir)?;
        let path = dir.path().to_path_buf();

        tracing::trace!(dir = %path.display(), "Staging area created");

        Ok(Self {
            path,
            dir: Some(dir),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the upload at `index` and return its staged path.
    pub fn stage(&self, index: usize, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path.join(format!("{index:03}.pdf"));
        fs::write(&path, bytes)?;
        Ok(path)
    }

    pub fn output_path(&self) -> PathBuf {
        self.path.join(OUTPUT_FILE_NAME)
    }

    /// Remove the directory on the blocking pool.
    pub async fn release(mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        let path = self.path.clone();

        match tokio::task::spawn_blocking(move || dir.close()).await {
            Ok(result) => log_removal(&path, result),
            Err(err) => tracing::warn!(
                dir = %path.display(),
                error = %err,
                "Staging cleanup task failed"
            ),
        }
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            log_removal(&self.path, dir.close());
        }
    }
}

fn log_removal(path: &Path, result: io::Result<()>) {
    match result {
        Ok(()) => tracing::trace!(dir = %path.display(), "Staging area removed"),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => tracing::warn!(
            dir = %path.display(),
            error = %err,
            "Failed to remove staging area"
        ),
    }
}
