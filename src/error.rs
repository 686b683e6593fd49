//! Error types for pdfmerge.
//!
//! [`MergeError`] covers everything that can go wrong while loading,
//! concatenating and writing PDF documents. HTTP-facing errors live in
//! [`crate::server::ApiError`] and wrap this type.

use std::io;
use std::path::PathBuf;

/// Result type alias for pdfmerge operations.
pub type Result<T> = std::result::Result<T, MergeError>;

/// Main error type for merge operations.
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    /// An input path did not exist when the merge reached it.
    #[error("PDF file not found: {}", .path.display())]
    FileNotFound {
        /// Path to the file that was not found.
        path: PathBuf,
    },

    /// The destination file was missing after the write step.
    #[error("Failed to create merged PDF at: {}", .path.display())]
    WriteFailure {
        /// Destination path.
        path: PathBuf,
    },

    /// The input could not be parsed as a PDF.
    #[error("Failed to load PDF: {}: {reason}", .path.display())]
    FailedToLoadPdf {
        /// Path to the PDF file.
        path: PathBuf,
        /// Reason reported by the parser.
        reason: String,
    },

    /// No input paths were given.
    #[error("No PDF files to merge")]
    NoFilesToMerge,

    /// The page tree of a document could not be spliced.
    #[error("Merge operation failed: {reason}")]
    MergeFailed {
        /// Description of what went wrong.
        reason: String,
    },

    /// Outline creation failed.
    #[error("Failed to create bookmarks: {reason}")]
    BookmarkFailed {
        /// Details about the failure.
        reason: String,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig {
        /// What is wrong with the configuration.
        message: String,
    },

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Structural error reported by lopdf.
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
}

impl MergeError {
    /// Create a FileNotFound error.
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a WriteFailure error.
    pub fn write_failure(path: impl Into<PathBuf>) -> Self {
        Self::WriteFailure { path: path.into() }
    }

    /// Create a FailedToLoadPdf error.
    pub fn failed_to_load_pdf(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FailedToLoadPdf {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a MergeFailed error.
    pub fn merge_failed(reason: impl Into<String>) -> Self {
        Self::MergeFailed {
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfig error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
