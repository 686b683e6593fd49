//! PDF merging operations.
//!
//! Documents are concatenated in the order given: every page of input `i`
//! precedes every page of input `i + 1`, and pages keep their internal order.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::merge::merge_pdfs;
//! use std::path::{Path, PathBuf};
//!
//! # fn example() -> pdfmerge::Result<()> {
//! let inputs = vec![PathBuf::from("a.pdf"), PathBuf::from("b.pdf")];
//! let stats = merge_pdfs(&inputs, Path::new("merged.pdf"))?;
//! println!("Created {} page document", stats.total_pages);
//! # Ok(())
//! # }
//! ```

pub mod bookmarks;
pub mod merger;

pub use bookmarks::{Bookmark, BookmarkManager};
pub use merger::{MergeStatistics, PdfMerger, merge_pdfs};
