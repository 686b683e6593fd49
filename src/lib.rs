//! pdfmerge - merge uploaded PDF files over HTTP.
//!
//! The crate has two layers:
//!
//! - [`merge`] concatenates PDF documents on disk, preserving submission
//!   order and each document's internal page order.
//! - [`server`] exposes that operation as `POST /api/merge-pdfs`, staging
//!   uploads in a private per-request directory that is removed once the
//!   response has been sent.
//!
//! # Examples
//!
//! ```no_run
//! use pdfmerge::config::Config;
//! use pdfmerge::server;
//!
//! # async fn example() -> std::io::Result<()> {
//! server::serve(Config::default()).await
//! # }
//! ```

#![warn(clippy::all)]

pub mod cli;
pub mod config;
mod error;
pub mod io;
pub mod logging;
pub mod merge;
pub mod server;
pub mod utils;

pub use config::Config;
pub use error::{MergeError, Result};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
