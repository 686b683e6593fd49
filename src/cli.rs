//! CLI argument parsing for pdfmerge.
//!
//! Every option can also be set through a `PDFMERGE_*` environment
//! variable, which is how the server is usually configured in containers.

use clap::Parser;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::config::{
    DEFAULT_HOST, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_REQUEST_SIZE, DEFAULT_PORT,
};

/// Merge uploaded PDF files over HTTP.
///
/// Serves `POST /api/merge-pdfs`, which accepts repeated `pdfs` file parts
/// and answers with a single merged PDF.
#[derive(Parser, Debug)]
#[command(name = "pdfmerge")]
#[command(version)]
#[command(about = "Merge uploaded PDF files over HTTP", long_about = None)]
pub struct Cli {
    /// Address to bind
    #[arg(long, env = "PDFMERGE_HOST", default_value_t = DEFAULT_HOST)]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "PDFMERGE_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Directory for per-request staging files
    ///
    /// Created at start-up if it does not exist. Each request stages its
    /// uploads in a private subdirectory that is removed once the response
    /// has been sent.
    #[arg(long, env = "PDFMERGE_UPLOAD_DIR", default_value = "uploads", value_name = "DIR")]
    pub upload_dir: PathBuf,

    /// Largest accepted single PDF, in bytes
    #[arg(long, env = "PDFMERGE_MAX_FILE_SIZE", default_value_t = DEFAULT_MAX_FILE_SIZE, value_name = "BYTES")]
    pub max_file_size: usize,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "PDFMERGE_MAX_REQUEST_SIZE", default_value_t = DEFAULT_MAX_REQUEST_SIZE, value_name = "BYTES")]
    pub max_request_size: usize,

    /// Add one bookmark per uploaded file to the merged document
    #[arg(long, env = "PDFMERGE_BOOKMARKS")]
    pub bookmarks: bool,

    /// Log filter used when RUST_LOG is not set (e.g. "info", "pdfmerge=debug")
    #[arg(long, default_value = "info", value_name = "FILTER")]
    pub log_level: String,
}
