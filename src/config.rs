//! Server configuration.
//!
//! [`Config`] is the validated, normalized form of the command line. It
//! carries the bind address, the upload directory and the upload limits
//! that drive the HTTP layer.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::cli::Cli;
use crate::{MergeError, Result};

/// Default bind host.
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// Default bind port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default per-file upload limit (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Default limit for a whole request body (100 MiB).
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 100 * 1024 * 1024;

/// Runtime configuration for the merge server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address to bind.
    pub host: IpAddr,

    /// Port to bind.
    pub port: u16,

    /// Directory holding per-request staging directories.
    pub upload_dir: PathBuf,

    /// Largest accepted single PDF, in bytes.
    pub max_file_size: usize,

    /// Largest accepted request body, in bytes.
    pub max_request_size: usize,

    /// Add one outline entry per uploaded file to the merged document.
    pub bookmarks: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST,
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from("uploads"),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_request_size: DEFAULT_MAX_REQUEST_SIZE,
            bookmarks: false,
        }
    }
}

impl Config {
    /// Socket address the server binds to.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::InvalidConfig`] if:
    /// - either size limit is zero
    /// - the per-file limit exceeds the request limit
    /// - the upload directory path is empty
    pub fn validate(&self) -> Result<()> {
        if self.max_file_size == 0 {
            return Err(MergeError::invalid_config(
                "max file size must be at least 1 byte",
            ));
        }

        if self.max_request_size == 0 {
            return Err(MergeError::invalid_config(
                "max request size must be at least 1 byte",
            ));
        }

        if self.max_file_size > self.max_request_size {
            return Err(MergeError::invalid_config(format!(
                "max file size ({}) cannot exceed max request size ({})",
                self.max_file_size, self.max_request_size
            )));
        }

        if self.upload_dir.as_os_str().is_empty() {
            return Err(MergeError::invalid_config("upload directory cannot be empty"));
        }

        Ok(())
    }
}

impl TryFrom<&Cli> for Config {
    type Error = MergeError;

    fn try_from(cli: &Cli) -> Result<Self> {
        let config = Self {
            host: cli.host,
            port: cli.port,
            upload_dir: cli.upload_dir.clone(),
            max_file_size: cli.max_file_size,
            max_request_size: cli.max_request_size,
            bookmarks: cli.bookmarks,
        };
        config.validate()?;
        Ok(config)
    }
}
