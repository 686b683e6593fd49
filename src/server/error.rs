//! HTTP-facing errors for the merge API.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::MergeError;

/// Errors returned by the request handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The `pdfs` field is absent.
    #[error("No PDF files provided")]
    MissingInput,

    /// Fewer than two named files were uploaded.
    #[error("At least 2 PDF files are required")]
    InsufficientFiles,

    /// A single upload exceeds the per-file limit.
    #[error("File '{label}' exceeds the {limit} byte limit")]
    FileTooLarge {
        /// Sanitized client filename.
        label: String,
        /// Configured limit in bytes.
        limit: usize,
    },

    /// The multipart body could not be read.
    #[error("{}", .0.body_text())]
    Upload(#[from] MultipartError),

    /// Staging, merging or writing failed.
    #[error(transparent)]
    Merge(#[from] MergeError),

    /// Anything else, e.g. a panicked blocking task.
    #[error("{0}")]
    Internal(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingInput | Self::InsufficientFiles => StatusCode::BAD_REQUEST,
            Self::FileTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Upload(err) => err.status(),
            Self::Merge(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        Self::Merge(MergeError::Io(err))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Internal(format!("Merge task failed: {err}"))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}
