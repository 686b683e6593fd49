//! Request handlers for the `/api` routes.

use std::path::PathBuf;

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Multipart, State, multipart::MultipartRejection},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tokio::io::AsyncReadExt;

use crate::MergeError;
use crate::merge::{MergeStatistics, PdfMerger};
use crate::server::error::ApiError;
use crate::server::staging::{OUTPUT_FILE_NAME, StagingArea};
use crate::server::state::AppState;
use crate::utils::{format_file_size, sanitize_label};

/// Multipart field carrying the uploaded documents.
pub const UPLOAD_FIELD: &str = "pdfs";

/// Read size for the streamed response body.
const RESPONSE_CHUNK_SIZE: usize = 64 * 1024;

/// One uploaded file: its display label and raw content.
#[derive(Debug)]
struct Upload {
    label: String,
    bytes: Bytes,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /api/health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
    })
}

/// `POST /api/merge-pdfs`
///
/// Stages every `pdfs` part in a private directory, merges them in
/// submission order and streams the result back. The staging directory
/// lives exactly as long as the response body.
pub async fn merge_pdfs(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let Ok(multipart) = multipart else {
        return Err(ApiError::MissingInput);
    };

    let uploads = collect_uploads(multipart, state.config.max_file_size).await?;
    let config = &state.config;

    let labels: Vec<String> = uploads.iter().map(|upload| upload.label.clone()).collect();
    let merger = if config.bookmarks {
        PdfMerger::new().with_bookmarks(labels.clone())
    } else {
        PdfMerger::new()
    };

    let (staging, stats) = run_merge(merger, config.upload_dir.clone(), uploads).await?;
    let output = staging.output_path();

    tracing::info!(
        files = stats.files_merged,
        pages = stats.total_pages,
        size = %stats.format_output_size(),
        elapsed_ms = stats.merge_time.as_millis() as u64,
        inputs = ?labels,
        "Merged PDFs"
    );

    let file = tokio::fs::File::open(&output).await?;
    let length = file.metadata().await?.len();

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{OUTPUT_FILE_NAME}\""),
            ),
            (header::CONTENT_LENGTH, length.to_string()),
        ],
        stream_body(file, staging),
    )
        .into_response())
}

/// Pull the `pdfs` parts out of the form, enforcing the per-file limit.
///
/// Parts without a filename are skipped. Fails with `MissingInput` when no
/// `pdfs` part exists and `InsufficientFiles` when fewer than two files do.
async fn collect_uploads(mut multipart: Multipart, max_file_size: usize) -> Result<Vec<Upload>, ApiError> {
    let mut field_present = false;
    let mut uploads = Vec::new();

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        field_present = true;

        let Some(file_name) = field.file_name().filter(|name| !name.is_empty()) else {
            continue;
        };
        let label = sanitize_label(file_name);

        let mut content = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            if content.len() + chunk.len() > max_file_size {
                return Err(ApiError::FileTooLarge {
                    label,
                    limit: max_file_size,
                });
            }
            content.extend_from_slice(&chunk);
        }

        tracing::debug!(
            index = uploads.len(),
            file = %label,
            size = %format_file_size(content.len() as u64),
            "Received upload"
        );

        uploads.push(Upload {
            label,
            bytes: Bytes::from(content),
        });
    }

    if !field_present {
        return Err(ApiError::MissingInput);
    }

    if uploads.len() < 2 {
        return Err(ApiError::InsufficientFiles);
    }

    Ok(uploads)
}

/// Stage `uploads` and merge them on the blocking pool.
///
/// On failure the staging area is dropped, and removed, before this returns.
async fn run_merge(
    merger: PdfMerger,
    upload_dir: PathBuf,
    uploads: Vec<Upload>,
) -> Result<(StagingArea, MergeStatistics), ApiError> {
    let merged = tokio::task::spawn_blocking(move || {
        let staging = StagingArea::create(&upload_dir)?;
        let inputs = uploads
            .iter()
            .enumerate()
            .map(|(index, upload)| staging.stage(index, &upload.bytes))
            .collect::<Result<Vec<_>, MergeError>>()?;

        let stats = merger.merge(&inputs, &staging.output_path())?;
        Ok::<_, MergeError>((staging, stats))
    })
    .await??;

    Ok(merged)
}

/// Stream `file` as the response body.
///
/// The staging area rides along in the stream state. It is released once
/// the file is exhausted, or dropped, and the directory removed, if the body
/// is abandoned.
fn stream_body(file: tokio::fs::File, staging: StagingArea) -> Body {
    let stream = futures::stream::try_unfold((file, staging), |(mut file, staging)| async move {
        let mut buf = vec![0u8; RESPONSE_CHUNK_SIZE];
        let read = file.read(&mut buf).await?;
        if read == 0 {
            drop(file);
            staging.release().await;
            return Ok::<_, std::io::Error>(None);
        }
        buf.truncate(read);
        Ok(Some((Bytes::from(buf), (file, staging))))
    });

    Body::from_stream(stream)
}
