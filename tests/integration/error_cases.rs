//! Rejected and failed merge requests.

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use pdfmerge::config::Config;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::common::{Part, entry_count, merge_request, pdf_bytes, test_app, test_app_with};

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_single_file_is_rejected() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app(upload_dir.path());

    let response = app
        .oneshot(merge_request(&[Part::pdf("a.pdf", pdf_bytes(2, 100))]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "At least 2 PDF files are required" })
    );
    assert_eq!(entry_count(upload_dir.path()), 0);
}

#[tokio::test]
async fn test_empty_form_is_missing_input() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app(upload_dir.path());

    let response = app.oneshot(merge_request(&[])).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "No PDF files provided" })
    );
    assert_eq!(entry_count(upload_dir.path()), 0);
}

#[tokio::test]
async fn test_wrong_field_name_is_missing_input() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app(upload_dir.path());

    let parts = [
        Part {
            name: "files",
            file_name: Some("a.pdf"),
            content: pdf_bytes(1, 100),
        },
        Part {
            name: "files",
            file_name: Some("b.pdf"),
            content: pdf_bytes(1, 100),
        },
    ];
    let response = app.oneshot(merge_request(&parts)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "No PDF files provided" })
    );
}

#[tokio::test]
async fn test_non_multipart_request_is_missing_input() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app(upload_dir.path());

    let request = Request::builder()
        .method("POST")
        .uri("/api/merge-pdfs")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "No PDF files provided" })
    );
}

#[tokio::test]
async fn test_parts_without_filename_are_ignored() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app(upload_dir.path());

    let parts = [
        Part::pdf("a.pdf", pdf_bytes(1, 100)),
        Part {
            name: "pdfs",
            file_name: None,
            content: pdf_bytes(1, 100),
        },
    ];
    let response = app.oneshot(merge_request(&parts)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({ "error": "At least 2 PDF files are required" })
    );
}

#[tokio::test]
async fn test_corrupted_file_fails_and_cleans_up() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app(upload_dir.path());

    let response = app
        .oneshot(merge_request(&[
            Part::pdf("a.pdf", pdf_bytes(2, 100)),
            Part::pdf("broken.pdf", b"this is not a pdf".to_vec()),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"].as_str().is_some_and(|msg| !msg.is_empty()));
    assert_eq!(entry_count(upload_dir.path()), 0);
}

#[tokio::test]
async fn test_file_over_limit_is_413() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app_with(Config {
        upload_dir: upload_dir.path().to_path_buf(),
        max_file_size: 1024,
        ..Config::default()
    });

    let response = app
        .oneshot(merge_request(&[
            Part::pdf("a.pdf", pdf_bytes(1, 100)),
            Part::pdf("big.pdf", vec![b'x'; 4096]),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("big.pdf"));
    assert_eq!(entry_count(upload_dir.path()), 0);
}

#[tokio::test]
async fn test_request_over_limit_is_413() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app_with(Config {
        upload_dir: upload_dir.path().to_path_buf(),
        max_file_size: 4096,
        max_request_size: 4096,
        ..Config::default()
    });

    let response = app
        .oneshot(merge_request(&[
            Part::pdf("a.pdf", vec![b'x'; 3000]),
            Part::pdf("b.pdf", vec![b'x'; 3000]),
        ]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(entry_count(upload_dir.path()), 0);
}
