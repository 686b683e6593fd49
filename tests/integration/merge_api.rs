//! Successful merges through `POST /api/merge-pdfs`.

use axum::body::to_bytes;
use axum::http::{StatusCode, header};
use lopdf::Document;
use pdfmerge::config::Config;
use rstest::rstest;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::common::{Part, entry_count, merge_request, page_widths, pdf_bytes, test_app, test_app_with};

#[tokio::test]
async fn test_merge_two_files_in_submission_order() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app(upload_dir.path());

    let request = merge_request(&[
        Part::pdf("a.pdf", pdf_bytes(2, 100)),
        Part::pdf("b.pdf", pdf_bytes(3, 200)),
    ]);
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"merged.pdf\""
    );
    let content_length: usize = headers[header::CONTENT_LENGTH]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(body.len(), content_length);

    let merged = Document::load_mem(&body).unwrap();
    assert_eq!(page_widths(&merged), vec![100, 100, 200, 200, 200]);
}

#[rstest]
#[case(vec![1, 1])]
#[case(vec![1, 4, 2])]
#[case(vec![3, 1, 1, 5])]
#[tokio::test]
async fn test_page_count_is_sum_of_inputs(#[case] page_counts: Vec<u32>) {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app(upload_dir.path());

    let names: Vec<String> = (0..page_counts.len()).map(|i| format!("doc{i}.pdf")).collect();
    let parts: Vec<Part<'_>> = page_counts
        .iter()
        .zip(&names)
        .enumerate()
        .map(|(i, (&pages, name))| Part::pdf(name, pdf_bytes(pages, 100 + i as i64)))
        .collect();

    let response = app.oneshot(merge_request(&parts)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let merged = Document::load_mem(&body).unwrap();

    let expected: Vec<i64> = page_counts
        .iter()
        .enumerate()
        .flat_map(|(i, &pages)| std::iter::repeat_n(100 + i as i64, pages as usize))
        .collect();
    assert_eq!(page_widths(&merged), expected);
}

#[tokio::test]
async fn test_staging_is_removed_after_response_is_sent() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app(upload_dir.path());

    let response = app
        .oneshot(merge_request(&[
            Part::pdf("a.pdf", pdf_bytes(1, 100)),
            Part::pdf("b.pdf", pdf_bytes(1, 200)),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let _ = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    assert_eq!(entry_count(upload_dir.path()), 0);
}

#[tokio::test]
async fn test_staging_is_removed_when_body_is_dropped() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app(upload_dir.path());

    let response = app
        .oneshot(merge_request(&[
            Part::pdf("a.pdf", pdf_bytes(1, 100)),
            Part::pdf("b.pdf", pdf_bytes(1, 200)),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(entry_count(upload_dir.path()), 1);

    drop(response);

    assert_eq!(entry_count(upload_dir.path()), 0);
}

#[tokio::test]
async fn test_traversal_filenames_stay_inside_staging() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app(upload_dir.path());

    let response = app
        .oneshot(merge_request(&[
            Part::pdf("../../escape.pdf", pdf_bytes(1, 100)),
            Part::pdf("..\\..\\escape2.pdf", pdf_bytes(1, 200)),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let _ = to_bytes(response.into_body(), usize::MAX).await.unwrap();

    let parent = upload_dir.path().parent().unwrap();
    assert!(!parent.join("escape.pdf").exists());
    assert!(!parent.join("escape2.pdf").exists());
    assert_eq!(entry_count(upload_dir.path()), 0);
}

#[tokio::test]
async fn test_bookmarks_added_when_enabled() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app_with(Config {
        upload_dir: upload_dir.path().to_path_buf(),
        bookmarks: true,
        ..Config::default()
    });

    let response = app
        .oneshot(merge_request(&[
            Part::pdf("first.pdf", pdf_bytes(2, 100)),
            Part::pdf("second.pdf", pdf_bytes(1, 200)),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let merged = Document::load_mem(&body).unwrap();

    let outlines_id = merged
        .catalog()
        .unwrap()
        .get(b"Outlines")
        .and_then(lopdf::Object::as_reference)
        .unwrap();
    let outlines = merged.get_dictionary(outlines_id).unwrap();
    assert_eq!(outlines.get(b"Count").and_then(lopdf::Object::as_i64).unwrap(), 2);
}

#[tokio::test]
async fn test_overlapping_requests_use_separate_staging() {
    let upload_dir = TempDir::new().unwrap();
    let app = test_app(upload_dir.path());

    let first = app.clone().oneshot(merge_request(&[
        Part::pdf("same.pdf", pdf_bytes(1, 100)),
        Part::pdf("other.pdf", pdf_bytes(2, 110)),
    ]));
    let second = app.oneshot(merge_request(&[
        Part::pdf("same.pdf", pdf_bytes(3, 300)),
        Part::pdf("other.pdf", pdf_bytes(1, 310)),
    ]));
    let (first, second) = tokio::join!(first, second);
    let (first, second) = (first.unwrap(), second.unwrap());

    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(second.status(), StatusCode::OK);
    // Both bodies are still pending, so both staging directories are alive.
    assert_eq!(entry_count(upload_dir.path()), 2);

    let first = to_bytes(first.into_body(), usize::MAX).await.unwrap();
    let second = to_bytes(second.into_body(), usize::MAX).await.unwrap();

    let first = Document::load_mem(&first).unwrap();
    let second = Document::load_mem(&second).unwrap();
    assert_eq!(page_widths(&first), vec![100, 110, 110]);
    assert_eq!(page_widths(&second), vec![300, 300, 300, 310]);
    assert_eq!(entry_count(upload_dir.path()), 0);
}
