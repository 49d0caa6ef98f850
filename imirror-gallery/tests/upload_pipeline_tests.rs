//! Upload pipeline staging, reconciliation, and preview release behavior

mod helpers;

use std::fs;
use std::path::PathBuf;

use helpers::{media_item, stub, StubMediaApi};
use imirror_common::events::EventBus;
use imirror_gallery::services::media_client::{BatchDetails, MediaApiError};
use imirror_gallery::services::upload_pipeline::{UploadPipeline, UploadStatus};

const PNG_MAGIC: [u8; 10] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

fn write_png(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, PNG_MAGIC).expect("write png");
    path
}

fn write_text(dir: &tempfile::TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, b"just some words").expect("write text");
    path
}

fn pipeline(api: StubMediaApi) -> (UploadPipeline, std::sync::Arc<StubMediaApi>) {
    let api = stub(api);
    let pipeline = UploadPipeline::new(api.clone(), EventBus::new(16));
    (pipeline, api)
}

#[tokio::test]
async fn non_image_files_are_filtered_out_of_the_selection() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = write_png(&dir, "a.png");
    let b = write_png(&dir, "b.png");
    let notes = write_text(&dir, "notes.txt");

    let (mut pipeline, _api) = pipeline(StubMediaApi::default());
    assert!(pipeline.add_file(&a).expect("add a"));
    assert!(!pipeline.add_file(&notes).expect("add notes"));
    assert!(pipeline.add_file(&b).expect("add b"));

    assert_eq!(pipeline.entries().len(), 2);
    assert_eq!(pipeline.entries()[0].filename, "a.png");
    assert_eq!(pipeline.entries()[1].filename, "b.png");
}

#[tokio::test]
async fn results_reconcile_positionally_onto_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = write_png(&dir, "a.png");
    let b = write_png(&dir, "b.png");

    let api = StubMediaApi::default();
    api.script_upload(Ok(vec![Some(media_item("ma", "a.png", &[])), None]));
    let (mut pipeline, api) = pipeline(api);
    pipeline.add_file(&a).expect("add a");
    pipeline.add_file(&b).expect("add b");

    let report = pipeline.upload(&BatchDetails::default()).await.expect("upload");

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.first_uploaded.as_ref().map(|m| m.id.as_str()), Some("ma"));
    assert_eq!(pipeline.entries()[0].status, UploadStatus::Uploaded);
    assert_eq!(pipeline.entries()[1].status, UploadStatus::Error);
    // The whole selection went up as one request
    assert_eq!(*api.upload_part_counts.lock().unwrap(), vec![2]);
}

#[tokio::test]
async fn whole_batch_failure_marks_every_entry() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = write_png(&dir, "a.png");
    let b = write_png(&dir, "b.png");

    let api = StubMediaApi::default();
    api.script_upload(Err(MediaApiError::Network("refused".to_string())));
    let (mut pipeline, _api) = pipeline(api);
    pipeline.add_file(&a).expect("add a");
    pipeline.add_file(&b).expect("add b");

    let result = pipeline.upload(&BatchDetails::default()).await;

    assert!(result.is_err());
    assert!(pipeline
        .entries()
        .iter()
        .all(|e| e.status == UploadStatus::Error));
}

#[tokio::test]
async fn short_result_list_errors_the_unmatched_tail() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = write_png(&dir, "a.png");
    let b = write_png(&dir, "b.png");

    let api = StubMediaApi::default();
    api.script_upload(Ok(vec![Some(media_item("ma", "a.png", &[]))]));
    let (mut pipeline, _api) = pipeline(api);
    pipeline.add_file(&a).expect("add a");
    pipeline.add_file(&b).expect("add b");

    let report = pipeline.upload(&BatchDetails::default()).await.expect("upload");

    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(pipeline.entries()[0].status, UploadStatus::Uploaded);
    assert_eq!(pipeline.entries()[1].status, UploadStatus::Error);
}

#[tokio::test]
async fn first_uploaded_skips_failed_slots() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = write_png(&dir, "a.png");
    let b = write_png(&dir, "b.png");

    let api = StubMediaApi::default();
    api.script_upload(Ok(vec![None, Some(media_item("mb", "b.png", &[]))]));
    let (mut pipeline, _api) = pipeline(api);
    pipeline.add_file(&a).expect("add a");
    pipeline.add_file(&b).expect("add b");

    let report = pipeline.upload(&BatchDetails::default()).await.expect("upload");

    assert_eq!(report.first_uploaded.as_ref().map(|m| m.id.as_str()), Some("mb"));
}

#[tokio::test]
async fn removing_an_entry_releases_its_preview_exactly_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = write_png(&dir, "a.png");

    let (mut pipeline, _api) = pipeline(StubMediaApi::default());
    pipeline.add_file(&a).expect("add a");
    assert_eq!(pipeline.released_previews(), 0);

    assert!(pipeline.remove_entry(0));
    assert_eq!(pipeline.released_previews(), 1);

    // Index is gone; a repeat removal is a no-op
    assert!(!pipeline.remove_entry(0));
    assert_eq!(pipeline.released_previews(), 1);
}

#[tokio::test]
async fn clearing_the_batch_releases_every_preview() {
    let dir = tempfile::tempdir().expect("tempdir");
    let a = write_png(&dir, "a.png");
    let b = write_png(&dir, "b.png");

    let (mut pipeline, _api) = pipeline(StubMediaApi::default());
    pipeline.add_file(&a).expect("add a");
    pipeline.add_file(&b).expect("add b");

    pipeline.clear();

    assert!(pipeline.entries().is_empty());
    assert_eq!(pipeline.released_previews(), 2);
}

#[tokio::test]
async fn folder_staging_walks_in_name_order_and_filters() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_png(&dir, "b.png");
    write_png(&dir, "a.png");
    write_text(&dir, "readme.txt");

    let (mut pipeline, _api) = pipeline(StubMediaApi::default());
    let accepted = pipeline.add_folder(dir.path()).expect("add folder");

    assert_eq!(accepted, 2);
    assert_eq!(pipeline.entries()[0].filename, "a.png");
    assert_eq!(pipeline.entries()[1].filename, "b.png");
}
