//! Batch upload pipeline
//!
//! Filters a local selection down to images, holds an in-memory preview per
//! accepted file, submits the batch as a single multipart request, and
//! reconciles the backend's positional result list back onto the entries.
//! Per-file failures stay per-entry; only a whole-request failure marks the
//! entire batch as errored.

use super::media_client::{BatchDetails, MediaApi, MediaApiError, UploadPart};
use imirror_common::events::{EventBus, GalleryEvent};
use imirror_common::models::MediaItem;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// In-memory preview for a file staged for upload.
///
/// The handle owns its bytes. `release` consumes the handle, so a preview
/// can be released at most once; dropping an unreleased handle releases it.
#[derive(Debug)]
pub struct LocalPreview {
    bytes: Vec<u8>,
    content_type: String,
    released: bool,
    releases: Arc<AtomicUsize>,
}

impl LocalPreview {
    fn new(bytes: Vec<u8>, content_type: String, releases: Arc<AtomicUsize>) -> Self {
        Self {
            bytes,
            content_type,
            released: false,
            releases,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Release the preview's backing memory
    pub fn release(mut self) {
        self.free();
    }

    fn free(&mut self) {
        if !self.released {
            self.released = true;
            self.bytes = Vec::new();
            self.releases.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Drop for LocalPreview {
    fn drop(&mut self) {
        self.free();
    }
}

/// Lifecycle of one staged file. Each upload attempt moves an entry through
/// at most one transition: Pending → Uploading → Uploaded | Error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Uploaded,
    Error,
}

/// One file staged for upload
#[derive(Debug)]
pub struct UploadedFile {
    pub path: PathBuf,
    pub filename: String,
    pub preview: Option<LocalPreview>,
    pub status: UploadStatus,
    /// Backend record once the entry uploads successfully
    pub media_item: Option<MediaItem>,
    pub error: Option<String>,
}

/// Result of one batch submission
#[derive(Debug, Clone)]
pub struct UploadReport {
    pub succeeded: usize,
    pub failed: usize,
    /// First successfully uploaded item, candidate for the interview flow
    pub first_uploaded: Option<MediaItem>,
}

pub struct UploadPipeline {
    api: Arc<dyn MediaApi>,
    event_bus: EventBus,
    entries: Vec<UploadedFile>,
    releases: Arc<AtomicUsize>,
}

impl UploadPipeline {
    pub fn new(api: Arc<dyn MediaApi>, event_bus: EventBus) -> Self {
        Self {
            api,
            event_bus,
            entries: Vec::new(),
            releases: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn entries(&self) -> &[UploadedFile] {
        &self.entries
    }

    /// How many previews have been released so far (explicitly or by drop)
    pub fn released_previews(&self) -> usize {
        self.releases.load(Ordering::SeqCst)
    }

    /// Stage one file. Returns false when the file was filtered out as a
    /// non-image.
    pub fn add_file(&mut self, path: &Path) -> std::io::Result<bool> {
        let bytes = std::fs::read(path)?;
        let Some(content_type) = image_content_type(path, &bytes) else {
            debug!(path = %path.display(), "Skipping non-image file");
            return Ok(false);
        };

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        debug!(path = %path.display(), content_type = %content_type, "Staged file for upload");
        self.entries.push(UploadedFile {
            path: path.to_path_buf(),
            filename,
            preview: Some(LocalPreview::new(
                bytes,
                content_type,
                Arc::clone(&self.releases),
            )),
            status: UploadStatus::Pending,
            media_item: None,
            error: None,
        });
        Ok(true)
    }

    /// Stage a list of files, preserving order. Returns how many were accepted.
    pub fn add_files<P: AsRef<Path>>(&mut self, paths: &[P]) -> std::io::Result<usize> {
        let mut accepted = 0;
        for path in paths {
            if self.add_file(path.as_ref())? {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    /// Stage every image under a folder, in deterministic name order
    pub fn add_folder(&mut self, dir: &Path) -> std::io::Result<usize> {
        let mut accepted = 0;
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::other)?;
            if entry.file_type().is_file() && self.add_file(entry.path())? {
                accepted += 1;
            }
        }
        Ok(accepted)
    }

    /// Remove one staged entry, releasing its preview regardless of status.
    /// Returns false for an out-of-range index.
    pub fn remove_entry(&mut self, index: usize) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        let mut entry = self.entries.remove(index);
        if let Some(preview) = entry.preview.take() {
            preview.release();
        }
        true
    }

    /// Drop every staged entry, releasing all previews
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            if let Some(preview) = entry.preview.take() {
                preview.release();
            }
        }
        self.entries.clear();
    }

    /// Submit every pending entry as one multipart batch and reconcile the
    /// positional results: outcome i belongs to pending entry i.
    pub async fn upload(&mut self, details: &BatchDetails) -> Result<UploadReport, MediaApiError> {
        let pending: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.status == UploadStatus::Pending && e.preview.is_some())
            .map(|(i, _)| i)
            .collect();
        if pending.is_empty() {
            return Ok(UploadReport {
                succeeded: 0,
                failed: 0,
                first_uploaded: None,
            });
        }

        let mut parts = Vec::with_capacity(pending.len());
        for &i in &pending {
            let entry = &mut self.entries[i];
            entry.status = UploadStatus::Uploading;
            if let Some(preview) = &entry.preview {
                parts.push(UploadPart {
                    filename: entry.filename.clone(),
                    bytes: preview.bytes().to_vec(),
                    content_type: preview.content_type().to_string(),
                });
            }
        }

        info!(batch_size = parts.len(), "Submitting upload batch");
        self.event_bus.emit_lossy(GalleryEvent::UploadBatchStarted {
            batch_size: parts.len(),
            timestamp: Utc::now(),
        });

        let outcomes = match self.api.upload_batch(parts, details).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                warn!(error = %e, "Upload batch failed");
                for &i in &pending {
                    let entry = &mut self.entries[i];
                    entry.status = UploadStatus::Error;
                    entry.error = Some(e.to_string());
                }
                self.event_bus.emit_lossy(GalleryEvent::UploadBatchCompleted {
                    succeeded: 0,
                    failed: pending.len(),
                    first_media_id: None,
                    timestamp: Utc::now(),
                });
                return Err(e);
            }
        };

        if outcomes.len() != pending.len() {
            // The backend contract is same-length, same-order; unmatched
            // tail entries become errors rather than silently vanishing.
            warn!(
                expected = pending.len(),
                got = outcomes.len(),
                "Upload result count does not match batch size"
            );
        }

        let mut report = UploadReport {
            succeeded: 0,
            failed: 0,
            first_uploaded: None,
        };
        for (slot, &i) in pending.iter().enumerate() {
            let entry = &mut self.entries[i];
            match outcomes.get(slot).cloned().flatten() {
                Some(item) => {
                    entry.status = UploadStatus::Uploaded;
                    entry.media_item = Some(item.clone());
                    report.succeeded += 1;
                    if report.first_uploaded.is_none() {
                        report.first_uploaded = Some(item.clone());
                    }
                    self.event_bus.emit_lossy(GalleryEvent::UploadEntryFinished {
                        index: i,
                        filename: entry.filename.clone(),
                        media_id: Some(item.id),
                        error: None,
                        timestamp: Utc::now(),
                    });
                }
                None => {
                    entry.status = UploadStatus::Error;
                    entry.error = Some("upload failed".to_string());
                    report.failed += 1;
                    self.event_bus.emit_lossy(GalleryEvent::UploadEntryFinished {
                        index: i,
                        filename: entry.filename.clone(),
                        media_id: None,
                        error: entry.error.clone(),
                        timestamp: Utc::now(),
                    });
                }
            }
        }

        info!(
            succeeded = report.succeeded,
            failed = report.failed,
            "Upload batch reconciled"
        );
        self.event_bus.emit_lossy(GalleryEvent::UploadBatchCompleted {
            succeeded: report.succeeded,
            failed: report.failed,
            first_media_id: report.first_uploaded.as_ref().map(|m| m.id.clone()),
            timestamp: Utc::now(),
        });
        Ok(report)
    }
}

/// Sniff the content type of a candidate file, accepting only images.
/// Falls back to the extension for formats the sniffer does not know.
fn image_content_type(path: &Path, bytes: &[u8]) -> Option<String> {
    if let Some(kind) = infer::get(bytes) {
        let mime = kind.mime_type();
        return if mime.starts_with("image/") {
            Some(mime.to_string())
        } else {
            None
        };
    }
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg" | "jpeg") => Some("image/jpeg".to_string()),
        Some("png") => Some("image/png".to_string()),
        Some("gif") => Some("image/gif".to_string()),
        Some("webp") => Some("image/webp".to_string()),
        _ => None,
    }
}
