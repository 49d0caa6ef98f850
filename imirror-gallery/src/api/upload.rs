//! Upload endpoints
//!
//! The service runs next to the user's files, so uploads are staged from
//! local paths and folders rather than re-streamed through this process.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

use crate::services::media_client::BatchDetails;
use crate::services::upload_pipeline::UploadStatus;
use crate::{ApiResult, AppState};

#[derive(Debug, Deserialize)]
struct UploadRequest {
    /// Individual files, in upload order
    #[serde(default)]
    paths: Vec<String>,
    /// Folder to scan for images
    folder: Option<String>,
    /// Batch-level event name
    name: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadEntryView {
    filename: String,
    status: UploadStatus,
    media_id: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    accepted: usize,
    succeeded: usize,
    failed: usize,
    entries: Vec<UploadEntryView>,
    /// First successful item; the UI starts the interview flow on it
    interview_media_id: Option<String>,
}

/// POST /api/upload - stage, filter, submit, and reconcile one batch
async fn upload(
    State(state): State<AppState>,
    Json(request): Json<UploadRequest>,
) -> ApiResult<Json<UploadResponse>> {
    let mut pipeline = state.uploads.lock().await;
    // One HTTP request is one batch
    pipeline.clear();

    let mut accepted = pipeline.add_files(&request.paths)?;
    if let Some(folder) = &request.folder {
        accepted += pipeline.add_folder(Path::new(folder))?;
    }

    let details = BatchDetails {
        name: request.name,
        description: request.description,
    };
    let first_uploaded = match pipeline.upload(&details).await {
        Ok(report) => report.first_uploaded,
        // Whole-batch failure is already reflected on every entry
        Err(e) => {
            warn!(error = %e, "Upload batch failed");
            None
        }
    };

    let entries: Vec<UploadEntryView> = pipeline
        .entries()
        .iter()
        .map(|entry| UploadEntryView {
            filename: entry.filename.clone(),
            status: entry.status,
            media_id: entry.media_item.as_ref().map(|m| m.id.clone()),
            error: entry.error.clone(),
        })
        .collect();
    let succeeded = entries
        .iter()
        .filter(|e| e.status == UploadStatus::Uploaded)
        .count();
    let failed = entries
        .iter()
        .filter(|e| e.status == UploadStatus::Error)
        .count();
    drop(pipeline);

    if succeeded > 0 {
        if let Err(e) = state.gallery.reload().await {
            warn!(error = %e, "Reload after upload failed");
        }
    }

    Ok(Json(UploadResponse {
        accepted,
        succeeded,
        failed,
        entries,
        interview_media_id: first_uploaded.map(|item| item.id),
    }))
}

pub fn upload_routes() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload))
}
