//! Context CRUD endpoints
//!
//! Contexts are text attached to a media item (interview transcripts,
//! notes). Straight passthrough to the backend, with a gallery reload after
//! every mutation since context word counts drive card sizing.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::{ApiResult, AppState};
use imirror_common::models::Context;

async fn reload_after_mutation(state: &AppState) {
    if let Err(e) = state.gallery.reload().await {
        warn!(error = %e, "Reload after context mutation failed");
    }
}

/// GET /api/media/:id/contexts
async fn list(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> ApiResult<Json<Vec<Context>>> {
    Ok(Json(state.api.list_contexts(&media_id).await?))
}

#[derive(Debug, Deserialize)]
struct AddContextRequest {
    text: String,
    context_type: Option<String>,
}

/// POST /api/media/:id/contexts
async fn add(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    Json(request): Json<AddContextRequest>,
) -> ApiResult<Json<Context>> {
    let context = state
        .api
        .add_context(&media_id, &request.text, request.context_type.as_deref())
        .await?;
    reload_after_mutation(&state).await;
    Ok(Json(context))
}

#[derive(Debug, Deserialize)]
struct UpdateContextRequest {
    text: String,
}

/// PUT /api/media/:id/contexts/:context_id
async fn update(
    State(state): State<AppState>,
    Path((media_id, context_id)): Path<(String, String)>,
    Json(request): Json<UpdateContextRequest>,
) -> ApiResult<Json<Context>> {
    let context = state
        .api
        .update_context(&media_id, &context_id, &request.text)
        .await?;
    reload_after_mutation(&state).await;
    Ok(Json(context))
}

/// DELETE /api/media/:id/contexts/:context_id
async fn remove(
    State(state): State<AppState>,
    Path((media_id, context_id)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    state.api.delete_context(&media_id, &context_id).await?;
    reload_after_mutation(&state).await;
    Ok(Json(json!({ "deleted": context_id })))
}

pub fn context_routes() -> Router<AppState> {
    Router::new()
        .route("/api/media/:id/contexts", get(list).post(add))
        .route(
            "/api/media/:id/contexts/:context_id",
            put(update).delete(remove),
        )
}
