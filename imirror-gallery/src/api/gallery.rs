//! Gallery view and tag endpoints

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::services::gallery::GalleryFilters;
use crate::services::preview_loader::PreviewOutcome;
use crate::{ApiError, ApiResult, AppState};
use imirror_common::models::{CleanupReport, MediaItem};
use imirror_common::tags::CardSize;

#[derive(Debug, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct GalleryCard {
    #[serde(flatten)]
    pub item: MediaItem,
    /// Layout size class derived from attached context text
    pub card_size: CardSize,
    /// True when the item's file could not be served
    pub missing: bool,
}

#[derive(Debug, Serialize)]
pub struct GalleryView {
    pub items: Vec<GalleryCard>,
    pub filters: GalleryFilters,
    pub tags: Vec<TagCount>,
}

/// GET /api/gallery - filtered item list plus the derived tag index
async fn gallery_view(State(state): State<AppState>) -> ApiResult<Json<GalleryView>> {
    let mut cards = Vec::new();
    for item in state.gallery.visible_items().await {
        let missing = state.gallery.is_missing(&item.id).await;
        cards.push(GalleryCard {
            card_size: item.card_size(),
            missing,
            item,
        });
    }
    let filters = state.gallery.filters().await;
    let tags = state
        .gallery
        .tag_index()
        .await
        .into_iter()
        .map(|(tag, count)| TagCount { tag, count })
        .collect();
    Ok(Json(GalleryView { items: cards, filters, tags }))
}

/// POST /api/gallery/refresh - full reload from the backend
async fn refresh(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let item_count = state.gallery.reload().await?;
    Ok(Json(json!({ "item_count": item_count })))
}

#[derive(Debug, Deserialize)]
struct SearchRequest {
    query: String,
}

/// POST /api/gallery/search
async fn set_search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state.gallery.set_search(&request.query).await;
    let visible = state.gallery.visible_items().await.len();
    Ok(Json(json!({ "visible": visible })))
}

#[derive(Debug, Deserialize)]
struct ToggleTagRequest {
    tag: String,
}

/// POST /api/tags/toggle - single-select toggle; the resulting selection
/// also drives the AI summary state machine
async fn toggle_tag(
    State(state): State<AppState>,
    Json(request): Json<ToggleTagRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let selection = state.gallery.toggle_tag(&request.tag).await;
    state.summary.select_tags(&selection).await;
    Ok(Json(json!({ "selected_tags": selection })))
}

/// POST /api/tags/clear
async fn clear_tags(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let selection = state.gallery.clear_tags().await;
    state.summary.select_tags(&selection).await;
    Ok(Json(json!({ "selected_tags": selection })))
}

/// DELETE /api/tags/:tag - remove the tag from every item carrying it
async fn delete_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let items_updated = state.gallery.delete_tag_everywhere(&tag).await?;
    let selection = state.gallery.filters().await.selected_tags;
    state.summary.select_tags(&selection).await;
    Ok(Json(json!({ "items_updated": items_updated })))
}

/// GET /api/media/:id/preview - preview bytes via the bounded-retry loader.
/// A record whose preview is exhausted gets marked missing so the gallery
/// can offer remediation.
async fn media_preview(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> ApiResult<Response> {
    let item = state.api.get_media(&media_id).await?;
    match state.previews.load(&item, &state.shutdown).await {
        Some(PreviewOutcome::Loaded(bytes)) => {
            let content_type = item
                .file_type
                .unwrap_or_else(|| "application/octet-stream".to_string());
            Ok(([(header::CONTENT_TYPE, content_type)], bytes).into_response())
        }
        Some(PreviewOutcome::Placeholder) => Ok(StatusCode::NO_CONTENT.into_response()),
        Some(PreviewOutcome::Failed { attempts }) => {
            state.gallery.mark_missing(&media_id).await;
            Err(ApiError::NotFound(format!(
                "preview unavailable for {media_id} after {attempts} attempts"
            )))
        }
        None => Err(ApiError::Internal("preview load cancelled".to_string())),
    }
}

/// POST /api/media/:id/remove-missing - delete a record whose file is gone
async fn remove_missing(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    state.gallery.remove_missing(&media_id).await?;
    Ok(Json(json!({ "removed": media_id })))
}

/// POST /api/media/cleanup-missing
async fn cleanup_missing(State(state): State<AppState>) -> ApiResult<Json<CleanupReport>> {
    let report = state.gallery.cleanup_missing().await?;
    Ok(Json(report))
}

/// POST /api/media/generate-year-tags
async fn generate_year_tags(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let items_updated = state.gallery.generate_year_tags().await?;
    Ok(Json(json!({ "items_updated": items_updated })))
}

#[derive(Debug, Deserialize)]
struct TitleRequest {
    title: String,
}

/// PUT /api/media/:id/title
async fn update_title(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    Json(request): Json<TitleRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state.gallery.update_title(&media_id, &request.title).await?;
    Ok(Json(json!({ "updated": media_id })))
}

#[derive(Debug, Deserialize)]
struct SummaryRequest {
    summary: String,
}

/// PUT /api/media/:id/summary
async fn update_summary(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
    Json(request): Json<SummaryRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    state
        .gallery
        .update_summary(&media_id, &request.summary)
        .await?;
    Ok(Json(json!({ "updated": media_id })))
}

pub fn gallery_routes() -> Router<AppState> {
    Router::new()
        .route("/api/gallery", get(gallery_view))
        .route("/api/gallery/refresh", post(refresh))
        .route("/api/gallery/search", post(set_search))
        .route("/api/tags/toggle", post(toggle_tag))
        .route("/api/tags/clear", post(clear_tags))
        .route("/api/tags/:tag", delete(delete_tag))
        .route("/api/media/:id/preview", get(media_preview))
        .route("/api/media/:id/title", axum::routing::put(update_title))
        .route("/api/media/:id/summary", axum::routing::put(update_summary))
        .route("/api/media/:id/remove-missing", post(remove_missing))
        .route("/api/media/cleanup-missing", post(cleanup_missing))
        .route("/api/media/generate-year-tags", post(generate_year_tags))
}
