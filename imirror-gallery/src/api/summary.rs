//! AI photographer summary endpoints

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::services::tag_summary::SummaryPhase;
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct SummaryStateResponse {
    /// "idle" | "generating" | "presenting"
    pub phase: String,
    pub tag: Option<String>,
    pub summary: Option<String>,
    pub photo_count: Option<usize>,
    /// Drives the talking-photographer indicator in the UI
    pub presenting: bool,
}

/// GET /api/summary - current summary state machine snapshot
async fn summary_state(State(state): State<AppState>) -> Json<SummaryStateResponse> {
    let presenting = state.summary.is_presenting().await;
    let response = match state.summary.phase().await {
        SummaryPhase::Idle => SummaryStateResponse {
            phase: "idle".to_string(),
            tag: None,
            summary: None,
            photo_count: None,
            presenting,
        },
        SummaryPhase::Generating { tag } => SummaryStateResponse {
            phase: "generating".to_string(),
            tag: Some(tag),
            summary: None,
            photo_count: None,
            presenting,
        },
        SummaryPhase::Presenting { tag, summary, photo_count } => SummaryStateResponse {
            phase: "presenting".to_string(),
            tag: Some(tag),
            summary: Some(summary),
            photo_count: Some(photo_count),
            presenting,
        },
    };
    Json(response)
}

#[derive(Debug, Deserialize)]
struct SummaryChatRequest {
    message: String,
}

/// POST /api/summary/chat - follow-up question to the AI photographer about
/// the currently presented tag
async fn summary_chat(
    State(state): State<AppState>,
    Json(request): Json<SummaryChatRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let tag = match state.summary.phase().await {
        SummaryPhase::Presenting { tag, .. } => tag,
        _ => {
            return Err(ApiError::BadRequest(
                "no summary is currently presented".to_string(),
            ))
        }
    };
    let reply = state
        .api
        .photographer_conversation(&tag, &[], &request.message, state.config.ai_model.as_deref())
        .await?;
    Ok(Json(json!({ "tag": tag, "reply": reply })))
}

pub fn summary_routes() -> Router<AppState> {
    Router::new()
        .route("/api/summary", get(summary_state))
        .route("/api/summary/chat", post(summary_chat))
}
