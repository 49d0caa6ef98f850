//! AI interview endpoints

use axum::{
    extract::{Path, State},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::services::interview::InterviewSession;
use crate::{ApiError, ApiResult, AppState};
use imirror_common::models::InterviewMessage;

#[derive(Debug, Serialize)]
struct InterviewStartResponse {
    session_id: Uuid,
    /// Opening assistant question
    question: String,
    voice_supported: bool,
}

/// POST /api/media/:id/interview - start a session for one media item
async fn start(
    State(state): State<AppState>,
    Path(media_id): Path<String>,
) -> ApiResult<Json<InterviewStartResponse>> {
    let mut session = InterviewSession::new(
        Arc::clone(&state.api),
        state.event_bus.clone(),
        state.config.ai_model.clone(),
        media_id,
    );
    let question = session.start().await?;
    let session_id = session.session_id;
    state.interviews.write().await.insert(session_id, session);
    Ok(Json(InterviewStartResponse {
        session_id,
        question,
        voice_supported: state.voice.is_supported(),
    }))
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    reply: String,
    /// System turns already filtered out
    transcript: Vec<InterviewMessage>,
}

/// POST /api/interview/:session_id/chat
async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let mut sessions = state.interviews.write().await;
    let session = sessions
        .get_mut(&session_id)
        .ok_or_else(|| ApiError::NotFound(format!("interview session {session_id}")))?;
    let reply = session.send(&request.message).await?;
    Ok(Json(ChatResponse {
        reply,
        transcript: session.transcript(),
    }))
}

/// POST /api/interview/:session_id/save - persist the transcript and close
/// the session
async fn save(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let (context_id, media_id) = {
        let mut sessions = state.interviews.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| ApiError::NotFound(format!("interview session {session_id}")))?;
        let context_id = session.save().await?;
        let media_id = session.media_id.clone();
        sessions.remove(&session_id);
        (context_id, media_id)
    };

    if let Err(e) = state.gallery.reload().await {
        warn!(error = %e, "Reload after interview save failed");
    }
    Ok(Json(json!({ "context_id": context_id, "media_id": media_id })))
}

pub fn interview_routes() -> Router<AppState> {
    Router::new()
        .route("/api/media/:id/interview", post(start))
        .route("/api/interview/:session_id/chat", post(chat))
        .route("/api/interview/:session_id/save", post(save))
}
