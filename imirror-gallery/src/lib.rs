//! imirror-gallery library interface
//!
//! Exposes the application state and router so integration tests can drive
//! the HTTP surface directly.

pub mod api;
pub mod config;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::config::GalleryConfig;
use crate::services::gallery::GalleryController;
use crate::services::interview::InterviewSession;
use crate::services::media_client::MediaApi;
use crate::services::preview_loader::PreviewLoader;
use crate::services::tag_summary::TagSummaryController;
use crate::services::upload_pipeline::UploadPipeline;
use crate::services::voice::VoiceSupport;
use imirror_common::events::EventBus;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: GalleryConfig,
    /// Media API backend, behind a trait so tests can substitute a stub
    pub api: Arc<dyn MediaApi>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    pub gallery: Arc<GalleryController>,
    pub summary: Arc<TagSummaryController>,
    pub previews: Arc<PreviewLoader>,
    pub uploads: Arc<Mutex<UploadPipeline>>,
    /// Active interview sessions keyed by session id
    pub interviews: Arc<RwLock<HashMap<Uuid, InterviewSession>>>,
    pub voice: VoiceSupport,
    /// Cancelled on shutdown; in-flight preview loads observe it
    pub shutdown: CancellationToken,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(config: GalleryConfig, api: Arc<dyn MediaApi>, event_bus: EventBus) -> Self {
        let gallery = Arc::new(GalleryController::new(
            Arc::clone(&api),
            event_bus.clone(),
        ));
        let summary = Arc::new(TagSummaryController::new(
            Arc::clone(&api),
            event_bus.clone(),
            config.ai_model.clone(),
        ));
        let previews = Arc::new(PreviewLoader::new(Arc::clone(&api), event_bus.clone()));
        let uploads = Arc::new(Mutex::new(UploadPipeline::new(
            Arc::clone(&api),
            event_bus.clone(),
        )));
        Self {
            config,
            api,
            event_bus,
            gallery,
            summary,
            previews,
            uploads,
            interviews: Arc::new(RwLock::new(HashMap::new())),
            voice: VoiceSupport::detect(),
            shutdown: CancellationToken::new(),
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .merge(api::gallery_routes())
        .merge(api::context_routes())
        .merge(api::summary_routes())
        .merge(api::upload_routes())
        .merge(api::interview_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
