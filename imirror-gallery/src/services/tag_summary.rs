//! AI photographer summary state machine
//!
//! Driven by tag selection: exactly one selected tag starts a generation,
//! anything else resets to idle. Selections race the network, so every
//! generation carries a monotone number and results for superseded
//! generations are discarded — the last selected tag always wins.

use super::media_client::{MediaApi, MediaApiError};
use imirror_common::events::{EventBus, GalleryEvent};
use imirror_common::models::PhotographerSummary;
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Shown in place of a summary when generation fails. Failure is a normal
/// presentation outcome here, not an error surface.
pub const SUMMARY_APOLOGY: &str = "Sorry, I couldn't generate a summary for this tag.";

/// Where the controller currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryPhase {
    /// No single tag selected, nothing held
    Idle,
    /// A request for this tag is in flight
    Generating { tag: String },
    /// A summary (or the apology placeholder) is held for this tag
    Presenting {
        tag: String,
        summary: String,
        photo_count: usize,
    },
}

/// Handle for one in-flight generation. Applying a result for a generation
/// that is no longer current is a no-op.
#[derive(Debug, Clone)]
pub struct PendingGeneration {
    pub tag: String,
    generation: u64,
}

pub struct TagSummaryController {
    api: Arc<dyn MediaApi>,
    event_bus: EventBus,
    model: Option<String>,
    phase: Mutex<SummaryPhase>,
    generation: AtomicU64,
}

impl TagSummaryController {
    pub fn new(api: Arc<dyn MediaApi>, event_bus: EventBus, model: Option<String>) -> Self {
        Self {
            api,
            event_bus,
            model,
            phase: Mutex::new(SummaryPhase::Idle),
            generation: AtomicU64::new(0),
        }
    }

    /// React to a tag selection change. Spawns a generation task when the
    /// selection has exactly one tag; anything else resets to idle.
    pub async fn select_tags(self: &Arc<Self>, tags: &[String]) {
        if let Some(pending) = self.note_selection(tags).await {
            let controller = Arc::clone(self);
            tokio::spawn(async move {
                controller.run_generation(pending).await;
            });
        }
    }

    /// Record the new selection and return the generation to run, if any.
    /// Every selection change invalidates whatever was in flight before it.
    pub async fn note_selection(&self, tags: &[String]) -> Option<PendingGeneration> {
        let mut phase = self.phase.lock().await;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        if tags.len() == 1 {
            let tag = tags[0].clone();
            debug!(tag = %tag, generation, "Starting summary generation");
            *phase = SummaryPhase::Generating { tag: tag.clone() };
            self.event_bus.emit_lossy(GalleryEvent::SummaryGenerating {
                tag: tag.clone(),
                timestamp: Utc::now(),
            });
            Some(PendingGeneration { tag, generation })
        } else {
            if !matches!(*phase, SummaryPhase::Idle) {
                *phase = SummaryPhase::Idle;
                self.event_bus.emit_lossy(GalleryEvent::SummaryCleared {
                    timestamp: Utc::now(),
                });
            }
            None
        }
    }

    /// Fetch the summary for one pending generation and apply the result
    pub async fn run_generation(&self, pending: PendingGeneration) {
        let result = self
            .api
            .photographer_summary(&pending.tag, self.model.as_deref())
            .await;
        self.apply(pending, result).await;
    }

    /// Apply a generation result. Returns false when the result arrived for
    /// a superseded generation and was discarded.
    pub async fn apply(
        &self,
        pending: PendingGeneration,
        result: Result<PhotographerSummary, MediaApiError>,
    ) -> bool {
        let mut phase = self.phase.lock().await;
        if pending.generation != self.generation.load(Ordering::SeqCst) {
            debug!(tag = %pending.tag, "Discarding stale summary response");
            return false;
        }

        match result {
            Ok(summary) => {
                info!(tag = %pending.tag, photo_count = summary.photo_count, "Summary ready");
                self.event_bus.emit_lossy(GalleryEvent::SummaryReady {
                    tag: pending.tag.clone(),
                    photo_count: summary.photo_count,
                    timestamp: Utc::now(),
                });
                *phase = SummaryPhase::Presenting {
                    tag: pending.tag,
                    summary: summary.summary,
                    photo_count: summary.photo_count,
                };
            }
            Err(e) => {
                warn!(tag = %pending.tag, error = %e, "Summary generation failed");
                self.event_bus.emit_lossy(GalleryEvent::SummaryFailed {
                    tag: pending.tag.clone(),
                    error: e.to_string(),
                    timestamp: Utc::now(),
                });
                *phase = SummaryPhase::Presenting {
                    tag: pending.tag,
                    summary: SUMMARY_APOLOGY.to_string(),
                    photo_count: 0,
                };
            }
        }
        true
    }

    pub async fn phase(&self) -> SummaryPhase {
        self.phase.lock().await.clone()
    }

    /// The presenting/"talking" indicator: true whenever a request is in
    /// flight or a summary is held.
    pub async fn is_presenting(&self) -> bool {
        !matches!(*self.phase.lock().await, SummaryPhase::Idle)
    }
}
