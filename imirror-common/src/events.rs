//! Event types for the iMirror event system
//!
//! Provides shared event definitions and the EventBus used for SSE
//! streaming and cross-component notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Gallery event types
///
/// Events are broadcast via EventBus and can be serialized for SSE
/// transmission. All events use this central enum for type safety and
/// exhaustive matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GalleryEvent {
    /// A preview fetch attempt failed and will be retried
    PreviewRetrying {
        media_id: String,
        /// Attempt that just failed (1-based)
        attempt: u32,
        max_attempts: u32,
        timestamp: DateTime<Utc>,
    },

    /// All preview fetch attempts failed; the item is a candidate for the
    /// missing-file remediation flow
    PreviewFailed {
        media_id: String,
        attempts: u32,
        timestamp: DateTime<Utc>,
    },

    /// An upload batch was submitted to the backend
    UploadBatchStarted {
        batch_size: usize,
        timestamp: DateTime<Utc>,
    },

    /// One entry in an upload batch reached a terminal status
    UploadEntryFinished {
        /// Position of the entry in the staged list
        index: usize,
        filename: String,
        /// Backend id when the entry uploaded successfully
        media_id: Option<String>,
        error: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// An upload batch finished reconciling
    UploadBatchCompleted {
        succeeded: usize,
        failed: usize,
        /// First successful item, candidate for the interview flow
        first_media_id: Option<String>,
        timestamp: DateTime<Utc>,
    },

    /// AI summary generation started for a tag
    SummaryGenerating {
        tag: String,
        timestamp: DateTime<Utc>,
    },

    /// AI summary is ready for presentation
    SummaryReady {
        tag: String,
        photo_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// AI summary generation failed; an apology placeholder is presented
    SummaryFailed {
        tag: String,
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// Tag selection was cleared; no summary is held
    SummaryCleared {
        timestamp: DateTime<Utc>,
    },

    /// The item list was reloaded from the backend
    GalleryReloaded {
        item_count: usize,
        timestamp: DateTime<Utc>,
    },

    /// A record was deleted
    MediaRemoved {
        media_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Bulk cleanup of records with missing files completed
    MissingCleanupCompleted {
        checked: usize,
        removed: usize,
        timestamp: DateTime<Utc>,
    },

    /// A tag was removed from every item carrying it
    TagDeleted {
        tag: String,
        items_updated: usize,
        timestamp: DateTime<Utc>,
    },

    /// An interview transcript was saved as a context on its media item
    InterviewSaved {
        media_id: String,
        context_id: String,
        timestamp: DateTime<Utc>,
    },
}

impl GalleryEvent {
    /// Get event type as string for SSE event naming and filtering
    pub fn event_type(&self) -> &str {
        match self {
            GalleryEvent::PreviewRetrying { .. } => "PreviewRetrying",
            GalleryEvent::PreviewFailed { .. } => "PreviewFailed",
            GalleryEvent::UploadBatchStarted { .. } => "UploadBatchStarted",
            GalleryEvent::UploadEntryFinished { .. } => "UploadEntryFinished",
            GalleryEvent::UploadBatchCompleted { .. } => "UploadBatchCompleted",
            GalleryEvent::SummaryGenerating { .. } => "SummaryGenerating",
            GalleryEvent::SummaryReady { .. } => "SummaryReady",
            GalleryEvent::SummaryFailed { .. } => "SummaryFailed",
            GalleryEvent::SummaryCleared { .. } => "SummaryCleared",
            GalleryEvent::GalleryReloaded { .. } => "GalleryReloaded",
            GalleryEvent::MediaRemoved { .. } => "MediaRemoved",
            GalleryEvent::MissingCleanupCompleted { .. } => "MissingCleanupCompleted",
            GalleryEvent::TagDeleted { .. } => "TagDeleted",
            GalleryEvent::InterviewSaved { .. } => "InterviewSaved",
        }
    }
}

/// Central event distribution bus
///
/// Wraps tokio::broadcast, providing:
/// - Non-blocking publish (slow subscribers don't block producers)
/// - Multiple concurrent subscribers
/// - Automatic cleanup when subscribers drop
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<GalleryEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity.
    /// Old events are dropped for lagging subscribers once the buffer fills.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events. Events emitted before subscription
    /// are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<GalleryEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers.
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists,
    /// `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: GalleryEvent,
    ) -> Result<usize, broadcast::error::SendError<GalleryEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring whether anyone is listening
    pub fn emit_lossy(&self, event: GalleryEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
