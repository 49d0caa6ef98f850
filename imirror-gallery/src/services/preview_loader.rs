//! Preview image acquisition with bounded retry
//!
//! Transient backend failures stay invisible until the attempt budget is
//! exhausted; the terminal outcome is always explicit. Cancellation between
//! or during attempts discards the load entirely so nothing reports into
//! state that no longer exists.

use super::media_client::MediaApi;
use imirror_common::events::{EventBus, GalleryEvent};
use imirror_common::models::MediaItem;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Retry behavior for a preview fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

/// Terminal result of a preview load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// Preview bytes fetched successfully
    Loaded(Vec<u8>),
    /// Non-image record; nothing to fetch, rendered as a placeholder card
    Placeholder,
    /// Every attempt failed; the caller may offer to remove the record
    Failed { attempts: u32 },
}

pub struct PreviewLoader {
    api: Arc<dyn MediaApi>,
    policy: RetryPolicy,
    event_bus: EventBus,
}

impl PreviewLoader {
    pub fn new(api: Arc<dyn MediaApi>, event_bus: EventBus) -> Self {
        Self {
            api,
            policy: RetryPolicy::default(),
            event_bus,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Load the preview for one item.
    ///
    /// Returns `None` when the load was cancelled mid-flight; a cancelled
    /// load reports neither success nor failure.
    pub async fn load(
        &self,
        item: &MediaItem,
        cancel: &CancellationToken,
    ) -> Option<PreviewOutcome> {
        if !item.is_image() {
            debug!(media_id = %item.id, "Non-image record, skipping preview fetch");
            return Some(PreviewOutcome::Placeholder);
        }

        let mut last_error = String::new();
        for attempt in 1..=self.policy.max_attempts {
            if cancel.is_cancelled() {
                return None;
            }

            let result = tokio::select! {
                _ = cancel.cancelled() => return None,
                result = self.api.get_preview(&item.id) => result,
            };

            match result {
                Ok(bytes) => {
                    debug!(media_id = %item.id, attempt, "Preview loaded");
                    return Some(PreviewOutcome::Loaded(bytes));
                }
                Err(e) => {
                    debug!(media_id = %item.id, attempt, error = %e, "Preview fetch failed");
                    last_error = e.to_string();
                    if attempt < self.policy.max_attempts {
                        self.event_bus.emit_lossy(GalleryEvent::PreviewRetrying {
                            media_id: item.id.clone(),
                            attempt,
                            max_attempts: self.policy.max_attempts,
                            timestamp: Utc::now(),
                        });
                        tokio::select! {
                            _ = cancel.cancelled() => return None,
                            _ = tokio::time::sleep(self.policy.delay) => {}
                        }
                    }
                }
            }
        }

        let attempts = self.policy.max_attempts;
        warn!(media_id = %item.id, attempts, error = %last_error, "Preview failed after all attempts");
        self.event_bus.emit_lossy(GalleryEvent::PreviewFailed {
            media_id: item.id.clone(),
            attempts,
            timestamp: Utc::now(),
        });
        Some(PreviewOutcome::Failed { attempts })
    }
}
