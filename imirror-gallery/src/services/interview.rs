//! AI interview sessions
//!
//! One conversation about a single media item. The backend owns prompt
//! construction and injects system turns into the transcript it returns;
//! those are filtered out by role — never by position — before display or
//! persistence.

use super::media_client::{MediaApi, MediaApiError};
use imirror_common::events::{EventBus, GalleryEvent};
use imirror_common::models::{InterviewMessage, MessageRole};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// System turns excluded by role, order otherwise preserved
fn without_system(messages: &[InterviewMessage]) -> Vec<InterviewMessage> {
    messages
        .iter()
        .filter(|m| m.role != MessageRole::System)
        .cloned()
        .collect()
}

pub struct InterviewSession {
    api: Arc<dyn MediaApi>,
    event_bus: EventBus,
    model: Option<String>,
    pub session_id: Uuid,
    pub media_id: String,
    messages: Vec<InterviewMessage>,
    saved: bool,
}

impl InterviewSession {
    pub fn new(
        api: Arc<dyn MediaApi>,
        event_bus: EventBus,
        model: Option<String>,
        media_id: String,
    ) -> Self {
        Self {
            api,
            event_bus,
            model,
            session_id: Uuid::new_v4(),
            media_id,
            messages: Vec::new(),
            saved: false,
        }
    }

    /// Start the interview; returns the opening assistant question
    pub async fn start(&mut self) -> Result<String, MediaApiError> {
        let messages = self
            .api
            .interview_start(&self.media_id, self.model.as_deref())
            .await?;
        info!(media_id = %self.media_id, session_id = %self.session_id, "Interview started");
        self.messages = messages;
        Ok(self.latest_assistant_text().unwrap_or_default())
    }

    /// Send a user reply; returns the assistant's follow-up. The full
    /// history (system turns included) goes back to the backend, which
    /// returns the updated transcript.
    pub async fn send(&mut self, text: &str) -> Result<String, MediaApiError> {
        let messages = self
            .api
            .interview_chat(&self.media_id, &self.messages, text, self.model.as_deref())
            .await?;
        self.messages = messages;
        Ok(self.latest_assistant_text().unwrap_or_default())
    }

    /// Messages suitable for display or persistence: system turns excluded
    pub fn transcript(&self) -> Vec<InterviewMessage> {
        without_system(&self.messages)
    }

    pub fn messages(&self) -> &[InterviewMessage] {
        &self.messages
    }

    fn latest_assistant_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant)
            .map(|m| m.content.clone())
    }

    /// Persist the transcript as a context on the media item, then trigger
    /// AI summary and tag generation for it. Generation failures are logged
    /// and swallowed; the save itself has already succeeded.
    pub async fn save(&mut self) -> Result<String, MediaApiError> {
        let transcript = self.transcript();
        let context_id = self.api.interview_save(&self.media_id, &transcript).await?;
        self.saved = true;
        info!(media_id = %self.media_id, context_id = %context_id, "Interview transcript saved");
        self.event_bus.emit_lossy(GalleryEvent::InterviewSaved {
            media_id: self.media_id.clone(),
            context_id: context_id.clone(),
            timestamp: Utc::now(),
        });

        if let Err(e) = self
            .api
            .generate_summary(&self.media_id, self.model.as_deref())
            .await
        {
            warn!(media_id = %self.media_id, error = %e, "Post-save summary generation failed");
        }
        if let Err(e) = self
            .api
            .generate_tags(&self.media_id, self.model.as_deref())
            .await
        {
            warn!(media_id = %self.media_id, error = %e, "Post-save tag generation failed");
        }
        Ok(context_id)
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }
}
