//! Shared media data model
//!
//! These types mirror the JSON shapes exchanged with the Media API backend.
//! The backend record is the single source of truth; everything here is a
//! client-side view of it.

use crate::tags::{self, CardSize};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single gallery record as returned by the Media API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaItem {
    /// Opaque backend-assigned identifier, immutable for the record's lifetime
    pub id: String,
    /// Original filename at upload time
    pub filename: String,
    /// Backend storage path
    pub file_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// AI-generated summary of the image, if one has been produced
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lowercase, deduplicated
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// MIME type; non-image types mark placeholder records (imported
    /// transcripts and the like)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Free-form backend metadata (EXIF extracts etc.), passed through opaquely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    /// Contexts attached to this item (interview transcripts, notes)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<Context>,
}

impl MediaItem {
    /// True when the record holds an actual image the preview endpoint can
    /// serve. Placeholder records (e.g. imported transcripts stored as text)
    /// have no preview to fetch.
    pub fn is_image(&self) -> bool {
        match self.file_type.as_deref() {
            Some(file_type) => file_type.starts_with("image/"),
            None => true,
        }
    }

    /// Total words across attached contexts, used for card sizing
    pub fn context_word_count(&self) -> usize {
        self.contexts.iter().map(|c| tags::word_count(&c.text)).sum()
    }

    /// Layout size class for this item's gallery card
    pub fn card_size(&self) -> CardSize {
        CardSize::from_word_count(self.context_word_count())
    }

    /// Case-insensitive tag membership test
    pub fn has_tag(&self, tag: &str) -> bool {
        let needle = tags::normalize_tag(tag);
        self.tags.iter().any(|t| tags::normalize_tag(t) == needle)
    }
}

/// A piece of text attached to a media item, owned by it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub id: String,
    pub text: String,
    /// Discriminator such as "interview" or "note"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Role of one interview turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Backend prompt plumbing; never displayed or persisted
    System,
    User,
    Assistant,
}

/// One turn in an interview conversation. Transcripts are append-only;
/// system turns are filtered out by role for display and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewMessage {
    pub role: MessageRole,
    pub content: String,
    /// Content discriminator for non-text payloads (e.g. "image")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl InterviewMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: MessageRole::System, content: content.into(), kind: None, data: None }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: MessageRole::User, content: content.into(), kind: None, data: None }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: MessageRole::Assistant, content: content.into(), kind: None, data: None }
    }

    pub fn is_system(&self) -> bool {
        self.role == MessageRole::System
    }
}

/// Result of a backend cleanup pass over records whose files are gone
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupReport {
    /// Records examined
    pub checked: usize,
    /// Records removed because their file was missing
    pub removed: usize,
    #[serde(default)]
    pub removed_ids: Vec<String>,
}

/// AI photographer summary for one tag
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotographerSummary {
    pub summary: String,
    /// How many photos carried the tag when the summary was generated
    pub photo_count: usize,
}
