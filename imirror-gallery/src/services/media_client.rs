//! Media API client
//!
//! All persistence, EXIF handling, and AI inference live behind the external
//! Media API backend. This module defines the `MediaApi` seam the controllers
//! talk through and the reqwest-backed implementation of it. JSON bodies
//! everywhere except preview (binary response) and upload (multipart request);
//! any non-2xx status is the uniform failure signal, with an optional `error`
//! field carrying detail.

use async_trait::async_trait;
use imirror_common::models::{
    CleanupReport, Context, InterviewMessage, MediaItem, PhotographerSummary,
};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "iMirror/0.1.0 (gallery service)";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Media API client errors
#[derive(Debug, Error)]
pub enum MediaApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Media item not found: {0}")]
    NotFound(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// One file in an upload batch, already read into memory
#[derive(Debug, Clone)]
pub struct UploadPart {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Optional batch-level details attached to an upload
#[derive(Debug, Clone, Default)]
pub struct BatchDetails {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Seam between the controllers and the HTTP backend.
///
/// Implemented by [`MediaApiClient`] for production and by in-memory stubs
/// in the integration tests.
#[async_trait]
pub trait MediaApi: Send + Sync {
    async fn list_media(&self) -> Result<Vec<MediaItem>, MediaApiError>;
    async fn get_media(&self, media_id: &str) -> Result<MediaItem, MediaApiError>;
    /// Fetch the preview image bytes for one item
    async fn get_preview(&self, media_id: &str) -> Result<Vec<u8>, MediaApiError>;
    async fn update_title(&self, media_id: &str, title: &str) -> Result<MediaItem, MediaApiError>;
    async fn update_summary(
        &self,
        media_id: &str,
        summary: &str,
    ) -> Result<MediaItem, MediaApiError>;
    /// Full-replace semantics: the given list becomes the item's tag set
    async fn update_tags(
        &self,
        media_id: &str,
        tags: &[String],
    ) -> Result<MediaItem, MediaApiError>;
    async fn delete_media(&self, media_id: &str) -> Result<(), MediaApiError>;
    /// Drop every record whose backing file is gone
    async fn cleanup_missing(&self) -> Result<CleanupReport, MediaApiError>;
    async fn generate_summary(
        &self,
        media_id: &str,
        model: Option<&str>,
    ) -> Result<String, MediaApiError>;
    async fn generate_tags(
        &self,
        media_id: &str,
        model: Option<&str>,
    ) -> Result<Vec<String>, MediaApiError>;
    /// Tag every item with its capture year; returns how many were updated
    async fn generate_year_tags(&self) -> Result<usize, MediaApiError>;
    /// Submit a whole batch as one multipart request. The result list is
    /// positional: outcome i belongs to part i, `None` marking a per-file
    /// failure inside an otherwise successful batch.
    async fn upload_batch(
        &self,
        parts: Vec<UploadPart>,
        details: &BatchDetails,
    ) -> Result<Vec<Option<MediaItem>>, MediaApiError>;
    async fn list_contexts(&self, media_id: &str) -> Result<Vec<Context>, MediaApiError>;
    async fn add_context(
        &self,
        media_id: &str,
        text: &str,
        context_type: Option<&str>,
    ) -> Result<Context, MediaApiError>;
    async fn update_context(
        &self,
        media_id: &str,
        context_id: &str,
        text: &str,
    ) -> Result<Context, MediaApiError>;
    async fn delete_context(&self, media_id: &str, context_id: &str)
        -> Result<(), MediaApiError>;
    /// AI photographer summary over every photo carrying a tag
    async fn photographer_summary(
        &self,
        tag: &str,
        model: Option<&str>,
    ) -> Result<PhotographerSummary, MediaApiError>;
    /// Free-form follow-up conversation with the AI photographer about a tag
    async fn photographer_conversation(
        &self,
        tag: &str,
        history: &[InterviewMessage],
        message: &str,
        model: Option<&str>,
    ) -> Result<String, MediaApiError>;
    async fn interview_start(
        &self,
        media_id: &str,
        model: Option<&str>,
    ) -> Result<Vec<InterviewMessage>, MediaApiError>;
    async fn interview_chat(
        &self,
        media_id: &str,
        history: &[InterviewMessage],
        message: &str,
        model: Option<&str>,
    ) -> Result<Vec<InterviewMessage>, MediaApiError>;
    /// Persist a transcript as a context; returns the new context id
    async fn interview_save(
        &self,
        media_id: &str,
        transcript: &[InterviewMessage],
    ) -> Result<String, MediaApiError>;
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    media_items: Vec<MediaItem>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    #[serde(default)]
    uploaded_items: Vec<Option<MediaItem>>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSummary {
    summary: String,
}

#[derive(Debug, Deserialize)]
struct GeneratedTags {
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct YearTagsResponse {
    #[serde(default)]
    items_updated: usize,
}

#[derive(Debug, Deserialize)]
struct ContextsResponse {
    #[serde(default)]
    contexts: Vec<Context>,
}

#[derive(Debug, Deserialize)]
struct InterviewMessages {
    #[serde(default)]
    messages: Vec<InterviewMessage>,
}

#[derive(Debug, Deserialize)]
struct SavedContext {
    context_id: String,
}

#[derive(Debug, Deserialize)]
struct ConversationReply {
    response: String,
}

/// Reqwest-backed Media API client
pub struct MediaApiClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl MediaApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, MediaApiError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| MediaApiError::Network(e.to_string()))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http_client, base_url })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Convert any non-2xx response into a MediaApiError, pulling the
    /// backend's `error` field out of the body when present
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, MediaApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let code = status.as_u16();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        Err(MediaApiError::Api(code, message))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, MediaApiError> {
        let response = self
            .http_client
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| MediaApiError::Network(e.to_string()))?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| MediaApiError::Parse(e.to_string()))
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<T, MediaApiError> {
        let response = self
            .http_client
            .request(method, self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| MediaApiError::Network(e.to_string()))?;
        let response = Self::check(response).await?;
        response
            .json()
            .await
            .map_err(|e| MediaApiError::Parse(e.to_string()))
    }
}

/// Map an upstream 404 onto the typed not-found error for the given id
fn map_missing(err: MediaApiError, media_id: &str) -> MediaApiError {
    match err {
        MediaApiError::Api(404, _) => MediaApiError::NotFound(media_id.to_string()),
        other => other,
    }
}

#[async_trait]
impl MediaApi for MediaApiClient {
    async fn list_media(&self) -> Result<Vec<MediaItem>, MediaApiError> {
        let body: ListResponse = self.get_json("/media-items").await?;
        Ok(body.media_items)
    }

    async fn get_media(&self, media_id: &str) -> Result<MediaItem, MediaApiError> {
        self.get_json(&format!("/media-items/{media_id}"))
            .await
            .map_err(|e| map_missing(e, media_id))
    }

    async fn get_preview(&self, media_id: &str) -> Result<Vec<u8>, MediaApiError> {
        let response = self
            .http_client
            .get(self.url(&format!("/media-items/{media_id}/preview")))
            .send()
            .await
            .map_err(|e| MediaApiError::Network(e.to_string()))?;
        let response = Self::check(response)
            .await
            .map_err(|e| map_missing(e, media_id))?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| MediaApiError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn update_title(&self, media_id: &str, title: &str) -> Result<MediaItem, MediaApiError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/media-items/{media_id}/title"),
            &json!({ "title": title }),
        )
        .await
        .map_err(|e| map_missing(e, media_id))
    }

    async fn update_summary(
        &self,
        media_id: &str,
        summary: &str,
    ) -> Result<MediaItem, MediaApiError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/media-items/{media_id}/summary"),
            &json!({ "summary": summary }),
        )
        .await
        .map_err(|e| map_missing(e, media_id))
    }

    async fn update_tags(
        &self,
        media_id: &str,
        tags: &[String],
    ) -> Result<MediaItem, MediaApiError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/media-items/{media_id}/tags"),
            &json!({ "tags": tags }),
        )
        .await
        .map_err(|e| map_missing(e, media_id))
    }

    async fn delete_media(&self, media_id: &str) -> Result<(), MediaApiError> {
        let response = self
            .http_client
            .delete(self.url(&format!("/media-items/{media_id}")))
            .send()
            .await
            .map_err(|e| MediaApiError::Network(e.to_string()))?;
        Self::check(response)
            .await
            .map_err(|e| map_missing(e, media_id))?;
        Ok(())
    }

    async fn cleanup_missing(&self) -> Result<CleanupReport, MediaApiError> {
        self.send_json(
            reqwest::Method::POST,
            "/media-items/cleanup-missing",
            &json!({}),
        )
        .await
    }

    async fn generate_summary(
        &self,
        media_id: &str,
        model: Option<&str>,
    ) -> Result<String, MediaApiError> {
        let body: GeneratedSummary = self
            .send_json(
                reqwest::Method::POST,
                &format!("/media-items/{media_id}/generate-summary"),
                &json!({ "model": model }),
            )
            .await
            .map_err(|e| map_missing(e, media_id))?;
        Ok(body.summary)
    }

    async fn generate_tags(
        &self,
        media_id: &str,
        model: Option<&str>,
    ) -> Result<Vec<String>, MediaApiError> {
        let body: GeneratedTags = self
            .send_json(
                reqwest::Method::POST,
                &format!("/media-items/{media_id}/generate-tags"),
                &json!({ "model": model }),
            )
            .await
            .map_err(|e| map_missing(e, media_id))?;
        Ok(body.tags)
    }

    async fn generate_year_tags(&self) -> Result<usize, MediaApiError> {
        let body: YearTagsResponse = self
            .send_json(
                reqwest::Method::POST,
                "/media-items/generate-year-tags",
                &json!({}),
            )
            .await?;
        Ok(body.items_updated)
    }

    async fn upload_batch(
        &self,
        parts: Vec<UploadPart>,
        details: &BatchDetails,
    ) -> Result<Vec<Option<MediaItem>>, MediaApiError> {
        let mut form = reqwest::multipart::Form::new();
        for part in parts {
            let file_part = reqwest::multipart::Part::bytes(part.bytes)
                .file_name(part.filename)
                .mime_str(&part.content_type)
                .map_err(|e| MediaApiError::Parse(e.to_string()))?;
            form = form.part("files", file_part);
        }
        if let Some(name) = &details.name {
            form = form.text("name", name.clone());
        }
        if let Some(description) = &details.description {
            form = form.text("description", description.clone());
        }

        let response = self
            .http_client
            .post(self.url("/media-items/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaApiError::Network(e.to_string()))?;
        let response = Self::check(response).await?;
        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaApiError::Parse(e.to_string()))?;
        Ok(body.uploaded_items)
    }

    async fn list_contexts(&self, media_id: &str) -> Result<Vec<Context>, MediaApiError> {
        let body: ContextsResponse = self
            .get_json(&format!("/media-items/{media_id}/contexts"))
            .await
            .map_err(|e| map_missing(e, media_id))?;
        Ok(body.contexts)
    }

    async fn add_context(
        &self,
        media_id: &str,
        text: &str,
        context_type: Option<&str>,
    ) -> Result<Context, MediaApiError> {
        self.send_json(
            reqwest::Method::POST,
            &format!("/media-items/{media_id}/contexts"),
            &json!({ "text": text, "context_type": context_type }),
        )
        .await
        .map_err(|e| map_missing(e, media_id))
    }

    async fn update_context(
        &self,
        media_id: &str,
        context_id: &str,
        text: &str,
    ) -> Result<Context, MediaApiError> {
        self.send_json(
            reqwest::Method::PUT,
            &format!("/media-items/{media_id}/contexts/{context_id}"),
            &json!({ "text": text }),
        )
        .await
        .map_err(|e| map_missing(e, media_id))
    }

    async fn delete_context(
        &self,
        media_id: &str,
        context_id: &str,
    ) -> Result<(), MediaApiError> {
        let response = self
            .http_client
            .delete(self.url(&format!("/media-items/{media_id}/contexts/{context_id}")))
            .send()
            .await
            .map_err(|e| MediaApiError::Network(e.to_string()))?;
        Self::check(response)
            .await
            .map_err(|e| map_missing(e, media_id))?;
        Ok(())
    }

    async fn photographer_summary(
        &self,
        tag: &str,
        model: Option<&str>,
    ) -> Result<PhotographerSummary, MediaApiError> {
        tracing::debug!(tag = %tag, "Requesting AI photographer summary");
        self.send_json(
            reqwest::Method::POST,
            "/ai-photographer/summary",
            &json!({ "tag": tag, "model": model }),
        )
        .await
    }

    async fn photographer_conversation(
        &self,
        tag: &str,
        history: &[InterviewMessage],
        message: &str,
        model: Option<&str>,
    ) -> Result<String, MediaApiError> {
        let body: ConversationReply = self
            .send_json(
                reqwest::Method::POST,
                "/ai-photographer/conversation",
                &json!({ "tag": tag, "messages": history, "message": message, "model": model }),
            )
            .await?;
        Ok(body.response)
    }

    async fn interview_start(
        &self,
        media_id: &str,
        model: Option<&str>,
    ) -> Result<Vec<InterviewMessage>, MediaApiError> {
        let body: InterviewMessages = self
            .send_json(
                reqwest::Method::POST,
                &format!("/media-items/{media_id}/interview/start"),
                &json!({ "model": model }),
            )
            .await
            .map_err(|e| map_missing(e, media_id))?;
        Ok(body.messages)
    }

    async fn interview_chat(
        &self,
        media_id: &str,
        history: &[InterviewMessage],
        message: &str,
        model: Option<&str>,
    ) -> Result<Vec<InterviewMessage>, MediaApiError> {
        let body: InterviewMessages = self
            .send_json(
                reqwest::Method::POST,
                &format!("/media-items/{media_id}/interview/chat"),
                &json!({ "messages": history, "message": message, "model": model }),
            )
            .await
            .map_err(|e| map_missing(e, media_id))?;
        Ok(body.messages)
    }

    async fn interview_save(
        &self,
        media_id: &str,
        transcript: &[InterviewMessage],
    ) -> Result<String, MediaApiError> {
        let body: SavedContext = self
            .send_json(
                reqwest::Method::POST,
                &format!("/media-items/{media_id}/interview/save"),
                &json!({ "messages": transcript }),
            )
            .await
            .map_err(|e| map_missing(e, media_id))?;
        Ok(body.context_id)
    }
}
