//! Shared test fixtures: an in-memory scripted Media API backend

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use imirror_common::models::{
    CleanupReport, Context, InterviewMessage, MediaItem, PhotographerSummary,
};
use imirror_gallery::services::media_client::{
    BatchDetails, MediaApi, MediaApiError, UploadPart,
};

/// Build a plain image item
pub fn media_item(id: &str, filename: &str, tags: &[&str]) -> MediaItem {
    MediaItem {
        id: id.to_string(),
        filename: filename.to_string(),
        file_path: format!("/media/{filename}"),
        title: None,
        summary: None,
        description: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        file_size: Some(1024),
        file_type: Some("image/jpeg".to_string()),
        created_at: None,
        updated_at: None,
        metadata: None,
        contexts: Vec::new(),
    }
}

/// Build a non-image item
pub fn text_item(id: &str) -> MediaItem {
    MediaItem {
        file_type: Some("text/plain".to_string()),
        ..media_item(id, &format!("{id}.txt"), &[])
    }
}

/// Scripted in-memory Media API. Result queues are consumed front to back;
/// a call with nothing scripted for it panics so tests fail loudly on
/// unexpected traffic.
#[derive(Default)]
pub struct StubMediaApi {
    pub items: Mutex<Vec<MediaItem>>,
    pub preview_results: Mutex<VecDeque<Result<Vec<u8>, MediaApiError>>>,
    pub preview_calls: AtomicUsize,
    pub upload_results: Mutex<VecDeque<Result<Vec<Option<MediaItem>>, MediaApiError>>>,
    pub upload_part_counts: Mutex<Vec<usize>>,
    pub summary_results: Mutex<VecDeque<Result<PhotographerSummary, MediaApiError>>>,
    pub summary_tags_seen: Mutex<Vec<String>>,
    pub updated_tags: Mutex<Vec<(String, Vec<String>)>>,
    pub deleted: Mutex<Vec<String>>,
    pub generate_summary_calls: AtomicUsize,
    pub generate_tags_calls: AtomicUsize,
    pub saved_transcripts: Mutex<Vec<(String, Vec<InterviewMessage>)>>,
    pub interview_script: Mutex<VecDeque<Vec<InterviewMessage>>>,
}

impl StubMediaApi {
    pub fn with_items(items: Vec<MediaItem>) -> Self {
        Self {
            items: Mutex::new(items),
            ..Self::default()
        }
    }

    pub fn script_preview(&self, result: Result<Vec<u8>, MediaApiError>) {
        self.preview_results.lock().unwrap().push_back(result);
    }

    pub fn script_upload(&self, result: Result<Vec<Option<MediaItem>>, MediaApiError>) {
        self.upload_results.lock().unwrap().push_back(result);
    }

    pub fn script_summary(&self, result: Result<PhotographerSummary, MediaApiError>) {
        self.summary_results.lock().unwrap().push_back(result);
    }

    pub fn script_interview(&self, messages: Vec<InterviewMessage>) {
        self.interview_script.lock().unwrap().push_back(messages);
    }
}

/// Convenience for handing the stub to controllers
pub fn stub(api: StubMediaApi) -> Arc<StubMediaApi> {
    Arc::new(api)
}

#[async_trait]
impl MediaApi for StubMediaApi {
    async fn list_media(&self) -> Result<Vec<MediaItem>, MediaApiError> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn get_media(&self, media_id: &str) -> Result<MediaItem, MediaApiError> {
        self.items
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == media_id)
            .cloned()
            .ok_or_else(|| MediaApiError::NotFound(media_id.to_string()))
    }

    async fn get_preview(&self, media_id: &str) -> Result<Vec<u8>, MediaApiError> {
        self.preview_calls.fetch_add(1, Ordering::SeqCst);
        self.preview_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected get_preview call for {media_id}"))
    }

    async fn update_title(&self, media_id: &str, title: &str) -> Result<MediaItem, MediaApiError> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|i| i.id == media_id)
            .ok_or_else(|| MediaApiError::NotFound(media_id.to_string()))?;
        item.title = Some(title.to_string());
        Ok(item.clone())
    }

    async fn update_summary(
        &self,
        media_id: &str,
        summary: &str,
    ) -> Result<MediaItem, MediaApiError> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|i| i.id == media_id)
            .ok_or_else(|| MediaApiError::NotFound(media_id.to_string()))?;
        item.summary = Some(summary.to_string());
        Ok(item.clone())
    }

    async fn update_tags(
        &self,
        media_id: &str,
        tags: &[String],
    ) -> Result<MediaItem, MediaApiError> {
        self.updated_tags
            .lock()
            .unwrap()
            .push((media_id.to_string(), tags.to_vec()));
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|i| i.id == media_id)
            .ok_or_else(|| MediaApiError::NotFound(media_id.to_string()))?;
        item.tags = tags.to_vec();
        Ok(item.clone())
    }

    async fn delete_media(&self, media_id: &str) -> Result<(), MediaApiError> {
        self.deleted.lock().unwrap().push(media_id.to_string());
        self.items.lock().unwrap().retain(|i| i.id != media_id);
        Ok(())
    }

    async fn cleanup_missing(&self) -> Result<CleanupReport, MediaApiError> {
        let checked = self.items.lock().unwrap().len();
        Ok(CleanupReport {
            checked,
            removed: 0,
            removed_ids: Vec::new(),
        })
    }

    async fn generate_summary(
        &self,
        _media_id: &str,
        _model: Option<&str>,
    ) -> Result<String, MediaApiError> {
        self.generate_summary_calls.fetch_add(1, Ordering::SeqCst);
        Ok("generated summary".to_string())
    }

    async fn generate_tags(
        &self,
        _media_id: &str,
        _model: Option<&str>,
    ) -> Result<Vec<String>, MediaApiError> {
        self.generate_tags_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec!["generated".to_string()])
    }

    async fn generate_year_tags(&self) -> Result<usize, MediaApiError> {
        Ok(0)
    }

    async fn upload_batch(
        &self,
        parts: Vec<UploadPart>,
        _details: &BatchDetails,
    ) -> Result<Vec<Option<MediaItem>>, MediaApiError> {
        self.upload_part_counts.lock().unwrap().push(parts.len());
        let outcome = self
            .upload_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected upload_batch call"));
        if let Ok(slots) = &outcome {
            let mut items = self.items.lock().unwrap();
            for item in slots.iter().flatten() {
                items.push(item.clone());
            }
        }
        outcome
    }

    async fn list_contexts(&self, media_id: &str) -> Result<Vec<Context>, MediaApiError> {
        Ok(self
            .get_media(media_id)
            .await
            .map(|item| item.contexts)
            .unwrap_or_default())
    }

    async fn add_context(
        &self,
        _media_id: &str,
        text: &str,
        context_type: Option<&str>,
    ) -> Result<Context, MediaApiError> {
        Ok(Context {
            id: "ctx-new".to_string(),
            text: text.to_string(),
            context_type: context_type.map(|t| t.to_string()),
            created_at: None,
            updated_at: None,
        })
    }

    async fn update_context(
        &self,
        _media_id: &str,
        context_id: &str,
        text: &str,
    ) -> Result<Context, MediaApiError> {
        Ok(Context {
            id: context_id.to_string(),
            text: text.to_string(),
            context_type: None,
            created_at: None,
            updated_at: None,
        })
    }

    async fn delete_context(
        &self,
        _media_id: &str,
        _context_id: &str,
    ) -> Result<(), MediaApiError> {
        Ok(())
    }

    async fn photographer_summary(
        &self,
        tag: &str,
        _model: Option<&str>,
    ) -> Result<PhotographerSummary, MediaApiError> {
        self.summary_tags_seen.lock().unwrap().push(tag.to_string());
        self.summary_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected photographer_summary call for {tag}"))
    }

    async fn photographer_conversation(
        &self,
        _tag: &str,
        _history: &[InterviewMessage],
        message: &str,
        _model: Option<&str>,
    ) -> Result<String, MediaApiError> {
        Ok(format!("about: {message}"))
    }

    async fn interview_start(
        &self,
        media_id: &str,
        _model: Option<&str>,
    ) -> Result<Vec<InterviewMessage>, MediaApiError> {
        self.interview_script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| panic!("unexpected interview_start call for {media_id}"))
    }

    async fn interview_chat(
        &self,
        media_id: &str,
        _history: &[InterviewMessage],
        _message: &str,
        _model: Option<&str>,
    ) -> Result<Vec<InterviewMessage>, MediaApiError> {
        self.interview_script
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| panic!("unexpected interview_chat call for {media_id}"))
    }

    async fn interview_save(
        &self,
        media_id: &str,
        transcript: &[InterviewMessage],
    ) -> Result<String, MediaApiError> {
        self.saved_transcripts
            .lock()
            .unwrap()
            .push((media_id.to_string(), transcript.to_vec()));
        Ok("ctx-saved".to_string())
    }
}
