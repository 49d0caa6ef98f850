//! Gallery list authority and filtering
//!
//! The backend record is the single source of truth: every mutation goes
//! through the Media API and is followed by a full reload rather than a
//! local patch. This controller owns the loaded item list, the view filters,
//! and the set of records whose files turned out to be missing.

use super::media_client::{MediaApi, MediaApiError};
use imirror_common::events::{EventBus, GalleryEvent};
use imirror_common::models::{CleanupReport, MediaItem};
use imirror_common::tags::normalize_tag;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Current view filters
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct GalleryFilters {
    pub search: String,
    /// Single-select: at most one tag; selecting another replaces it
    pub selected_tags: Vec<String>,
}

pub struct GalleryController {
    api: Arc<dyn MediaApi>,
    event_bus: EventBus,
    items: RwLock<Vec<MediaItem>>,
    filters: RwLock<GalleryFilters>,
    missing: RwLock<HashSet<String>>,
}

impl GalleryController {
    pub fn new(api: Arc<dyn MediaApi>, event_bus: EventBus) -> Self {
        Self {
            api,
            event_bus,
            items: RwLock::new(Vec::new()),
            filters: RwLock::new(GalleryFilters::default()),
            missing: RwLock::new(HashSet::new()),
        }
    }

    /// Replace the item list with a fresh load from the backend
    pub async fn reload(&self) -> Result<usize, MediaApiError> {
        let fresh = self.api.list_media().await?;
        let count = fresh.len();
        {
            let mut items = self.items.write().await;
            *items = fresh;
            // Forget missing marks for records that no longer exist
            let ids: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();
            self.missing
                .write()
                .await
                .retain(|id| ids.contains(id.as_str()));
        }
        self.event_bus.emit_lossy(GalleryEvent::GalleryReloaded {
            item_count: count,
            timestamp: Utc::now(),
        });
        Ok(count)
    }

    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }

    /// Toggle tag selection with replace-not-add semantics; returns the
    /// resulting selection (empty or a single tag)
    pub async fn toggle_tag(&self, tag: &str) -> Vec<String> {
        let tag = normalize_tag(tag);
        let mut filters = self.filters.write().await;
        if filters.selected_tags.first().map(|t| t.as_str()) == Some(tag.as_str()) {
            filters.selected_tags.clear();
        } else {
            filters.selected_tags = vec![tag];
        }
        filters.selected_tags.clone()
    }

    pub async fn clear_tags(&self) -> Vec<String> {
        let mut filters = self.filters.write().await;
        filters.selected_tags.clear();
        filters.selected_tags.clone()
    }

    pub async fn set_search(&self, query: &str) {
        self.filters.write().await.search = query.to_string();
    }

    pub async fn filters(&self) -> GalleryFilters {
        self.filters.read().await.clone()
    }

    /// Record that an item's file could not be served; missing items sort
    /// to the end of the visible list
    pub async fn mark_missing(&self, media_id: &str) {
        self.missing.write().await.insert(media_id.to_string());
    }

    pub async fn is_missing(&self, media_id: &str) -> bool {
        self.missing.read().await.contains(media_id)
    }

    /// Items matching the current filters, missing-file records last
    pub async fn visible_items(&self) -> Vec<MediaItem> {
        let items = self.items.read().await;
        let filters = self.filters.read().await;
        let missing = self.missing.read().await;
        let needle = filters.search.trim().to_lowercase();

        let mut visible: Vec<MediaItem> = items
            .iter()
            .filter(|item| {
                let tag_ok = match filters.selected_tags.first() {
                    Some(tag) => item.has_tag(tag),
                    None => true,
                };
                let search_ok = needle.is_empty()
                    || item.filename.to_lowercase().contains(&needle)
                    || item
                        .title
                        .as_deref()
                        .is_some_and(|t| t.to_lowercase().contains(&needle))
                    || item
                        .summary
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&needle))
                    || item.tags.iter().any(|t| t.to_lowercase().contains(&needle));
                tag_ok && search_ok
            })
            .cloned()
            .collect();
        // Stable: false sorts before true, preserving backend order within
        // each group
        visible.sort_by_key(|item| missing.contains(&item.id));
        visible
    }

    /// Tag frequency index over all loaded items, most frequent first,
    /// alphabetical within equal counts
    pub async fn tag_index(&self) -> Vec<(String, usize)> {
        let items = self.items.read().await;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for item in items.iter() {
            for tag in &item.tags {
                *counts.entry(normalize_tag(tag)).or_insert(0) += 1;
            }
        }
        let mut index: Vec<(String, usize)> = counts.into_iter().collect();
        index.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        index
    }

    /// Remove a tag from every item carrying it, then reload. The tag
    /// disappears from the global list because no item references it
    /// anymore; the tag list is always derived, never stored.
    pub async fn delete_tag_everywhere(&self, tag: &str) -> Result<usize, MediaApiError> {
        let tag = normalize_tag(tag);
        let carriers: Vec<(String, Vec<String>)> = {
            let items = self.items.read().await;
            items
                .iter()
                .filter(|item| item.has_tag(&tag))
                .map(|item| {
                    let kept: Vec<String> = item
                        .tags
                        .iter()
                        .filter(|t| normalize_tag(t) != tag)
                        .cloned()
                        .collect();
                    (item.id.clone(), kept)
                })
                .collect()
        };

        for (media_id, kept) in &carriers {
            self.api.update_tags(media_id, kept).await?;
        }
        let updated = carriers.len();

        {
            let mut filters = self.filters.write().await;
            filters.selected_tags.retain(|t| *t != tag);
        }
        self.reload().await?;

        info!(tag = %tag, items_updated = updated, "Tag deleted from all items");
        self.event_bus.emit_lossy(GalleryEvent::TagDeleted {
            tag,
            items_updated: updated,
            timestamp: Utc::now(),
        });
        Ok(updated)
    }

    pub async fn update_title(&self, media_id: &str, title: &str) -> Result<(), MediaApiError> {
        self.api.update_title(media_id, title).await?;
        self.reload().await?;
        Ok(())
    }

    pub async fn update_summary(&self, media_id: &str, summary: &str) -> Result<(), MediaApiError> {
        self.api.update_summary(media_id, summary).await?;
        self.reload().await?;
        Ok(())
    }

    /// Delete a record whose file has gone missing, then reload
    pub async fn remove_missing(&self, media_id: &str) -> Result<(), MediaApiError> {
        self.api.delete_media(media_id).await?;
        info!(media_id = %media_id, "Missing record removed");
        self.event_bus.emit_lossy(GalleryEvent::MediaRemoved {
            media_id: media_id.to_string(),
            timestamp: Utc::now(),
        });
        self.reload().await?;
        Ok(())
    }

    /// Ask the backend to drop every record whose file is gone, then reload
    pub async fn cleanup_missing(&self) -> Result<CleanupReport, MediaApiError> {
        let report = self.api.cleanup_missing().await?;
        info!(checked = report.checked, removed = report.removed, "Missing-file cleanup completed");
        self.event_bus
            .emit_lossy(GalleryEvent::MissingCleanupCompleted {
                checked: report.checked,
                removed: report.removed,
                timestamp: Utc::now(),
            });
        self.reload().await?;
        Ok(report)
    }

    /// Tag every item with its capture year on the backend, then reload
    pub async fn generate_year_tags(&self) -> Result<usize, MediaApiError> {
        let updated = self.api.generate_year_tags().await?;
        self.reload().await?;
        Ok(updated)
    }
}
