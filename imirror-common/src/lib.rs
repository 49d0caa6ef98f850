//! # iMirror Common Library
//!
//! Shared code for the iMirror gallery services including:
//! - Media data model (items, contexts, interview transcripts)
//! - Event types (GalleryEvent enum) and EventBus
//! - Configuration loading
//! - Tag normalization and layout helpers

pub mod config;
pub mod error;
pub mod events;
pub mod models;
pub mod tags;

pub use error::{Error, Result};
