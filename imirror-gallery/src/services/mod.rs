//! Gallery service layer
//!
//! Controllers coordinating the Media API backend: list authority and
//! filtering, preview acquisition, batch uploads, AI summaries, interviews,
//! and the voice capability seam.

pub mod gallery;
pub mod interview;
pub mod media_client;
pub mod preview_loader;
pub mod tag_summary;
pub mod upload_pipeline;
pub mod voice;
