//! HTTP facade routes

mod contexts;
mod gallery;
mod health;
mod interview;
mod sse;
mod summary;
mod upload;

pub use contexts::context_routes;
pub use gallery::gallery_routes;
pub use health::health_routes;
pub use interview::interview_routes;
pub use sse::event_stream;
pub use summary::summary_routes;
pub use upload::upload_routes;
