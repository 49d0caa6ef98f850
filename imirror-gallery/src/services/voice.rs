//! Voice capture/playback abstraction
//!
//! The engine never talks to audio hardware directly; a platform plugs in a
//! `VoiceIo` implementation, and every voice feature degrades gracefully
//! when none is available. Capture and playback are mutually exclusive per
//! session: starting one stops the other.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Voice capture failed: {0}")]
    Capture(String),

    #[error("Voice playback failed: {0}")]
    Playback(String),

    #[error("Voice session cancelled")]
    Cancelled,
}

/// Platform voice capability
#[async_trait]
pub trait VoiceIo: Send + Sync {
    /// Speak a piece of text; resolves when playback completes or is stopped
    async fn speak(&self, text: &str) -> Result<(), VoiceError>;
    /// Capture one utterance and return its transcription
    async fn capture(&self) -> Result<String, VoiceError>;
    /// Stop whatever is currently playing or capturing
    fn stop(&self);
}

/// Result of probing for voice support at startup. Callers branch on this
/// instead of discovering mid-session that voice is unavailable.
#[derive(Clone)]
pub enum VoiceSupport {
    Supported(Arc<dyn VoiceIo>),
    Unsupported,
}

impl VoiceSupport {
    /// No platform backend ships with the engine itself
    pub fn detect() -> Self {
        VoiceSupport::Unsupported
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, VoiceSupport::Supported(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VoiceMode {
    Idle,
    Capturing,
    Speaking,
}

/// Serializes capture and playback for one interview session
pub struct VoiceSession {
    io: Arc<dyn VoiceIo>,
    mode: Mutex<VoiceMode>,
    cancel: CancellationToken,
}

impl VoiceSession {
    pub fn new(io: Arc<dyn VoiceIo>) -> Self {
        Self {
            io,
            mode: Mutex::new(VoiceMode::Idle),
            cancel: CancellationToken::new(),
        }
    }

    pub async fn speak(&self, text: &str) -> Result<(), VoiceError> {
        self.begin(VoiceMode::Speaking).await?;
        let result = tokio::select! {
            _ = self.cancel.cancelled() => Err(VoiceError::Cancelled),
            result = self.io.speak(text) => result,
        };
        self.finish().await;
        result
    }

    pub async fn capture(&self) -> Result<String, VoiceError> {
        self.begin(VoiceMode::Capturing).await?;
        let result = tokio::select! {
            _ = self.cancel.cancelled() => Err(VoiceError::Cancelled),
            result = self.io.capture() => result,
        };
        self.finish().await;
        result
    }

    async fn begin(&self, next: VoiceMode) -> Result<(), VoiceError> {
        if self.cancel.is_cancelled() {
            return Err(VoiceError::Cancelled);
        }
        let mut mode = self.mode.lock().await;
        if *mode != VoiceMode::Idle {
            debug!(current = ?*mode, ?next, "Stopping active voice mode before switching");
            self.io.stop();
        }
        *mode = next;
        Ok(())
    }

    async fn finish(&self) {
        *self.mode.lock().await = VoiceMode::Idle;
    }

    /// Tear the session down; any in-flight speak/capture resolves cancelled
    /// and nothing can start afterwards
    pub fn teardown(&self) {
        self.cancel.cancel();
        self.io.stop();
    }
}
