//! Collaborator traits for deep media extraction.
//!
//! Speech-to-text and image/video inspection are platform capabilities, not
//! part of this core. They appear here only as trait seams; the normalizer
//! degrades to best-effort metadata when a collaborator is absent.

use async_trait::async_trait;
use oxidesk_core::error::InputError;

/// Converts an audio buffer into text.
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, InputError>;
}

/// Extracts metadata (dimensions, duration, codec...) from image or video
/// bytes. Returned keys are merged into the event's metadata bag.
#[async_trait]
pub trait MediaInspector: Send + Sync {
    async fn inspect(
        &self,
        bytes: &[u8],
    ) -> Result<serde_json::Map<String, serde_json::Value>, InputError>;
}
