//! Normalized input events.
//!
//! Everything the user hands the agent — typed text, a dropped file, an
//! audio buffer, a video clip — is normalized into one `InputEvent` shape
//! carrying the raw bytes plus a loosely-typed metadata bag. Consumers must
//! tolerate missing metadata keys; which keys are present depends on the
//! kind and on which extraction collaborators were available.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The detected media category of an input source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKind {
    Text,
    Audio,
    Video,
    File,
    Image,
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Audio => "audio",
            Self::Video => "video",
            Self::File => "file",
            Self::Image => "image",
        };
        write!(f, "{s}")
    }
}

/// A normalized piece of user-supplied media, immutable once constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputEvent {
    /// Unique event ID
    pub id: Uuid,

    /// Detected media category
    pub kind: InputKind,

    /// Raw payload bytes
    pub content: Vec<u8>,

    /// Open key/value bag: filename, file_size, image_width, duration_secs...
    /// Required keys vary by `kind`; consumers tolerate absence.
    pub metadata: serde_json::Map<String, serde_json::Value>,

    /// When this event was constructed
    pub created_at: DateTime<Utc>,
}

impl InputEvent {
    pub fn new(
        kind: InputKind,
        content: Vec<u8>,
        metadata: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            content,
            metadata,
            created_at: Utc::now(),
        }
    }

    /// Build a text event straight from a string.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut metadata = serde_json::Map::new();
        metadata.insert("text".into(), serde_json::Value::String(text.clone()));
        Self::new(InputKind::Text, text.into_bytes(), metadata)
    }

    /// Fetch a metadata value as a string, if present and string-typed.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// Fetch a metadata value as a u64, if present and numeric.
    pub fn meta_u64(&self, key: &str) -> Option<u64> {
        self.metadata.get(key).and_then(|v| v.as_u64())
    }
}
