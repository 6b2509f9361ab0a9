//! The input normalizer — heterogeneous media in, uniform events out.
//!
//! `normalize_*` builds an `InputEvent` from a raw source, rejecting only
//! sources that cannot be read at all or exceed the size ceiling. `render`
//! turns an event into the text the agent reasons over, delegating deep
//! extraction (speech-to-text, image/video inspection) to optional
//! collaborators and degrading to best-effort descriptions when they are
//! absent.

use std::path::Path;
use std::sync::Arc;

use oxidesk_core::error::InputError;
use oxidesk_core::input_event::{InputEvent, InputKind};
use serde_json::Value;
use tracing::{debug, warn};

use crate::file;
use crate::media::{MediaInspector, Transcriber};
use crate::text::decode_text;

/// Default size ceiling for input sources (100 MB, matching the file
/// validation limit of the desktop surface).
pub const DEFAULT_MAX_SOURCE_BYTES: u64 = 100 * 1024 * 1024;

pub struct InputNormalizer {
    transcriber: Option<Arc<dyn Transcriber>>,
    inspector: Option<Arc<dyn MediaInspector>>,
    max_source_bytes: u64,
}

impl InputNormalizer {
    pub fn new() -> Self {
        Self {
            transcriber: None,
            inspector: None,
            max_source_bytes: DEFAULT_MAX_SOURCE_BYTES,
        }
    }

    /// Attach a speech-to-text collaborator.
    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Attach an image/video metadata collaborator.
    pub fn with_inspector(mut self, inspector: Arc<dyn MediaInspector>) -> Self {
        self.inspector = Some(inspector);
        self
    }

    /// Override the source size ceiling.
    pub fn with_max_source_bytes(mut self, limit: u64) -> Self {
        self.max_source_bytes = limit;
        self
    }

    /// Normalize plain text. Never fails.
    pub fn normalize_text(&self, text: impl Into<String>) -> InputEvent {
        InputEvent::text(text)
    }

    /// Normalize a file-system source into an `InputEvent`.
    ///
    /// Fails with `UnreadableSource` when the path does not name a readable
    /// file and with `TooLarge` when it exceeds the size ceiling; both are
    /// checked before any content processing begins.
    pub async fn normalize_file(&self, path: &Path) -> Result<InputEvent, InputError> {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| InputError::UnreadableSource(format!("{}: {e}", path.display())))?;

        if !meta.is_file() {
            return Err(InputError::UnreadableSource(format!(
                "{}: not a regular file",
                path.display()
            )));
        }

        if meta.len() > self.max_source_bytes {
            return Err(InputError::TooLarge {
                size: meta.len(),
                limit: self.max_source_bytes,
            });
        }

        let content = tokio::fs::read(path)
            .await
            .map_err(|e| InputError::UnreadableSource(format!("{}: {e}", path.display())))?;

        let kind = file::detect_kind(path);
        let mut metadata = serde_json::Map::new();
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            metadata.insert("filename".into(), name.into());
        }
        metadata.insert("file_size".into(), (content.len() as u64).into());
        metadata.insert("file_path".into(), path.display().to_string().into());
        if let Some(format) = file::declared_format(path) {
            metadata.insert("file_type".into(), format.clone().into());
            match kind {
                InputKind::Audio => {
                    metadata.insert("audio_format".into(), format.into());
                }
                InputKind::Video => {
                    metadata.insert("video_format".into(), format.into());
                }
                _ => {}
            }
        }

        match kind {
            InputKind::Text => {
                if let Some(text) = decode_text(&content) {
                    metadata.insert("text_content".into(), text.into());
                }
                // A text event from a file still travels as File so the
                // filename context is preserved downstream.
                Ok(InputEvent::new(InputKind::File, content, metadata))
            }
            InputKind::Image => {
                metadata.insert(
                    "image_format".into(),
                    file::detect_image_format(&content).into(),
                );
                if let Some(inspector) = &self.inspector {
                    match inspector.inspect(&content).await {
                        Ok(extra) => metadata.extend(extra),
                        Err(e) => warn!(error = %e, "Image inspection failed, keeping best-effort metadata"),
                    }
                }
                Ok(InputEvent::new(InputKind::Image, content, metadata))
            }
            InputKind::File if file::is_pdf(path) => {
                metadata.insert(
                    "text_content".into(),
                    format!("[PDF Document - {} bytes]", content.len()).into(),
                );
                Ok(InputEvent::new(InputKind::File, content, metadata))
            }
            other => Ok(InputEvent::new(other, content, metadata)),
        }
    }

    /// Normalize a batch of paths, skipping sources that fail and logging
    /// why; one bad file never sinks the rest.
    pub async fn normalize_files(&self, paths: &[&Path]) -> Vec<InputEvent> {
        let mut events = Vec::with_capacity(paths.len());
        for path in paths {
            match self.normalize_file(path).await {
                Ok(event) => events.push(event),
                Err(e) => warn!(path = %path.display(), error = %e, "Failed to normalize file"),
            }
        }
        events
    }

    /// Turn an event into the uniform text the agent reasons over.
    pub async fn render(&self, event: &InputEvent) -> Result<String, InputError> {
        debug!(kind = %event.kind, event_id = %event.id, "Rendering input event");

        match event.kind {
            InputKind::Text => self.render_text(event),
            InputKind::Audio => Ok(self.render_audio(event).await),
            InputKind::Video => Ok(self.render_video(event).await),
            InputKind::File | InputKind::Image => Ok(self.render_file(event)),
        }
    }

    fn render_text(&self, event: &InputEvent) -> Result<String, InputError> {
        if let Some(text) = event.meta_str("text") {
            return Ok(text.to_string());
        }
        decode_text(&event.content)
            .ok_or_else(|| InputError::ExtractionFailed("unable to decode text content".into()))
    }

    async fn render_audio(&self, event: &InputEvent) -> String {
        if let Some(transcriber) = &self.transcriber {
            match transcriber.transcribe(&event.content).await {
                Ok(transcript) => return transcript,
                Err(e) => {
                    warn!(error = %e, "Transcription failed, degrading to description");
                }
            }
        }
        self.describe(event, "Audio file", &[("audio_format", "Format")])
    }

    async fn render_video(&self, event: &InputEvent) -> String {
        let mut extra: Vec<(String, Value)> = Vec::new();
        if let Some(inspector) = &self.inspector {
            match inspector.inspect(&event.content).await {
                Ok(map) => extra.extend(map),
                Err(e) => {
                    warn!(error = %e, "Video inspection failed, degrading to description");
                }
            }
        }

        let mut description =
            self.describe(event, "Video file", &[("video_format", "Format")]);
        if let Some(duration) = extra
            .iter()
            .find(|(k, _)| k == "duration_secs")
            .and_then(|(_, v)| v.as_f64())
        {
            description.push_str(&format!(" Duration: {duration:.1}s"));
        }
        description
    }

    fn render_file(&self, event: &InputEvent) -> String {
        // Decoded text content wins over any description.
        if let Some(text) = event.meta_str("text_content") {
            return text.to_string();
        }

        if event.kind == InputKind::Image {
            let mut description = self.describe(event, "Image file", &[]);
            if let (Some(w), Some(h)) = (
                event.meta_u64("image_width"),
                event.meta_u64("image_height"),
            ) {
                description.push_str(&format!(" ({w}x{h})"));
            }
            if let Some(format) = event.meta_str("image_format") {
                description.push_str(&format!(" Format: {format}"));
            }
            if let Some(size) = event.meta_u64("file_size") {
                description.push_str(&format!(" Size: {}", file::format_size(size)));
            }
            return description;
        }

        let mut description = self.describe(event, "File", &[("file_type", "Type")]);
        if let Some(size) = event.meta_u64("file_size") {
            description.push_str(&format!(" Size: {}", file::format_size(size)));
        }
        description
    }

    /// Shared description prefix: label, filename, then labeled metadata
    /// keys that happen to be present.
    fn describe(&self, event: &InputEvent, label: &str, keys: &[(&str, &str)]) -> String {
        let mut description = format!("{label}: ");
        if let Some(name) = event.meta_str("filename") {
            description.push_str(name);
        }
        for (key, display) in keys {
            if let Some(value) = event.meta_str(key) {
                description.push_str(&format!(" {display}: {value}"));
            }
        }
        description
    }

    /// Basic per-kind sanity check, mirroring the validation the desktop
    /// surface runs before handing events over.
    pub fn validate_event(&self, event: &InputEvent) -> bool {
        if event.content.is_empty() {
            return false;
        }

        match event.kind {
            InputKind::Text => event.meta_str("text").is_some(),
            InputKind::File | InputKind::Image => event.meta_str("filename").is_some(),
            InputKind::Audio | InputKind::Video => true,
        }
    }
}

impl Default for InputNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
