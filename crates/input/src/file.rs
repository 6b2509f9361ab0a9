//! File kind detection and format sniffing.

use oxidesk_core::input_event::InputKind;
use std::path::Path;

pub const TEXT_EXTENSIONS: &[&str] = &[
    "txt", "md", "json", "xml", "html", "htm", "rtf", "toml", "yaml", "yml", "csv", "log", "rs",
    "py", "js", "ts", "sh", "c", "h", "cpp",
];

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "heic", "webp"];

pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "m4a", "aac", "aiff", "flac", "ogg"];

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "avi", "mkv", "webm"];

/// Classify a path into a media kind by its extension. Anything
/// unrecognized is a generic file.
pub fn detect_kind(path: &Path) -> InputKind {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let ext = ext.as_str();

    if TEXT_EXTENSIONS.contains(&ext) {
        InputKind::Text
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        InputKind::Image
    } else if AUDIO_EXTENSIONS.contains(&ext) {
        InputKind::Audio
    } else if VIDEO_EXTENSIONS.contains(&ext) {
        InputKind::Video
    } else {
        InputKind::File
    }
}

/// Whether the extension names a declared-text format worth decoding.
pub fn is_text_like(path: &Path) -> bool {
    detect_kind(path) == InputKind::Text
}

/// Whether the file is a PDF by extension (content gets a byte-count
/// placeholder instead of a decode attempt).
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Sniff an image format from its leading magic bytes.
pub fn detect_image_format(bytes: &[u8]) -> &'static str {
    if bytes.len() < 4 {
        return "Unknown";
    }

    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        "JPEG"
    } else if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
        "PNG"
    } else if bytes.starts_with(&[0x47, 0x49, 0x46, 0x38]) {
        "GIF"
    } else if bytes.starts_with(&[0x42, 0x4D]) {
        "BMP"
    } else {
        "Unknown"
    }
}

/// Declared format from the extension, uppercased ("MP3", "MOV"...).
pub fn declared_format(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_uppercase())
}

/// Render a byte count for humans: "512 bytes", "2.0 KB", "1.4 MB".
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} bytes")
    }
}
