//! Multi-modal input normalization for oxidesk.
//!
//! Converts heterogeneous raw media — typed text, dropped files, audio and
//! video buffers — into uniform `InputEvent`s the agent can reason over.
//! Deep extraction (speech-to-text, media inspection) is delegated to
//! collaborator traits; when a collaborator is unavailable the pipeline
//! degrades to best-effort metadata instead of failing.

pub mod file;
pub mod media;
pub mod normalizer;
pub mod text;

pub use media::{MediaInspector, Transcriber};
pub use normalizer::{DEFAULT_MAX_SOURCE_BYTES, InputNormalizer};
