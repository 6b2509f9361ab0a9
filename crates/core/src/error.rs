//! Error types for the oxidesk domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level `Error`
//! aggregates them for callers that don't care which layer failed.
//!
//! Tool failures are deliberately *not* here: per the in-band error policy,
//! a failing tool produces a `ToolResult` with `success: false` that is
//! folded into the conversation, never a thrown error.

use thiserror::Error;

/// The top-level error type for all oxidesk operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Client error: {0}")]
    Client(#[from] ClientError),

    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the streaming protocol client.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    #[error("No API key configured")]
    MissingApiKey,

    #[error("Response carried no body")]
    EmptyResponse,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("API request failed: {message} (status: {status})")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures of the input normalization pipeline.
///
/// These are the only errors surfaced to the caller during a turn — they
/// occur before any conversation state is touched.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("Source is not readable: {0}")]
    UnreadableSource(String),

    #[error("Unsupported input type: {0}")]
    UnsupportedType(String),

    #[error("Content extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("Source too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },
}

/// Configuration loading and validation failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
