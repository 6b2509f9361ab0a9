//! Configuration loading and validation for oxidesk.
//!
//! Loads configuration from `~/.oxidesk/config.toml` with environment
//! variable overrides. Validates all settings at startup. The resulting
//! `AppConfig` is constructed once at process start and passed by handle
//! into the client, input normalizer, and orchestrator constructors — no
//! global singleton.

use oxidesk_core::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default Anthropic-style messages endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.anthropic.com";

/// The root configuration structure.
///
/// Maps directly to `~/.oxidesk/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the LLM endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the LLM endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum tokens per model response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Whether to stream responses (SSE) or fetch them in one shot
    #[serde(default = "default_stream")]
    pub stream: bool,

    /// Size ceiling for normalized input sources, in bytes
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,

    /// Override for the seeded system prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}
fn default_model() -> String {
    "claude-3-sonnet-20240229".into()
}
fn default_max_tokens() -> u32 {
    4000
}
fn default_stream() -> bool {
    true
}
fn default_max_input_bytes() -> u64 {
    100 * 1024 * 1024
}

/// Redact the API key for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("stream", &self.stream)
            .field("max_input_bytes", &self.max_input_bytes)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.oxidesk/config.toml).
    ///
    /// Also checks environment variables:
    /// - `OXIDESK_API_KEY` then `ANTHROPIC_API_KEY` for the credential
    /// - `OXIDESK_ENDPOINT` and `OXIDESK_MODEL` as overrides
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        config.apply_env(|key| std::env::var(key).ok());

        // Overrides can invalidate a config the file check accepted.
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through a lookup closure.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if self.api_key.is_none() {
            self.api_key = var("OXIDESK_API_KEY").or_else(|| var("ANTHROPIC_API_KEY"));
        }

        if let Some(endpoint) = var("OXIDESK_ENDPOINT") {
            self.endpoint = endpoint;
        }

        if let Some(model) = var("OXIDESK_MODEL") {
            self.model = model;
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: Self =
            toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".oxidesk")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.endpoint.trim().is_empty() {
            return Err(ConfigError::Invalid("endpoint must not be empty".into()));
        }

        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be > 0".into()));
        }

        if self.max_input_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_input_bytes must be > 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_endpoint(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            stream: default_stream(),
            max_input_bytes: default_max_input_bytes(),
            system_prompt: None,
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}
