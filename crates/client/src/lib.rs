//! LLM endpoint client implementation for oxidesk.
//!
//! `AnthropicClient` speaks the Anthropic Messages API over HTTPS, in both
//! streaming (SSE) and single-envelope modes. It implements the
//! `LlmEndpoint` trait from `oxidesk-core`, so the orchestrator never
//! depends on this crate directly.

pub mod anthropic;

pub use anthropic::AnthropicClient;
