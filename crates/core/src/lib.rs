//! # oxidesk Core
//!
//! Domain types, traits, and error definitions for the oxidesk agent
//! runtime. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem seam is a trait here (`LlmEndpoint`, `Tool`).
//! Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with scripted/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod endpoint;
pub mod error;
pub mod input_event;
pub mod message;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use endpoint::{LlmEndpoint, StreamDelta};
pub use error::{ClientError, ConfigError, Error, InputError, Result};
pub use input_event::{InputEvent, InputKind};
pub use message::{Conversation, ConversationId, Message, Role};
pub use tool::{Tool, ToolParams, ToolRegistry, ToolResult};
