//! The conversational agent runtime.
//!
//! Ties the rest of the workspace together into one loop: user input (or a
//! normalized input event) goes in, the full conversation history goes to
//! the LLM endpoint, the reply comes back — streamed or whole — and any
//! `@tool(...)` calls embedded in it are extracted, executed, and folded
//! back into the conversation as tool messages.
//!
//! [`Agent`] is the entry point. [`extract`] is the tool-call scanner, and
//! [`TurnEvent`] is the progress surface a UI subscribes to.

pub mod extractor;
pub mod orchestrator;
pub mod turn_event;

pub use extractor::{ToolInvocation, extract};
pub use orchestrator::{Agent, DEFAULT_SYSTEM_PROMPT};
pub use turn_event::TurnEvent;
