//! Built-in tool implementations for oxidesk.
//!
//! Tools give the agent the ability to act on the local machine. The model
//! invokes them through call syntax embedded in its reply text; results are
//! folded back into the conversation as tool messages.

pub mod file_operations;

pub use file_operations::FileOperationsTool;

use oxidesk_core::tool::ToolRegistry;

/// Create the default tool registry with all built-in tools.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(FileOperationsTool::new()));
    registry
}
