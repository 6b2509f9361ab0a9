//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world. Each
//! capability is a named, self-describing unit the model can invoke with the
//! `@tool_name(key: "value")` syntax embedded in its reply text.
//!
//! Parameters stay string-typed end to end; numeric or boolean
//! interpretation is each tool's own responsibility.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parsed parameters for a tool invocation.
pub type ToolParams = HashMap<String, String>;

/// The result of a tool execution.
///
/// Exactly one side is live: `output` when `success` is true, `error`
/// otherwise. Failures travel in-band through the conversation log, never
/// as thrown errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Whether the tool executed successfully
    pub success: bool,

    /// The output content (empty on failure)
    pub output: String,

    /// Failure description (None on success)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolResult {
    /// A successful result with human-readable output.
    pub fn ok(output: impl Into<String>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
        }
    }

    /// A failed result with a failure description.
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(error.into()),
        }
    }
}

/// The core Tool trait.
///
/// Implementations are side-effecting and non-transactional; a multi-step
/// request is realized as independent invocations with no rollback.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "file_operations").
    fn name(&self) -> &str;

    /// A description of what this tool does (goes into the system prompt).
    fn description(&self) -> &str;

    /// Execute the tool with the given parameters.
    async fn execute(&self, params: &ToolParams) -> ToolResult;
}

/// A registry of available tools.
///
/// Populated at orchestrator construction and read-only for the rest of the
/// session, so concurrent turns can share it without locking.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Execute a named tool.
    ///
    /// An unregistered name does not raise; it produces a synthesized
    /// failure result so the conversation log stays the single channel for
    /// all outcomes.
    pub async fn execute(&self, name: &str, params: &ToolParams) -> ToolResult {
        match self.tools.get(name) {
            Some(tool) => tool.execute(params).await,
            None => {
                tracing::warn!(tool = name, "Requested tool is not registered");
                ToolResult::fail(format!("Tool '{name}' not found"))
            }
        }
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
