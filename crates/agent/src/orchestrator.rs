//! The agent orchestration loop.
//!
//! One turn: append the user message, send the full history to the LLM
//! endpoint, append the assistant reply, then scan it for embedded tool
//! calls and fold each result back into the conversation. Endpoint failures
//! are absorbed in-band — the turn always completes, with the failure
//! visible only as conversation content.
//!
//! Turns are not serialized against each other. Each runs its own network
//! call and tool pass; the conversation append is the only synchronized
//! operation, so concurrent turns interleave at message granularity without
//! losing anything.

use std::sync::Arc;

use oxidesk_config::AppConfig;
use oxidesk_core::endpoint::LlmEndpoint;
use oxidesk_core::error::InputError;
use oxidesk_core::input_event::InputEvent;
use oxidesk_core::message::{Conversation, Message};
use oxidesk_core::tool::ToolRegistry;
use oxidesk_input::InputNormalizer;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::extractor;
use crate::turn_event::TurnEvent;

/// Default system prompt seeded at index 0 of every conversation.
pub const DEFAULT_SYSTEM_PROMPT: &str = "\
You are an AI assistant integrated into a desktop application. You can help \
users by answering questions, managing files and directories, and automating \
workflows through the available tools.

Available tools:
- file_operations: read, write, create directories, and list directory contents

To use a tool, include a call in your reply using the syntax \
@tool_name(key: \"value\", ...). Explain what you are about to do, then make \
the call. Be helpful and concise.";

/// The top-level agent: owns the conversation, the endpoint handle, the
/// tool registry, and the input normalizer. Cheap to clone; clones share
/// the same conversation.
#[derive(Clone)]
pub struct Agent {
    endpoint: Arc<dyn LlmEndpoint>,
    tools: Arc<ToolRegistry>,
    normalizer: Arc<InputNormalizer>,
    conversation: Arc<Mutex<Conversation>>,
    system_prompt: String,
    stream_enabled: bool,
}

impl Agent {
    /// Create an agent with an explicit registry and the default prompt.
    pub fn new(endpoint: Arc<dyn LlmEndpoint>, tools: Arc<ToolRegistry>) -> Self {
        let system_prompt = DEFAULT_SYSTEM_PROMPT.to_string();
        Self {
            endpoint,
            tools,
            normalizer: Arc::new(InputNormalizer::new()),
            conversation: Arc::new(Mutex::new(Conversation::seeded(&system_prompt))),
            system_prompt,
            stream_enabled: true,
        }
    }

    /// Create an agent wired from application configuration, with the
    /// built-in tool registry.
    pub fn from_config(config: &AppConfig, endpoint: Arc<dyn LlmEndpoint>) -> Self {
        let mut agent = Self::new(endpoint, Arc::new(oxidesk_tools::default_registry()))
            .with_streaming(config.stream)
            .with_normalizer(Arc::new(
                InputNormalizer::new().with_max_source_bytes(config.max_input_bytes),
            ));
        if let Some(prompt) = &config.system_prompt {
            agent = agent.with_system_prompt(prompt.clone());
        }
        agent
    }

    /// Replace the seeded system prompt (re-seeds the conversation).
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self.conversation = Arc::new(Mutex::new(Conversation::seeded(&self.system_prompt)));
        self
    }

    /// Enable or disable streaming mode for endpoint calls.
    pub fn with_streaming(mut self, enabled: bool) -> Self {
        self.stream_enabled = enabled;
        self
    }

    /// Replace the input normalizer.
    pub fn with_normalizer(mut self, normalizer: Arc<InputNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Process one user turn.
    ///
    /// Always completes: endpoint failures become an in-band assistant
    /// message and that message is the returned reply. Progress events,
    /// when a channel is attached, are tagged with this turn's id.
    pub async fn process_turn(
        &self,
        input: &str,
        progress: Option<mpsc::Sender<TurnEvent>>,
    ) -> String {
        let turn_id = Uuid::new_v4();
        debug!(%turn_id, "Processing user turn");

        let history = {
            let mut conv = self.conversation.lock().await;
            conv.push(Message::user(input));
            conv.messages.clone()
        };

        let mut forwarder = None;
        let result = if self.stream_enabled {
            // Per-turn accumulator: the endpoint pushes running-buffer
            // snapshots into a private channel, forwarded with the turn id
            // attached. Concurrent turns cannot touch each other's buffer.
            let partials = progress.clone().map(|tx| {
                let (ptx, mut prx) = mpsc::channel::<String>(16);
                forwarder = Some(tokio::spawn(async move {
                    while let Some(text) = prx.recv().await {
                        if tx.send(TurnEvent::Partial { turn_id, text }).await.is_err() {
                            return;
                        }
                    }
                }));
                ptx
            });
            self.endpoint.send(&history, partials).await
        } else {
            self.endpoint.complete(&history).await
        };

        // The endpoint-side sender is gone once the call returns; wait for
        // the forwarder to drain so no Partial for this turn can land after
        // its ToolResult or Done events.
        if let Some(handle) = forwarder {
            let _ = handle.await;
        }

        let reply = match result {
            Ok(text) => {
                info!(%turn_id, chars = text.len(), "Assistant reply assembled");
                self.conversation.lock().await.push(Message::assistant(&text));
                self.run_tool_pass(&text, turn_id, progress.as_ref()).await;
                text
            }
            Err(e) => {
                warn!(%turn_id, error = %e, "Endpoint call failed, absorbing in-band");
                let message = format!("Error: {e}");
                self.conversation
                    .lock()
                    .await
                    .push(Message::assistant(&message));
                message
            }
        };

        if let Some(tx) = &progress {
            let _ = tx
                .send(TurnEvent::Done {
                    turn_id,
                    reply: reply.clone(),
                })
                .await;
        }

        reply
    }

    /// Normalize an input event and run a turn over its rendered text.
    ///
    /// Normalization failures are the only errors surfaced to the caller;
    /// they occur before any conversation state is touched.
    pub async fn process_event(
        &self,
        event: InputEvent,
        progress: Option<mpsc::Sender<TurnEvent>>,
    ) -> Result<String, InputError> {
        let text = self.normalizer.render(&event).await?;
        Ok(self.process_turn(&text, progress).await)
    }

    /// Extract and execute tool calls from an assistant reply, in source
    /// order, folding each result into the conversation as a tool message.
    async fn run_tool_pass(
        &self,
        reply: &str,
        turn_id: Uuid,
        progress: Option<&mpsc::Sender<TurnEvent>>,
    ) {
        for invocation in extractor::extract(reply) {
            debug!(%turn_id, tool = %invocation.name, "Executing tool call");
            let result = self
                .tools
                .execute(&invocation.name, &invocation.parameters)
                .await;

            let content = if result.success {
                format!("Tool execution result: {}", result.output)
            } else {
                format!(
                    "Tool execution failed: {}",
                    result.error.as_deref().unwrap_or("Unknown error")
                )
            };

            if let Some(tx) = progress {
                let _ = tx
                    .send(TurnEvent::ToolResult {
                        turn_id,
                        name: invocation.name.clone(),
                        success: result.success,
                        output: content.clone(),
                    })
                    .await;
            }

            self.conversation.lock().await.push(Message::tool(content));
        }
    }

    /// Hard reset: discard the conversation and re-seed the system prompt.
    pub async fn clear_conversation(&self) {
        let mut conv = self.conversation.lock().await;
        *conv = Conversation::seeded(&self.system_prompt);
        info!(conversation_id = %conv.id, "Conversation cleared");
    }

    /// A point-in-time copy of the conversation.
    pub async fn conversation_snapshot(&self) -> Conversation {
        self.conversation.lock().await.clone()
    }
}
