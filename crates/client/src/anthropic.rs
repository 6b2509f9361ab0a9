//! Anthropic Messages API client.
//!
//! Features:
//! - `x-api-key` header authentication (not Bearer)
//! - `anthropic-version` header
//! - System prompt as top-level field, never inlined as a turn
//! - Streaming via SSE `data:` frames with `content_block_delta` events
//!   and the `[DONE]` sentinel
//!
//! One request per call — retry policy, if any, belongs to the caller.

use async_trait::async_trait;
use futures::StreamExt;
use oxidesk_config::AppConfig;
use oxidesk_core::endpoint::{LlmEndpoint, StreamDelta};
use oxidesk_core::error::ClientError;
use oxidesk_core::message::{Message, Role};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DONE_SENTINEL: &str = "[DONE]";

/// Anthropic native Messages API client.
pub struct AnthropicClient {
    base_url: String,
    api_key: Option<String>,
    model: String,
    max_tokens: u32,
    client: reqwest::Client,
}

impl AnthropicClient {
    /// Create a client from application configuration.
    pub fn new(config: &AppConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;

        Ok(Self {
            base_url: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            client,
        })
    }

    /// Override the base URL (e.g., for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_key(&self) -> Result<&str, ClientError> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(ClientError::MissingApiKey),
        }
    }

    /// Separate system messages from the conversational turns.
    /// The Messages API takes the system prompt as a top-level field.
    fn extract_system(messages: &[Message]) -> (Option<String>, Vec<&Message>) {
        let mut system_parts: Vec<&str> = Vec::new();
        let mut turns: Vec<&Message> = Vec::new();

        for msg in messages {
            match msg.role {
                Role::System => system_parts.push(&msg.content),
                _ => turns.push(msg),
            }
        }

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join("\n\n"))
        };

        (system, turns)
    }

    /// Convert turns to wire format. Tool output goes over as a user turn,
    /// which is how the Messages API expects results fed back to the model.
    fn to_api_messages(turns: &[&Message]) -> Vec<ApiMessage> {
        turns
            .iter()
            .map(|msg| ApiMessage {
                role: match msg.role {
                    Role::Assistant => "assistant",
                    _ => "user",
                }
                .into(),
                content: msg.content.clone(),
            })
            .collect()
    }

    fn build_body(&self, messages: &[Message], stream: bool) -> serde_json::Value {
        let (system, turns) = Self::extract_system(messages);
        let api_messages = Self::to_api_messages(&turns);

        let mut body = serde_json::json!({
            "model": self.model,
            "messages": api_messages,
            "max_tokens": self.max_tokens,
            "stream": stream,
        });

        if let Some(ref sys) = system {
            body["system"] = serde_json::json!(sys);
        }

        body
    }

    async fn post(
        &self,
        body: &serde_json::Value,
        streaming: bool,
    ) -> Result<reqwest::Response, ClientError> {
        let api_key = self.api_key()?;
        let url = format!("{}/v1/messages", self.base_url);

        let mut request = self
            .client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json");

        if streaming {
            request = request.header("Accept", "text/event-stream");
        }

        let response = request
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            // Drain the body so the error carries the endpoint's diagnostics.
            let message = response.text().await.unwrap_or_default();
            warn!(status, body = %message, "LLM endpoint returned an error");
            return Err(ClientError::Api { status, message });
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmEndpoint for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, messages: &[Message]) -> Result<String, ClientError> {
        let body = self.build_body(messages, false);
        debug!(model = %self.model, turns = messages.len(), "Sending completion request");

        let response = self.post(&body, false).await?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        if bytes.is_empty() {
            return Err(ClientError::EmptyResponse);
        }

        let envelope: MessagesResponse = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::MalformedResponse(e.to_string()))?;

        envelope
            .content
            .iter()
            .find_map(|block| block.text.clone())
            .ok_or_else(|| {
                ClientError::MalformedResponse("response carried no text content block".into())
            })
    }

    async fn stream(
        &self,
        messages: &[Message],
    ) -> Result<mpsc::Receiver<StreamDelta>, ClientError> {
        let body = self.build_body(messages, true);
        debug!(model = %self.model, turns = messages.len(), "Sending streaming request");

        let response = self.post(&body, true).await?;

        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            let mut byte_stream = response.bytes_stream();
            let mut frames = FrameBuffer::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let bytes = match chunk_result {
                    Ok(b) => b,
                    Err(e) => {
                        let _ = tx.send(Err(ClientError::Network(e.to_string()))).await;
                        return;
                    }
                };

                for frame in frames.push_chunk(&bytes) {
                    match frame {
                        Frame::Delta(text) => {
                            if tx.send(Ok(text)).await.is_err() {
                                return;
                            }
                        }
                        Frame::Done => return,
                        Frame::Skip => {}
                    }
                }
            }

            // Connection closed without the sentinel: a final frame may sit
            // in the buffer without a trailing newline.
            if let Frame::Delta(text) = frames.finish() {
                let _ = tx.send(Ok(text)).await;
            }
        });

        Ok(rx)
    }
}

/// One parsed line of the streaming wire protocol.
#[derive(Debug, PartialEq)]
enum Frame {
    /// An incremental text delta, possibly empty.
    Delta(String),
    /// The `[DONE]` sentinel.
    Done,
    /// Anything else — blank lines, comments, unknown event types,
    /// unparseable fragments. Skipped to tolerate protocol evolution.
    Skip,
}

/// Reassembles SSE lines from arbitrarily-split byte chunks.
struct FrameBuffer {
    buffer: String,
}

impl FrameBuffer {
    fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Fold a chunk in and parse every newline-terminated line it completes.
    fn push_chunk(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.push_str(&String::from_utf8_lossy(chunk));

        let mut frames = Vec::new();
        while let Some(line_end) = self.buffer.find('\n') {
            let line = self.buffer[..line_end].trim_end_matches('\r').to_string();
            self.buffer.drain(..=line_end);
            frames.push(parse_frame(&line));
        }
        frames
    }

    /// Parse whatever remains once the stream ends. The wire may close
    /// without a trailing newline; the residual is still one frame.
    fn finish(self) -> Frame {
        if self.buffer.is_empty() {
            Frame::Skip
        } else {
            parse_frame(self.buffer.trim_end_matches('\r'))
        }
    }
}

fn parse_frame(line: &str) -> Frame {
    let Some(data) = line.strip_prefix("data: ") else {
        return Frame::Skip;
    };
    let data = data.trim();

    if data == DONE_SENTINEL {
        return Frame::Done;
    }
    if data.is_empty() {
        return Frame::Skip;
    }

    let event: serde_json::Value = match serde_json::from_str(data) {
        Ok(v) => v,
        Err(e) => {
            trace!(error = %e, data = %data, "Ignoring unparseable SSE fragment");
            return Frame::Skip;
        }
    };

    if event["type"].as_str() != Some("content_block_delta") {
        return Frame::Skip;
    }

    match event["delta"]["text"].as_str() {
        Some(text) => Frame::Delta(text.to_string()),
        None => Frame::Skip,
    }
}

// --- Wire types ---

#[derive(Debug, Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    #[allow(dead_code)]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}
