//! LlmEndpoint trait — the abstraction over the remote model endpoint.
//!
//! An endpoint knows how to send an ordered message history to an LLM and
//! get the reply back, either as one complete string or as a stream of text
//! deltas. The orchestrator calls through this trait without knowing which
//! wire implementation sits behind it — which is also what makes the agent
//! loop testable with a scripted endpoint.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::error::ClientError;
use crate::message::Message;

/// A single incremental text delta from a streaming response, in wire order.
pub type StreamDelta = std::result::Result<String, ClientError>;

#[async_trait]
pub trait LlmEndpoint: Send + Sync {
    /// A human-readable name for this endpoint (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send the history and get the complete reply in one shot.
    async fn complete(&self, messages: &[Message])
    -> std::result::Result<String, ClientError>;

    /// Send the history and get a stream of text deltas.
    ///
    /// Default implementation calls `complete()` and emits the whole reply
    /// as a single delta.
    async fn stream(
        &self,
        messages: &[Message],
    ) -> std::result::Result<mpsc::Receiver<StreamDelta>, ClientError> {
        let reply = self.complete(messages).await?;
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.send(Ok(reply)).await;
        Ok(rx)
    }

    /// Stream the reply, forwarding the running buffer after every delta.
    ///
    /// Each value sent through `progress` is the full accumulated text so
    /// far, not the delta — successive values are prefix-extensions of each
    /// other. Returns the final assembled string once the stream ends.
    async fn send(
        &self,
        messages: &[Message],
        progress: Option<mpsc::Sender<String>>,
    ) -> std::result::Result<String, ClientError> {
        let mut rx = self.stream(messages).await?;
        let mut assembled = String::new();

        while let Some(delta) = rx.recv().await {
            assembled.push_str(&delta?);
            if let Some(tx) = &progress {
                // A closed receiver just means nobody is watching anymore.
                let _ = tx.send(assembled.clone()).await;
            }
        }

        Ok(assembled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Streams a scripted reply split into fixed deltas.
    struct ScriptedEndpoint {
        deltas: Vec<String>,
    }

    #[async_trait]
    impl LlmEndpoint for ScriptedEndpoint {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(
            &self,
            _messages: &[Message],
        ) -> std::result::Result<String, ClientError> {
            Ok(self.deltas.concat())
        }

        async fn stream(
            &self,
            _messages: &[Message],
        ) -> std::result::Result<mpsc::Receiver<StreamDelta>, ClientError> {
            let (tx, rx) = mpsc::channel(8);
            let deltas = self.deltas.clone();
            tokio::spawn(async move {
                for delta in deltas {
                    if tx.send(Ok(delta)).await.is_err() {
                        return;
                    }
                }
            });
            Ok(rx)
        }
    }

    #[tokio::test]
    async fn send_assembles_deltas_in_order() {
        let endpoint = ScriptedEndpoint {
            deltas: vec!["Hi".into(), " there".into()],
        };
        let reply = endpoint.send(&[], None).await.unwrap();
        assert_eq!(reply, "Hi there");
    }

    #[tokio::test]
    async fn progress_sees_running_buffer_not_diffs() {
        let endpoint = ScriptedEndpoint {
            deltas: vec!["Hi".into(), " there".into()],
        };
        let (tx, mut rx) = mpsc::channel(8);

        let reply = endpoint.send(&[], Some(tx)).await.unwrap();
        assert_eq!(reply, "Hi there");

        let mut snapshots = Vec::new();
        while let Some(text) = rx.recv().await {
            snapshots.push(text);
        }
        assert_eq!(snapshots, vec!["Hi".to_string(), "Hi there".to_string()]);
    }

    #[tokio::test]
    async fn partials_are_monotonic_prefix_extensions() {
        let endpoint = ScriptedEndpoint {
            deltas: vec!["a".into(), "b".into(), "".into(), "c".into()],
        };
        let (tx, mut rx) = mpsc::channel(8);
        endpoint.send(&[], Some(tx)).await.unwrap();

        let mut previous = String::new();
        while let Some(text) = rx.recv().await {
            assert!(text.starts_with(&previous), "{text:?} not a prefix extension of {previous:?}");
            previous = text;
        }
        assert_eq!(previous, "abc");
    }

    #[tokio::test]
    async fn default_stream_wraps_complete() {
        struct OneShot;

        #[async_trait]
        impl LlmEndpoint for OneShot {
            fn name(&self) -> &str {
                "oneshot"
            }
            async fn complete(
                &self,
                _messages: &[Message],
            ) -> std::result::Result<String, ClientError> {
                Ok("whole reply".into())
            }
        }

        let mut rx = OneShot.stream(&[]).await.unwrap();
        assert_eq!(rx.recv().await.unwrap().unwrap(), "whole reply");
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn send_propagates_mid_stream_errors() {
        struct Failing;

        #[async_trait]
        impl LlmEndpoint for Failing {
            fn name(&self) -> &str {
                "failing"
            }
            async fn complete(
                &self,
                _messages: &[Message],
            ) -> std::result::Result<String, ClientError> {
                unreachable!()
            }
            async fn stream(
                &self,
                _messages: &[Message],
            ) -> std::result::Result<mpsc::Receiver<StreamDelta>, ClientError> {
                let (tx, rx) = mpsc::channel(2);
                let _ = tx.send(Ok("partial".into())).await;
                let _ = tx.send(Err(ClientError::Network("connection reset".into()))).await;
                Ok(rx)
            }
        }

        let err = Failing.send(&[], None).await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
