//! LLM Gateway port
//!
//! Defines the interface for communicating with LLM providers. The engine
//! never performs inference itself; [`ChatAgent`](crate::responders::ChatAgent)
//! reaches a model only through these traits.

use async_trait::async_trait;
use taskweave_domain::{Model, StreamEvent};
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors that can occur during LLM gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Gateway for LLM communication
///
/// Implementations (adapters) live in the infrastructure layer. Retry and
/// backoff, if any, belong to the adapter as well.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Create a new session with the specified model
    async fn create_session(&self, model: &Model) -> Result<Box<dyn LlmSession>, GatewayError>;

    /// Create a new session with a system prompt
    async fn create_session_with_system_prompt(
        &self,
        model: &Model,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError>;
}

/// Handle for receiving streaming events from an LLM session.
pub struct StreamHandle {
    pub receiver: mpsc::Receiver<StreamEvent>,
}

impl StreamHandle {
    pub fn new(receiver: mpsc::Receiver<StreamEvent>) -> Self {
        Self { receiver }
    }

    /// Consume the stream and collect all text into a single string.
    pub async fn collect_text(self) -> Result<String, GatewayError> {
        self.forward(|_| {}).await
    }

    /// Consume the stream, handing each delta to `on_chunk`, and return the
    /// full text.
    pub async fn forward(mut self, mut on_chunk: impl FnMut(&str)) -> Result<String, GatewayError> {
        let mut full_text = String::new();
        while let Some(event) = self.receiver.recv().await {
            match event {
                StreamEvent::Delta(chunk) => {
                    on_chunk(&chunk);
                    full_text.push_str(&chunk);
                }
                StreamEvent::Completed(text) => {
                    if full_text.is_empty() {
                        return Ok(text);
                    }
                    return Ok(full_text);
                }
                StreamEvent::Error(e) => {
                    return Err(GatewayError::RequestFailed(e));
                }
            }
        }
        // Channel closed without Completed, return what we have
        Ok(full_text)
    }
}

/// An active LLM session
///
/// A session keeps its own conversation history; each `send` is one user turn.
#[async_trait]
pub trait LlmSession: Send + Sync {
    /// Get the model used by this session
    fn model(&self) -> &Model;

    /// Send a message and get a response
    async fn send(&self, content: &str) -> Result<String, GatewayError>;

    /// Send a message and get a streaming response.
    ///
    /// Default implementation calls `send()` and wraps the result in a single
    /// `Completed` event.
    async fn send_streaming(&self, content: &str) -> Result<StreamHandle, GatewayError> {
        let result = self.send(content).await?;
        let (tx, rx) = mpsc::channel(1);
        let _ = tx.send(StreamEvent::Completed(result)).await;
        Ok(StreamHandle::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_forward_collects_deltas() {
        let (tx, rx) = mpsc::channel(4);
        tx.send(StreamEvent::Delta("TO[Odd".into())).await.unwrap();
        tx.send(StreamEvent::Delta("Handler]: 3".into())).await.unwrap();
        tx.send(StreamEvent::Completed("ignored".into())).await.unwrap();
        drop(tx);

        let mut chunks = Vec::new();
        let text = StreamHandle::new(rx)
            .forward(|c| chunks.push(c.to_string()))
            .await
            .unwrap();
        assert_eq!(text, "TO[OddHandler]: 3");
        assert_eq!(chunks.len(), 2);
    }

    #[tokio::test]
    async fn test_completed_only_stream() {
        let (tx, rx) = mpsc::channel(1);
        tx.send(StreamEvent::Completed("10".into())).await.unwrap();
        assert_eq!(StreamHandle::new(rx).collect_text().await.unwrap(), "10");
    }

    #[tokio::test]
    async fn test_error_event_fails() {
        let (tx, rx) = mpsc::channel(1);
        tx.send(StreamEvent::Error("boom".into())).await.unwrap();
        assert!(matches!(
            StreamHandle::new(rx).collect_text().await,
            Err(GatewayError::RequestFailed(_))
        ));
    }
}
