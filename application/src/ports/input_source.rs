//! Human input port
//!
//! Where human turns come from: a terminal, a chat widget, or a script in
//! tests. Returning `Ok(None)` means the human is done.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use thiserror::Error;

/// Errors from an input source
#[derive(Error, Debug)]
pub enum InputError {
    #[error("Input I/O error: {0}")]
    Io(String),

    #[error("Input source closed unexpectedly")]
    Closed,
}

/// Source of human turns
#[async_trait]
pub trait InputSource: Send + Sync {
    /// Wait for the next human turn. `prompt` is a short hint to display.
    async fn next_input(&self, prompt: &str) -> Result<Option<String>, InputError>;
}

/// Input source that never has anything to say
pub struct NoInput;

#[async_trait]
impl InputSource for NoInput {
    async fn next_input(&self, _prompt: &str) -> Result<Option<String>, InputError> {
        Ok(None)
    }
}

/// Input source that replays a fixed list of turns, then reports done
pub struct QueuedInput {
    turns: Mutex<VecDeque<String>>,
}

impl QueuedInput {
    pub fn new(turns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            turns: Mutex::new(turns.into_iter().map(Into::into).collect()),
        }
    }

    pub fn remaining(&self) -> usize {
        self.turns.lock().map(|t| t.len()).unwrap_or(0)
    }
}

#[async_trait]
impl InputSource for QueuedInput {
    async fn next_input(&self, _prompt: &str) -> Result<Option<String>, InputError> {
        let mut turns = self
            .turns
            .lock()
            .map_err(|e| InputError::Io(e.to_string()))?;
        Ok(turns.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_queued_input_drains_then_ends() {
        let input = QueuedInput::new(["hi", "bye"]);
        assert_eq!(input.next_input(">").await.unwrap().as_deref(), Some("hi"));
        assert_eq!(input.next_input(">").await.unwrap().as_deref(), Some("bye"));
        assert_eq!(input.next_input(">").await.unwrap(), None);
        assert_eq!(input.remaining(), 0);
    }

    #[tokio::test]
    async fn test_no_input() {
        assert!(NoInput.next_input(">").await.unwrap().is_none());
    }
}
