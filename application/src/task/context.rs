//! Run context
//!
//! Explicit per-run environment handed down the unit tree: cancellation,
//! the observer, the human input source and the streaming switch. Nothing
//! here is global; two runs with two contexts share nothing.

use crate::ports::input_source::{InputSource, NoInput};
use crate::ports::run_observer::{NoObserver, RunObserver};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct RunContext {
    cancellation: CancellationToken,
    observer: Arc<dyn RunObserver>,
    input: Arc<dyn InputSource>,
    stream: bool,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            cancellation: CancellationToken::new(),
            observer: Arc::new(NoObserver),
            input: Arc::new(NoInput),
            stream: false,
        }
    }
}

impl RunContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_input(mut self, input: Arc<dyn InputSource>) -> Self {
        self.input = input;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_streaming(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    pub fn observer(&self) -> &dyn RunObserver {
        self.observer.as_ref()
    }

    pub fn input(&self) -> &dyn InputSource {
        self.input.as_ref()
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Cancel every run sharing this context's token.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    pub fn stream(&self) -> bool {
        self.stream
    }
}

impl std::fmt::Debug for RunContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunContext")
            .field("cancelled", &self.is_cancelled())
            .field("stream", &self.stream)
            .finish_non_exhaustive()
    }
}
