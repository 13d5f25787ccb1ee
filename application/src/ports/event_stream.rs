//! Observable event stream
//!
//! [`ChannelObserver`] turns observer callbacks into owned [`RunEvent`]s on an
//! unbounded channel, so a front-end can consume them as a
//! [`Stream`](futures::Stream) on its own task.

use super::run_observer::RunObserver;
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use taskweave_domain::{Message, RoutingError, StepState};
use tokio::sync::mpsc;

/// Owned form of every [`RunObserver`] callback
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    RunStarted { unit: String, input: Message },
    StateChanged { unit: String, state: StepState },
    MessageAppended { unit: String, message: Message },
    RoutingFailed { unit: String, error: RoutingError },
    StreamChunk { unit: String, chunk: String },
    RunCompleted { unit: String, result: Message },
    RunFailed { unit: String, error: String },
}

impl RunEvent {
    pub fn unit(&self) -> &str {
        match self {
            RunEvent::RunStarted { unit, .. }
            | RunEvent::StateChanged { unit, .. }
            | RunEvent::MessageAppended { unit, .. }
            | RunEvent::RoutingFailed { unit, .. }
            | RunEvent::StreamChunk { unit, .. }
            | RunEvent::RunCompleted { unit, .. }
            | RunEvent::RunFailed { unit, .. } => unit,
        }
    }
}

/// Create a connected observer / stream pair.
pub fn event_channel() -> (ChannelObserver, EventStream) {
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelObserver { tx }, EventStream { rx })
}

/// Observer half: sends each callback as a [`RunEvent`].
///
/// Sending never blocks; events are dropped silently once the stream half is
/// gone.
#[derive(Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<RunEvent>,
}

impl ChannelObserver {
    fn emit(&self, event: RunEvent) {
        let _ = self.tx.send(event);
    }
}

impl RunObserver for ChannelObserver {
    fn on_run_start(&self, unit: &str, input: &Message) {
        self.emit(RunEvent::RunStarted {
            unit: unit.to_string(),
            input: input.clone(),
        });
    }

    fn on_state_change(&self, unit: &str, state: StepState) {
        self.emit(RunEvent::StateChanged {
            unit: unit.to_string(),
            state,
        });
    }

    fn on_message(&self, unit: &str, message: &Message) {
        self.emit(RunEvent::MessageAppended {
            unit: unit.to_string(),
            message: message.clone(),
        });
    }

    fn on_routing_error(&self, unit: &str, error: &RoutingError) {
        self.emit(RunEvent::RoutingFailed {
            unit: unit.to_string(),
            error: error.clone(),
        });
    }

    fn on_stream_chunk(&self, unit: &str, chunk: &str) {
        self.emit(RunEvent::StreamChunk {
            unit: unit.to_string(),
            chunk: chunk.to_string(),
        });
    }

    fn on_run_complete(&self, unit: &str, result: &Message) {
        self.emit(RunEvent::RunCompleted {
            unit: unit.to_string(),
            result: result.clone(),
        });
    }

    fn on_run_failed(&self, unit: &str, error: &str) {
        self.emit(RunEvent::RunFailed {
            unit: unit.to_string(),
            error: error.to_string(),
        });
    }
}

/// Stream half: yields events in the order they were produced.
pub struct EventStream {
    rx: mpsc::UnboundedReceiver<RunEvent>,
}

impl EventStream {
    /// Wait for the next event; `None` once every observer is dropped.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.rx.recv().await
    }

    /// Take every event that is already buffered without waiting.
    pub fn drain(&mut self) -> Vec<RunEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Stream for EventStream {
    type Item = RunEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
