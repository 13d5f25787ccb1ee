//! Port for structured conversation logging.
//!
//! Defines the [`ConversationLogger`] trait for recording run events
//! (inputs, transcript messages, routing failures, results) to a structured
//! log, and [`TranscriptLogObserver`], which feeds it from a run.
//!
//! This is separate from `tracing`-based operation logs: tracing handles
//! human-readable diagnostic messages, while this port captures the full
//! transcript in a machine-readable format (JSONL).

use super::run_observer::RunObserver;
use serde_json::{Value, json};
use std::sync::Arc;
use taskweave_domain::{Message, RoutingError};

/// A structured conversation event for logging.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "message", "routing_error", "run_completed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging conversation events to a structured log.
///
/// The `log` method is synchronous and non-fallible so a broken log never
/// disturbs a run.
pub trait ConversationLogger: Send + Sync {
    /// Record a conversation event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}

/// Adapter: [`RunObserver`] → [`ConversationLogger`]
///
/// State changes and stream chunks are not logged; the appended messages
/// already carry the full transcript.
pub struct TranscriptLogObserver {
    logger: Arc<dyn ConversationLogger>,
}

impl TranscriptLogObserver {
    pub fn new(logger: Arc<dyn ConversationLogger>) -> Self {
        Self { logger }
    }
}

fn message_json(message: &Message) -> Value {
    serde_json::to_value(message).unwrap_or(Value::Null)
}

impl RunObserver for TranscriptLogObserver {
    fn on_run_start(&self, unit: &str, input: &Message) {
        self.logger.log(ConversationEvent::new(
            "run_started",
            json!({ "unit": unit, "input": message_json(input) }),
        ));
    }

    fn on_message(&self, unit: &str, message: &Message) {
        self.logger.log(ConversationEvent::new(
            "message",
            json!({ "unit": unit, "message": message_json(message) }),
        ));
    }

    fn on_routing_error(&self, unit: &str, error: &RoutingError) {
        self.logger.log(ConversationEvent::new(
            "routing_error",
            json!({
                "unit": unit,
                "signal": error.signal().as_str(),
                "error": error.to_string(),
            }),
        ));
    }

    fn on_run_complete(&self, unit: &str, result: &Message) {
        self.logger.log(ConversationEvent::new(
            "run_completed",
            json!({ "unit": unit, "result": message_json(result) }),
        ));
    }

    fn on_run_failed(&self, unit: &str, error: &str) {
        self.logger.log(ConversationEvent::new(
            "run_failed",
            json!({ "unit": unit, "error": error }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryLogger {
        events: Mutex<Vec<(String, Value)>>,
    }

    impl ConversationLogger for MemoryLogger {
        fn log(&self, event: ConversationEvent) {
            self.events
                .lock()
                .unwrap()
                .push((event.event_type.to_string(), event.payload));
        }
    }

    #[test]
    fn test_observer_logs_messages_and_errors() {
        let logger = Arc::new(MemoryLogger::default());
        let observer = TranscriptLogObserver::new(logger.clone());

        observer.on_message(
            "Router",
            &Message::new("Router", "3").addressed_to("OddHandler"),
        );
        observer.on_routing_error("Router", &RoutingError::Unaddressed);

        let events = logger.events.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, "message");
        assert_eq!(events[0].1["message"]["recipient"], "OddHandler");
        assert_eq!(events[1].0, "routing_error");
        assert_eq!(events[1].1["signal"], "unaddressed");
    }
}
