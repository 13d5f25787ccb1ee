//! Composite observer that fans events out to several observers
//!
//! Fans run events out to e.g. the console renderer and the transcript
//! logger at the same time.

use super::run_observer::RunObserver;
use std::sync::Arc;
use taskweave_domain::{Message, RoutingError, StepState};

/// An observer that forwards every callback to each delegate in order.
#[derive(Default, Clone)]
pub struct CompositeObserver {
    delegates: Vec<Arc<dyn RunObserver>>,
}

impl CompositeObserver {
    pub fn new(delegates: Vec<Arc<dyn RunObserver>>) -> Self {
        Self { delegates }
    }

    pub fn with(mut self, observer: Arc<dyn RunObserver>) -> Self {
        self.delegates.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.delegates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.delegates.is_empty()
    }
}

/// Macro to delegate a method call to all inner observers.
macro_rules! delegate {
    ($self:ident, $method:ident $(, $arg:expr)*) => {
        for d in &$self.delegates {
            d.$method($($arg),*);
        }
    };
}

impl RunObserver for CompositeObserver {
    fn on_run_start(&self, unit: &str, input: &Message) {
        delegate!(self, on_run_start, unit, input);
    }

    fn on_state_change(&self, unit: &str, state: StepState) {
        delegate!(self, on_state_change, unit, state);
    }

    fn on_message(&self, unit: &str, message: &Message) {
        delegate!(self, on_message, unit, message);
    }

    fn on_routing_error(&self, unit: &str, error: &RoutingError) {
        delegate!(self, on_routing_error, unit, error);
    }

    fn on_stream_chunk(&self, unit: &str, chunk: &str) {
        delegate!(self, on_stream_chunk, unit, chunk);
    }

    fn on_run_complete(&self, unit: &str, result: &Message) {
        delegate!(self, on_run_complete, unit, result);
    }

    fn on_run_failed(&self, unit: &str, error: &str) {
        delegate!(self, on_run_failed, unit, error);
    }
}
