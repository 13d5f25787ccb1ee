//! Run observer port
//!
//! The callback hook a presentation layer uses to watch a run without taking
//! part in the step loop. Every transcript append is reported, in order.

use taskweave_domain::{Message, RoutingError, StepState};

/// Callback for events during a unit's run
///
/// All methods have no-op defaults; implementations override what they
/// render. Callbacks are synchronous and must not block.
pub trait RunObserver: Send + Sync {
    /// A unit started a run with `input`
    fn on_run_start(&self, _unit: &str, _input: &Message) {}

    /// A unit's step loop moved to `state`
    fn on_state_change(&self, _unit: &str, _state: StepState) {}

    /// A message was appended to a unit's transcript
    fn on_message(&self, _unit: &str, _message: &Message) {}

    /// A reply could not be routed
    fn on_routing_error(&self, _unit: &str, _error: &RoutingError) {}

    /// A streamed text chunk arrived from a unit's responder
    fn on_stream_chunk(&self, _unit: &str, _chunk: &str) {}

    /// A unit finished its run with `result`
    fn on_run_complete(&self, _unit: &str, _result: &Message) {}

    /// A unit's run failed
    fn on_run_failed(&self, _unit: &str, _error: &str) {}
}

/// No-op observer for when nobody is watching
pub struct NoObserver;

impl RunObserver for NoObserver {}
