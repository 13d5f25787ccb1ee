//! Step loop state machine.
//!
//! ```text
//! Idle -> AwaitingResponder -> Routing -> Delivering -> Idle | Done
//!                  |              |
//!                  +-> Done       +-> Idle | Done
//! ```

use serde::{Deserialize, Serialize};

/// State of a unit's step loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepState {
    #[default]
    Idle,
    /// The unit's responder has been invoked and may be suspended.
    AwaitingResponder,
    /// The reply is being resolved by the recipient router.
    Routing,
    /// A child unit is running with the routed message.
    Delivering,
    Done,
}

impl StepState {
    /// Whether `next` is a legal successor of `self`.
    pub fn can_transition_to(self, next: StepState) -> bool {
        use StepState::*;
        matches!(
            (self, next),
            (Idle, AwaitingResponder)
                | (AwaitingResponder, Routing)
                | (AwaitingResponder, Done)
                | (Routing, Delivering)
                | (Routing, Idle)
                | (Routing, Done)
                | (Delivering, Idle)
                | (Delivering, Done)
                | (Done, Idle)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StepState::Idle => "idle",
            StepState::AwaitingResponder => "awaiting_responder",
            StepState::Routing => "routing",
            StepState::Delivering => "delivering",
            StepState::Done => "done",
        }
    }
}

impl std::fmt::Display for StepState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
