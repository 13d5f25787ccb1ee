//! Execution parameters for the run loop
//!
//! [`ExecutionParams`] carries the knobs the binary reads from configuration
//! and flags, and turns them into termination policies and a
//! [`RunContext`]. These are application-layer concerns, not domain policy.

use crate::task::RunContext;
use serde::{Deserialize, Serialize};
use taskweave_domain::{DEFAULT_MAX_STEPS, TerminationPolicy};

/// Run loop control parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionParams {
    /// Step budget for looping units.
    pub max_steps: usize,
    /// Forward streamed model output to observers.
    pub stream: bool,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            max_steps: DEFAULT_MAX_STEPS,
            stream: true,
        }
    }
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max;
        self
    }

    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }

    // ==================== Derived values ====================

    pub fn continuous(&self) -> TerminationPolicy {
        TerminationPolicy::Continuous {
            max_steps: self.max_steps,
        }
    }

    pub fn interactive(&self) -> TerminationPolicy {
        TerminationPolicy::Interactive {
            max_steps: self.max_steps,
        }
    }

    /// A fresh run context with the streaming switch applied.
    pub fn run_context(&self) -> RunContext {
        RunContext::new().with_streaming(self.stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = ExecutionParams::default();
        assert_eq!(params.max_steps, DEFAULT_MAX_STEPS);
        assert!(params.stream);
    }

    #[test]
    fn test_policies_carry_budget() {
        let params = ExecutionParams::default().with_max_steps(7).with_stream(false);
        assert_eq!(params.continuous().max_steps(), 7);
        assert!(params.interactive().is_interactive());
        assert!(!params.run_context().stream());
    }
}
