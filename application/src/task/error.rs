//! Run errors

use crate::responders::ResponderError;
use taskweave_domain::{DomainError, RoutingError};
use thiserror::Error;

/// Errors that end a unit's run
#[derive(Error, Debug)]
pub enum RunError {
    #[error("{unit} exceeded its step budget of {max_steps}")]
    StepBudgetExceeded { unit: String, max_steps: usize },

    #[error("Responder of {unit} failed: {source}")]
    ResponderFailure {
        unit: String,
        source: ResponderError,
    },

    #[error("{unit} could not route its reply: {source}")]
    Routing { unit: String, source: RoutingError },

    #[error("{gate} rejected the recipient chosen by {unit}: {reason}")]
    Rejected {
        unit: String,
        gate: String,
        reason: String,
    },

    #[error("No child of {unit} accepted the message")]
    NoEligibleChild { unit: String },

    #[error("Run cancelled")]
    Cancelled,

    #[error(transparent)]
    Structure(#[from] DomainError),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl RunError {
    pub fn is_budget_exceeded(&self) -> bool {
        matches!(self, RunError::StepBudgetExceeded { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunError::Cancelled)
    }

    /// Name of the unit the error originated in, when there is one.
    pub fn unit(&self) -> Option<&str> {
        match self {
            RunError::StepBudgetExceeded { unit, .. }
            | RunError::ResponderFailure { unit, .. }
            | RunError::Routing { unit, .. }
            | RunError::Rejected { unit, .. }
            | RunError::NoEligibleChild { unit } => Some(unit),
            RunError::Cancelled | RunError::Structure(_) | RunError::Runtime(_) => None,
        }
    }
}
