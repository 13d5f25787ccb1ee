//! Domain error types

use thiserror::Error;

/// Structural errors raised while assembling a unit hierarchy.
///
/// These fail fast: a hierarchy that produced one of these never runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Duplicate child name: {0}")]
    DuplicateChildName(String),

    #[error("Invalid unit name {name:?}: {reason}")]
    InvalidUnitName { name: String, reason: &'static str },

    #[error("Cannot attach sub-tasks to {0} after it has run")]
    HierarchySealed(String),

    #[error("Step budget must be at least 1")]
    ZeroStepBudget,
}

impl DomainError {
    /// Check if this error is a sibling name collision
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DomainError::DuplicateChildName(_))
    }
}
