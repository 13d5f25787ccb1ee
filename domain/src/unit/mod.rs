//! Orchestration unit configuration and lifecycle.
//!
//! - [`config::TaskConfig`]: fixed per-unit configuration
//! - [`config::TerminationPolicy`]: when a run is complete
//! - [`state::StepState`]: step loop state machine
//! - [`naming`]: unit name and sibling uniqueness rules

pub mod config;
pub mod naming;
pub mod state;
