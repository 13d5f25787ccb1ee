//! Use cases
//!
//! The unit engine itself lives in [`crate::task`]; use cases here compose
//! runs.

pub mod run_independent;
