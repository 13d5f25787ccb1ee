//! Application-level configuration.
//!
//! - [`ExecutionParams`]: run loop control (step budget, streaming)

pub mod execution_params;

pub use execution_params::ExecutionParams;
