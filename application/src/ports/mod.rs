//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that outer layers implement or consume:
//! model backends, presentation hooks, human input and transcript logs.

pub mod composite_observer;
pub mod conversation_logger;
pub mod event_stream;
pub mod input_source;
pub mod llm_gateway;
pub mod run_observer;
