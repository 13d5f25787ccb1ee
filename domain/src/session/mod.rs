//! LLM chat session value types.
//!
//! - [`entities::ChatTurn`]: one turn of a model conversation
//! - [`stream::StreamEvent`]: incremental output from a streaming reply

pub mod entities;
pub mod stream;
