//! Messages exchanged between orchestration units.
//!
//! - [`entities::Message`]: immutable unit of communication
//! - [`entities::Signal`]: negative-feedback tag
//! - [`transcript::Transcript`]: append-only per-run message log

pub mod entities;
pub mod transcript;
