//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`]: chat models an agent can be backed by
//! - [`error::DomainError`]: structural (setup-time) errors
//! - [`string`]: display helpers for message content

pub mod error;
pub mod model;
pub mod string;
