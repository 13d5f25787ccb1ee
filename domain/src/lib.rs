//! Domain layer for taskweave
//!
//! Pure types and rules, no I/O and no async runtime.
//!
//! # Core Concepts
//!
//! ## Messages
//!
//! Units exchange immutable [`Message`]s. A message may name a `recipient`;
//! one carrying a [`Signal`] is negative feedback for its recipient.
//!
//! ## Routing
//!
//! A reply starting with `TO[<name>]:` is addressed to the child `<name>`.
//! [`RecipientRouter`] resolves the name or reports a [`RoutingError`].
//!
//! ## Units
//!
//! [`TaskConfig`] fixes a unit's name, [`DelegationMode`] and
//! [`TerminationPolicy`]; [`StepState`] describes where its step loop is.

pub mod core;
pub mod message;
pub mod routing;
pub mod session;
pub mod unit;

// Re-export commonly used types
pub use core::{error::DomainError, model::Model, string::preview};
pub use message::{
    entities::{Message, ROOT_SENDER, Signal, USER_SENDER},
    transcript::Transcript,
};
pub use routing::{
    directive::{Directive, format_directive, parse_directive, parse_done},
    router::{RecipientRouter, Route, RoutingError},
};
pub use session::{
    entities::{ChatTurn, Role},
    stream::StreamEvent,
};
pub use unit::{
    config::{DEFAULT_MAX_STEPS, DelegationMode, TaskConfig, TerminationPolicy},
    naming::{check_sibling_names, validate_unit_name},
    state::StepState,
};
