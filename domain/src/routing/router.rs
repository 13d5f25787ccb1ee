//! Recipient router
//!
//! Turns a responder's reply into a [`Route`] for the owning unit. The
//! router is deterministic and synchronous; the step loop decides what a
//! [`RoutingError`] means for the run (feedback or failure).

use super::directive::{format_directive, parse_directive, parse_done};
use crate::message::entities::{Message, Signal};
use crate::unit::config::DelegationMode;
use thiserror::Error;

/// Routing failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error("Unknown recipient {name:?} (known: {})", .known.join(", "))]
    UnknownRecipient { name: String, known: Vec<String> },

    #[error("Reply names no recipient but this unit delegates to its children")]
    Unaddressed,
}

impl RoutingError {
    /// The feedback signal matching this error.
    pub fn signal(&self) -> Signal {
        match self {
            RoutingError::UnknownRecipient { name, .. } => Signal::UnknownRecipient {
                name: name.clone(),
            },
            RoutingError::Unaddressed => Signal::Unaddressed,
        }
    }

    /// Negative feedback addressed to the unit whose reply failed to route.
    pub fn to_feedback(&self, unit: &str) -> Message {
        let content = match self {
            RoutingError::UnknownRecipient { name, known } if known.is_empty() => format!(
                "{:?} is not a valid recipient: there is nobody to delegate to. Reply without a TO[...] prefix.",
                name
            ),
            RoutingError::UnknownRecipient { name, known } => format!(
                "{:?} is not a valid recipient. Address one of [{}] by starting your message with {}",
                name,
                known.join(", "),
                format_directive("<name>", "<message>")
            ),
            RoutingError::Unaddressed => format!(
                "Your message has no recipient. Start it with {}",
                format_directive("<name>", "<message>")
            ),
        };
        Message::feedback(unit, unit, self.signal(), content)
    }
}

/// Where a reply goes next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// DONE signal; `Some(text)` replaces the result, `None` keeps the tail.
    Done(Option<String>),
    /// The unit's own output (leaf units, and signals which never route).
    Output(Message),
    /// Addressed to a resolved child.
    Delegate(Message),
    /// Unaddressed in a static-order unit: offered to children in order.
    Broadcast(Message),
}

impl Route {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Route::Done(_) | Route::Output(_))
    }
}

/// Resolves recipient directives for one unit.
#[derive(Debug, Clone)]
pub struct RecipientRouter<'a> {
    unit: &'a str,
    children: Vec<&'a str>,
    mode: DelegationMode,
}

impl<'a> RecipientRouter<'a> {
    pub fn new(unit: &'a str, children: Vec<&'a str>, mode: DelegationMode) -> Self {
        Self {
            unit,
            children,
            mode,
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Resolve a name to exactly one child (case-sensitive exact match).
    pub fn resolve(&self, name: &str) -> Result<&'a str, RoutingError> {
        self.children
            .iter()
            .copied()
            .find(|child| *child == name)
            .ok_or_else(|| RoutingError::UnknownRecipient {
                name: name.to_string(),
                known: self.children.iter().map(|c| c.to_string()).collect(),
            })
    }

    /// Route a raw text reply produced by the unit's responder.
    pub fn route_text(&self, raw: &str) -> Result<Route, RoutingError> {
        if let Some(result) = parse_done(raw) {
            return Ok(Route::Done(result.map(str::to_string)));
        }

        let directive = parse_directive(raw);
        match directive.recipient {
            Some(name) => {
                let child = self.resolve(name)?;
                Ok(Route::Delegate(
                    Message::new(self.unit, directive.body).addressed_to(child),
                ))
            }
            None => self.route_unaddressed(Message::new(self.unit, directive.body)),
        }
    }

    /// Route a message the responder built itself (a pass-through re-emission).
    ///
    /// Leaf units hand such messages up unchanged; units with children resolve
    /// the carried recipient like a parsed directive.
    pub fn route_message(&self, message: Message) -> Result<Route, RoutingError> {
        if !self.has_children() || message.is_negative_feedback() {
            return Ok(Route::Output(message));
        }
        match message.recipient() {
            Some(name) => {
                self.resolve(name)?;
                Ok(Route::Delegate(message))
            }
            None => self.route_unaddressed(message),
        }
    }

    fn route_unaddressed(&self, message: Message) -> Result<Route, RoutingError> {
        if !self.has_children() {
            return Ok(Route::Output(message));
        }
        match self.mode {
            DelegationMode::Llm => Err(RoutingError::Unaddressed),
            DelegationMode::Static => Ok(Route::Broadcast(message)),
        }
    }
}
