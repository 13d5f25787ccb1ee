//! Recipient validator
//!
//! Deterministic responder that checks the recipient of the message it was
//! handed against an allow-set. No model call, no suspension.

use super::{Reply, ResponderContext};
use std::collections::BTreeSet;
use taskweave_domain::{Message, Signal};

/// Unit name used by [`Task::validator`](crate::task::Task::validator).
pub const DEFAULT_VALIDATOR_NAME: &str = "RecipientValidator";

/// Allow-set check on the latest message's recipient
#[derive(Debug, Clone, Default)]
pub struct RecipientValidator {
    allowed: BTreeSet<String>,
}

impl RecipientValidator {
    pub fn new<I, S>(recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: recipients.into_iter().map(Into::into).collect(),
        }
    }

    pub fn allows(&self, recipient: &str) -> bool {
        self.allowed.contains(recipient)
    }

    pub fn allowed(&self) -> impl Iterator<Item = &str> {
        self.allowed.iter().map(String::as_str)
    }

    /// Pass the message through unchanged, or reject it back to its sender.
    pub fn check(&self, unit: &str, message: &Message) -> Message {
        match message.recipient() {
            Some(recipient) if self.allows(recipient) => message.clone(),
            recipient => {
                let listed = self.allowed().collect::<Vec<_>>().join(", ");
                let content = match recipient {
                    Some(name) => {
                        format!("{name:?} is not an allowed recipient (allowed: {listed})")
                    }
                    None => format!("Message has no recipient (allowed: {listed})"),
                };
                Message::feedback(
                    unit,
                    message.sender(),
                    Signal::RejectedRecipient {
                        name: recipient.map(str::to_string),
                    },
                    content,
                )
            }
        }
    }

    pub(super) fn respond(&self, ctx: &ResponderContext<'_>) -> Option<Reply> {
        let latest = ctx.latest()?;
        Some(Reply::Forward(self.check(ctx.unit, latest)))
    }
}
