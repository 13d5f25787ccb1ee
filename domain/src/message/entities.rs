//! Message entity and the negative-feedback signal

use serde::{Deserialize, Serialize};

/// Sender id for input handed to a top-level `run` by its caller.
pub const ROOT_SENDER: &str = "root";

/// Sender id for turns typed by a human through an input source.
pub const USER_SENDER: &str = "user";

/// Why a previous action was rejected.
///
/// A [`Message`] carrying a signal is negative feedback: it goes back to the
/// sender that made the mistake and is never routed any further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Signal {
    /// The directive named a unit that is not a child.
    UnknownRecipient { name: String },
    /// A delegating unit replied without naming a recipient.
    Unaddressed,
    /// A validator refused the recipient (`None` when the message had none).
    RejectedRecipient { name: Option<String> },
    /// No child in declaration order produced a usable reply.
    NoEligibleChild,
    /// A child unit's run failed and the parent absorbed the failure.
    ChildFailed { child: String },
}

impl Signal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Signal::UnknownRecipient { .. } => "unknown_recipient",
            Signal::Unaddressed => "unaddressed",
            Signal::RejectedRecipient { .. } => "rejected_recipient",
            Signal::NoEligibleChild => "no_eligible_child",
            Signal::ChildFailed { .. } => "child_failed",
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message in a unit's transcript (Entity)
///
/// Fields are private: once built a message never changes, and anything that
/// looks like an edit ([`Message::restamped`]) produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    content: String,
    sender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    signal: Option<Signal>,
}

impl Message {
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            sender: sender.into(),
            recipient: None,
            signal: None,
        }
    }

    /// Input supplied by whoever calls `run`.
    pub fn root(content: impl Into<String>) -> Self {
        Self::new(ROOT_SENDER, content)
    }

    /// A turn typed by a human.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(USER_SENDER, content)
    }

    /// Negative feedback from `sender`, addressed back to `recipient`.
    pub fn feedback(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        signal: Signal,
        content: impl Into<String>,
    ) -> Self {
        Self {
            content: content.into(),
            sender: sender.into(),
            recipient: Some(recipient.into()),
            signal: Some(signal),
        }
    }

    pub fn addressed_to(mut self, recipient: impl Into<String>) -> Self {
        self.recipient = Some(recipient.into());
        self
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn recipient(&self) -> Option<&str> {
        self.recipient.as_deref()
    }

    pub fn signal(&self) -> Option<&Signal> {
        self.signal.as_ref()
    }

    pub fn is_negative_feedback(&self) -> bool {
        self.signal.is_some()
    }

    pub fn is_addressed(&self) -> bool {
        self.recipient.is_some()
    }

    /// Same content and signal, re-attributed to `sender` and unaddressed.
    ///
    /// Used when a child's result is recorded in the parent's transcript.
    pub fn restamped(&self, sender: impl Into<String>) -> Self {
        Self {
            content: self.content.clone(),
            sender: sender.into(),
            recipient: None,
            signal: self.signal.clone(),
        }
    }
}

impl From<&str> for Message {
    /// Caller-supplied run input
    fn from(content: &str) -> Self {
        Message::root(content)
    }
}

impl From<String> for Message {
    fn from(content: String) -> Self {
        Message::root(content)
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.recipient {
            Some(to) => write!(f, "{} -> {}: {}", self.sender, to, self.content),
            None => write!(f, "{}: {}", self.sender, self.content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_message_is_unaddressed() {
        let msg = Message::root("3");
        assert_eq!(msg.sender(), ROOT_SENDER);
        assert_eq!(msg.content(), "3");
        assert!(msg.recipient().is_none());
        assert!(!msg.is_negative_feedback());
    }

    #[test]
    fn test_feedback_is_addressed_back() {
        let msg = Message::feedback(
            "RecipientValidator",
            "Router",
            Signal::RejectedRecipient {
                name: Some("Nobody".into()),
            },
            "invalid recipient",
        );
        assert_eq!(msg.recipient(), Some("Router"));
        assert!(msg.is_negative_feedback());
    }

    #[test]
    fn test_restamped_builds_new_message() {
        let original = Message::new("OddHandler", "10").addressed_to("Router");
        let stamped = original.restamped("Child");
        assert_eq!(stamped.sender(), "Child");
        assert_eq!(stamped.content(), "10");
        assert!(stamped.recipient().is_none());
        // The original is untouched
        assert_eq!(original.sender(), "OddHandler");
        assert_eq!(original.recipient(), Some("Router"));
    }

    #[test]
    fn test_display_includes_recipient() {
        let msg = Message::new("Router", "3").addressed_to("OddHandler");
        assert_eq!(msg.to_string(), "Router -> OddHandler: 3");
    }

    #[test]
    fn test_signal_serializes_tagged() {
        let json = serde_json::to_value(Signal::UnknownRecipient { name: "X".into() }).unwrap();
        assert_eq!(json["kind"], "unknown_recipient");
        assert_eq!(json["name"], "X");
    }
}
