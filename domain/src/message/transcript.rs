//! Per-run message log owned by a single unit

use super::entities::Message;

/// Ordered, append-only sequence of messages for one run.
///
/// Entries are only ever pushed once a step has completed, so a run that is
/// cancelled or fails leaves a transcript that is shorter but never holds a
/// half-applied step.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh transcript with the run's input as the first entry.
    pub fn seeded(input: Message) -> Self {
        Self {
            messages: vec![input],
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The most recent message, if any.
    pub fn tail(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// Number of negative-feedback entries recorded so far.
    pub fn feedback_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.is_negative_feedback())
            .count()
    }
}

impl<'a> IntoIterator for &'a Transcript {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::entities::Signal;

    #[test]
    fn test_seeded_tail_is_input() {
        let transcript = Transcript::seeded(Message::root("3"));
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.tail().unwrap().content(), "3");
    }

    #[test]
    fn test_feedback_count() {
        let mut transcript = Transcript::seeded(Message::root("3"));
        transcript.push(Message::new("Router", "TO[Nobody]: 3"));
        transcript.push(Message::feedback(
            "Router",
            "Router",
            Signal::UnknownRecipient {
                name: "Nobody".into(),
            },
            "unknown",
        ));
        assert_eq!(transcript.feedback_count(), 1);
        assert_eq!(transcript.iter().count(), 3);
    }
}
