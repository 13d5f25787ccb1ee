//! Function responder
//!
//! Wraps a plain closure. Used for deterministic units (offline demos,
//! handlers with fixed arithmetic) and as the scripted test double.

use super::{Reply, ResponderContext, ResponderError};
use std::collections::VecDeque;
use taskweave_domain::Message;

type ReplyFn =
    dyn FnMut(&ResponderContext<'_>) -> Result<Option<Reply>, ResponderError> + Send + Sync;

/// Responder backed by a closure over the responder context
pub struct FnResponder {
    func: Box<ReplyFn>,
}

impl FnResponder {
    pub fn new<F>(func: F) -> Self
    where
        F: FnMut(&ResponderContext<'_>) -> Result<Option<Reply>, ResponderError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            func: Box::new(func),
        }
    }

    /// Answer the latest message with `func(latest)` as raw text.
    pub fn replying<F>(func: F) -> Self
    where
        F: Fn(&Message) -> Option<String> + Send + Sync + 'static,
    {
        Self::new(move |ctx| Ok(ctx.latest().and_then(|m| func(m)).map(Reply::Text)))
    }

    /// Reply with each entry in turn, then with nothing.
    pub fn scripted<I, R>(replies: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Reply>,
    {
        let mut queue: VecDeque<Reply> = replies.into_iter().map(Into::into).collect();
        Self::new(move |_| Ok(queue.pop_front()))
    }

    pub(super) fn respond(
        &mut self,
        ctx: &ResponderContext<'_>,
    ) -> Result<Option<Reply>, ResponderError> {
        (self.func)(ctx)
    }
}
