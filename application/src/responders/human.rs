//! Human responder
//!
//! Hands the step to a person through the run context's
//! [`InputSource`](crate::ports::input_source::InputSource). What they type
//! is routed like any other raw reply, so `TO[<name>]:` works for humans too.

use super::{Reply, ResponderContext, ResponderError};

#[derive(Debug, Clone, Default)]
pub struct HumanResponder {
    prompt: Option<String>,
}

impl HumanResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub(super) async fn respond(
        &self,
        ctx: &ResponderContext<'_>,
    ) -> Result<Option<Reply>, ResponderError> {
        let prompt = self.prompt.as_deref().unwrap_or(ctx.unit);
        let line = ctx.input.next_input(prompt).await?;
        Ok(line.map(Reply::Text))
    }
}
