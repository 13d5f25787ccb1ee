//! LLM-backed responder
//!
//! Keeps one [`LlmSession`] per run. Each step sends the transcript entries
//! the model has not seen yet as a single user turn; the session keeps the
//! conversation history.

use super::{Reply, ResponderContext, ResponderError};
use crate::ports::llm_gateway::{LlmGateway, LlmSession};
use std::sync::Arc;
use taskweave_domain::{Message, Model, ROOT_SENDER, USER_SENDER};
use tracing::debug;

pub struct ChatAgent {
    gateway: Arc<dyn LlmGateway>,
    model: Model,
    system_prompt: Option<String>,
    session: Option<Box<dyn LlmSession>>,
    /// Transcript entries already sent to (or produced by) the session
    seen: usize,
}

impl ChatAgent {
    pub fn new(gateway: Arc<dyn LlmGateway>, model: Model) -> Self {
        Self {
            gateway,
            model,
            system_prompt: None,
            session: None,
            seen: 0,
        }
    }

    /// Fallback system prompt for units configured without one.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    async fn open_session(
        &self,
        system_prompt: Option<&str>,
    ) -> Result<Box<dyn LlmSession>, ResponderError> {
        let session = match system_prompt {
            Some(prompt) => {
                self.gateway
                    .create_session_with_system_prompt(&self.model, prompt)
                    .await?
            }
            None => self.gateway.create_session(&self.model).await?,
        };
        Ok(session)
    }

    pub(super) async fn respond(
        &mut self,
        ctx: &ResponderContext<'_>,
    ) -> Result<Option<Reply>, ResponderError> {
        if ctx.is_first_step() || self.session.is_none() {
            let system_prompt = ctx.system_message.or(self.system_prompt.as_deref());
            self.session = Some(self.open_session(system_prompt).await?);
            self.seen = 0;
            debug!(unit = ctx.unit, model = %self.model, "Opened LLM session");
        }

        let pending = &ctx.transcript.messages()[self.seen.min(ctx.transcript.len())..];
        let prompt = render_prompt(ctx.unit, pending);
        self.seen = ctx.transcript.len();
        if prompt.is_empty() {
            return Ok(None);
        }

        let Some(session) = self.session.as_deref() else {
            return Err(ResponderError::Failed("LLM session not open".to_string()));
        };

        let text = if ctx.stream {
            let handle = session.send_streaming(&prompt).await?;
            handle
                .forward(|chunk| ctx.observer.on_stream_chunk(ctx.unit, chunk))
                .await?
        } else {
            session.send(&prompt).await?
        };

        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(Reply::Text(text)))
    }
}

/// Render unseen transcript entries as one user turn.
///
/// The unit's own replies are skipped (the session already has them);
/// feedback addressed to the unit is kept.
fn render_prompt(unit: &str, pending: &[Message]) -> String {
    pending
        .iter()
        .filter(|m| m.sender() != unit || m.is_negative_feedback())
        .map(|m| match m.sender() {
            _ if m.is_negative_feedback() => {
                format!("[feedback from {}] {}", m.sender(), m.content())
            }
            ROOT_SENDER | USER_SENDER => m.content().to_string(),
            sender => format!("[{}]: {}", sender, m.content()),
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
