//! Responders
//!
//! A responder is the pluggable decision-maker inside an orchestration unit.
//! The set is closed: every variant is dispatched through [`Responder`], and
//! composition happens by nesting [`Task`](crate::task::Task)s, not by adding
//! responder kinds.

pub mod chat_agent;
pub mod function;
pub mod human;
pub mod validator;

pub use chat_agent::ChatAgent;
pub use function::FnResponder;
pub use human::HumanResponder;
pub use validator::{DEFAULT_VALIDATOR_NAME, RecipientValidator};

use crate::ports::input_source::{InputError, InputSource};
use crate::ports::llm_gateway::GatewayError;
use crate::ports::run_observer::RunObserver;
use taskweave_domain::{Message, Transcript};
use thiserror::Error;

/// What a responder produced for one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Raw text, routed through the `TO[<name>]:` grammar.
    Text(String),
    /// A message the responder built itself, routed by its own recipient.
    Forward(Message),
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

/// Errors raised by a responder
///
/// The engine never retries these; they surface to the caller as
/// [`RunError::ResponderFailure`](crate::task::RunError::ResponderFailure).
#[derive(Error, Debug)]
pub enum ResponderError {
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("{0}")]
    Failed(String),
}

/// Everything a responder may look at while producing a reply
pub struct ResponderContext<'a> {
    /// Name of the unit that owns the responder
    pub unit: &'a str,
    /// 1-based step number within the current run
    pub step: usize,
    /// Framing text from the unit's configuration
    pub system_message: Option<&'a str>,
    pub transcript: &'a Transcript,
    pub observer: &'a dyn RunObserver,
    pub input: &'a dyn InputSource,
    /// Whether streamed output should be forwarded to the observer
    pub stream: bool,
}

impl ResponderContext<'_> {
    /// The most recent transcript message, usually the one to answer.
    pub fn latest(&self) -> Option<&Message> {
        self.transcript.tail()
    }

    pub fn is_first_step(&self) -> bool {
        self.step <= 1
    }
}

/// Closed set of responder kinds
pub enum Responder {
    Agent(ChatAgent),
    Validator(RecipientValidator),
    Human(HumanResponder),
    Function(FnResponder),
}

impl Responder {
    /// Produce the reply for one step. `Ok(None)` means "nothing to say".
    pub async fn respond(
        &mut self,
        ctx: &ResponderContext<'_>,
    ) -> Result<Option<Reply>, ResponderError> {
        match self {
            Responder::Agent(agent) => agent.respond(ctx).await,
            Responder::Validator(validator) => Ok(validator.respond(ctx)),
            Responder::Human(human) => human.respond(ctx).await,
            Responder::Function(function) => function.respond(ctx),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Responder::Agent(_) => "agent",
            Responder::Validator(_) => "validator",
            Responder::Human(_) => "human",
            Responder::Function(_) => "function",
        }
    }

    pub fn is_validator(&self) -> bool {
        matches!(self, Responder::Validator(_))
    }
}

impl std::fmt::Debug for Responder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Responder").field(&self.kind()).finish()
    }
}

impl From<ChatAgent> for Responder {
    fn from(agent: ChatAgent) -> Self {
        Responder::Agent(agent)
    }
}

impl From<RecipientValidator> for Responder {
    fn from(validator: RecipientValidator) -> Self {
        Responder::Validator(validator)
    }
}

impl From<HumanResponder> for Responder {
    fn from(human: HumanResponder) -> Self {
        Responder::Human(human)
    }
}

impl From<FnResponder> for Responder {
    fn from(function: FnResponder) -> Self {
        Responder::Function(function)
    }
}
