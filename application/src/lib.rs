//! Application layer for taskweave
//!
//! This crate contains the unit engine, the responders, use cases and port
//! definitions. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod responders;
pub mod task;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    composite_observer::CompositeObserver,
    conversation_logger::{
        ConversationEvent, ConversationLogger, NoConversationLogger, TranscriptLogObserver,
    },
    event_stream::{ChannelObserver, EventStream, RunEvent, event_channel},
    input_source::{InputError, InputSource, NoInput, QueuedInput},
    llm_gateway::{GatewayError, LlmGateway, LlmSession, StreamHandle},
    run_observer::{NoObserver, RunObserver},
};
pub use responders::{
    ChatAgent, DEFAULT_VALIDATOR_NAME, FnResponder, HumanResponder, RecipientValidator, Reply,
    Responder, ResponderContext, ResponderError,
};
pub use task::{RunContext, RunError, Task};
pub use use_cases::run_independent::{IndependentRun, RunIndependentUseCase};
