//! Infrastructure layer for taskweave
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer: configuration file loading, the
//! OpenAI-compatible gateway and JSONL transcript logging.

pub mod config;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigValidationError, FileConfig, FileLlmConfig, FileLoggingConfig,
    FileOutputConfig, FileRunConfig,
};
pub use logging::JsonlConversationLogger;
pub use providers::{OpenAiConfig, OpenAiGateway, OpenAiSession};
