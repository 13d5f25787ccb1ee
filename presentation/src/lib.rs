//! Presentation layer for taskweave
//!
//! This crate contains CLI definitions, console rendering, progress
//! reporters and terminal input.

pub mod cli;
pub mod config;
pub mod input;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use cli::commands::{Cli, Command};
pub use config::OutputConfig;
pub use input::{ConsoleInput, LineInput};
pub use output::console::{ConsoleFormatter, ConsoleRenderer};
pub use progress::reporter::{ProgressReporter, SimpleProgress};
