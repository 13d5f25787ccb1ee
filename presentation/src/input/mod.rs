//! Terminal input

pub mod console_input;

pub use console_input::{ConsoleInput, LineInput};
