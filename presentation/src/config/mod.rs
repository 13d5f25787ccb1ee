//! Presentation-level configuration
//!
//! Configuration for terminal output.

use serde::{Deserialize, Serialize};

/// Output configuration for the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Enable colored terminal output
    pub color: bool,
    /// Show progress indicators
    pub show_progress: bool,
    /// Model output is streamed to the terminal as it arrives
    pub stream: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            color: true,
            show_progress: true,
            stream: true,
        }
    }
}

impl OutputConfig {
    /// A spinner only makes sense when nothing else is writing to the line.
    pub fn spinner_enabled(&self) -> bool {
        self.show_progress && !self.stream
    }
}
