//! Configuration file loading for taskweave
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `TASKWEAVE_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./taskweave.toml` or `./.taskweave.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/taskweave/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileConfig, FileLlmConfig, FileLoggingConfig, FileOutputConfig,
    FileRunConfig,
};
pub use loader::ConfigLoader;
