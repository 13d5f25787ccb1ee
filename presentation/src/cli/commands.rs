//! CLI command definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for taskweave
#[derive(Parser, Debug)]
#[command(name = "taskweave")]
#[command(author, version, about = "Hierarchical multi-agent task orchestration")]
#[command(long_about = r#"
taskweave runs a tree of units. Each unit has one responder (an LLM agent,
a validator, a human, or a plain function) and may delegate to named
children by starting its reply with TO[<ChildName>]: ...

Configuration files are loaded from (in priority order):
1. TASKWEAVE_* environment variables (e.g. TASKWEAVE_RUN__MAX_STEPS=10)
2. --config <path>        Explicit config file
3. ./taskweave.toml       Project-level config
4. ~/.config/taskweave/config.toml   Global config

Example:
  taskweave num-router 27
  taskweave num-router 6 --offline
  taskweave --model gpt-4o-mini chat --system "Answer in one sentence."
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Debug logging (same as -vv)
    #[arg(long, global = true)]
    pub debug: bool,

    /// Print model replies only once complete
    #[arg(long, global = true)]
    pub no_stream: bool,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration sources and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,

    /// Step budget for looping units
    #[arg(long, value_name = "N", global = true)]
    pub max_steps: Option<usize>,

    /// Model for LLM-backed units
    #[arg(short, long, value_name = "MODEL", global = true)]
    pub model: Option<String>,

    /// Also write diagnostic logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub log_dir: Option<PathBuf>,

    /// Write the run transcript as JSONL into this directory
    #[arg(long, value_name = "DIR", global = true)]
    pub transcript_log: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Route a number through Router -> {EvenHandler, OddHandler} until it reaches 1
    NumRouter {
        /// Starting number
        #[arg(allow_negative_numbers = true)]
        number: i64,

        /// Use deterministic function responders instead of an LLM
        #[arg(long)]
        offline: bool,
    },

    /// Chat with a single agent; an empty line, q, quit, exit or EOF ends the session
    Chat {
        /// System message for the agent
        #[arg(long, value_name = "TEXT")]
        system: Option<String>,
    },
}

impl Cli {
    /// Log level index: 0 = warn, 1 = info, 2 = debug, 3+ = trace
    pub fn verbosity(&self) -> u8 {
        if self.debug {
            self.verbose.max(2)
        } else {
            self.verbose
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_router_with_globals() {
        let cli = Cli::try_parse_from([
            "taskweave",
            "num-router",
            "27",
            "--offline",
            "--max-steps",
            "50",
            "-v",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Some(Command::NumRouter {
                number: 27,
                offline: true
            })
        );
        assert_eq!(cli.max_steps, Some(50));
        assert_eq!(cli.verbosity(), 1);
    }

    #[test]
    fn test_negative_number() {
        let cli = Cli::try_parse_from(["taskweave", "num-router", "-4"]).unwrap();
        assert!(matches!(cli.command, Some(Command::NumRouter { number: -4, .. })));
    }

    #[test]
    fn test_chat_system() {
        let cli = Cli::try_parse_from([
            "taskweave",
            "--model",
            "gpt-4o-mini",
            "chat",
            "--system",
            "Be brief",
        ])
        .unwrap();
        assert_eq!(
            cli.command,
            Some(Command::Chat {
                system: Some("Be brief".to_string())
            })
        );
        assert_eq!(cli.model.as_deref(), Some("gpt-4o-mini"));
    }

    #[test]
    fn test_debug_implies_debug_level() {
        let cli = Cli::try_parse_from(["taskweave", "--debug", "chat"]).unwrap();
        assert_eq!(cli.verbosity(), 2);
    }

    #[test]
    fn test_show_config_needs_no_command() {
        let cli = Cli::try_parse_from(["taskweave", "--show-config"]).unwrap();
        assert!(cli.show_config);
        assert!(cli.command.is_none());
    }
}
