//! CLI entrypoint for taskweave
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod num_router;

use anyhow::{Context, Result, bail};
use clap::Parser;
use num_router::Responders;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use taskweave_application::{
    ChatAgent, CompositeObserver, ExecutionParams, InputSource, LlmGateway, RunError,
    RunObserver, Task, TranscriptLogObserver,
};
use taskweave_domain::{Message, Model, TaskConfig};
use taskweave_infrastructure::{
    ConfigLoader, FileConfig, JsonlConversationLogger, OpenAiConfig, OpenAiGateway,
};
use taskweave_presentation::{
    Cli, Command, ConsoleFormatter, ConsoleInput, ConsoleRenderer, OutputConfig, ProgressReporter,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const CHAT_UNIT: &str = "Assistant";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_tracing(cli.verbosity(), cli.log_dir.as_deref());

    info!("Starting taskweave");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?
    };

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        println!();
        println!("Effective configuration:");
        println!("{}", toml::to_string_pretty(&config)?);
        return Ok(());
    }

    config.validate()?;

    let Some(command) = cli.command.clone() else {
        bail!("No command given. Try `taskweave num-router 27` or `taskweave chat`.");
    };

    // Flags override file and environment settings
    let params = ExecutionParams::default()
        .with_max_steps(cli.max_steps.unwrap_or(config.run.max_steps))
        .with_stream(config.llm.stream && !cli.no_stream);
    let model = cli
        .model
        .as_deref()
        .map(Model::from)
        .unwrap_or_else(|| config.llm.model.clone());
    let output = OutputConfig {
        color: config.output.color,
        show_progress: config.output.show_progress && !cli.quiet,
        stream: params.stream,
    };
    if !output.color {
        colored::control::set_override(false);
    }

    // === Cancellation ===
    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling run");
                token.cancel();
            }
        });
    }

    // === Dependency Injection ===
    let mut ctx = params.run_context().with_cancellation(token);
    let (mut task, input) = match command {
        Command::NumRouter { number, offline } => {
            let responders = if offline {
                Responders::Offline
            } else {
                Responders::Llm {
                    gateway: build_gateway(&config)?,
                    model,
                }
            };
            let task = num_router::build(&responders, &params)?;
            (task, Message::root(number.to_string()))
        }
        Command::Chat { system } => {
            let gateway = build_gateway(&config)?;
            let mut unit = TaskConfig::new(CHAT_UNIT).with_termination(params.interactive());
            if let Some(system) = system {
                unit = unit.with_system_message(system);
            }
            let task = Task::new(unit, ChatAgent::new(gateway, model))?;

            let console = Arc::new(ConsoleInput::stdin());
            let Some(first) = next_line(&console).await? else {
                return Ok(());
            };
            ctx = ctx.with_input(console);
            (task, Message::user(first))
        }
    };

    let observer = build_observer(&cli, &config, &output, task.name());
    let ctx = ctx.with_observer(observer);

    match task.run_async(input, &ctx).await {
        Ok(result) => {
            println!("{}", ConsoleFormatter::format_result(&result));
            Ok(())
        }
        Err(RunError::Cancelled) => {
            eprintln!("{}", ConsoleFormatter::format_failure("cancelled"));
            Ok(())
        }
        Err(e) if e.is_budget_exceeded() => {
            bail!("{e}. Raise it with --max-steps or [run] max_steps in taskweave.toml")
        }
        Err(e) => Err(e.into()),
    }
}

/// Console tracing by verbosity, plus a daily rolling file when `log_dir` is set.
fn init_tracing(verbosity: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "taskweave.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    guard
}

fn build_gateway(config: &FileConfig) -> Result<Arc<dyn LlmGateway>> {
    let llm = &config.llm;
    let endpoint = OpenAiConfig::from_env(&llm.api_key_env)
        .with_context(|| format!("Set {} or use --offline", llm.api_key_env))?
        .with_base_url(llm.base_url.as_str())
        .with_temperature(llm.temperature)
        .with_timeout(Duration::from_secs(llm.timeout_seconds.unwrap_or(120)));
    info!(base_url = %endpoint.base_url, "Using OpenAI-compatible endpoint");
    Ok(Arc::new(OpenAiGateway::new(endpoint)?))
}

fn build_observer(
    cli: &Cli,
    config: &FileConfig,
    output: &OutputConfig,
    root: &str,
) -> Arc<dyn RunObserver> {
    let mut observer = CompositeObserver::new(Vec::new()).with(Arc::new(ConsoleRenderer::new()));

    if output.spinner_enabled() {
        observer = observer.with(Arc::new(ProgressReporter::new(root)));
    }

    let transcript_dir = cli
        .transcript_log
        .as_ref()
        .or(config.logging.transcript_dir.as_ref());
    if let Some(dir) = transcript_dir {
        match JsonlConversationLogger::in_dir(dir, root) {
            Some(logger) => {
                info!(path = %logger.path().display(), "Writing transcript");
                observer = observer.with(Arc::new(TranscriptLogObserver::new(Arc::new(logger))));
            }
            None => warn!(dir = %dir.display(), "Transcript logging disabled"),
        }
    }

    Arc::new(observer)
}

async fn next_line(console: &ConsoleInput) -> Result<Option<String>> {
    Ok(console.next_input(CHAT_UNIT).await?)
}
