//! Console rendering of runs

use colored::Colorize;
use std::io::Write;
use std::sync::Mutex;
use taskweave_application::RunObserver;
use taskweave_domain::{Message, RoutingError, preview};

const PREVIEW_LEN: usize = 400;

/// Formats run messages for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// One transcript entry, as seen from `unit`
    pub fn format_message(unit: &str, message: &Message) -> String {
        let content = preview(message.content(), PREVIEW_LEN);
        let route = match message.recipient() {
            Some(recipient) => format!("{} -> {}", message.sender(), recipient),
            None => message.sender().to_string(),
        };

        if let Some(signal) = message.signal() {
            return format!(
                "{} {} {} {}",
                format!("[{}]", unit).dimmed(),
                route.yellow(),
                format!("({})", signal.as_str()).red(),
                content
            );
        }
        format!(
            "{} {} {}",
            format!("[{}]", unit).dimmed(),
            format!("{}:", route).cyan().bold(),
            content
        )
    }

    pub fn format_routing_error(unit: &str, error: &RoutingError) -> String {
        format!("{} {} {}", format!("[{}]", unit).dimmed(), "routing:".red().bold(), error)
    }

    /// Final result of the top-level run
    pub fn format_result(result: &Message) -> String {
        format!(
            "\n{}\n{} {}\n",
            "=== Result ===".cyan().bold(),
            format!("{}:", result.sender()).yellow().bold(),
            result.content()
        )
    }

    pub fn format_failure(error: &str) -> String {
        format!("{} {}", "Run failed:".red().bold(), error)
    }
}

/// Prints every transcript append as it happens.
///
/// Streamed chunks are written straight to stdout; the completed reply that
/// follows them is not printed a second time.
#[derive(Default)]
pub struct ConsoleRenderer {
    /// Unit whose reply is currently being streamed
    streaming: Mutex<Option<String>>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn take_streaming(&self, unit: &str) -> bool {
        let Ok(mut streaming) = self.streaming.lock() else {
            return false;
        };
        if streaming.as_deref() == Some(unit) {
            *streaming = None;
            true
        } else {
            false
        }
    }
}

impl RunObserver for ConsoleRenderer {
    fn on_message(&self, unit: &str, message: &Message) {
        if message.sender() == unit
            && !message.is_negative_feedback()
            && self.take_streaming(unit)
        {
            println!();
            return;
        }
        println!("{}", ConsoleFormatter::format_message(unit, message));
    }

    fn on_routing_error(&self, unit: &str, error: &RoutingError) {
        println!("{}", ConsoleFormatter::format_routing_error(unit, error));
    }

    fn on_stream_chunk(&self, unit: &str, chunk: &str) {
        if let Ok(mut streaming) = self.streaming.lock()
            && streaming.is_none()
        {
            *streaming = Some(unit.to_string());
            print!("{} {} ", format!("[{}]", unit).dimmed(), format!("{}:", unit).cyan().bold());
        }
        print!("{}", chunk);
        let _ = std::io::stdout().flush();
    }

    fn on_run_complete(&self, unit: &str, _result: &Message) {
        // A stream that produced no message still left its prefix on the line
        if self.take_streaming(unit) {
            println!();
        }
    }

    fn on_run_failed(&self, unit: &str, _error: &str) {
        if self.take_streaming(unit) {
            println!();
        }
    }
}
