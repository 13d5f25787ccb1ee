//! Progress reporting for runs

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;
use taskweave_application::RunObserver;
use taskweave_domain::{Message, StepState};

/// Spinner showing which unit is active and what it is doing
pub struct ProgressReporter {
    root: String,
    spinner: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    /// `root` is the unit whose completion ends the spinner.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            spinner: Mutex::new(None),
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn state_label(state: StepState) -> &'static str {
        match state {
            StepState::Idle => "idle",
            StepState::AwaitingResponder => "thinking...",
            StepState::Routing => "routing",
            StepState::Delivering => "delegating",
            StepState::Done => "done",
        }
    }

    fn finish(&self, message: String) {
        if let Ok(mut spinner) = self.spinner.lock()
            && let Some(pb) = spinner.take()
        {
            pb.finish_with_message(message);
        }
    }
}

impl RunObserver for ProgressReporter {
    fn on_run_start(&self, unit: &str, _input: &Message) {
        if unit != self.root {
            return;
        }
        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_prefix(unit.to_string());
        pb.set_message("starting");
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(mut spinner) = self.spinner.lock() {
            *spinner = Some(pb);
        }
    }

    fn on_state_change(&self, unit: &str, state: StepState) {
        if let Ok(spinner) = self.spinner.lock()
            && let Some(pb) = spinner.as_ref()
        {
            pb.set_prefix(unit.to_string());
            pb.set_message(Self::state_label(state));
        }
    }

    fn on_run_complete(&self, unit: &str, _result: &Message) {
        if unit == self.root {
            self.finish(format!("{}", "complete".green()));
        }
    }

    fn on_run_failed(&self, unit: &str, _error: &str) {
        if unit == self.root {
            self.finish(format!("{}", "failed".red()));
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl RunObserver for SimpleProgress {
    fn on_run_start(&self, unit: &str, _input: &Message) {
        println!("{} {}", "->".cyan(), unit.bold());
    }

    fn on_run_complete(&self, unit: &str, _result: &Message) {
        println!("  {} {}", "v".green(), unit);
    }

    fn on_run_failed(&self, unit: &str, error: &str) {
        println!("  {} {} ({})", "x".red(), unit, error);
    }
}
