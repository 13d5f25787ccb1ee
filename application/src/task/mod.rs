//! Orchestration unit
//!
//! A [`Task`] owns one [`Responder`], an ordered list of child tasks and the
//! transcript of its current run. Hierarchies are built bottom-up with
//! [`Task::add_sub_task`] and then run from the root; children never point
//! back at their parent.

pub mod context;
pub mod error;
mod run;

#[cfg(test)]
mod tests;

pub use context::RunContext;
pub use error::RunError;

use crate::responders::{DEFAULT_VALIDATOR_NAME, RecipientValidator, Responder};
use taskweave_domain::{
    DelegationMode, DomainError, StepState, TaskConfig, Transcript, check_sibling_names,
};

#[derive(Debug)]
pub struct Task {
    config: TaskConfig,
    responder: Responder,
    children: Vec<Task>,
    transcript: Transcript,
    state: StepState,
    runs: usize,
}

impl Task {
    pub fn new(config: TaskConfig, responder: impl Into<Responder>) -> Result<Self, DomainError> {
        config.validate()?;
        Ok(Self {
            config,
            responder: responder.into(),
            children: Vec::new(),
            transcript: Transcript::new(),
            state: StepState::Idle,
            runs: 0,
        })
    }

    /// Single-round validator unit named `RecipientValidator`.
    pub fn validator<I, S>(recipients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config: TaskConfig::new(DEFAULT_VALIDATOR_NAME).single_round(),
            responder: RecipientValidator::new(recipients).into(),
            children: Vec::new(),
            transcript: Transcript::new(),
            state: StepState::Idle,
            runs: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    pub fn responder(&self) -> &Responder {
        &self.responder
    }

    pub fn children(&self) -> &[Task] {
        &self.children
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(Task::name).collect()
    }

    pub fn child(&self, name: &str) -> Option<&Task> {
        self.children.iter().find(|c| c.name() == name)
    }

    /// Transcript of the latest run (empty before the first run).
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> StepState {
        self.state
    }

    pub fn run_count(&self) -> usize {
        self.runs
    }

    pub fn delegates_by_llm(&self) -> bool {
        self.config.delegation == DelegationMode::Llm
    }

    /// Validator children check every delivery instead of taking it.
    pub fn is_gate(&self) -> bool {
        self.responder.is_validator()
    }

    /// Attach `units` as children, all or nothing.
    ///
    /// Fails with `DuplicateChildName` if any name collides with an existing
    /// child or another unit in the batch, and with `HierarchySealed` once
    /// this unit has run. On failure the child set is unchanged.
    pub fn add_sub_task(
        &mut self,
        units: impl IntoIterator<Item = Task>,
    ) -> Result<(), DomainError> {
        if self.runs > 0 {
            return Err(DomainError::HierarchySealed(self.config.name.clone()));
        }
        let units: Vec<Task> = units.into_iter().collect();
        check_sibling_names(
            self.children.iter().map(Task::name),
            units.iter().map(Task::name),
        )?;
        self.children.extend(units);
        Ok(())
    }

    /// Builder form of [`Task::add_sub_task`].
    pub fn with_sub_tasks(
        mut self,
        units: impl IntoIterator<Item = Task>,
    ) -> Result<Self, DomainError> {
        self.add_sub_task(units)?;
        Ok(self)
    }
}
