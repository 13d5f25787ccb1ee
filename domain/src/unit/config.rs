//! Unit configuration (read-only after construction)

use crate::core::error::DomainError;
use crate::unit::naming::validate_unit_name;
use serde::{Deserialize, Serialize};

/// Step budget applied to looping units unless configured otherwise.
pub const DEFAULT_MAX_STEPS: usize = 20;

/// How a unit picks the child that acts next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelegationMode {
    /// The unit's own responder names the child with a `TO[...]` directive.
    Llm,
    /// Children are offered the message in declaration order.
    #[default]
    Static,
}

impl From<bool> for DelegationMode {
    /// `llm_delegate` flag to mode
    fn from(llm_delegate: bool) -> Self {
        if llm_delegate {
            DelegationMode::Llm
        } else {
            DelegationMode::Static
        }
    }
}

/// When a unit's run is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum TerminationPolicy {
    /// Done after exactly one successful step.
    SingleRound,
    /// Loop until a done-condition fires or `max_steps` is exhausted.
    Continuous { max_steps: usize },
    /// Like `Continuous`, but each terminal reply is followed by a human turn
    /// from the run's input source; the run ends when input runs out.
    Interactive { max_steps: usize },
}

impl TerminationPolicy {
    pub fn continuous() -> Self {
        TerminationPolicy::Continuous {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    pub fn interactive() -> Self {
        TerminationPolicy::Interactive {
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Upper bound on steps in one run.
    pub fn max_steps(&self) -> usize {
        match self {
            TerminationPolicy::SingleRound => 1,
            TerminationPolicy::Continuous { max_steps }
            | TerminationPolicy::Interactive { max_steps } => *max_steps,
        }
    }

    pub fn is_single_round(&self) -> bool {
        matches!(self, TerminationPolicy::SingleRound)
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, TerminationPolicy::Interactive { .. })
    }

    /// Same policy with a different budget; single round is left alone.
    pub fn with_max_steps(self, max_steps: usize) -> Self {
        match self {
            TerminationPolicy::SingleRound => self,
            TerminationPolicy::Continuous { .. } => TerminationPolicy::Continuous { max_steps },
            TerminationPolicy::Interactive { .. } => TerminationPolicy::Interactive { max_steps },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TerminationPolicy::SingleRound => "single_round",
            TerminationPolicy::Continuous { .. } => "continuous",
            TerminationPolicy::Interactive { .. } => "interactive",
        }
    }
}

impl Default for TerminationPolicy {
    fn default() -> Self {
        Self::continuous()
    }
}

/// Configuration for one orchestration unit (Entity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Unique among siblings; also the resolution key for `TO[...]`.
    pub name: String,
    pub delegation: DelegationMode,
    pub termination: TerminationPolicy,
    /// Framing text handed to the responder, opaque to the engine.
    pub system_message: Option<String>,
}

impl TaskConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            delegation: DelegationMode::default(),
            termination: TerminationPolicy::default(),
            system_message: None,
        }
    }

    pub fn single_round(mut self) -> Self {
        self.termination = TerminationPolicy::SingleRound;
        self
    }

    pub fn interactive(mut self) -> Self {
        self.termination = TerminationPolicy::Interactive {
            max_steps: self.termination.max_steps().max(DEFAULT_MAX_STEPS),
        };
        self
    }

    pub fn llm_delegate(mut self, enabled: bool) -> Self {
        self.delegation = DelegationMode::from(enabled);
        self
    }

    pub fn with_termination(mut self, termination: TerminationPolicy) -> Self {
        self.termination = termination;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.termination = self.termination.with_max_steps(max_steps);
        self
    }

    pub fn with_system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = Some(message.into());
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), DomainError> {
        validate_unit_name(&self.name)?;
        if self.termination.max_steps() == 0 {
            return Err(DomainError::ZeroStepBudget);
        }
        Ok(())
    }
}
