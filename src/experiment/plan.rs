//! Experiment plan data model
//!
//! A plan is plain data: an ordered list of [`StateStep`] records consumed
//! front to back by the runner. There is no transition table; state `n + 1`
//! always follows state `n` in list order.
//!
//! # Step anatomy
//!
//! ```text
//! pre_action ─► sample(application, sample_minutes) ─► adjustment? ─► sample(post_application, post_minutes)
//!                   └────────────────── same CSV file ───────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use setpoint_sweep::experiment::{ExperimentPlan, ReloadTarget, StateStep};
//! use setpoint_sweep::sampler::{Adjustment, ParameterAdjustment};
//! use setpoint_sweep::simulation::Signal;
//!
//! let reload = ReloadTarget::new("Plant", "Plant", "SteadyState");
//! let plan = ExperimentPlan::new("Plant", vec![Signal::new("PIC:Measurement", "barg")])
//!     .with_chunk_size(300)
//!     .with_state(StateStep::new(0, "App A", 2).then(None, 180))
//!     .with_state(
//!         StateStep::new(1, "App A", 1)
//!             .reload(reload)
//!             .adjust(ParameterAdjustment::new("PIC:InternalSetpoint", Adjustment::Multiplicative(1.1)))
//!             .then(None, 1),
//!     );
//!
//! assert!(plan.validate().is_ok());
//! assert_eq!(plan.total_minutes(), 185);
//! ```

use std::collections::HashSet;
use std::path::PathBuf;

use crate::experiment::ExperimentError;
use crate::sampler::ParameterAdjustment;
use crate::simulation::Signal;

/// Default number of samples per flush
pub const DEFAULT_CHUNK_SIZE: usize = 300;

// =================================================================================================
// Pre-actions
// =================================================================================================

/// Model, parameter set and initial conditions passed to `load`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadTarget {
    pub model: String,
    pub parameters: String,
    pub initial_conditions: String,
}

impl ReloadTarget {
    pub fn new(
        model: impl Into<String>,
        parameters: impl Into<String>,
        initial_conditions: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            parameters: parameters.into(),
            initial_conditions: initial_conditions.into(),
        }
    }
}

/// What happens before a state starts sampling
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PreAction {
    /// Continue from wherever the previous state left the simulator
    #[default]
    None,

    /// `load(...)` then `initialize()`
    Reload(ReloadTarget),
}

// =================================================================================================
// State step
// =================================================================================================

/// One experiment state
#[derive(Debug, Clone, PartialEq)]
pub struct StateStep {
    /// State number, used in the filename
    pub state: u32,

    /// Run before the first sampling phase
    pub pre_action: PreAction,

    /// Application sampled during the first phase
    pub application: String,

    /// Duration of the first phase
    pub sample_minutes: u32,

    /// Applied between the phases (on `application`)
    pub adjustment: Option<ParameterAdjustment>,

    /// Application sampled during the second phase, `application` when `None`
    pub post_application: Option<String>,

    /// Duration of the second phase
    pub post_minutes: u32,
}

impl StateStep {
    /// Single-phase state without pre-action or adjustment
    pub fn new(state: u32, application: impl Into<String>, sample_minutes: u32) -> Self {
        Self {
            state,
            pre_action: PreAction::None,
            application: application.into(),
            sample_minutes,
            adjustment: None,
            post_application: None,
            post_minutes: 0,
        }
    }

    /// Builder pattern: reload the model before sampling
    pub fn reload(mut self, target: ReloadTarget) -> Self {
        self.pre_action = PreAction::Reload(target);
        self
    }

    /// Builder pattern: adjust a parameter between the phases
    pub fn adjust(mut self, adjustment: ParameterAdjustment) -> Self {
        self.adjustment = Some(adjustment);
        self
    }

    /// Builder pattern: second phase, optionally on another application
    pub fn then(mut self, post_application: Option<&str>, post_minutes: u32) -> Self {
        self.post_application = post_application.map(str::to_string);
        self.post_minutes = post_minutes;
        self
    }

    /// Application of the second phase
    pub fn post_application(&self) -> &str {
        self.post_application.as_deref().unwrap_or(&self.application)
    }

    /// Simulated minutes across both phases
    pub fn total_minutes(&self) -> u32 {
        self.sample_minutes + self.post_minutes
    }
}

// =================================================================================================
// Plan
// =================================================================================================

/// Ordered list of states plus what they share
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentPlan {
    /// Filename prefix
    pub project_name: String,

    /// Samples per flush
    pub chunk_size: usize,

    /// Directory receiving the CSV files
    pub output_dir: PathBuf,

    /// Simulation speed factor applied before the first state
    pub speed: Option<f64>,

    /// Sampled signals, in column order
    pub signals: Vec<Signal>,

    /// States, in execution order
    pub states: Vec<StateStep>,
}

impl ExperimentPlan {
    /// Empty plan writing to the current directory
    pub fn new(project_name: impl Into<String>, signals: Vec<Signal>) -> Self {
        Self {
            project_name: project_name.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            output_dir: PathBuf::from("."),
            speed: None,
            signals,
            states: Vec::new(),
        }
    }

    /// Builder pattern: set chunk size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Builder pattern: set output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Builder pattern: set simulation speed
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Builder pattern: append a state
    pub fn with_state(mut self, step: StateStep) -> Self {
        self.states.push(step);
        self
    }

    /// Simulated minutes across all states
    pub fn total_minutes(&self) -> u32 {
        self.states.iter().map(StateStep::total_minutes).sum()
    }

    /// Check the plan before anything touches the simulator
    ///
    /// # Errors
    ///
    /// [`ExperimentError::InvalidPlan`] when:
    /// - there is no state
    /// - two states share a number (they would share a filename)
    /// - `chunk_size` is zero
    /// - `speed` is not strictly positive
    /// - an application name is empty
    pub fn validate(&self) -> Result<(), ExperimentError> {
        if self.states.is_empty() {
            return Err(ExperimentError::InvalidPlan("plan has no states".into()));
        }

        if self.chunk_size == 0 {
            return Err(ExperimentError::InvalidPlan("chunk_size must be at least 1".into()));
        }

        if let Some(speed) = self.speed {
            if speed.is_nan() || speed <= 0.0 {
                return Err(ExperimentError::InvalidPlan(format!(
                    "speed must be positive, got {speed}"
                )));
            }
        }

        let mut seen = HashSet::new();
        for step in &self.states {
            if !seen.insert(step.state) {
                return Err(ExperimentError::InvalidPlan(format!(
                    "state {} appears more than once",
                    step.state
                )));
            }
            if step.application.is_empty() || step.post_application().is_empty() {
                return Err(ExperimentError::InvalidPlan(format!(
                    "state {} has an empty application name",
                    step.state
                )));
            }
        }

        Ok(())
    }
}

// =================================================================================================
// Tests
// =================================================================================================
