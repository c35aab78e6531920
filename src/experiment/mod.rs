//! Experiment sequencing
//!
//! An experiment is a linear sequence of *states*. Each state records one
//! CSV file: sample for a while, optionally nudge a setpoint, sample again to
//! capture the response.
//!
//! # Modules
//!
//! - [`plan`]: the data model ([`ExperimentPlan`], [`StateStep`], [`PreAction`])
//! - [`filename`]: `{project}_state{n}_{dd.mm.yyyy_HH-MM}.csv`
//! - [`runner`]: the single generic runner consuming a plan
//!
//! # Example
//!
//! ```rust,no_run
//! use setpoint_sweep::experiment::{run_plan, ExperimentPlan, StateStep};
//! use setpoint_sweep::models::FirstOrderPlant;
//! use setpoint_sweep::simulation::Signal;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut plant = FirstOrderPlant::new("demo").with_parameter("A", "Level", 0.5);
//! let plan = ExperimentPlan::new("demo", vec![Signal::new("Level", "m")])
//!     .with_state(StateStep::new(0, "A", 2).then(None, 10));
//!
//! let report = run_plan(&mut plant, plan)?;
//! println!("{} rows", report.total_rows());
//! # Ok(())
//! # }
//! ```

pub mod filename;
pub mod plan;
pub mod runner;

use crate::config::ConfigError;
use crate::sampler::SamplerError;
use crate::simulation::SimulationError;

pub use filename::{format_filename, generate_filename, TIMESTAMP_FORMAT};
pub use plan::{ExperimentPlan, PreAction, ReloadTarget, StateStep, DEFAULT_CHUNK_SIZE};
pub use runner::{run_plan, ExperimentReport, ExperimentRunner, StateReport};

/// Errors raised while preparing or running an experiment
#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    /// Plan rejected by validation
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    /// Plan file could not be read or parsed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Simulator refused a plan-wide setting
    #[error("simulator setup failed: {0}")]
    Setup(#[source] SimulationError),

    /// Reload or adjustment of a state failed
    #[error("state {state}: {source}")]
    Simulation {
        state: u32,
        #[source]
        source: SimulationError,
    },

    /// A sampling phase of a state failed
    #[error("state {state}: {source}")]
    Sampler {
        state: u32,
        #[source]
        source: SamplerError,
    },
}

impl ExperimentError {
    /// State that failed, if the error belongs to one
    pub fn state(&self) -> Option<u32> {
        match self {
            ExperimentError::Simulation { state, .. } | ExperimentError::Sampler { state, .. } => Some(*state),
            _ => None,
        }
    }
}
