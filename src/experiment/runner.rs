//! Generic plan runner
//!
//! Executes the states of an [`ExperimentPlan`] in list order against one
//! simulation handle. For each state:
//!
//! 1. build the output filename (project, state, local timestamp)
//! 2. run the pre-action (`load` + `initialize` on reload)
//! 3. buffered sampling of `application` for `sample_minutes`
//! 4. apply the adjustment, if any
//! 5. buffered sampling of the post application for `post_minutes`, same file
//!
//! The first failing state stops the run: state `n + 1` starts from the
//! simulator state `n` leaves behind, so continuing past a failure would
//! record meaningless data.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;

use crate::experiment::filename::{format_filename, generate_filename};
use crate::experiment::{ExperimentError, ExperimentPlan, PreAction, StateStep};
use crate::output::export::CsvConfig;
use crate::sampler::{AdjustmentOutcome, BufferedSampler, SamplerError, SamplerReport};
use crate::simulation::{SimulationError, SimulationHandle};

// =================================================================================================
// Reports
// =================================================================================================

/// Outcome of one completed state
#[derive(Debug, Clone, PartialEq)]
pub struct StateReport {
    /// State number
    pub state: u32,

    /// CSV file written
    pub path: PathBuf,

    /// Data rows appended across both phases
    pub rows_written: usize,

    /// Flushes across both phases
    pub flushes: usize,

    /// Parameter values around the adjustment
    pub adjustment: Option<AdjustmentOutcome>,
}

/// Outcome of a completed plan
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExperimentReport {
    pub states: Vec<StateReport>,
}

impl ExperimentReport {
    /// Data rows across every state
    pub fn total_rows(&self) -> usize {
        self.states.iter().map(|s| s.rows_written).sum()
    }
}

// =================================================================================================
// Runner
// =================================================================================================

/// Where filename timestamps come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Clock {
    Local,
    Fixed(NaiveDateTime),
}

/// Runs an [`ExperimentPlan`] state by state
#[derive(Debug, Clone)]
pub struct ExperimentRunner {
    plan: ExperimentPlan,
    sampler: BufferedSampler,
    clock: Clock,
}

impl ExperimentRunner {
    /// Validate the plan and prepare a runner for it
    pub fn new(plan: ExperimentPlan) -> Result<Self, ExperimentError> {
        plan.validate()?;
        let sampler = BufferedSampler::new(plan.chunk_size)
            .map_err(|e| ExperimentError::InvalidPlan(e.to_string()))?;

        Ok(Self {
            plan,
            sampler,
            clock: Clock::Local,
        })
    }

    /// Builder pattern: stamp every filename with a fixed time
    pub fn with_timestamp(mut self, timestamp: NaiveDateTime) -> Self {
        self.clock = Clock::Fixed(timestamp);
        self
    }

    /// Builder pattern: set CSV formatting
    pub fn with_csv_config(mut self, config: CsvConfig) -> Self {
        self.sampler = self.sampler.with_csv_config(config);
        self
    }

    /// Plan being run
    pub fn plan(&self) -> &ExperimentPlan {
        &self.plan
    }

    /// Output path of a state
    pub fn path_for(&self, state: u32) -> PathBuf {
        let name = match self.clock {
            Clock::Local => generate_filename(&self.plan.project_name, state),
            Clock::Fixed(ts) => format_filename(&self.plan.project_name, state, &ts),
        };
        self.plan.output_dir.join(name)
    }

    /// Run every state in order
    ///
    /// # Errors
    ///
    /// - [`ExperimentError::Setup`]: `set_speed` refused before the first state
    /// - [`ExperimentError::Simulation`]: reload or adjustment of a state failed
    /// - [`ExperimentError::Sampler`]: a sampling phase of a state failed
    ///
    /// States after the failing one are not attempted.
    pub fn run<S>(&self, sim: &mut S) -> Result<ExperimentReport, ExperimentError>
    where
        S: SimulationHandle + ?Sized,
    {
        if let Some(speed) = self.plan.speed {
            sim.set_speed(speed).map_err(ExperimentError::Setup)?;
        }

        log::info!(
            "=== Starting '{}' on {}: {} states, {} simulated minutes ===",
            self.plan.project_name,
            sim.name(),
            self.plan.states.len(),
            self.plan.total_minutes()
        );

        let mut report = ExperimentReport::default();
        for step in &self.plan.states {
            match self.run_state(sim, step) {
                Ok(state_report) => report.states.push(state_report),
                Err(err) => {
                    log::error!("State {} failed, stopping the sequence: {err}", step.state);
                    return Err(err);
                }
            }
        }

        log::info!(
            "=== Finished '{}': {} rows in {} files ===",
            self.plan.project_name,
            report.total_rows(),
            report.states.len()
        );
        Ok(report)
    }

    fn run_state<S>(&self, sim: &mut S, step: &StateStep) -> Result<StateReport, ExperimentError>
    where
        S: SimulationHandle + ?Sized,
    {
        let state = step.state;
        let path = self.path_for(state);
        log::info!("--- STATE {state} ---");

        self.pre_action(sim, &step.pre_action)
            .map_err(|source| ExperimentError::Simulation { state, source })?;

        let first = self
            .sample(sim, &step.application, step.sample_minutes, &path)
            .map_err(|source| ExperimentError::Sampler { state, source })?;

        let adjustment = match &step.adjustment {
            Some(adjustment) => Some(
                adjustment
                    .apply(sim, &step.application)
                    .map_err(|source| ExperimentError::Simulation { state, source })?,
            ),
            None => None,
        };

        let second = self
            .sample(sim, step.post_application(), step.post_minutes, &path)
            .map_err(|source| ExperimentError::Sampler { state, source })?;

        Ok(StateReport {
            state,
            path,
            rows_written: first.rows_written + second.rows_written,
            flushes: first.flushes.len() + second.flushes.len(),
            adjustment,
        })
    }

    fn pre_action<S>(&self, sim: &mut S, action: &PreAction) -> Result<(), SimulationError>
    where
        S: SimulationHandle + ?Sized,
    {
        match action {
            PreAction::None => Ok(()),
            PreAction::Reload(target) => {
                log::debug!(
                    "Reloading {} / {} / {}",
                    target.model,
                    target.parameters,
                    target.initial_conditions
                );
                sim.load(&target.model, &target.parameters, &target.initial_conditions)?;
                sim.initialize()
            }
        }
    }

    fn sample<S>(
        &self,
        sim: &mut S,
        application: &str,
        minutes: u32,
        path: &Path,
    ) -> Result<SamplerReport, SamplerError>
    where
        S: SimulationHandle + ?Sized,
    {
        self.sampler.run(sim, application, &self.plan.signals, minutes, path)
    }
}

/// Validate and run a plan with local-time filenames
pub fn run_plan<S>(sim: &mut S, plan: ExperimentPlan) -> Result<ExperimentReport, ExperimentError>
where
    S: SimulationHandle + ?Sized,
{
    ExperimentRunner::new(plan)?.run(sim)
}

// =================================================================================================
// Tests
// =================================================================================================
