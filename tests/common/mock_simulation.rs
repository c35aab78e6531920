//! Mock simulation handles for testing
//!
//! Readings are a known function of model time, so every row of a recording
//! can be checked exactly, and faults can be injected at a chosen second.

use std::collections::HashMap;
use std::time::Duration;

use setpoint_sweep::simulation::{Signal, SimulationError, SimulationHandle};

// =================================================================================================
// Fault injection
// =================================================================================================

/// Which call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `advance` fails on the n-th call (1-based); the clock does not move
    Advance(usize),

    /// `read_values` fails right after the n-th successful advance
    Read(usize),
}

// =================================================================================================
// Ramp simulation: signal i reads 10 * t + i
// =================================================================================================

/// Deterministic handle whose signal `i` reads `10 * model_time + i`
///
/// Signal names are ignored for sampling (position matters); named
/// parameters can be declared for adjustment tests.
pub struct RampSimulation {
    time: f64,
    advances: usize,
    fault: Option<Fault>,
    parameters: HashMap<String, f64>,
}

impl RampSimulation {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            advances: 0,
            fault: None,
            parameters: HashMap::new(),
        }
    }

    /// Builder pattern: inject a fault
    pub fn failing(mut self, fault: Fault) -> Self {
        self.fault = Some(fault);
        self
    }

    /// Builder pattern: declare a parameter
    pub fn with_parameter(mut self, name: &str, value: f64) -> Self {
        self.parameters.insert(name.to_string(), value);
        self
    }

    /// Expected reading of signal `index` at `time`
    pub fn expected(time: f64, index: usize) -> f64 {
        10.0 * time + index as f64
    }

    /// Successful advances so far
    pub fn advances(&self) -> usize {
        self.advances
    }
}

impl SimulationHandle for RampSimulation {
    fn advance(&mut self, step: Duration) -> Result<(), SimulationError> {
        if self.fault == Some(Fault::Advance(self.advances + 1)) {
            return Err(SimulationError::Step {
                time: self.time,
                message: "injected advance fault".to_string(),
            });
        }
        self.advances += 1;
        self.time += step.as_secs_f64();
        Ok(())
    }

    fn read_value(&self, application: &str, name: &str) -> Result<f64, SimulationError> {
        self.parameters
            .get(name)
            .copied()
            .ok_or_else(|| SimulationError::UnknownVariable {
                application: application.to_string(),
                name: name.to_string(),
            })
    }

    fn read_values(&self, _application: &str, signals: &[Signal]) -> Result<Vec<f64>, SimulationError> {
        if self.fault == Some(Fault::Read(self.advances)) {
            return Err(SimulationError::Access {
                name: "*".to_string(),
                message: format!("injected read fault at t = {}", self.time),
            });
        }
        Ok((0..signals.len()).map(|i| Self::expected(self.time, i)).collect())
    }

    fn write_value(&mut self, application: &str, name: &str, value: f64) -> Result<(), SimulationError> {
        match self.parameters.get_mut(name) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(SimulationError::UnknownVariable {
                application: application.to_string(),
                name: name.to_string(),
            }),
        }
    }

    fn model_time(&self) -> f64 {
        self.time
    }

    fn name(&self) -> &str {
        "RampSimulation"
    }
}
