//! Simulation handle traits and types
//!
//! This module defines the core API the sampler consumes:
//! - `SimulationHandle`: trait for any simulator the crate can drive
//! - `Signal`: name + unit descriptor of a sampled or written variable
//! - `SimulationError`: failures reported by a handle

use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

// =================================================================================================
// Signal descriptor
// =================================================================================================

/// Named, unit-tagged simulator variable
///
/// The name is the identifier understood by the simulator
/// (e.g. `"D-20VA006:Pressure"`), the unit is a display string only.
/// Signals are defined once per experiment as an ordered list; that order is
/// the CSV column order.
///
/// # Example
/// ```
/// use setpoint_sweep::simulation::Signal;
///
/// let signal = Signal::new("P", "bar");
/// assert_eq!(signal.header(), "P [bar]");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct Signal {
    /// Identifier understood by the simulator
    pub name: String,

    /// Display unit
    pub unit: String,
}

impl Signal {
    /// Create a signal descriptor
    pub fn new(name: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
        }
    }

    /// CSV column header: `"{name} [{unit}]"`
    pub fn header(&self) -> String {
        format!("{} [{}]", self.name, self.unit)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header())
    }
}

impl<N: Into<String>, U: Into<String>> From<(N, U)> for Signal {
    fn from((name, unit): (N, U)) -> Self {
        Signal::new(name, unit)
    }
}

// =================================================================================================
// Errors
// =================================================================================================

/// Failure reported by a simulation handle
///
/// A failed step is treated as a corrupted simulation state: callers never
/// retry, they salvage what they have and propagate.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Advancing the clock failed
    #[error("simulation step failed at t = {time} s: {message}")]
    Step { time: f64, message: String },

    /// The application identifier is not known to the simulator
    #[error("unknown application '{0}'")]
    UnknownApplication(String),

    /// The variable does not exist in the given application
    #[error("unknown variable '{name}' in application '{application}'")]
    UnknownVariable { application: String, name: String },

    /// Reading or writing a value failed inside the simulator
    #[error("value access failed for '{name}': {message}")]
    Access { name: String, message: String },

    /// Load / initialize / speed change failed
    #[error("lifecycle operation '{operation}' failed: {message}")]
    Lifecycle { operation: String, message: String },
}

// =================================================================================================
// Simulation handle
// =================================================================================================

/// Live handle on an external process simulator
///
/// # Contract
///
/// - One handle is driven by exactly one thread of control; the simulator is
///   not assumed reentrant, hence `&mut self` on every call that changes it.
/// - `advance` moves the *simulated* clock, not wall-clock time.
/// - `read_values` returns one reading per signal, in the order given.
///
/// Lifecycle calls (`load`, `initialize`, `set_speed`) are opaque to the
/// sampler; experiment plans issue them between sampling phases.
///
/// # Implementing a Handle
///
/// ```rust
/// use std::time::Duration;
/// use setpoint_sweep::simulation::{SimulationHandle, SimulationError};
///
/// struct Clock { t: f64 }
///
/// impl SimulationHandle for Clock {
///     fn advance(&mut self, step: Duration) -> Result<(), SimulationError> {
///         self.t += step.as_secs_f64();
///         Ok(())
///     }
///     fn read_value(&self, _app: &str, _name: &str) -> Result<f64, SimulationError> {
///         Ok(self.t)
///     }
///     fn write_value(&mut self, _app: &str, _name: &str, _value: f64) -> Result<(), SimulationError> {
///         Ok(())
///     }
///     fn model_time(&self) -> f64 { self.t }
///     fn name(&self) -> &str { "Clock" }
/// }
/// ```
pub trait SimulationHandle {
    /// Advance the simulated clock by `step`
    fn advance(&mut self, step: Duration) -> Result<(), SimulationError>;

    /// Read one named value from an application
    fn read_value(&self, application: &str, name: &str) -> Result<f64, SimulationError>;

    /// Read all signals from an application, in list order
    ///
    /// The default implementation reads the signals one by one; simulators
    /// with a batched read should override it.
    fn read_values(&self, application: &str, signals: &[Signal]) -> Result<Vec<f64>, SimulationError> {
        signals
            .iter()
            .map(|signal| self.read_value(application, &signal.name))
            .collect()
    }

    /// Write one named value into an application
    fn write_value(&mut self, application: &str, name: &str, value: f64) -> Result<(), SimulationError>;

    /// Elapsed simulated time in seconds
    fn model_time(&self) -> f64;

    /// Load model, parameter and initial-condition files
    fn load(&mut self, _model: &str, _parameters: &str, _initial_conditions: &str) -> Result<(), SimulationError> {
        Ok(())
    }

    /// Initialize the loaded timeline
    fn initialize(&mut self) -> Result<(), SimulationError> {
        Ok(())
    }

    /// Set the execution speed relative to real time
    fn set_speed(&mut self, _factor: f64) -> Result<(), SimulationError> {
        Ok(())
    }

    /// Simulator name (for logging)
    fn name(&self) -> &str;
}

impl<S: SimulationHandle + ?Sized> SimulationHandle for &mut S {
    fn advance(&mut self, step: Duration) -> Result<(), SimulationError> {
        (**self).advance(step)
    }

    fn read_value(&self, application: &str, name: &str) -> Result<f64, SimulationError> {
        (**self).read_value(application, name)
    }

    fn read_values(&self, application: &str, signals: &[Signal]) -> Result<Vec<f64>, SimulationError> {
        (**self).read_values(application, signals)
    }

    fn write_value(&mut self, application: &str, name: &str, value: f64) -> Result<(), SimulationError> {
        (**self).write_value(application, name, value)
    }

    fn model_time(&self) -> f64 {
        (**self).model_time()
    }

    fn load(&mut self, model: &str, parameters: &str, initial_conditions: &str) -> Result<(), SimulationError> {
        (**self).load(model, parameters, initial_conditions)
    }

    fn initialize(&mut self) -> Result<(), SimulationError> {
        (**self).initialize()
    }

    fn set_speed(&mut self, factor: f64) -> Result<(), SimulationError> {
        (**self).set_speed(factor)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

// ================================================================================================
// Tests
// ================================================================================================
