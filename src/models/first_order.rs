//! In-process first-order plant
//!
//! A small stand-in for the external process simulator. Each application
//! holds a set of named parameters (setpoints, valve positions, measurements)
//! and a list of first-order lags linking an input parameter to an output
//! parameter:
//!
//! ```text
//! τ · dy/dt = (bias + K · u) − y
//! ```
//!
//! Each `advance(dt)` integrates the lags exactly over `dt`
//! (`y ← y + (y∞ − y) · (1 − e^(−dt/τ))`), so a one-second step is exact
//! regardless of τ. `load` + `initialize` restore the initial values, which
//! mirrors reloading an initial-conditions file before each experiment state.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use setpoint_sweep::models::{FirstOrderLag, FirstOrderPlant};
//! use setpoint_sweep::simulation::SimulationHandle;
//!
//! let mut plant = FirstOrderPlant::new("separator")
//!     .with_parameter("A", "PIC:InternalSetpoint", 20.0)
//!     .with_parameter("A", "PIC:Measurement", 20.0)
//!     .with_lag("A", FirstOrderLag::new("PIC:InternalSetpoint", "PIC:Measurement", 1.0, 30.0));
//!
//! plant.write_value("A", "PIC:InternalSetpoint", 22.0).unwrap();
//! plant.advance(Duration::from_secs(600)).unwrap();
//! assert!((plant.read_value("A", "PIC:Measurement").unwrap() - 22.0).abs() < 1e-3);
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use crate::simulation::{SimulationError, SimulationHandle};

// =================================================================================================
// First-order lag
// =================================================================================================

/// First-order response of `output` to `input`
///
/// Steady state: `output = bias + gain · input`.
#[derive(Debug, Clone, PartialEq)]
pub struct FirstOrderLag {
    /// Driving parameter (setpoint, valve position, ...)
    pub input: String,

    /// Responding parameter (measurement)
    pub output: String,

    /// Static gain K
    pub gain: f64,

    /// Time constant τ in seconds (must be positive)
    pub time_constant: f64,

    /// Offset added to the steady state
    pub bias: f64,
}

impl FirstOrderLag {
    /// Create a lag with zero bias
    pub fn new(input: impl Into<String>, output: impl Into<String>, gain: f64, time_constant: f64) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            gain,
            time_constant,
            bias: 0.0,
        }
    }

    /// Builder pattern: set bias
    pub fn bias(mut self, bias: f64) -> Self {
        self.bias = bias;
        self
    }

    /// Steady-state output for a given input
    pub fn steady_state(&self, input: f64) -> f64 {
        self.bias + self.gain * input
    }
}

// =================================================================================================
// Application
// =================================================================================================

#[derive(Debug, Clone, Default)]
struct Application {
    initial: BTreeMap<String, f64>,
    values: BTreeMap<String, f64>,
    lags: Vec<FirstOrderLag>,
}

impl Application {
    fn step(&mut self, dt: f64) {
        for lag in &self.lags {
            let Some(&input) = self.values.get(&lag.input) else {
                continue;
            };
            let target = lag.steady_state(input);
            let current = self.values.get(&lag.output).copied().unwrap_or(target);
            let alpha = if lag.time_constant > 0.0 {
                1.0 - (-dt / lag.time_constant).exp()
            } else {
                1.0
            };
            self.values.insert(lag.output.clone(), current + (target - current) * alpha);
        }
    }

    fn reset(&mut self) {
        self.values = self.initial.clone();
    }
}

// =================================================================================================
// Plant
// =================================================================================================

/// Deterministic in-process simulator made of first-order lags
#[derive(Debug, Clone)]
pub struct FirstOrderPlant {
    name: String,
    time: f64,
    speed: f64,
    loaded: Option<(String, String, String)>,
    applications: BTreeMap<String, Application>,
}

impl FirstOrderPlant {
    /// Create an empty plant
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            time: 0.0,
            speed: 1.0,
            loaded: None,
            applications: BTreeMap::new(),
        }
    }

    /// Builder pattern: declare a parameter with its initial value
    ///
    /// The application is created on first use.
    pub fn with_parameter(mut self, application: &str, name: &str, value: f64) -> Self {
        self.add_parameter(application, name, value);
        self
    }

    /// Builder pattern: add a first-order lag to an application
    pub fn with_lag(mut self, application: &str, lag: FirstOrderLag) -> Self {
        self.add_lag(application, lag);
        self
    }

    /// Declare a parameter with its initial value
    pub fn add_parameter(&mut self, application: &str, name: &str, value: f64) {
        let app = self.applications.entry(application.to_string()).or_default();
        app.initial.insert(name.to_string(), value);
        app.values.insert(name.to_string(), value);
    }

    /// Add a first-order lag to an application
    pub fn add_lag(&mut self, application: &str, lag: FirstOrderLag) {
        self.applications
            .entry(application.to_string())
            .or_default()
            .lags
            .push(lag);
    }

    /// Names of the declared applications
    pub fn applications(&self) -> Vec<&str> {
        self.applications.keys().map(String::as_str).collect()
    }

    /// Current speed factor (informational only)
    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Files passed to the last `load` call
    pub fn loaded_files(&self) -> Option<&(String, String, String)> {
        self.loaded.as_ref()
    }

    fn application(&self, application: &str) -> Result<&Application, SimulationError> {
        self.applications
            .get(application)
            .ok_or_else(|| SimulationError::UnknownApplication(application.to_string()))
    }
}

impl SimulationHandle for FirstOrderPlant {
    fn advance(&mut self, step: Duration) -> Result<(), SimulationError> {
        let dt = step.as_secs_f64();
        for app in self.applications.values_mut() {
            app.step(dt);
        }
        self.time += dt;
        Ok(())
    }

    fn read_value(&self, application: &str, name: &str) -> Result<f64, SimulationError> {
        self.application(application)?
            .values
            .get(name)
            .copied()
            .ok_or_else(|| SimulationError::UnknownVariable {
                application: application.to_string(),
                name: name.to_string(),
            })
    }

    fn write_value(&mut self, application: &str, name: &str, value: f64) -> Result<(), SimulationError> {
        let app = self
            .applications
            .get_mut(application)
            .ok_or_else(|| SimulationError::UnknownApplication(application.to_string()))?;

        match app.values.get_mut(name) {
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

    fn load(&mut self, model: &str, parameters: &str, initial_conditions: &str) -> Result<(), SimulationError> {
        self.loaded = Some((model.to_string(), parameters.to_string(), initial_conditions.to_string()));
        for app in self.applications.values_mut() {
            app.reset();
        }
        Ok(())
    }

    fn initialize(&mut self) -> Result<(), SimulationError> {
        self.time = 0.0;
        Ok(())
    }

    fn set_speed(&mut self, factor: f64) -> Result<(), SimulationError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(SimulationError::Lifecycle {
                operation: "set_speed".to_string(),
                message: format!("speed factor must be positive, got {factor}"),
            });
        }
        self.speed = factor;
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// =================================================================================================
// Tests
// =================================================================================================
