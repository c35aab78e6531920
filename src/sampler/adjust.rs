//! Parameter adjustments between sampling phases
//!
//! An adjustment reads the current value of a named parameter, transforms
//! it and writes the result back. Two transforms exist because the
//! experiments use both, and they are **not** equivalent:
//!
//! | Operation          | New value                    | Typical use            |
//! |--------------------|------------------------------|------------------------|
//! | `Multiplicative`   | `current · factor`           | ±10 % setpoint steps   |
//! | `AdditivePercent`  | `current + delta / 100`      | fractional setpoints   |
//! | `Additive`         | `current + delta`            | temperature offsets    |
//!
//! # Unit conversion hook
//!
//! Temperatures are stored in Kelvin, where multiplying is meaningless
//! (1.1 · 303.15 K is not "+10 %" of anything useful). A
//! [`UnitConversion::KelvinCelsius`] hook converts to °C before the
//! transform and back to Kelvin before writing:
//!
//! ```text
//! 303.15 K → 30 °C → 30 · 1.1 = 33 °C → 306.15 K
//! ```

use std::fmt;

use crate::simulation::{SimulationError, SimulationHandle};

/// Offset between Kelvin and degrees Celsius
pub const KELVIN_OFFSET: f64 = 273.15;

// =================================================================================================
// Operation and conversion
// =================================================================================================

/// Transform applied to the current value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Adjustment {
    /// `current · factor` (1.1 for +10 %, 0.9 for −10 %)
    Multiplicative(f64),

    /// `current + delta / 100`
    AdditivePercent(f64),

    /// `current + delta`
    Additive(f64),
}

impl Adjustment {
    /// Apply the transform to a value
    pub fn apply(&self, current: f64) -> f64 {
        match *self {
            Adjustment::Multiplicative(factor) => current * factor,
            Adjustment::AdditivePercent(delta) => current + delta / 100.0,
            Adjustment::Additive(delta) => current + delta,
        }
    }
}

impl fmt::Display for Adjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Adjustment::Multiplicative(factor) => write!(f, "x{factor} ({:.1}%)", factor * 100.0),
            Adjustment::AdditivePercent(delta) => write!(f, "{delta:+.1}/100"),
            Adjustment::Additive(delta) => write!(f, "{delta:+.1}"),
        }
    }
}

/// Conversion applied around the transform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitConversion {
    /// Transform the stored value directly
    #[default]
    None,

    /// Stored in Kelvin, transformed in °C
    KelvinCelsius,
}

impl UnitConversion {
    /// Stored unit → working unit
    pub fn to_working(&self, stored: f64) -> f64 {
        match self {
            UnitConversion::None => stored,
            UnitConversion::KelvinCelsius => stored - KELVIN_OFFSET,
        }
    }

    /// Working unit → stored unit
    pub fn to_stored(&self, working: f64) -> f64 {
        match self {
            UnitConversion::None => working,
            UnitConversion::KelvinCelsius => working + KELVIN_OFFSET,
        }
    }
}

// =================================================================================================
// Parameter adjustment
// =================================================================================================

/// Adjustment of one named parameter
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterAdjustment {
    /// Simulator parameter name (e.g. `"D-27PIC0101:InternalSetpoint"`)
    pub parameter: String,

    /// Transform
    pub adjustment: Adjustment,

    /// Conversion around the transform
    pub conversion: UnitConversion,
}

/// Values before and after an adjustment, in the stored unit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjustmentOutcome {
    pub previous: f64,
    pub updated: f64,
}

impl ParameterAdjustment {
    /// Create an adjustment without unit conversion
    pub fn new(parameter: impl Into<String>, adjustment: Adjustment) -> Self {
        Self {
            parameter: parameter.into(),
            adjustment,
            conversion: UnitConversion::None,
        }
    }

    /// Builder pattern: set unit conversion
    pub fn with_conversion(mut self, conversion: UnitConversion) -> Self {
        self.conversion = conversion;
        self
    }

    /// Value that would be written for a given stored value
    pub fn transform(&self, stored: f64) -> f64 {
        let working = self.conversion.to_working(stored);
        self.conversion.to_stored(self.adjustment.apply(working))
    }

    /// Read, transform and write back
    pub fn apply<S>(&self, sim: &mut S, application: &str) -> Result<AdjustmentOutcome, SimulationError>
    where
        S: SimulationHandle + ?Sized,
    {
        let previous = sim.read_value(application, &self.parameter)?;
        let updated = self.transform(previous);
        sim.write_value(application, &self.parameter, updated)?;

        log::info!(
            "Adjusted {}: {} -> {} ({})",
            self.parameter,
            previous,
            updated,
            self.adjustment
        );

        Ok(AdjustmentOutcome { previous, updated })
    }
}

// =================================================================================================
// Named entry points
// =================================================================================================

/// Multiply a parameter by `multiplier`
pub fn adjust_parameter_multiplicative<S>(
    sim: &mut S,
    application: &str,
    parameter: &str,
    multiplier: f64,
) -> Result<AdjustmentOutcome, SimulationError>
where
    S: SimulationHandle + ?Sized,
{
    ParameterAdjustment::new(parameter, Adjustment::Multiplicative(multiplier)).apply(sim, application)
}

/// Add `delta / 100` to a parameter
pub fn adjust_parameter_additive_percent<S>(
    sim: &mut S,
    application: &str,
    parameter: &str,
    delta: f64,
) -> Result<AdjustmentOutcome, SimulationError>
where
    S: SimulationHandle + ?Sized,
{
    ParameterAdjustment::new(parameter, Adjustment::AdditivePercent(delta)).apply(sim, application)
}

/// Multiply a Kelvin-stored temperature by `multiplier` on the Celsius scale
pub fn adjust_temperature_multiplicative<S>(
    sim: &mut S,
    application: &str,
    parameter: &str,
    multiplier: f64,
) -> Result<AdjustmentOutcome, SimulationError>
where
    S: SimulationHandle + ?Sized,
{
    ParameterAdjustment::new(parameter, Adjustment::Multiplicative(multiplier))
        .with_conversion(UnitConversion::KelvinCelsius)
        .apply(sim, application)
}

/// Add `delta` °C to a Kelvin-stored temperature
pub fn adjust_temperature_additive<S>(
    sim: &mut S,
    application: &str,
    parameter: &str,
    delta: f64,
) -> Result<AdjustmentOutcome, SimulationError>
where
    S: SimulationHandle + ?Sized,
{
    ParameterAdjustment::new(parameter, Adjustment::Additive(delta))
        .with_conversion(UnitConversion::KelvinCelsius)
        .apply(sim, application)
}

// =================================================================================================
// Tests
// =================================================================================================
