//! First-order controller tuning (SIMC rules)
//!
//! From an open-loop step test on a first-order-plus-delay process:
//!
//! ```text
//! k   = Δy / Δu
//! Kc  = (1 / k) · τ₁ / (τc + θ)
//! τI  = min(τ₁, 4 · (τc + θ))
//! ```
//!
//! with τ₁ the process time constant, θ the delay and τc the desired
//! closed-loop time constant (the only tuning knob).

use nalgebra::DVector;

use crate::analysis::AnalysisError;

/// Open-loop step test summary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepResponse {
    pub y_min: f64,
    pub y_max: f64,
    pub u_min: f64,
    pub u_max: f64,

    /// Process time constant τ₁
    pub tau_1: f64,

    /// Process delay θ
    pub delay: f64,
}

impl StepResponse {
    /// Build from the recorded input and output columns (min/max of each)
    pub fn from_series(u: &DVector<f64>, y: &DVector<f64>, tau_1: f64, delay: f64) -> Result<Self, AnalysisError> {
        if u.is_empty() || y.is_empty() {
            return Err(AnalysisError::EmptySelection);
        }
        Ok(Self {
            y_min: nan_min(y),
            y_max: nan_max(y),
            u_min: nan_min(u),
            u_max: nan_max(u),
            tau_1,
            delay,
        })
    }

    pub fn delta_y(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn delta_u(&self) -> f64 {
        self.u_max - self.u_min
    }

    /// Process gain k = Δy / Δu
    pub fn gain(&self) -> f64 {
        self.delta_y() / self.delta_u()
    }
}

fn nan_min(v: &DVector<f64>) -> f64 {
    v.iter().copied().filter(|x| !x.is_nan()).fold(f64::INFINITY, f64::min)
}

fn nan_max(v: &DVector<f64>) -> f64 {
    v.iter().copied().filter(|x| !x.is_nan()).fold(f64::NEG_INFINITY, f64::max)
}

/// PI settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimcTuning {
    /// Process gain k
    pub process_gain: f64,

    /// k / τ₁, the initial slope of the response per unit input
    pub normalized_gain: f64,

    /// Proportional gain Kc
    pub kc: f64,

    /// Integral time τI
    pub tau_i: f64,
}

/// SIMC PI tuning for a given closed-loop time constant `tau_c`
///
/// # Errors
///
/// [`AnalysisError::InvalidTuning`] when Δu or Δy is zero or not finite,
/// `tau_1` is not positive, or `tau_c + delay` is not positive.
pub fn simc_tuning(response: &StepResponse, tau_c: f64) -> Result<SimcTuning, AnalysisError> {
    let (du, dy) = (response.delta_u(), response.delta_y());
    if !du.is_finite() || du == 0.0 {
        return Err(AnalysisError::InvalidTuning(format!("input step Δu = {du} must be non-zero")));
    }
    if !dy.is_finite() || dy == 0.0 {
        return Err(AnalysisError::InvalidTuning(format!("output change Δy = {dy} must be non-zero")));
    }
    if response.tau_1.is_nan() || response.tau_1 <= 0.0 {
        return Err(AnalysisError::InvalidTuning(format!("τ1 = {} must be positive", response.tau_1)));
    }

    let horizon = tau_c + response.delay;
    if horizon.is_nan() || horizon <= 0.0 {
        return Err(AnalysisError::InvalidTuning(format!("τc + θ = {horizon} must be positive")));
    }

    let k = response.gain();
    Ok(SimcTuning {
        process_gain: k,
        normalized_gain: k / response.tau_1,
        kc: (1.0 / k) * (response.tau_1 / horizon),
        tau_i: response.tau_1.min(4.0 * horizon),
    })
}

// =================================================================================================
// Tests
// =================================================================================================
