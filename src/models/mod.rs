//! In-process simulation models
//!
//! All models implement the [`SimulationHandle`](crate::simulation::SimulationHandle)
//! trait. The sampler calls `advance` once per simulated second and reads the
//! signal values back; models are responsible for the dynamics, the sampler
//! for the recording.
//!
//! # Available Models
//!
//! ## [`FirstOrderPlant`] — first-order lags
//!
//! Named parameters grouped by application, with first-order lags linking
//! setpoints or valve positions to measurements. Deterministic, so it is
//! used for dry runs of experiment plans and throughout the test suite.

// =================================================================================================
// Module Declarations
// =================================================================================================

pub mod first_order;

// =================================================================================================
// Public Re-exports
// =================================================================================================

pub use first_order::{FirstOrderLag, FirstOrderPlant};
