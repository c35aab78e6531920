//! Simulation handles
//!
//! This module defines the boundary between the crate and the process
//! simulator it drives. The simulator itself (physics, numerical
//! integration, object model) is external; the crate only needs a handle
//! that can advance the clock, read values and write values.
//!
//! # Core Concepts
//!
//! - **Simulation Handle**: live, single-threaded handle on a simulator
//! - **Signal**: name + unit descriptor; an ordered list of signals defines
//!   the CSV columns of a recording
//!
//! # Architecture
//!
//! The handle is **separate from the sampling logic**:
//! - The handle provides the **simulation** (external, opaque)
//! - The sampler provides the **recording** (stepping, buffering, flushing)
//!
//! Any simulator binding can be driven by the sampler once it implements
//! [`SimulationHandle`]. The crate ships one in-process implementation,
//! [`FirstOrderPlant`](crate::models::FirstOrderPlant), for dry runs and tests.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use setpoint_sweep::models::FirstOrderPlant;
//! use setpoint_sweep::simulation::{SimulationHandle, Signal};
//!
//! let mut plant = FirstOrderPlant::new("demo")
//!     .with_parameter("A", "valve", 50.0);
//!
//! plant.advance(Duration::from_secs(1)).unwrap();
//! let values = plant.read_values("A", &[Signal::new("valve", "%")]).unwrap();
//! assert_eq!(values, vec![50.0]);
//! ```

pub mod traits;

pub use traits::{Signal, SimulationError, SimulationHandle};

use std::time::Duration;

/// Fixed sampling step: one simulated second
pub const ONE_SECOND: Duration = Duration::from_secs(1);
