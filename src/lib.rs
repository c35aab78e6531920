//! setpoint-sweep: Setpoint Sweeps on Process Simulators
//!
//! Drives a process simulator through a linear sequence of experiment
//! states, records the sampled signals to CSV with a bounded write buffer,
//! and post-processes or plots the recordings.
//!
//! # Architecture
//!
//! setpoint-sweep is built on two core principles:
//!
//! 1. **Separation of Simulation and Recording**
//!    - A simulation handle advances the clock and reads/writes values (what to record)
//!    - The sampler steps, buffers and flushes (how to record)
//!
//! 2. **Experiments as Data**
//!    - A plan is an ordered list of state records
//!    - One generic runner consumes every plan
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use setpoint_sweep::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // 1. A simulator (here the in-process first-order plant)
//! let mut plant = FirstOrderPlant::new("demo")
//!     .with_parameter("A", "PIC:InternalSetpoint", 20.0)
//!     .with_parameter("A", "PIC:Measurement", 20.0)
//!     .with_lag("A", FirstOrderLag::new("PIC:InternalSetpoint", "PIC:Measurement", 1.0, 14.0));
//!
//! // 2. The plan: 2 minutes steady, +10 % setpoint, 10 minutes response
//! let plan = ExperimentPlan::new("demo", vec![Signal::new("PIC:Measurement", "barg")])
//!     .with_chunk_size(300)
//!     .with_state(
//!         StateStep::new(0, "A", 2)
//!             .adjust(ParameterAdjustment::new("PIC:InternalSetpoint", Adjustment::Multiplicative(1.1)))
//!             .then(None, 10),
//!     );
//!
//! // 3. Run it
//! let report = run_plan(&mut plant, plan)?;
//! println!("{} rows written", report.total_rows());
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - [`simulation`]: Simulation handle trait and signal descriptors
//! - [`models`]: In-process simulator for dry runs
//! - [`sampler`]: Buffered/unbuffered sampling and parameter adjustments
//! - [`experiment`]: Plans, filenames and the runner
//! - [`config`]: TOML plan files
//! - [`analysis`]: CSV post-processing (selection, molar mass, tuning)
//! - [`output`]: CSV export and plots

// Core modules
pub mod simulation;

pub mod models;
pub mod sampler;

pub mod experiment;
pub mod config;

pub mod analysis;
pub mod output;

pub mod prelude {
    //! Convenient imports for common usage
    //!
    //! ```rust
    //!
    //! use setpoint_sweep::prelude::*;
    //! ```
    pub use crate::simulation::{Signal,
                                SimulationError,
                                SimulationHandle};
    pub use crate::models::{FirstOrderLag,
                            FirstOrderPlant};
    pub use crate::sampler::{run_buffered,
                             run_unbuffered,
                             Adjustment,
                             BufferedSampler,
                             ParameterAdjustment,
                             Sample,
                             SamplerError,
                             SamplerReport,
                             UnitConversion};
    pub use crate::experiment::{run_plan,
                                ExperimentError,
                                ExperimentPlan,
                                ExperimentRunner,
                                ReloadTarget,
                                StateStep};
}
