//! Sampling of simulator signals
//!
//! # Overview
//!
//! A sampling phase advances the simulator one second at a time for a given
//! number of minutes and records one row per second: the model time followed
//! by one value per [`Signal`](crate::simulation::Signal).
//!
//! Two strategies exist:
//!
//! | Strategy      | Module                    | Persistence                              |
//! |---------------|---------------------------|------------------------------------------|
//! | Buffered      | [`buffered`]              | appended in chunks, salvaged on failure   |
//! | Unbuffered    | [`unbuffered`]            | in memory, saved once by the caller       |
//!
//! Between phases a state can nudge a parameter with an [`adjust`] operation.
//!
//! # Data Flow
//!
//! ```text
//! SimulationHandle ──advance(1 s)──► read_values ──► Sample ──► SampleBuffer
//!                                                                   │ full?
//!                                                                   ▼
//!                                                       CsvExporter::append_samples
//! ```

pub mod adjust;
pub mod buffer;
pub mod buffered;
pub mod unbuffered;

use crate::output::export::CsvError;
use crate::simulation::SimulationError;

pub use adjust::{
    adjust_parameter_additive_percent, adjust_parameter_multiplicative, adjust_temperature_additive,
    adjust_temperature_multiplicative, Adjustment, AdjustmentOutcome, ParameterAdjustment, UnitConversion,
};
pub use buffer::{Sample, SampleBuffer};
pub use buffered::{run_buffered, BufferedSampler, FlushEvent, FlushTrigger, ProgressMark, SamplerReport};
pub use unbuffered::{run_unbuffered, sample_into};

/// Errors raised while sampling
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// Simulator refused to advance, read or write
    #[error(transparent)]
    Simulation(#[from] SimulationError),

    /// Header or chunk could not be written
    #[error(transparent)]
    Export(#[from] CsvError),

    /// A chunk size of zero never fills
    #[error("chunk size must be at least 1")]
    InvalidChunkSize,

    /// Simulator returned a different number of values than requested
    #[error("expected {expected} values per sample, simulator returned {found}")]
    ColumnMismatch { expected: usize, found: usize },
}
