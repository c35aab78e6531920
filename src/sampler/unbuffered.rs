//! Unbuffered sampling
//!
//! Collects every sample in memory and leaves persistence to the caller,
//! typically one [`CsvExporter::write_samples`](crate::output::export::CsvExporter::write_samples)
//! once all phases of a state are done. Simpler than the buffered path, but a
//! failure before the save loses the whole recording.

use crate::sampler::{Sample, SamplerError};
use crate::simulation::{Signal, SimulationHandle, ONE_SECOND};

/// Sample once per simulated second for `minutes`, appending to `samples`
///
/// Appending (rather than returning a fresh vector) lets several phases of
/// one state share a single recording. On error the samples collected so
/// far stay in `samples`.
pub fn sample_into<S>(
    sim: &mut S,
    application: &str,
    signals: &[Signal],
    minutes: u32,
    samples: &mut Vec<Sample>,
) -> Result<usize, SamplerError>
where
    S: SimulationHandle + ?Sized,
{
    let total_seconds = minutes as usize * 60;
    samples.reserve(total_seconds);

    for _ in 0..total_seconds {
        sim.advance(ONE_SECOND)?;
        let values = sim.read_values(application, signals)?;
        if values.len() != signals.len() {
            return Err(SamplerError::ColumnMismatch {
                expected: signals.len(),
                found: values.len(),
            });
        }
        samples.push(Sample::new(sim.model_time(), values));
    }

    Ok(total_seconds)
}

/// Sample once per simulated second for `minutes` into a new vector
pub fn run_unbuffered<S>(
    sim: &mut S,
    application: &str,
    signals: &[Signal],
    minutes: u32,
) -> Result<Vec<Sample>, SamplerError>
where
    S: SimulationHandle + ?Sized,
{
    let mut samples = Vec::new();
    sample_into(sim, application, signals, minutes, &mut samples)?;
    Ok(samples)
}

// =================================================================================================
// Tests
// =================================================================================================
