//! Buffered sampler
//!
//! # Algorithm
//!
//! For a run of `minutes` on one application:
//!
//! 1. Write the CSV header if the file is absent or empty
//! 2. For each of the `minutes * 60` simulated seconds:
//!    - advance the simulator by exactly one second
//!    - read every signal, prepend the model time → one [`Sample`]
//!    - push it onto the buffer; flush when `chunk_size` samples are waiting
//! 3. Flush whatever remains
//!
//! # Failure Semantics
//!
//! A simulator error (or a column mismatch) inside the loop triggers a
//! salvage flush of the buffer before the error is returned. A failing
//! salvage flush is logged and not retried; the *original* error is what the
//! caller sees.
//!
//! A failed chunk flush ([`SamplerError::Export`]) is returned as is, with no
//! salvage. The append may have failed partway through, and writing the same
//! rows again would duplicate them in the file. At most `chunk_size` samples
//! are lost in that case.
//!
//! # Example
//!
//! ```rust,ignore
//! use setpoint_sweep::sampler::BufferedSampler;
//!
//! let sampler = BufferedSampler::new(300)?;
//! let report = sampler.run(&mut sim, "Hugin A", &signals, 60, "state0.csv")?;
//! println!("{} rows in {} flushes", report.rows_written, report.flushes.len());
//! ```

use std::path::Path;

use crate::output::export::{CsvConfig, CsvExporter};
use crate::sampler::{Sample, SampleBuffer, SamplerError};
use crate::simulation::{Signal, SimulationHandle, ONE_SECOND};

// =================================================================================================
// Run report
// =================================================================================================

/// Why a flush happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    /// Buffer reached `chunk_size` inside the loop
    ChunkFull,

    /// Remaining samples written after the loop
    EndOfRun,
}

/// One successful write of buffered rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlushEvent {
    /// Rows appended by this flush
    pub rows: usize,

    /// Simulated second (1-based within the run) at which the flush happened
    pub second: usize,

    /// What caused it
    pub trigger: FlushTrigger,
}

/// Progress checkpoint reached during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressMark {
    /// 25, 50, 75 or 100
    pub percent: u8,

    /// Simulated second at which it was reported
    pub second: usize,
}

/// Summary of a completed run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SamplerReport {
    /// Header row written by this run
    pub header_written: bool,

    /// Data rows appended
    pub rows_written: usize,

    /// Every flush, in order
    pub flushes: Vec<FlushEvent>,

    /// Progress checkpoints reported
    pub progress: Vec<ProgressMark>,

    /// Model time of the last sample (or of the simulator at start for empty runs)
    pub final_model_time: f64,
}

// =================================================================================================
// Progress checkpoints
// =================================================================================================

/// Four integer checkpoints at 25/50/75/100 % of a run, computed once
#[derive(Debug, Clone)]
pub(crate) struct Checkpoints {
    marks: [usize; 4],
    next: usize,
}

impl Checkpoints {
    pub(crate) fn new(total_seconds: usize) -> Self {
        Self {
            marks: [
                total_seconds / 4,
                total_seconds / 2,
                total_seconds * 3 / 4,
                total_seconds,
            ],
            next: 0,
        }
    }

    /// Checkpoints crossed at `second`, each reported once
    ///
    /// Short runs can have several checkpoints at the same second (or at
    /// second 0); they are all reported on the first second at or past them.
    pub(crate) fn reached(&mut self, second: usize) -> Vec<u8> {
        let mut percents = Vec::new();
        while self.next < self.marks.len() && second >= self.marks[self.next] {
            self.next += 1;
            percents.push((25 * self.next) as u8);
        }
        percents
    }
}

// =================================================================================================
// Sampler
// =================================================================================================

/// Chunked, crash-tolerant sampler writing to an append-only CSV
#[derive(Debug, Clone)]
pub struct BufferedSampler {
    chunk_size: usize,
    exporter: CsvExporter,
}

impl BufferedSampler {
    /// Create a sampler flushing every `chunk_size` samples
    ///
    /// # Errors
    ///
    /// [`SamplerError::InvalidChunkSize`] when `chunk_size == 0`.
    pub fn new(chunk_size: usize) -> Result<Self, SamplerError> {
        if chunk_size == 0 {
            return Err(SamplerError::InvalidChunkSize);
        }
        Ok(Self {
            chunk_size,
            exporter: CsvExporter::default(),
        })
    }

    /// Builder pattern: set CSV formatting
    pub fn with_csv_config(mut self, config: CsvConfig) -> Self {
        self.exporter = CsvExporter::new(config);
        self
    }

    /// Configured chunk size
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Sample `signals` of `application` once per simulated second for `minutes`
    ///
    /// # Errors
    ///
    /// - [`SamplerError::Simulation`]: advance or read failed
    /// - [`SamplerError::Export`]: header or flush write failed
    /// - [`SamplerError::ColumnMismatch`]: simulator returned the wrong number of values
    ///
    /// In every case the buffered samples were flushed (best effort) first.
    pub fn run<S, P>(
        &self,
        sim: &mut S,
        application: &str,
        signals: &[Signal],
        minutes: u32,
        path: P,
    ) -> Result<SamplerReport, SamplerError>
    where
        S: SimulationHandle + ?Sized,
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let total_seconds = minutes as usize * 60;
        let mut checkpoints = Checkpoints::new(total_seconds);
        let mut buffer = SampleBuffer::new(self.chunk_size)?;

        let mut report = SamplerReport {
            header_written: self.exporter.ensure_header(path, signals)?,
            final_model_time: sim.model_time(),
            ..Default::default()
        };

        log::info!(
            "Starting {}min simulation on '{}' (chunk {}) -> {}",
            minutes,
            application,
            self.chunk_size,
            path.display()
        );

        for second in 1..=total_seconds {
            if let Err(err) = self.step(sim, application, signals, second, path, &mut buffer, &mut report) {
                if worth_salvaging(&err) {
                    self.salvage(&mut buffer, path);
                }
                log::error!("Simulation failed at second {second} of {total_seconds}: {err}");
                return Err(err);
            }

            for percent in checkpoints.reached(second) {
                log::info!("  Progress {percent}%...");
                report.progress.push(ProgressMark { percent, second });
            }
        }

        if !buffer.is_empty() {
            let rows = buffer.flush_to(&self.exporter, path)?;
            report.rows_written += rows;
            report.flushes.push(FlushEvent {
                rows,
                second: total_seconds,
                trigger: FlushTrigger::EndOfRun,
            });
            log::debug!("Final flush of {rows} rows to {}", path.display());
        }

        log::info!("Completed {}min simulation -> data in {}", minutes, path.display());
        Ok(report)
    }

    /// One simulated second: advance, read, buffer, flush if full
    #[allow(clippy::too_many_arguments)]
    fn step<S>(
        &self,
        sim: &mut S,
        application: &str,
        signals: &[Signal],
        second: usize,
        path: &Path,
        buffer: &mut SampleBuffer,
        report: &mut SamplerReport,
    ) -> Result<(), SamplerError>
    where
        S: SimulationHandle + ?Sized,
    {
        sim.advance(ONE_SECOND)?;

        let values = sim.read_values(application, signals)?;
        if values.len() != signals.len() {
            return Err(SamplerError::ColumnMismatch {
                expected: signals.len(),
                found: values.len(),
            });
        }

        let model_time = sim.model_time();
        report.final_model_time = model_time;

        if buffer.push(Sample::new(model_time, values)) {
            let rows = buffer.flush_to(&self.exporter, path)?;
            report.rows_written += rows;
            report.flushes.push(FlushEvent {
                rows,
                second,
                trigger: FlushTrigger::ChunkFull,
            });
            log::debug!("Flushed {rows} rows at second {second}");
        }

        Ok(())
    }

    /// Best-effort flush after a simulator failure; never masks the original error
    ///
    /// Not called after a failed chunk flush: see [`worth_salvaging`].
    fn salvage(&self, buffer: &mut SampleBuffer, path: &Path) {
        if buffer.is_empty() {
            return;
        }

        let pending = buffer.len();
        match buffer.flush_to(&self.exporter, path) {
            Ok(rows) => log::warn!("Partial data flushed to {} ({rows} rows)", path.display()),
            Err(e) => log::error!(
                "Salvage flush of {pending} rows to {} failed: {e}",
                path.display()
            ),
        }
    }
}

/// Whether the buffer should be flushed once more after `err`
///
/// A failed flush may have appended part of the chunk already.
fn worth_salvaging(err: &SamplerError) -> bool {
    !matches!(err, SamplerError::Export(_))
}

/// Run a buffered sampling phase with the default CSV format
///
/// Convenience wrapper around [`BufferedSampler::run`].
pub fn run_buffered<S, P>(
    sim: &mut S,
    application: &str,
    signals: &[Signal],
    minutes: u32,
    chunk_size: usize,
    path: P,
) -> Result<SamplerReport, SamplerError>
where
    S: SimulationHandle + ?Sized,
    P: AsRef<Path>,
{
    BufferedSampler::new(chunk_size)?.run(sim, application, signals, minutes, path)
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FirstOrderPlant;
    use std::fs;
    use tempfile::tempdir;

    fn plant() -> FirstOrderPlant {
        FirstOrderPlant::new("test").with_parameter("A", "P", 5.0)
    }

    #[test]
    fn test_checkpoints_for_one_minute() {
        let mut cp = Checkpoints::new(60);
        let hits: Vec<(usize, Vec<u8>)> = (1..=60)
            .map(|s| (s, cp.reached(s)))
            .filter(|(_, p)| !p.is_empty())
            .collect();
        assert_eq!(hits, vec![(15, vec![25]), (30, vec![50]), (45, vec![75]), (60, vec![100])]);
    }

    #[test]
    fn test_checkpoints_short_run_reports_all() {
        let mut cp = Checkpoints::new(2);
        // marks = [0, 1, 1, 2]
        assert_eq!(cp.reached(1), vec![25, 50, 75]);
        assert_eq!(cp.reached(2), vec![100]);
        assert!(cp.reached(3).is_empty());
    }

    #[test]
    fn test_chunk_size_zero_rejected_before_touching_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nothing.csv");
        let mut sim = plant();

        let err = run_buffered(&mut sim, "A", &[Signal::new("P", "bar")], 1, 0, &path).unwrap_err();
        assert!(matches!(err, SamplerError::InvalidChunkSize));
        assert!(!path.exists());
    }

    #[test]
    fn test_zero_minutes_writes_only_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("header.csv");
        let mut sim = plant();

        let report = run_buffered(&mut sim, "A", &[Signal::new("P", "bar")], 0, 10, &path).unwrap();
        assert!(report.header_written);
        assert_eq!(report.rows_written, 0);
        assert!(report.flushes.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "ModelTime [s],P [bar]\n");
    }

    #[test]
    fn test_column_mismatch_is_error() {
        struct Short(f64);
        impl SimulationHandle for Short {
            fn advance(&mut self, step: std::time::Duration) -> Result<(), crate::simulation::SimulationError> {
                self.0 += step.as_secs_f64();
                Ok(())
            }
            fn read_value(&self, _: &str, _: &str) -> Result<f64, crate::simulation::SimulationError> {
                Ok(0.0)
            }
            fn read_values(&self, _: &str, _: &[Signal]) -> Result<Vec<f64>, crate::simulation::SimulationError> {
                Ok(vec![])
            }
            fn write_value(&mut self, _: &str, _: &str, _: f64) -> Result<(), crate::simulation::SimulationError> {
                Ok(())
            }
            fn model_time(&self) -> f64 {
                self.0
            }
            fn name(&self) -> &str {
                "Short"
            }
        }

        let dir = tempdir().unwrap();
        let path = dir.path().join("short.csv");
        let err = run_buffered(&mut Short(0.0), "A", &[Signal::new("P", "bar")], 1, 5, &path).unwrap_err();
        assert!(matches!(err, SamplerError::ColumnMismatch { expected: 1, found: 0 }));
    }

    #[test]
    fn test_report_tracks_model_time() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("time.csv");
        let mut sim = plant();

        let report = run_buffered(&mut sim, "A", &[Signal::new("P", "bar")], 2, 7, &path).unwrap();
        assert_eq!(report.rows_written, 120);
        assert_eq!(report.final_model_time, 120.0);
        // 17 full chunks of 7, then 1 left over
        assert_eq!(report.flushes.len(), 18);
        assert_eq!(report.flushes.last().unwrap().rows, 1);
        assert_eq!(report.flushes.last().unwrap().trigger, FlushTrigger::EndOfRun);
    }

    #[test]
    fn test_failed_flush_is_not_salvaged() {
        let io = std::io::Error::other("disk full");
        assert!(!worth_salvaging(&SamplerError::Export(io.into())));

        let lost = crate::simulation::SimulationError::Lifecycle {
            operation: "advance".to_string(),
            message: "connection lost".to_string(),
        };
        assert!(worth_salvaging(&SamplerError::Simulation(lost)));
        assert!(worth_salvaging(&SamplerError::ColumnMismatch { expected: 2, found: 1 }));
    }
}
