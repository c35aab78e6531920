//! Samples and the bounded write buffer
//!
//! A [`Sample`] is one row of a recording: the simulator's elapsed model
//! time followed by one reading per signal. The [`SampleBuffer`] collects
//! samples until `chunk_size` of them are waiting, then the sampler flushes
//! it to disk and it starts over empty.

use std::path::Path;

use crate::output::export::{CsvError, CsvExporter};
use crate::sampler::SamplerError;

// =================================================================================================
// Sample
// =================================================================================================

/// One recorded row: model time, then one value per signal
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Elapsed simulated time in seconds
    pub model_time: f64,

    /// Readings in signal-list order
    pub values: Vec<f64>,
}

impl Sample {
    /// Create a sample
    pub fn new(model_time: f64, values: Vec<f64>) -> Self {
        Self { model_time, values }
    }

    /// Number of CSV columns this sample occupies (`1 + values.len()`)
    pub fn columns(&self) -> usize {
        1 + self.values.len()
    }
}

// =================================================================================================
// Buffer
// =================================================================================================

/// Bounded, append-only list of samples awaiting persistence
///
/// Owned by a single sampling run; never shared.
///
/// # Example
///
/// ```rust
/// use setpoint_sweep::sampler::{Sample, SampleBuffer};
///
/// let mut buffer = SampleBuffer::new(2).unwrap();
/// assert!(!buffer.push(Sample::new(1.0, vec![0.5])));
/// assert!(buffer.push(Sample::new(2.0, vec![0.6])));   // full
/// ```
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Vec<Sample>,
    chunk_size: usize,
}

impl SampleBuffer {
    /// Create an empty buffer flushing every `chunk_size` samples
    ///
    /// # Errors
    ///
    /// `chunk_size == 0` is rejected: such a buffer could never fill.
    pub fn new(chunk_size: usize) -> Result<Self, SamplerError> {
        if chunk_size == 0 {
            return Err(SamplerError::InvalidChunkSize);
        }

        Ok(Self {
            samples: Vec::with_capacity(chunk_size),
            chunk_size,
        })
    }

    /// Append a sample; returns `true` once the buffer has reached `chunk_size`
    pub fn push(&mut self, sample: Sample) -> bool {
        self.samples.push(sample);
        self.is_full()
    }

    /// Buffer holds `chunk_size` samples or more
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.chunk_size
    }

    /// Number of buffered samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// No sample waiting
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Configured flush threshold
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Buffered samples, oldest first
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Append every buffered sample to `path` in one write, then clear
    ///
    /// Flushing an empty buffer does nothing and returns `Ok(0)`.
    /// On failure the buffer is left untouched so a later salvage flush can
    /// try again.
    pub fn flush_to<P: AsRef<Path>>(&mut self, exporter: &CsvExporter, path: P) -> Result<usize, CsvError> {
        let written = exporter.append_samples(path, &self.samples)?;
        self.samples.clear();
        Ok(written)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
