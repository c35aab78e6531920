//! CSV export for sampled simulation data
//!
//! This module provides the file plumbing behind the sampler: header
//! handling, chunked appends and whole-file writes. The files are plain
//! comma-separated values readable by pandas, Excel and the crate's own
//! [`analysis`](crate::analysis) module.
//!
//! # File Layout
//!
//! ```csv
//! ModelTime [s],P [bar],T [C]
//! 1.0,20.0,30.0
//! 2.0,20.1,30.0
//! ```
//!
//! - The header row is written **once**, only when the file is absent or
//!   empty. Later runs targeting the same path append rows without a second
//!   header.
//! - Every data row is the model time followed by one reading per signal,
//!   in the order of the signal list that produced the header.
//! - Rows are appended; nothing is ever rewritten in place (except by
//!   [`CsvExporter::write_samples`], which truncates on purpose).
//!
//! # Quick Examples
//!
//! ```rust,ignore
//! use setpoint_sweep::output::export::CsvExporter;
//!
//! let exporter = CsvExporter::default();
//! exporter.ensure_header("run.csv", &signals)?;
//! exporter.append_samples("run.csv", &chunk)?;
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use thiserror::Error;

use crate::sampler::Sample;
use crate::simulation::Signal;

// =============================================================================
// Errors
// =============================================================================

/// Errors raised while writing CSV files
#[derive(Debug, Error)]
pub enum CsvError {
    /// File system failure (open, append, metadata)
    #[error("CSV file I/O failed: {0}")]
    Io(#[from] io::Error),

    /// Record encoding failure
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    /// A row does not match the header width
    #[error("row {row} has {found} columns, header has {expected}")]
    Shape {
        row: usize,
        expected: usize,
        found: usize,
    },
}

// =============================================================================
// Configuration Structures
// =============================================================================

/// Configuration for CSV export
///
/// # Fields
///
/// - `delimiter`: Column separator (default: `b','`)
/// - `precision`: Fixed number of decimal places, or `None` for the shortest
///   representation that round-trips (default: `None`)
/// - `time_header`: Header of the model-time column (default: `"ModelTime [s]"`)
///
/// # Example
///
/// ```rust,ignore
/// let config = CsvConfig::default().precision(6);
/// ```
#[derive(Clone, Debug)]
pub struct CsvConfig {
    /// Column delimiter (default: ',')
    pub delimiter: u8,

    /// Decimal places for floating-point values (default: shortest round-trip)
    pub precision: Option<usize>,

    /// Header for the time column (default: "ModelTime [s]")
    pub time_header: String,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            precision: None,
            time_header: "ModelTime [s]".to_string(),
        }
    }
}

impl CsvConfig {
    /// Builder pattern: set delimiter
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder pattern: set fixed precision
    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Format a number with the configured precision
    pub fn format_number(&self, value: f64) -> String {
        match self.precision {
            Some(precision) => format!("{:.prec$}", value, prec = precision),
            // Debug keeps the trailing ".0" on integral values
            None => format!("{:?}", value),
        }
    }

    /// Header row for a signal list: time header, then `"{name} [{unit}]"`
    pub fn header_row(&self, signals: &[Signal]) -> Vec<String> {
        std::iter::once(self.time_header.clone())
            .chain(signals.iter().map(Signal::header))
            .collect()
    }
}

// =============================================================================
// Exporter
// =============================================================================

/// CSV writer used by the samplers
#[derive(Clone, Debug, Default)]
pub struct CsvExporter {
    config: CsvConfig,
}

impl CsvExporter {
    /// Create an exporter with a given configuration
    pub fn new(config: CsvConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &CsvConfig {
        &self.config
    }

    /// Write the header row if the file is absent or empty
    ///
    /// Returns `true` when the header was written, `false` when the file
    /// already had content. The check-then-write is not atomic across
    /// processes; one writer per file is assumed.
    pub fn ensure_header<P: AsRef<Path>>(&self, path: P, signals: &[Signal]) -> Result<bool, CsvError> {
        let path = path.as_ref();

        match fs::metadata(path) {
            Ok(metadata) if metadata.len() > 0 => return Ok(false),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let bytes = self.encode(std::iter::once(self.config.header_row(signals)))?;
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(&bytes)?;
        file.flush()?;

        log::debug!("Wrote CSV header ({} columns) to {}", signals.len() + 1, path.display());
        Ok(true)
    }

    /// Append rows to the file in a single write
    ///
    /// An empty slice is a no-op: the file is not even opened.
    /// Returns the number of rows appended.
    pub fn append_samples<P: AsRef<Path>>(&self, path: P, samples: &[Sample]) -> Result<usize, CsvError> {
        if samples.is_empty() {
            return Ok(0);
        }

        let bytes = self.encode(samples.iter().map(|s| self.record(s)))?;

        let mut file = OpenOptions::new().create(true).append(true).open(path.as_ref())?;
        file.write_all(&bytes)?;
        file.flush()?;

        Ok(samples.len())
    }

    /// Write header and all rows, truncating any existing file
    ///
    /// Used by the unbuffered sampling path, which keeps everything in
    /// memory and saves once at the end.
    pub fn write_samples<P: AsRef<Path>>(
        &self,
        path: P,
        signals: &[Signal],
        samples: &[Sample],
    ) -> Result<(), CsvError> {

        // ============================= Validation =============================

        let expected = signals.len() + 1;
        for (row, sample) in samples.iter().enumerate() {
            if sample.columns() != expected {
                return Err(CsvError::Shape { row, expected, found: sample.columns() });
            }
        }

        // ============================= Write File =============================

        let rows = std::iter::once(self.config.header_row(signals))
            .chain(samples.iter().map(|s| self.record(s)));
        let bytes = self.encode(rows)?;

        let mut file = File::create(path.as_ref())?;
        file.write_all(&bytes)?;
        file.flush()?;

        log::info!("Data stored in: {}", path.as_ref().display());
        Ok(())
    }

    fn record(&self, sample: &Sample) -> Vec<String> {
        std::iter::once(sample.model_time)
            .chain(sample.values.iter().copied())
            .map(|v| self.config.format_number(v))
            .collect()
    }

    /// Encode rows into one contiguous buffer so each flush is a single write
    fn encode<I>(&self, rows: I) -> Result<Vec<u8>, CsvError>
    where
        I: IntoIterator<Item = Vec<String>>,
    {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.config.delimiter)
            .flexible(true)
            .from_writer(Vec::new());

        for row in rows {
            writer.write_record(&row)?;
        }

        writer.into_inner().map_err(|e| CsvError::Io(e.into_error()))
    }
}

/// Write the header row with the default configuration if the file is absent or empty
pub fn ensure_header<P: AsRef<Path>>(path: P, signals: &[Signal]) -> Result<bool, CsvError> {
    CsvExporter::default().ensure_header(path, signals)
}

// =================================================================================================
// Tests
// =================================================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn signals() -> Vec<Signal> {
        vec![Signal::new("P", "bar"), Signal::new("T, inlet", "C")]
    }

    #[test]
    fn test_header_row_format() {
        let header = CsvConfig::default().header_row(&signals());
        assert_eq!(header, vec!["ModelTime [s]", "P [bar]", "T, inlet [C]"]);
    }

    #[test]
    fn test_format_number() {
        let config = CsvConfig::default();
        assert_eq!(config.format_number(22.0), "22.0");
        assert_eq!(config.format_number(0.5), "0.5");
        assert_eq!(CsvConfig::default().precision(3).format_number(1.0), "1.000");
    }

    #[test]
    fn test_ensure_header_writes_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.csv");

        assert!(ensure_header(&path, &signals()).unwrap());
        assert!(!ensure_header(&path, &signals()).unwrap());

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "ModelTime [s],P [bar],\"T, inlet [C]\"\n");
    }

    #[test]
    fn test_ensure_header_on_empty_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        File::create(&path).unwrap();

        assert!(ensure_header(&path, &signals()).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_append_empty_is_noop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("never.csv");

        assert_eq!(CsvExporter::default().append_samples(&path, &[]).unwrap(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn test_append_after_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("run.csv");
        let exporter = CsvExporter::default();

        exporter.ensure_header(&path, &signals()).unwrap();
        let rows = vec![
            Sample::new(1.0, vec![20.0, 30.0]),
            Sample::new(2.0, vec![20.5, 30.0]),
        ];
        assert_eq!(exporter.append_samples(&path, &rows).unwrap(), 2);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "1.0,20.0,30.0");
        assert_eq!(lines[2], "2.0,20.5,30.0");
    }

    #[test]
    fn test_write_samples_truncates() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("whole.csv");
        fs::write(&path, "stale\nstale\nstale\n").unwrap();

        let exporter = CsvExporter::default();
        exporter
            .write_samples(&path, &signals(), &[Sample::new(1.0, vec![1.0, 2.0])])
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("stale"));
    }

    #[test]
    fn test_write_samples_rejects_wrong_width() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.csv");

        let err = CsvExporter::default()
            .write_samples(&path, &signals(), &[Sample::new(1.0, vec![1.0])])
            .unwrap_err();
        assert!(matches!(err, CsvError::Shape { row: 0, expected: 3, found: 2 }));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("eu.csv");
        let exporter = CsvExporter::new(CsvConfig::default().delimiter(b';'));

        exporter.ensure_header(&path, &[Signal::new("P", "bar")]).unwrap();
        exporter.append_samples(&path, &[Sample::new(1.0, vec![2.0])]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "ModelTime [s];P [bar]\n1.0;2.0\n");
    }
}
