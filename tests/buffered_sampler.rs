//! Integration tests: buffered sampler + CSV export
//!
//! These tests drive the sampler against a deterministic mock handle and read
//! the recordings back from disk.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use setpoint_sweep::output::export::{ensure_header, CsvConfig};
use setpoint_sweep::sampler::{
    adjust_parameter_multiplicative, adjust_temperature_additive, adjust_temperature_multiplicative,
    run_buffered, run_unbuffered, BufferedSampler, FlushTrigger, SamplerError,
};
use setpoint_sweep::output::export::CsvExporter;
use setpoint_sweep::simulation::{Signal, SimulationError, SimulationHandle};
use tempfile::tempdir;

mod common;
use common::{assert_one_second_steps, read_recording, relative_error, signals, Fault, RampSimulation};

// =================================================================================================
// Row and flush accounting
// =================================================================================================

#[test]
fn test_one_minute_chunk_ten() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("p.csv");
    let mut sim = RampSimulation::new();

    let report = run_buffered(&mut sim, "A", &[Signal::new("P", "bar")], 1, 10, &path).unwrap();

    let recording = read_recording(&path);
    assert_eq!(recording.header, vec!["ModelTime [s]", "P [bar]"]);
    assert_eq!(recording.rows.len(), 60);

    assert_eq!(report.flushes.len(), 6);
    assert!(report.flushes.iter().all(|f| f.rows == 10 && f.trigger == FlushTrigger::ChunkFull));
    assert_eq!(report.flushes.last().unwrap().second, 60);
}

#[test]
fn test_large_chunk_flushes_once_after_loop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("big.csv");
    let mut sim = RampSimulation::new();

    let report = run_buffered(&mut sim, "A", &[Signal::new("P", "bar")], 1, 1000, &path).unwrap();

    assert_eq!(report.flushes.len(), 1);
    assert_eq!(report.flushes[0].rows, 60);
    assert_eq!(report.flushes[0].trigger, FlushTrigger::EndOfRun);
    assert_eq!(read_recording(&path).rows.len(), 60);
}

#[test]
fn test_row_count_and_width_across_shapes() {
    let dir = tempdir().unwrap();

    for (minutes, chunk, n_signals) in [(1, 1, 1), (2, 7, 3), (3, 60, 5), (1, 59, 0), (2, 61, 2)] {
        let path = dir.path().join(format!("shape_{minutes}_{chunk}_{n_signals}.csv"));
        let mut sim = RampSimulation::new();

        let report = run_buffered(&mut sim, "A", &signals(n_signals), minutes, chunk, &path).unwrap();
        let recording = read_recording(&path);

        let expected_rows = minutes as usize * 60;
        assert_eq!(recording.rows.len(), expected_rows, "{path:?}");
        assert_eq!(report.rows_written, expected_rows);
        assert_eq!(recording.header.len(), 1 + n_signals);
        assert!(recording.rows.iter().all(|r| r.len() == 1 + n_signals));
        assert_one_second_steps(&recording.times(), "model time");

        let flushed: usize = report.flushes.iter().map(|f| f.rows).sum();
        assert_eq!(flushed, expected_rows);
    }
}

#[test]
fn test_rows_hold_readings_in_signal_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("order.csv");
    let mut sim = RampSimulation::new();

    run_buffered(&mut sim, "A", &signals(3), 1, 16, &path).unwrap();

    for row in read_recording(&path).rows {
        let t = row[0];
        for (i, value) in row[1..].iter().enumerate() {
            assert_eq!(*value, RampSimulation::expected(t, i));
        }
    }
}

#[test]
fn test_progress_checkpoints() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("progress.csv");
    let mut sim = RampSimulation::new();

    let report = run_buffered(&mut sim, "A", &signals(1), 2, 50, &path).unwrap();
    let marks: Vec<(u8, usize)> = report.progress.iter().map(|m| (m.percent, m.second)).collect();
    assert_eq!(marks, vec![(25, 30), (50, 60), (75, 90), (100, 120)]);
}

// =================================================================================================
// Header handling
// =================================================================================================

#[test]
fn test_ensure_header_twice_writes_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("header.csv");

    assert!(ensure_header(&path, &signals(2)).unwrap());
    assert!(!ensure_header(&path, &signals(2)).unwrap());

    assert_eq!(fs::read_to_string(&path).unwrap(), "ModelTime [s],S0 [u],S1 [u]\n");
}

#[test]
fn test_second_run_appends_without_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("append.csv");
    let mut sim = RampSimulation::new();

    let first = run_buffered(&mut sim, "A", &signals(1), 1, 25, &path).unwrap();
    let second = run_buffered(&mut sim, "B", &signals(1), 1, 25, &path).unwrap();

    assert!(first.header_written);
    assert!(!second.header_written);

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content.matches("ModelTime").count(), 1);

    let recording = read_recording(&path);
    assert_eq!(recording.rows.len(), 120);
    assert_one_second_steps(&recording.times(), "continued run");
    assert_eq!(recording.rows[60][0], 61.0);
}

#[test]
fn test_existing_empty_file_gets_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.csv");
    fs::write(&path, "").unwrap();

    let report = run_buffered(&mut RampSimulation::new(), "A", &signals(1), 1, 10, &path).unwrap();
    assert!(report.header_written);
    assert_eq!(read_recording(&path).rows.len(), 60);
}

// =================================================================================================
// Failure semantics
// =================================================================================================

#[test]
fn test_fault_injection_loses_nothing_already_sampled() {
    let chunk = 10;

    for second in [1, chunk / 2, chunk, chunk + 1] {
        for fault in [Fault::Advance(second), Fault::Read(second)] {
            let dir = tempdir().unwrap();
            let path = dir.path().join("fault.csv");
            let mut sim = RampSimulation::new().failing(fault);

            let err = run_buffered(&mut sim, "A", &signals(2), 1, chunk, &path).unwrap_err();
            assert!(matches!(err, SamplerError::Simulation(_)), "{fault:?}: {err}");

            // Every sample taken before the failing second is on disk
            let recording = read_recording(&path);
            assert_eq!(recording.rows.len(), second - 1, "{fault:?}");
            assert_one_second_steps(&recording.times(), "salvaged rows");
        }
    }
}

#[test]
fn test_flush_failure_propagates() {
    let dir = tempdir().unwrap();
    // A directory cannot be appended to
    let path = dir.path().to_path_buf();

    let err = run_buffered(&mut RampSimulation::new(), "A", &signals(1), 1, 5, &path).unwrap_err();
    assert!(matches!(err, SamplerError::Export(_)));
}

/// Handle that replaces the recording with a directory before its n-th advance
///
/// Appends fail from then on, for root as well, since a directory cannot be
/// opened for writing.
struct RecordingTurnsIntoDirectory {
    sim: RampSimulation,
    path: PathBuf,
    at: usize,
}

impl SimulationHandle for RecordingTurnsIntoDirectory {
    fn advance(&mut self, step: Duration) -> Result<(), SimulationError> {
        if self.sim.advances() + 1 == self.at {
            fs::remove_file(&self.path).unwrap();
            fs::create_dir(&self.path).unwrap();
        }
        self.sim.advance(step)
    }

    fn read_value(&self, application: &str, name: &str) -> Result<f64, SimulationError> {
        self.sim.read_value(application, name)
    }

    fn read_values(&self, application: &str, signals: &[Signal]) -> Result<Vec<f64>, SimulationError> {
        self.sim.read_values(application, signals)
    }

    fn write_value(&mut self, application: &str, name: &str, value: f64) -> Result<(), SimulationError> {
        self.sim.write_value(application, name, value)
    }

    fn model_time(&self) -> f64 {
        self.sim.model_time()
    }

    fn name(&self) -> &str {
        "RecordingTurnsIntoDirectory"
    }
}

#[test]
fn test_simulator_error_wins_over_failed_salvage() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("salvage.csv");

    // Four samples buffered when second 5 fails; the salvage append then fails too
    let mut sim = RecordingTurnsIntoDirectory {
        sim: RampSimulation::new().failing(Fault::Advance(5)),
        path: path.clone(),
        at: 5,
    };

    let err = run_buffered(&mut sim, "A", &signals(2), 1, 10, &path).unwrap_err();
    assert!(matches!(err, SamplerError::Simulation(_)), "{err}");
    assert!(path.is_dir());
    assert_eq!(sim.sim.advances(), 4);
}

#[test]
fn test_failed_chunk_flush_ends_run_with_export_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("chunk.csv");

    // Second 5 fills the first chunk of 5, whose append fails
    let mut sim = RecordingTurnsIntoDirectory {
        sim: RampSimulation::new(),
        path: path.clone(),
        at: 5,
    };

    let err = run_buffered(&mut sim, "A", &signals(1), 1, 5, &path).unwrap_err();
    assert!(matches!(err, SamplerError::Export(_)), "{err}");
    assert_eq!(sim.sim.advances(), 5);
}

#[test]
fn test_zero_chunk_size_rejected() {
    assert!(matches!(BufferedSampler::new(0), Err(SamplerError::InvalidChunkSize)));
}

// =================================================================================================
// Formatting and the unbuffered path
// =================================================================================================

#[test]
fn test_custom_csv_config() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("semicolon.csv");

    let sampler = BufferedSampler::new(30)
        .unwrap()
        .with_csv_config(CsvConfig::default().delimiter(b';').precision(2));
    sampler
        .run(&mut RampSimulation::new(), "A", &signals(1), 1, &path)
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("ModelTime [s];S0 [u]"));
    assert_eq!(lines.next(), Some("1.00;10.00"));
}

#[test]
fn test_unbuffered_matches_buffered() {
    let dir = tempdir().unwrap();
    let buffered = dir.path().join("buffered.csv");
    let unbuffered = dir.path().join("unbuffered.csv");

    run_buffered(&mut RampSimulation::new(), "A", &signals(2), 1, 7, &buffered).unwrap();

    let samples = run_unbuffered(&mut RampSimulation::new(), "A", &signals(2), 1).unwrap();
    CsvExporter::default()
        .write_samples(&unbuffered, &signals(2), &samples)
        .unwrap();

    assert_eq!(
        fs::read_to_string(&buffered).unwrap(),
        fs::read_to_string(&unbuffered).unwrap()
    );
}

// =================================================================================================
// Adjustments between phases
// =================================================================================================

#[test]
fn test_multiplicative_adjustment_between_phases() {
    let mut sim = RampSimulation::new().with_parameter("SP", 20.0);

    let outcome = adjust_parameter_multiplicative(&mut sim, "A", "SP", 1.1).unwrap();
    assert!(relative_error(outcome.updated, 22.0) < 1e-12);
}

#[test]
fn test_temperature_adjustments() {
    let mut sim = RampSimulation::new().with_parameter("T", 303.15);

    let outcome = adjust_temperature_multiplicative(&mut sim, "A", "T", 1.1).unwrap();
    assert!(relative_error(outcome.updated, 306.15) < 1e-12);

    let outcome = adjust_temperature_additive(&mut sim, "A", "T", 2.0).unwrap();
    assert!(relative_error(outcome.updated, 308.15) < 1e-12);
}
