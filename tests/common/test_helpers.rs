//! Helper functions for integration tests

use std::path::Path;

use setpoint_sweep::simulation::Signal;

/// Header and numeric rows of a recording
pub struct Recording {
    pub header: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl Recording {
    /// Model-time column
    pub fn times(&self) -> Vec<f64> {
        self.rows.iter().map(|r| r[0]).collect()
    }
}

/// Read a recording back with the `csv` crate
pub fn read_recording<P: AsRef<Path>>(path: P) -> Recording {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let header = reader.headers().unwrap().iter().map(str::to_string).collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(|v| v.parse::<f64>().unwrap()).collect())
        .collect();
    Recording { header, rows }
}

/// `n` signals named `S0..S{n-1}` with unit `u`
pub fn signals(n: usize) -> Vec<Signal> {
    (0..n).map(|i| Signal::new(format!("S{i}"), "u")).collect()
}

/// Assert consecutive model times increase by exactly one second
pub fn assert_one_second_steps(times: &[f64], message: &str) {
    for (i, pair) in times.windows(2).enumerate() {
        assert!(
            (pair[1] - pair[0] - 1.0).abs() < 1e-9,
            "{}: step {} goes from {} to {}",
            message, i, pair[0], pair[1]
        );
    }
}

/// Compute relative error: |actual - expected| / |expected|
pub fn relative_error(actual: f64, expected: f64) -> f64 {
    if expected.abs() < 1e-10 {
        (actual - expected).abs()
    } else {
        (actual - expected).abs() / expected.abs()
    }
}
