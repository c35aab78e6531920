//! Export module for sampled data.
//!
//! # Architecture
//!
//! Each file format is an independent implementation in its own sub-module.
//! Only CSV exists today: it is what the plotting and post-processing side
//! (and pandas) reads back.
//!
//! | Format  | Module          |
//! |---------|-----------------|
//! | CSV     | [`csv`]         |
//!
//! # Usage example
//!
//! ```rust,ignore
//! use setpoint_sweep::output::export::{CsvExporter, ensure_header};
//!
//! // Header only on a fresh (absent or empty) file
//! ensure_header("state0.csv", &signals)?;
//!
//! // Chunked append, one write per call
//! CsvExporter::default().append_samples("state0.csv", &chunk)?;
//! ```

pub mod csv;

// Re-export the most commonly used types at the module level so users can write:
//   use setpoint_sweep::output::export::{CsvExporter, CsvConfig, CsvError};
// instead of the full sub-module path.
pub use csv::{ensure_header, CsvConfig, CsvError, CsvExporter};
