//! Output module for recorded data
//!
//! This module provides tools to persist and render recordings:
//! - **Export**: CSV header/chunk plumbing used by the samplers
//! - **Visualization**: PNG/SVG multi-axis plots using plotters
//!
//! # Architecture
//!
//! ```text
//! output/
//! ├── mod.rs              ← This file
//! ├── export/             ← Data export
//! │   ├── mod.rs
//! │   └── csv.rs
//! └── visualization/      ← Plots
//!     ├── mod.rs
//!     ├── config.rs
//!     └── multi_axis.rs
//! ```
//!
//! # Quick Start
//!
//! ## CSV Export
//!
//! ```rust,ignore
//! use setpoint_sweep::output::export::CsvExporter;
//!
//! let exporter = CsvExporter::default();
//! exporter.ensure_header("state0.csv", &signals)?;
//! exporter.append_samples("state0.csv", &chunk)?;
//! ```
//!
//! ## Visualization
//!
//! ```rust,ignore
//! use setpoint_sweep::output::visualization::plot_columns;
//!
//! plot_columns(&table, &[0, 1, 5], "state0.png", None)?;
//! ```

pub mod export;
pub mod visualization;

// Re-export commonly used items for convenience
pub use export::{ensure_header, CsvConfig, CsvError, CsvExporter};
pub use visualization::{plot_columns, PlotConfig};
