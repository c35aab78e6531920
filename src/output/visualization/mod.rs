//! Visualization module for recorded CSV files
//!
//! This module renders recordings with the `plotters` library.
//!
//! # Organization
//!
//! - **config**: Shared plot configuration (`PlotConfig`) and the color pool
//! - **multi_axis**: Time-series plots with one y-axis per unit
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use setpoint_sweep::analysis::{select_columns, CsvTable};
//! use setpoint_sweep::output::visualization::{plot_columns, PlotConfig};
//!
//! let table = CsvTable::from_path("Yggdrasil_state0_07.07.2025_18-23.csv")?;
//! let selection = select_columns("0,1,2,3:10,14:24,29", table.ncols() - 1);
//!
//! // PNG with default config
//! plot_columns(&table, &selection, "state0.png", None)?;
//!
//! // SVG with a custom title
//! let config = PlotConfig::recording("D20TIC0188: 10% Downstep");
//! plot_columns(&table, &selection, "state0.svg", Some(&config))?;
//! ```
//!
//! The backend follows the file extension: `.svg` renders vector output,
//! anything else a bitmap.

pub mod config;
pub mod multi_axis;

pub use config::{parse_hex_color, PlotConfig, COLOR_POOL, NO_TITLE};
pub use multi_axis::{panel_layout, plot_columns, value_range, PanelLayout};
