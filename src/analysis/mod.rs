//! Post-processing of recorded CSV files
//!
//! # Modules
//!
//! - [`table`]: load a recording into a header list plus a `DMatrix`
//! - [`selection`]: column-index syntax (`"0,2:5"`), unit parsing and grouping
//! - [`molar_mass`]: weighted molar mass column from mole-percent compositions
//! - [`tuning`]: SIMC PI tuning from an open-loop step test
//!
//! # Example
//!
//! ```rust,no_run
//! use setpoint_sweep::analysis::{append_molar_mass, parse_indices, CsvTable, OIL};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut table = CsvTable::from_path("Yggdrasil_state0_07.07.2025_18-23.csv")?;
//! let selection = parse_indices("4:33", table.ncols());
//! append_molar_mass(&mut table, &selection, &OIL, "MW [g/mol]")?;
//! table.write("Yggdrasil_state0_07.07.2025_18-23_upgraded.csv")?;
//! # Ok(())
//! # }
//! ```

pub mod molar_mass;
pub mod selection;
pub mod table;
pub mod tuning;

use thiserror::Error;

pub use molar_mass::{
    append_molar_mass, weighted_molar_mass, ColumnMapping, Component, ComponentTable, MolarMass, BASIC, GAS, OIL,
};
pub use selection::{group_by_unit, parse_indices, parse_unit, select_columns, UnitGroup, UNKNOWN_UNIT};
pub use table::CsvTable;
pub use tuning::{simc_tuning, SimcTuning, StepResponse};

/// Errors raised while post-processing
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}, column {column}: '{value}' is not a number")]
    Parse { row: usize, column: usize, value: String },

    #[error("no valid column selected")]
    EmptySelection,

    #[error("length mismatch: expected {expected}, found {found}")]
    Mismatch { expected: usize, found: usize },

    #[error("cannot tune: {0}")]
    InvalidTuning(String),
}
