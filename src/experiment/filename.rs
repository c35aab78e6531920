//! Output filename convention
//!
//! Every state writes to its own file, named after the project, the state
//! number and the local time the file was created:
//!
//! ```text
//! {project}_state{state}_{dd.mm.yyyy_HH-MM}.csv
//! Yggdrasil_state0_07.07.2025_18-23.csv
//! ```

use chrono::{Local, NaiveDateTime};

/// `chrono` format string of the timestamp part
pub const TIMESTAMP_FORMAT: &str = "%d.%m.%Y_%H-%M";

/// Build a filename for a given timestamp
pub fn format_filename(project_name: &str, state: u32, timestamp: &NaiveDateTime) -> String {
    format!(
        "{}_state{}_{}.csv",
        project_name,
        state,
        timestamp.format(TIMESTAMP_FORMAT)
    )
}

/// Build a filename stamped with the current local time
pub fn generate_filename(project_name: &str, state: u32) -> String {
    format_filename(project_name, state, &Local::now().naive_local())
}
