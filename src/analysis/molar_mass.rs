//! Weighted molar mass of a stream
//!
//! Composition columns hold mole percentages. Mapped in order onto a
//! component table, they give the mixture molar mass per row:
//!
//! ```text
//! M_mix = Σ (x_i / 100) · M_i
//! ```
//!
//! The `i`-th selected column is paired with the `i`-th component of the
//! table. Selecting more columns than the table has components truncates
//! the selection (with a warning). An out-of-range index is skipped with a
//! warning but still uses up its component slot, so the pairing of the
//! following columns does not shift.

use nalgebra::{DMatrix, DVector};

use crate::analysis::{AnalysisError, CsvTable};

// =================================================================================================
// Component tables
// =================================================================================================

/// Named chemical with its molar mass in g/mol
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Component {
    pub name: &'static str,
    pub molar_mass: f64,
}

const fn c(name: &'static str, molar_mass: f64) -> Component {
    Component { name, molar_mass }
}

/// Ordered list of components
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComponentTable {
    pub name: &'static str,
    pub components: &'static [Component],
}

/// Common laboratory chemicals
pub const BASIC: ComponentTable = ComponentTable {
    name: "basic",
    components: &[
        c("H2O", 18.015),
        c("CO2", 44.01),
        c("C6H6", 78.11),
        c("NaCl", 58.44),
        c("CH4", 16.04),
        c("NH3", 17.03),
        c("O2", 32.00),
        c("N2", 28.02),
    ],
};

/// Oil stream composition, in simulator component order
pub const OIL: ComponentTable = ComponentTable {
    name: "oil",
    components: &[
        c("H2O", 18.01528),
        c("MEG", 62.068),
        c("N2", 28.0134),
        c("CO2", 44.0095),
        c("H2S", 34.08088),
        c("C1", 16.04246),
        c("C2", 30.06904),
        c("C3", 44.097),
        c("IC4", 58.1222),
        c("NC4", 58.1222),
        c("IC5", 72.1514),
        c("NC5", 72.1514),
        c("NC6", 86.1806),
        c("C7FU", 88.41),
        c("C7LI-C7FG", 47.0),
        c("C8FU", 101.709),
        c("C8LI-C8FG", 47.0),
        c("C9LI-C9FG", 47.0),
        c("C10F-C13R", 47.0),
        c("C11-C12LF", 47.0),
        c("C10C-C15L", 47.0),
        c("C14-C20RD", 229.3099),
        c("C18C-C21L", 47.0),
        c("C23-C29RD", 47.0),
        c("C26-C30LF", 386.38),
        c("C30-C36LF", 47.0),
        c("C28C-C80R", 47.0),
        c("C39-C80LF", 47.0),
        c("C46-C42C2", 47.0),
        c("C63-C80FR", 691.1777588),
    ],
};

/// Gas stream composition: the oil list with TEG after MEG
pub const GAS: ComponentTable = ComponentTable {
    name: "gas",
    components: &[
        c("H2O", 18.01528),
        c("MEG", 62.068),
        c("TEG", 150.18),
        c("N2", 28.0134),
        c("CO2", 44.0095),
        c("H2S", 34.08088),
        c("C1", 16.04246),
        c("C2", 30.06904),
        c("C3", 44.097),
        c("IC4", 58.1222),
        c("NC4", 58.1222),
        c("IC5", 72.1514),
        c("NC5", 72.1514),
        c("NC6", 86.1806),
        c("C7FU", 88.41),
        c("C7LI-C7FG", 47.0),
        c("C8FU", 101.709),
        c("C8LI-C8FG", 47.0),
        c("C9LI-C9FG", 47.0),
        c("C10F-C13R", 47.0),
        c("C11-C12LF", 47.0),
        c("C10C-C15L", 47.0),
        c("C14-C20RD", 229.3099),
        c("C18C-C21L", 47.0),
        c("C23-C29RD", 47.0),
        c("C26-C30LF", 386.38),
        c("C30-C36LF", 47.0),
        c("C28C-C80R", 47.0),
        c("C39-C80LF", 47.0),
        c("C46-C42C2", 47.0),
        c("C63-C80FR", 691.1777588),
    ],
};

impl ComponentTable {
    /// Built-in table by name (`basic`, `oil`, `gas`, case-insensitive)
    pub fn by_name(name: &str) -> Option<&'static ComponentTable> {
        [&BASIC, &OIL, &GAS]
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

// =================================================================================================
// Computation
// =================================================================================================

/// Column paired with a component
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnMapping {
    pub column: usize,
    pub component: Component,
}

/// Per-row molar mass and the pairing that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct MolarMass {
    pub mapping: Vec<ColumnMapping>,
    pub values: DVector<f64>,
}

/// Weighted molar mass of every row
///
/// `selection` indexes the table columns (time column included), in
/// component order.
///
/// # Errors
///
/// [`AnalysisError::EmptySelection`] when no selected index is in range.
pub fn weighted_molar_mass(
    table: &CsvTable,
    selection: &[usize],
    components: &ComponentTable,
) -> Result<MolarMass, AnalysisError> {
    let mut selection = selection;
    if selection.len() > components.len() {
        log::warn!(
            "Selected {} columns but '{}' defines only {} components, truncating",
            selection.len(),
            components.name,
            components.len()
        );
        selection = &selection[..components.len()];
    }

    let mut mapping = Vec::with_capacity(selection.len());
    for (&column, &component) in selection.iter().zip(components.components) {
        if column >= table.ncols() {
            log::warn!(
                "Index {column} is out of range (0-{}), skipped",
                table.ncols().saturating_sub(1)
            );
            continue;
        }
        log::info!(
            "  Column {column} ({}) -> {} (MW={})",
            table.headers()[column],
            component.name,
            component.molar_mass
        );
        mapping.push(ColumnMapping { column, component });
    }

    if mapping.is_empty() {
        return Err(AnalysisError::EmptySelection);
    }

    // nrows × k composition block times k weights
    let fractions = DMatrix::from_fn(table.nrows(), mapping.len(), |row, j| {
        table.data()[(row, mapping[j].column)]
    });
    let weights = DVector::from_iterator(mapping.len(), mapping.iter().map(|m| m.component.molar_mass / 100.0));

    Ok(MolarMass {
        values: fractions * weights,
        mapping,
    })
}

/// Compute the weighted molar mass and append it as `column_name`
pub fn append_molar_mass(
    table: &mut CsvTable,
    selection: &[usize],
    components: &ComponentTable,
    column_name: &str,
) -> Result<MolarMass, AnalysisError> {
    let result = weighted_molar_mass(table, selection, components)?;
    table.push_column(column_name, &result.values)?;
    Ok(result)
}

// =================================================================================================
// Tests
// =================================================================================================
