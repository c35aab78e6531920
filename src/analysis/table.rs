//! Recorded CSV loaded as a numeric matrix
//!
//! The first column is model time; every other column is one signal.
//! Values live in an `nrows × ncols` [`DMatrix`] so column arithmetic
//! (weighted sums, min/max of a step response) is plain linear algebra.
//!
//! Empty cells load as `NaN` and are written back as empty cells.

use std::fs::File;
use std::io;
use std::path::Path;

use nalgebra::{DMatrix, DVector};

use crate::analysis::AnalysisError;

/// Headers plus numeric data of a recorded CSV
#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    headers: Vec<String>,
    data: DMatrix<f64>,
}

impl CsvTable {
    /// Build a table from headers and a matrix of matching width
    pub fn new(headers: Vec<String>, data: DMatrix<f64>) -> Result<Self, AnalysisError> {
        if headers.len() != data.ncols() {
            return Err(AnalysisError::Mismatch {
                expected: headers.len(),
                found: data.ncols(),
            });
        }
        Ok(Self { headers, data })
    }

    /// Read a comma-separated file with a header row
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AnalysisError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Read comma-separated text with a header row
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, AnalysisError> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.trim().to_string()).collect();
        let ncols = headers.len();

        let mut values = Vec::new();
        let mut nrows = 0;
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            for (column, cell) in record.iter().enumerate() {
                values.push(parse_cell(cell, row, column)?);
            }
            nrows += 1;
        }

        Ok(Self {
            headers,
            data: DMatrix::from_row_slice(nrows, ncols, &values),
        })
    }

    /// Column headers, time column first
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Numeric data
    pub fn data(&self) -> &DMatrix<f64> {
        &self.data
    }

    pub fn nrows(&self) -> usize {
        self.data.nrows()
    }

    pub fn ncols(&self) -> usize {
        self.data.ncols()
    }

    /// Copy of one column
    pub fn column(&self, index: usize) -> Option<DVector<f64>> {
        (index < self.ncols()).then(|| self.data.column(index).into_owned())
    }

    /// Model-time column
    pub fn time(&self) -> Option<DVector<f64>> {
        self.column(0)
    }

    /// `(index, header)` for every column
    pub fn list_columns(&self) -> Vec<(usize, &str)> {
        self.headers.iter().map(String::as_str).enumerate().collect()
    }

    /// Append a named column at the right edge
    pub fn push_column(&mut self, name: impl Into<String>, values: &DVector<f64>) -> Result<(), AnalysisError> {
        if values.len() != self.nrows() {
            return Err(AnalysisError::Mismatch {
                expected: self.nrows(),
                found: values.len(),
            });
        }

        let index = self.ncols();
        let data = std::mem::replace(&mut self.data, DMatrix::zeros(0, 0));
        self.data = data.insert_column(index, 0.0);
        self.data.set_column(index, values);
        self.headers.push(name.into());
        Ok(())
    }

    /// Write header and rows as comma-separated text, truncating `path`
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<(), AnalysisError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.headers)?;

        for row in self.data.row_iter() {
            writer.write_record(row.iter().map(|v| format_cell(*v)))?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn parse_cell(cell: &str, row: usize, column: usize) -> Result<f64, AnalysisError> {
    let cell = cell.trim();
    if cell.is_empty() {
        return Ok(f64::NAN);
    }
    cell.parse().map_err(|_| AnalysisError::Parse {
        row,
        column,
        value: cell.to_string(),
    })
}

fn format_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        format!("{:?}", value)
    }
}

// =================================================================================================
// Tests
// =================================================================================================
