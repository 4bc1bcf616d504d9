//! # Cleaned Table
//!
//! The end product of detection: named columns plus typed rows, rectangular
//! by construction. Also carries the CSV codec used to hand a table to the
//! external transformation service and to read its answer back.

use crate::workbook::cell::CellValue;
use crate::workbook::grid::Grid;
use thiserror::Error;

/// Errors raised by the table CSV codec.
#[derive(Error, Debug)]
pub enum TableError {
    #[error("{0}")]
    CsvError(#[from] csv::Error),

    #[error("{0}")]
    Utf8Error(#[from] std::string::FromUtf8Error),

    #[error("CSV document has no columns")]
    NoColumns,

    #[error("CSV document has no data rows")]
    NoRows,
}

/// A cleaned, rectangular table.
///
/// Invariant: every row holds exactly one value per declared column; the
/// column count is fixed at construction and only grows through
/// [`Table::push_column`], which extends every row at once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Table {
        debug_assert!(rows.iter().all(|row| row.len() == columns.len()));
        Table { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Index of the column with the given name, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Appends a column, one value per existing row.
    ///
    /// Surplus values are dropped and missing ones padded so the rectangle
    /// invariant survives even a miscounted caller.
    pub fn push_column(&mut self, name: impl Into<String>, mut values: Vec<CellValue>) {
        values.resize(self.rows.len(), CellValue::Empty);
        self.columns.push(name.into());
        for (row, value) in self.rows.iter_mut().zip(values) {
            row.push(value);
        }
    }

    /// Renders the table as a grid: header row first, then the data rows.
    pub fn to_grid(&self) -> Grid {
        let mut rows = Vec::with_capacity(self.rows.len() + 1);
        rows.push(
            self.columns
                .iter()
                .map(|column| CellValue::Text(column.to_owned()))
                .collect(),
        );
        rows.extend(self.rows.iter().cloned());
        Grid::from_rows(rows)
    }

    /// Serializes the table as CSV with a header row, standard quoting.
    pub fn to_csv(&self) -> Result<String, TableError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|error| TableError::CsvError(error.into_error().into()))?;
        Ok(String::from_utf8(bytes)?)
    }

    /// Parses a CSV document (first row = header) into a table.
    ///
    /// Numeric-looking fields become numbers, empty fields become missing.
    /// Ragged rows, an empty header, or a document without data rows are
    /// rejected; the caller treats any of these as a transform failure.
    pub fn from_csv(text: &str) -> Result<Table, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(text.as_bytes());
        let columns: Vec<String> = reader
            .headers()?
            .iter()
            .map(|header| header.trim().to_string())
            .collect();
        if columns.is_empty() || columns.iter().all(String::is_empty) {
            return Err(TableError::NoColumns);
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(parse_csv_field).collect());
        }
        if rows.is_empty() {
            return Err(TableError::NoRows);
        }
        Ok(Table::new(columns, rows))
    }
}

fn parse_csv_field(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }
    match field.trim().parse::<f64>() {
        Ok(number) => CellValue::Number(number),
        Err(_) => CellValue::Text(field.to_owned()),
    }
}
