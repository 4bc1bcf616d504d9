//! # Workbook Module
//!
//! Reads xlsx workbooks into plain cell grids and writes grids back out.
//! The cell model is deliberately small: a cell is empty, a string, or a
//! number. Dates, formulas and styling carry no meaning for table detection
//! and are not interpreted.

pub mod cell;
pub mod grid;
pub(crate) mod reference;
pub mod writer;
pub mod xlsx;

use thiserror::Error;

/// Errors raised while reading or writing the xlsx container.
#[derive(Error, Debug)]
pub enum WorkbookError {
    /// A required archive part is absent (corrupt or non-xlsx input)
    #[error("Not a valid xlsx workbook: missing part '{0}'")]
    MissingPart(String),

    /// The workbook declares no worksheets
    #[error("Workbook contains no worksheets")]
    NoWorksheets,
}
