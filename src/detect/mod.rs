//! # Table Detection
//!
//! Locates the tabular blocks inside raw sheet grids and turns each block
//! into a cleaned [`Table`]. Detection is heuristic and total: a sheet that
//! contains nothing table-like simply contributes no tables, it never fails.

pub mod clean;
pub mod header;
pub mod segment;
pub mod trim;

pub use clean::clean_block;
pub use segment::find_segments;
pub use trim::trim_edges;

use crate::error::GridpressError;
use crate::table::Table;
use crate::workbook::grid::Grid;
use crate::workbook::xlsx::read_workbook;
use segment::MIN_NON_NULL;
use segment::MIN_ROWS;

/// Parses xlsx bytes and detects the cleaned tables per sheet.
///
/// Only sheets that yield at least one table appear in the result; the
/// original sheet order is preserved. Fails only on unreadable input.
pub fn detect_tables(bytes: &[u8]) -> Result<Vec<(String, Vec<Table>)>, GridpressError> {
    let sheets = read_workbook(bytes)?;
    Ok(scan_workbook(&sheets))
}

/// Detects tables in already-parsed sheet grids.
pub fn scan_workbook(sheets: &[(String, Grid)]) -> Vec<(String, Vec<Table>)> {
    let mut detected = Vec::new();
    for (name, grid) in sheets {
        let tables = scan_sheet(name, grid);
        if tables.is_empty() {
            tracing::debug!(sheet = name.as_str(), "no tables detected, sheet skipped");
        } else {
            detected.push((name.to_owned(), tables));
        }
    }
    detected
}

fn scan_sheet(name: &str, grid: &Grid) -> Vec<Table> {
    let grid = trim_edges(grid);
    if grid.is_empty() {
        tracing::debug!(sheet = name, "sheet is empty");
        return Vec::new();
    }

    let counts = grid.non_empty_counts();
    let mut segments = find_segments(&counts, MIN_NON_NULL, MIN_ROWS);
    if segments.is_empty() {
        // Nothing dense enough to segment on; try the sheet as one block.
        segments.push((0, grid.height() - 1));
    }

    segments
        .into_iter()
        .filter_map(|(start, end)| clean_block(&grid.slice_rows(start, end)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::cell::CellValue;

    fn text(value: &str) -> CellValue {
        CellValue::text(value)
    }

    #[test]
    fn finds_two_stacked_tables_in_one_sheet() {
        let grid = Grid::from_rows(vec![
            vec![text("Ventas 2024"), CellValue::Empty],
            vec![text("Producto"), text("Monto")],
            vec![text("a"), text("10")],
            vec![text("b"), text("20")],
            vec![CellValue::Empty, CellValue::Empty],
            vec![text("Cliente"), text("Zona")],
            vec![text("x"), text("norte")],
            vec![text("y"), text("sur")],
        ]);
        let sheets = vec![("Hoja1".to_string(), grid)];
        let detected = scan_workbook(&sheets);
        assert_eq!(detected.len(), 1);
        let (name, tables) = &detected[0];
        assert_eq!(name, "Hoja1");
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].columns(), ["producto", "monto"]);
        assert_eq!(tables[0].rows()[0][1], CellValue::Number(10.0));
        assert_eq!(tables[1].columns(), ["cliente", "zona"]);
    }

    #[test]
    fn sparse_sheet_falls_back_to_a_single_block() {
        // Every row has a single non-empty cell, so segmentation yields
        // nothing and the whole grid is cleaned as one block.
        let grid = Grid::from_rows(vec![
            vec![text("only"), CellValue::Empty],
            vec![text("v1"), CellValue::Empty],
            vec![text("v2"), CellValue::Empty],
        ]);
        let sheets = vec![("S".to_string(), grid)];
        let detected = scan_workbook(&sheets);
        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].1.len(), 1);
        assert_eq!(detected[0].1[0].columns(), ["only"]);
        assert_eq!(detected[0].1[0].row_count(), 2);
    }

    #[test]
    fn empty_and_unusable_sheets_are_omitted() {
        let sheets = vec![
            ("Empty".to_string(), Grid::default()),
            (
                "Blank".to_string(),
                Grid::from_rows(vec![vec![CellValue::Empty, CellValue::Empty]]),
            ),
            (
                "Data".to_string(),
                Grid::from_rows(vec![
                    vec![text("h1"), text("h2")],
                    vec![text("a"), text("b")],
                ]),
            ),
        ];
        let detected = scan_workbook(&sheets);
        assert_eq!(detected.len(), 1);
        assert_eq!(detected[0].0, "Data");
    }
}
