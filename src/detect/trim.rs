use crate::workbook::cell::CellValue;
use crate::workbook::grid::Grid;

/// Strips fully-empty border rows and columns from a grid.
///
/// One pass per edge, in order: top, bottom, left, right. A grid that
/// shrinks to nothing comes back as the empty grid.
pub fn trim_edges(grid: &Grid) -> Grid {
    let mut rows: Vec<Vec<CellValue>> = grid.rows().to_vec();

    while rows.first().map(|row| row_is_empty(row)).unwrap_or(false) {
        rows.remove(0);
    }
    while rows.last().map(|row| row_is_empty(row)).unwrap_or(false) {
        rows.pop();
    }

    let mut col_lower = 0usize;
    let mut col_upper = rows.first().map(Vec::len).unwrap_or(0);
    while col_lower < col_upper && col_is_empty(&rows, col_lower) {
        col_lower += 1;
    }
    while col_upper > col_lower && col_is_empty(&rows, col_upper - 1) {
        col_upper -= 1;
    }

    if rows.is_empty() || col_lower == col_upper {
        return Grid::default();
    }
    Grid::from_rows(
        rows.into_iter()
            .map(|row| row[col_lower..col_upper].to_vec())
            .collect(),
    )
}

fn row_is_empty(row: &[CellValue]) -> bool {
    row.iter().all(CellValue::is_missing)
}

fn col_is_empty(rows: &[Vec<CellValue>], col: usize) -> bool {
    rows.iter().all(|row| row[col].is_missing())
}
