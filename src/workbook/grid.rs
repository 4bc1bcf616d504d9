use crate::workbook::cell::CellValue;

/// A rectangular grid of raw cell values, row-major, order preserving.
///
/// Construction pads ragged input with empty cells so that every row has the
/// same width; the invariant holds for the lifetime of the grid.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Grid {
    rows: Vec<Vec<CellValue>>,
}

impl Grid {
    /// Builds a grid from rows, padding short rows to a common width.
    pub fn from_rows(mut rows: Vec<Vec<CellValue>>) -> Grid {
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return Grid::default();
        }
        for row in &mut rows {
            row.resize(width, CellValue::Empty);
        }
        Grid { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map(Vec::len).unwrap_or(0)
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Copies an inclusive row range into a new grid (all columns).
    pub fn slice_rows(&self, start: usize, end: usize) -> Grid {
        let end = end.min(self.height().saturating_sub(1));
        if start > end || self.is_empty() {
            return Grid::default();
        }
        Grid {
            rows: self.rows[start..=end].to_vec(),
        }
    }

    /// Number of non-missing cells per row, in row order.
    pub(crate) fn non_empty_counts(&self) -> Vec<usize> {
        self.rows
            .iter()
            .map(|row| row.iter().filter(|cell| !cell.is_missing()).count())
            .collect()
    }
}
