use crate::detect::header::normalize_header;
use crate::detect::trim::trim_edges;
use crate::table::Table;
use crate::workbook::cell::CellValue;
use crate::workbook::grid::Grid;
use std::collections::HashMap;

/// Minimum of non-empty cells for a row to be accepted as the header row.
const HEADER_MIN_NON_NULL: usize = 2;

/// Turns one candidate block of rows into a finished table.
///
/// Steps, in order: trim empty edges, locate the header row (first row with
/// at least two non-empty cells, else row 0), normalize and de-duplicate the
/// header, drop blank-only columns and rows, and finally attempt whole-column
/// numeric coercion. Returns `None` when nothing table-like survives.
pub fn clean_block(block: &Grid) -> Option<Table> {
    let block = trim_edges(block);
    if block.is_empty() {
        return None;
    }

    let header_index = block
        .non_empty_counts()
        .iter()
        .position(|count| *count >= HEADER_MIN_NON_NULL)
        .unwrap_or(0);
    let columns = unique_columns(&block.rows()[header_index]);

    let mut rows: Vec<Vec<CellValue>> = block.rows()[header_index + 1..].to_vec();
    if rows.is_empty() {
        return None;
    }
    // Extra trailing cells beyond the header width are dropped, not an error.
    for row in &mut rows {
        row.truncate(columns.len());
        row.resize(columns.len(), CellValue::Empty);
    }

    let keep: Vec<usize> = (0..columns.len())
        .filter(|&col| rows.iter().any(|row| !row[col].is_blank()))
        .collect();
    if keep.is_empty() {
        return None;
    }
    let columns: Vec<String> = keep.iter().map(|&col| columns[col].to_owned()).collect();
    let mut rows: Vec<Vec<CellValue>> = rows
        .into_iter()
        .map(|row| keep.iter().map(|&col| row[col].to_owned()).collect())
        .filter(|row: &Vec<CellValue>| row.iter().any(|cell| !cell.is_blank()))
        .collect();
    if rows.is_empty() {
        return None;
    }

    coerce_numeric_columns(&mut rows, columns.len());
    Some(Table::new(columns, rows))
}

/// Normalizes a header row into unique tokens; repeats get `_2`, `_3`, ...
fn unique_columns(header: &[CellValue]) -> Vec<String> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    header
        .iter()
        .map(|cell| {
            let base = normalize_header(cell);
            let count = seen.entry(base.to_owned()).or_insert(0);
            *count += 1;
            if *count == 1 {
                base
            } else {
                format!("{}_{}", base, count)
            }
        })
        .collect()
}

/// Whole-column numeric coercion: a column converts only when every
/// non-missing value parses as a number, otherwise it is left untouched.
fn coerce_numeric_columns(rows: &mut [Vec<CellValue>], width: usize) {
    for col in 0..width {
        let mut parsed: Vec<(usize, f64)> = Vec::new();
        let mut convertible = true;
        for (index, row) in rows.iter().enumerate() {
            match &row[col] {
                CellValue::Empty | CellValue::Number(_) => (),
                CellValue::Text(text) => match parse_number(text) {
                    Some(number) => parsed.push((index, number)),
                    None => {
                        convertible = false;
                        break;
                    }
                },
            }
        }
        if convertible {
            for (index, number) in parsed {
                rows[index][col] = CellValue::Number(number);
            }
        }
    }
}

fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> CellValue {
        CellValue::text(value)
    }

    #[test]
    fn cleans_a_padded_block() {
        let grid = Grid::from_rows(vec![
            vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
            vec![text("Header1"), text("Header2"), CellValue::Empty],
            vec![text("a"), text("1"), CellValue::Empty],
            vec![text("b"), text("2"), CellValue::Empty],
            vec![CellValue::Empty, CellValue::Empty, CellValue::Empty],
        ]);
        let table = clean_block(&grid).unwrap();
        assert_eq!(table.columns(), ["header1", "header2"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0][0], text("a"));
        assert_eq!(table.rows()[0][1], CellValue::Number(1.0));
    }

    #[test]
    fn header_defaults_to_the_first_row() {
        // No row reaches two non-empty cells; row 0 becomes the header.
        let grid = Grid::from_rows(vec![
            vec![text("only"), CellValue::Empty],
            vec![text("x"), CellValue::Empty],
        ]);
        let table = clean_block(&grid).unwrap();
        assert_eq!(table.columns(), ["only"]);
        assert_eq!(table.row_count(), 1);
    }

    #[test]
    fn duplicate_headers_are_made_unique() {
        let grid = Grid::from_rows(vec![
            vec![text("Name"), text("name"), text("NAME ")],
            vec![text("a"), text("b"), text("c")],
        ]);
        let table = clean_block(&grid).unwrap();
        assert_eq!(table.columns(), ["name", "name_2", "name_3"]);
    }

    #[test]
    fn blank_rows_and_columns_are_dropped() {
        let grid = Grid::from_rows(vec![
            vec![text("h1"), text("h2"), text("h3")],
            vec![text("a"), text("  "), text("x")],
            vec![text("  "), CellValue::Empty, text("   ")],
            vec![text("b"), CellValue::Empty, text("y")],
        ]);
        let table = clean_block(&grid).unwrap();
        assert_eq!(table.columns(), ["h1", "h3"]);
        assert_eq!(table.row_count(), 2);
        for row in table.rows() {
            assert!(row.iter().any(|cell| !cell.is_blank()));
        }
    }

    #[test]
    fn mixed_columns_stay_text() {
        let grid = Grid::from_rows(vec![
            vec![text("id"), text("note")],
            vec![text("1"), text("12 units")],
            vec![text("2"), text("30")],
        ]);
        let table = clean_block(&grid).unwrap();
        assert_eq!(table.rows()[0][0], CellValue::Number(1.0));
        // "12 units" fails to parse, so the whole column keeps its text form.
        assert_eq!(table.rows()[1][1], text("30"));
    }

    #[test]
    fn degenerate_blocks_yield_nothing() {
        assert!(clean_block(&Grid::default()).is_none());
        // Header only, no data rows.
        let header_only = Grid::from_rows(vec![vec![text("a"), text("b")]]);
        assert!(clean_block(&header_only).is_none());
        // Data rows entirely blank text.
        let blank_data = Grid::from_rows(vec![
            vec![text("a"), text("b")],
            vec![text(" "), text("  ")],
        ]);
        assert!(clean_block(&blank_data).is_none());
    }
}
