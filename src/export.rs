//! # Export Pipeline
//!
//! The end-to-end path: xlsx bytes in, detected tables transformed by the
//! rule document, xlsx bytes out. One output sheet per detected table, named
//! after the source sheet.

use crate::detect::clean_block;
use crate::detect::scan_workbook;
use crate::error::GridpressError;
use crate::table::Table;
use crate::transform::rules::RuleSet;
use crate::transform::RuleTransformer;
use crate::workbook::grid::Grid;
use crate::workbook::xlsx::read_workbook;
use crate::workbook::writer::write_workbook;
use thiserror::Error;

/// Sheet names in xlsx are capped at 31 characters.
const SHEET_NAME_LIMIT: usize = 31;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Sheet '{name}' not found; available sheets: {}", available.join(", "))]
    SheetNotFound { name: String, available: Vec<String> },

    #[error("Sheet '{name}' contains no usable table")]
    EmptySheet { name: String },

    #[error("Workbook contains no usable table")]
    NoTables,
}

/// Detects, cleans and transforms the tables of a workbook.
///
/// With a `sheet` name only that sheet is processed; the name must exist.
/// Without one every sheet contributes its detected tables. Detected tables
/// are named `{sheet}_Table{n}`; a requested sheet where detection finds
/// nothing is cleaned as a single table under the sheet's own name.
pub fn export_tables(
    bytes: &[u8],
    sheet: Option<&str>,
    rules: &RuleSet,
    transformer: &RuleTransformer,
) -> Result<Vec<(String, Table)>, GridpressError> {
    let sheets = read_workbook(bytes)?;

    let selected: Vec<(String, Grid)> = match sheet {
        Some(name) => {
            let found = sheets.iter().find(|(sheet_name, _)| sheet_name == name);
            match found {
                Some(entry) => vec![entry.to_owned()],
                None => {
                    return Err(ExportError::SheetNotFound {
                        name: name.to_owned(),
                        available: sheets.into_iter().map(|(name, _)| name).collect(),
                    }
                    .into())
                }
            }
        }
        None => sheets,
    };

    let detected = scan_workbook(&selected);
    if detected.is_empty() {
        let Some(name) = sheet else {
            return Err(ExportError::NoTables.into());
        };
        // Detection found nothing in the requested sheet; clean the whole
        // grid as one table and emit it under the sheet's own name. Only
        // detected tables get the `_Table{n}` suffix.
        let (_, grid) = &selected[0];
        let table = clean_block(grid).ok_or_else(|| ExportError::EmptySheet {
            name: name.to_owned(),
        })?;
        return Ok(vec![(name.to_owned(), transformer.transform(&table, rules))]);
    }

    let mut output = Vec::new();
    for (name, tables) in detected {
        for (index, table) in tables.iter().enumerate() {
            let transformed = transformer.transform(table, rules);
            output.push((table_sheet_name(&name, index + 1), transformed));
        }
    }
    Ok(output)
}

/// Full pipeline: xlsx bytes in, transformed xlsx bytes out.
pub fn export_workbook(
    bytes: &[u8],
    sheet: Option<&str>,
    rules: &RuleSet,
    transformer: &RuleTransformer,
) -> Result<Vec<u8>, GridpressError> {
    let tables = export_tables(bytes, sheet, rules, transformer)?;
    let sheets: Vec<_> = tables
        .into_iter()
        .map(|(name, table)| (name, table.to_grid()))
        .collect();
    write_workbook(&sheets)
}

fn table_sheet_name(sheet: &str, number: usize) -> String {
    format!("{}_Table{}", sheet, number)
        .chars()
        .take(SHEET_NAME_LIMIT)
        .collect()
}
