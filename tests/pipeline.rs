//! End-to-end pipeline tests: xlsx bytes in, detection, transformation and
//! xlsx bytes out, with no external service configured.

use gridpress::detect_tables;
use gridpress::export::ExportError;
use gridpress::export_tables;
use gridpress::export_workbook;
use gridpress::read_workbook;
use gridpress::write_workbook;
use gridpress::CellValue;
use gridpress::DebugSink;
use gridpress::Grid;
use gridpress::GridpressError;
use gridpress::RuleSet;
use gridpress::RuleTransformer;

fn text(value: &str) -> CellValue {
    CellValue::text(value)
}

/// A workbook with one padded data sheet and one blank sheet.
fn sample_workbook() -> Vec<u8> {
    let data = Grid::from_rows(vec![
        vec![CellValue::Empty, CellValue::Empty],
        vec![text("H A"), text("H B")],
        vec![text("x1"), CellValue::Number(10.0)],
        vec![text("x2"), CellValue::Number(20.0)],
        vec![CellValue::Empty, CellValue::Empty],
    ]);
    let blank = Grid::from_rows(vec![vec![CellValue::Empty, CellValue::Empty]]);
    write_workbook(&[("Sheet1".to_string(), data), ("EmptySheet".to_string(), blank)]).unwrap()
}

#[test]
fn detection_skips_blank_sheets_and_cleans_the_rest() {
    let detected = detect_tables(&sample_workbook()).unwrap();
    assert_eq!(detected.len(), 1);
    let (sheet, tables) = &detected[0];
    assert_eq!(sheet, "Sheet1");
    assert_eq!(tables.len(), 1);
    let table = &tables[0];
    assert_eq!(table.columns(), ["h_a", "h_b"]);
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.rows()[0][0], text("x1"));
    assert_eq!(table.rows()[0][1], CellValue::Number(10.0));
}

#[test]
fn export_applies_the_fallback_and_round_trips_through_xlsx() {
    let transformer = RuleTransformer::new(None, DebugSink::disabled());
    let bytes = export_workbook(
        &sample_workbook(),
        None,
        &RuleSet::empty(),
        &transformer,
    )
    .unwrap();

    let sheets = read_workbook(&bytes).unwrap();
    assert_eq!(sheets.len(), 1);
    let (name, grid) = &sheets[0];
    assert_eq!(name, "Sheet1_Table1");

    let header: Vec<String> = grid.rows()[0].iter().map(CellValue::to_string).collect();
    assert_eq!(
        header,
        [
            "h_a",
            "h_b",
            "DANOS MATERIALES LIMITES",
            "ROBO TOTAL LIMITES",
            "DANOS MATERIALES DEDUCIBLES",
            "ROBO TOTAL DEDUCIBLES",
        ]
    );
    // No unit column and empty rules: agreed-value limits, default
    // deductibles.
    assert_eq!(grid.height(), 3);
    assert_eq!(grid.rows()[1][2], text("VALOR CONVENIDO"));
    assert_eq!(grid.rows()[2][3], text("VALOR CONVENIDO"));
    assert_eq!(grid.rows()[1][4], text("10 %"));
    assert_eq!(grid.rows()[2][5], text("10 %"));
}

#[test]
fn whole_sheet_fallback_keeps_the_sheet_name() {
    // The only dense run of rows has blank-text data, so segmented
    // detection yields nothing and the requested sheet is cleaned as one
    // table under its own name.
    let grid = Grid::from_rows(vec![
        vec![text("H1"), text("H2")],
        vec![text(" "), text("  ")],
        vec![CellValue::Empty, CellValue::Empty],
        vec![text("x"), CellValue::Empty],
        vec![text("y"), CellValue::Empty],
    ]);
    let bytes = write_workbook(&[("Inventario".to_string(), grid)]).unwrap();

    let transformer = RuleTransformer::new(None, DebugSink::disabled());
    let tables = export_tables(
        &bytes,
        Some("Inventario"),
        &RuleSet::empty(),
        &transformer,
    )
    .unwrap();
    assert_eq!(tables.len(), 1);
    let (name, table) = &tables[0];
    assert_eq!(name, "Inventario");
    assert_eq!(table.columns()[0], "h1");
    assert_eq!(table.row_count(), 2);
    // Still no unit column, so the appended limits carry the agreed value.
    let limit_col = table.column_index("DANOS MATERIALES LIMITES").unwrap();
    assert_eq!(table.rows()[0][limit_col], text("VALOR CONVENIDO"));
}

#[test]
fn requesting_an_unknown_sheet_reports_the_available_ones() {
    let transformer = RuleTransformer::new(None, DebugSink::disabled());
    let error = export_workbook(
        &sample_workbook(),
        Some("Nope"),
        &RuleSet::empty(),
        &transformer,
    )
    .unwrap_err();
    match error {
        GridpressError::ExportError(ExportError::SheetNotFound { name, available }) => {
            assert_eq!(name, "Nope");
            assert_eq!(available, ["Sheet1", "EmptySheet"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn requesting_a_blank_sheet_is_an_error() {
    let transformer = RuleTransformer::new(None, DebugSink::disabled());
    let error = export_workbook(
        &sample_workbook(),
        Some("EmptySheet"),
        &RuleSet::empty(),
        &transformer,
    )
    .unwrap_err();
    match error {
        GridpressError::ExportError(ExportError::EmptySheet { name }) => {
            assert_eq!(name, "EmptySheet");
        }
        other => panic!("unexpected error: {other}"),
    }
}
