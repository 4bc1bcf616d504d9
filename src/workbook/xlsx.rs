//! Reads xlsx workbooks from raw bytes into [`Grid`]s.
//!
//! Only the parts that matter for table detection are parsed: the sheet list
//! (in file order), the shared string table, and per-sheet cell values.
//! Number formats are ignored; a numeric cell is a number regardless of how
//! the sheet styles it.

use crate::error::GridpressError;
use crate::error::ResultMessage;
use crate::helpers::xml::XmlNodeHelper;
use crate::helpers::xml::XmlReader;
use crate::helpers::xml::XmlTextContextHelper;
use crate::helpers::zip::ZipHelper;
use crate::match_xml_events;
use crate::workbook::cell::CellValue;
use crate::workbook::grid::Grid;
use crate::workbook::reference::reference_to_index;
use crate::workbook::WorkbookError;
use quick_xml::events::Event;
use quick_xml::name::QName;
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::BufRead;
use std::io::Cursor;
use zip::ZipArchive;

// XML tag names for parsing the SpreadsheetML format
const TAG_RELATIONSHIP: &[u8] = b"Relationship";          // Part relationship
const TAG_SHEET: QName = QName(b"sheet");                  // Worksheet definition
const TAG_SHARED_STRING_ITEM: QName = QName(b"si");        // Shared string table item
const TAG_PHONETIC_TEXT: QName = QName(b"rPh");            // Phonetic text for Asian languages
const TAG_ROW: QName = QName(b"row");                      // Row in worksheet
const TAG_CELL: QName = QName(b"c");                       // Cell in worksheet
const TAG_INLINE_STRING: QName = QName(b"is");             // Inline string value
const TAG_VALUE: QName = QName(b"v");                      // Cell value content

/// Raw cell kind as declared by the `t` attribute of a cell element.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
enum RawKind {
    #[default]
    Number,
    SharedString,
    InlineString,
    Boolean,
    Error,
}

/// Reads every sheet of an xlsx workbook into a grid, preserving file order.
///
/// # Arguments
/// * `bytes` - Raw bytes of the workbook
///
/// # Returns
/// Ordered `(sheet name, grid)` pairs; empty sheets yield empty grids.
///
/// # Errors
/// Fails when the bytes are not a ZIP container, a required part is missing,
/// or a part is not well-formed XML.
pub fn read_workbook(bytes: &[u8]) -> Result<Vec<(String, Grid)>, GridpressError> {
    let mut zip = ZipArchive::new(Cursor::new(bytes))?;
    let sheets = load_workbook(&mut zip).with_prefix("read workbook structure")?;
    if sheets.is_empty() {
        Err(WorkbookError::NoWorksheets)?;
    }
    let shared_strings = load_shared_strings(&mut zip)?;

    let mut grids = Vec::with_capacity(sheets.len());
    for (name, path) in sheets {
        let grid = read_sheet(&mut zip, &path, &shared_strings).with_prefix(&name)?;
        grids.push((name, grid));
    }
    Ok(grids)
}

/// Loads worksheet relationships, mapping relationship ids to zip paths.
fn load_relationships(
    zip: &mut ZipArchive<Cursor<&[u8]>>,
    path: &str,
) -> Result<HashMap<String, String>, GridpressError> {
    let mut reader = zip
        .xml_reader(path)?
        .ok_or_else(|| WorkbookError::MissingPart(path.to_string()))?;
    let mut relationships: HashMap<String, String> = HashMap::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.local_name().as_ref() == TAG_RELATIONSHIP => {
            let id = event.get_attribute_value("Id")?;
            let kind = event.get_attribute_value("Type")?;
            let target = event.get_attribute_value("Target")?;
            // Only worksheet relationships are of interest
            if kind.map(|it| it.ends_with("/worksheet")).unwrap_or(true) {
                if let Some((id, target)) = id.zip(target) {
                    relationships.insert(id.to_string(), to_zip_path(target));
                }
            }
        }
    });
    Ok(relationships)
}

/// Loads the sheet list from xl/workbook.xml as (name, zip path) pairs in file order.
fn load_workbook(
    zip: &mut ZipArchive<Cursor<&[u8]>>,
) -> Result<Vec<(String, String)>, GridpressError> {
    let relationships = load_relationships(zip, "xl/_rels/workbook.xml.rels")?;
    let mut reader = zip
        .xml_reader("xl/workbook.xml")?
        .ok_or_else(|| WorkbookError::MissingPart("xl/workbook.xml".to_string()))?;
    let mut sheets: Vec<(String, String)> = Vec::new();
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHEET => {
            let mut name = None::<Cow<str>>;
            let mut id = None::<Cow<str>>;
            for result in event.attributes() {
                let attribute = result?;
                let key = attribute.key.local_name();
                if key.as_ref() == b"name" {
                    name = Some(attribute.unescape_value()?);
                } else if key.as_ref() == b"id" {
                    id = Some(attribute.unescape_value()?);
                }
            }
            if let Some((name, id)) = name.zip(id) {
                if let Some(path) = relationships.get(&id.to_string()) {
                    sheets.push((name.to_string(), path.to_owned()));
                }
            }
        }
    });
    Ok(sheets)
}

/// Loads the shared string table; absent table means no shared strings.
fn load_shared_strings(
    zip: &mut ZipArchive<Cursor<&[u8]>>,
) -> Result<Vec<String>, GridpressError> {
    let mut shared_strings = Vec::<String>::new();
    let mut reader = match zip.xml_reader("xl/sharedStrings.xml")? {
        Some(reader) => reader,
        None => return Ok(shared_strings),
    };
    match_xml_events!(reader => {
        Event::Start(event) if event.name() == TAG_SHARED_STRING_ITEM => {
            let string = read_text(&mut reader, TAG_SHARED_STRING_ITEM)?;
            shared_strings.push(string);
        }
    });
    Ok(shared_strings)
}

/// Reads one worksheet part into a dense grid anchored at A1.
fn read_sheet(
    zip: &mut ZipArchive<Cursor<&[u8]>>,
    path: &str,
    shared_strings: &[String],
) -> Result<Grid, GridpressError> {
    let mut reader = zip
        .xml_reader(path)?
        .ok_or_else(|| WorkbookError::MissingPart(path.to_string()))?;

    let mut cells: Vec<(usize, usize, CellValue)> = Vec::new();
    let mut row_count = 0usize;
    let mut col_count = 0usize;
    let mut row = 0usize;
    let mut col = 0usize;
    let mut kind = RawKind::default();
    let mut value = String::new();
    match_xml_events!(reader => {
        Event::End(event) if event.name() == TAG_ROW => {
            row_count += 1;
            col_count = 0;
        }
        Event::Start(event) if event.name() == TAG_CELL => {
            // Position from the explicit reference, else from document order
            (row, col) = event.get_attribute_value("r")?
                .and_then(|reference| reference_to_index(&reference))
                .unwrap_or((row_count, col_count));
            col_count += 1;
            kind = event.get_attribute_value("t")?.map(|t| {
                match t.as_ref() {
                    "s" => RawKind::SharedString,
                    "inlineStr" | "str" | "d" => RawKind::InlineString,
                    "b" => RawKind::Boolean,
                    "e" => RawKind::Error,
                    _ => RawKind::Number,
                }
            }).unwrap_or(RawKind::Number);
            value.clear();
        }
        Event::Start(event) if event.name() == TAG_INLINE_STRING => {
            value = read_text(&mut reader, TAG_INLINE_STRING)?;
        }
        Event::Start(event) if event.name() == TAG_VALUE => {
            value = read_text(&mut reader, TAG_VALUE)?;
        }
        Event::End(event) if event.name() == TAG_CELL && !value.is_empty() => {
            let cell = to_cell_value(kind, &value, shared_strings)?;
            if !cell.is_missing() {
                cells.push((row, col, cell));
            }
            value.clear();
        }
    });

    Ok(to_grid(cells))
}

/// Collects text content up to the closing tag, skipping phonetic runs.
fn read_text<R: BufRead>(reader: &mut XmlReader<R>, until: QName) -> Result<String, GridpressError> {
    let mut text = String::new();
    let mut phonetic = false;
    while let Some(event) = reader.next()? {
        match event {
            Event::Start(event) if event.name() == TAG_PHONETIC_TEXT => phonetic = true,
            Event::End(event) if event.name() == TAG_PHONETIC_TEXT => phonetic = false,
            Event::Text(event) if !phonetic => text.push_bytes_text(&event)?,
            Event::GeneralRef(event) if !phonetic => text.push_bytes_ref(&event)?,
            Event::End(event) if event.name() == until => break,
            Event::Eof => break,
            _ => (),
        }
    }
    Ok(text)
}

/// Converts a raw cell into the reduced value model.
fn to_cell_value(
    kind: RawKind,
    value: &str,
    shared_strings: &[String],
) -> Result<CellValue, GridpressError> {
    let cell = match kind {
        RawKind::SharedString => {
            let index = value.parse::<usize>()?;
            shared_strings
                .get(index)
                .map(|string| CellValue::Text(string.to_owned()))
                .unwrap_or_default()
        }
        RawKind::InlineString => CellValue::Text(value.to_owned()),
        RawKind::Boolean => {
            let truthy = value == "1" || value.eq_ignore_ascii_case("true");
            CellValue::text(if truthy { "true" } else { "false" })
        }
        // Error cells carry no usable value
        RawKind::Error => CellValue::Empty,
        RawKind::Number => value
            .trim()
            .parse::<f64>()
            .map(CellValue::Number)
            .unwrap_or_else(|_| CellValue::Text(value.to_owned())),
    };
    Ok(cell)
}

/// Builds a dense grid from sparse cells, anchored at row 0 / column 0.
fn to_grid(cells: Vec<(usize, usize, CellValue)>) -> Grid {
    let height = cells.iter().map(|(row, _, _)| row + 1).max().unwrap_or(0);
    let width = cells.iter().map(|(_, col, _)| col + 1).max().unwrap_or(0);
    if height == 0 || width == 0 {
        return Grid::default();
    }
    let mut rows = vec![vec![CellValue::Empty; width]; height];
    for (row, col, cell) in cells {
        rows[row][col] = cell;
    }
    Grid::from_rows(rows)
}

/// Normalizes a relationship target to a path inside the xlsx archive.
fn to_zip_path(path: Cow<'_, str>) -> String {
    if path.starts_with("/xl/") {
        path[1..].to_string()
    } else if path.starts_with("xl/") {
        path.to_string()
    } else {
        format!("xl/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shared_string_out_of_range_reads_as_empty() {
        let shared = vec!["hello".to_string()];
        assert_eq!(
            to_cell_value(RawKind::SharedString, "0", &shared).unwrap(),
            CellValue::text("hello")
        );
        assert_eq!(
            to_cell_value(RawKind::SharedString, "7", &shared).unwrap(),
            CellValue::Empty
        );
    }

    #[test]
    fn number_cells_fall_back_to_text_on_parse_failure() {
        assert_eq!(
            to_cell_value(RawKind::Number, "12.5", &[]).unwrap(),
            CellValue::Number(12.5)
        );
        assert_eq!(
            to_cell_value(RawKind::Number, "n/a", &[]).unwrap(),
            CellValue::text("n/a")
        );
    }

    #[test]
    fn sparse_cells_become_a_dense_grid() {
        let grid = to_grid(vec![
            (1, 1, CellValue::text("x")),
            (2, 0, CellValue::Number(5.0)),
        ]);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.width(), 2);
        assert_eq!(grid.rows()[0][0], CellValue::Empty);
        assert_eq!(grid.rows()[1][1], CellValue::text("x"));
        assert_eq!(grid.rows()[2][0], CellValue::Number(5.0));
    }

    #[test]
    fn relationship_targets_are_anchored_under_xl() {
        assert_eq!(to_zip_path(Cow::from("worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::from("/xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
        assert_eq!(to_zip_path(Cow::from("xl/worksheets/sheet1.xml")), "xl/worksheets/sheet1.xml");
    }
}
