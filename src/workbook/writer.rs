//! Writes grids back out as a minimal xlsx workbook.
//!
//! Strings are stored as inline strings so no shared string table is needed;
//! numbers are stored as plain numeric cells. Only the parts a reader
//! actually requires are emitted.

use crate::error::GridpressError;
use crate::workbook::cell::format_number;
use crate::workbook::cell::CellValue;
use crate::workbook::grid::Grid;
use crate::workbook::reference::index_to_reference;
use quick_xml::events::BytesDecl;
use quick_xml::events::BytesEnd;
use quick_xml::events::BytesStart;
use quick_xml::events::BytesText;
use quick_xml::events::Event;
use quick_xml::Writer;
use std::io::Cursor;
use std::io::Write;
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

const XMLNS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const XMLNS_RELATIONSHIPS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Serializes ordered `(sheet name, grid)` pairs to xlsx bytes.
///
/// Sheet names are written as given; callers are responsible for keeping
/// them within the format's 31-character limit.
pub fn write_workbook(sheets: &[(String, Grid)]) -> Result<Vec<u8>, GridpressError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(content_types(sheets.len()).as_bytes())?;

    zip.start_file("_rels/.rels", options)?;
    zip.write_all(ROOT_RELATIONSHIPS.as_bytes())?;

    zip.start_file("xl/workbook.xml", options)?;
    zip.write_all(&workbook_xml(sheets)?)?;

    zip.start_file("xl/_rels/workbook.xml.rels", options)?;
    zip.write_all(workbook_relationships(sheets.len()).as_bytes())?;

    for (index, (_, grid)) in sheets.iter().enumerate() {
        zip.start_file(format!("xl/worksheets/sheet{}.xml", index + 1), options)?;
        zip.write_all(&worksheet_xml(grid)?)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

const ROOT_RELATIONSHIPS: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
    r#"</Relationships>"#,
);

fn content_types(sheet_count: usize) -> String {
    let mut parts = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    ));
    for index in 1..=sheet_count {
        parts.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{index}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        ));
    }
    parts.push_str("</Types>");
    parts
}

fn workbook_relationships(sheet_count: usize) -> String {
    let mut parts = String::from(concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    ));
    for index in 1..=sheet_count {
        parts.push_str(&format!(
            r#"<Relationship Id="rId{index}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{index}.xml"/>"#,
        ));
    }
    parts.push_str("</Relationships>");
    parts
}

/// Builds xl/workbook.xml with one sheet entry per grid, escaping names.
fn workbook_xml(sheets: &[(String, Grid)]) -> Result<Vec<u8>, GridpressError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut workbook = BytesStart::new("workbook");
    workbook.push_attribute(("xmlns", XMLNS_MAIN));
    workbook.push_attribute(("xmlns:r", XMLNS_RELATIONSHIPS));
    writer.write_event(Event::Start(workbook))?;
    writer.write_event(Event::Start(BytesStart::new("sheets")))?;
    for (index, (name, _)) in sheets.iter().enumerate() {
        let mut sheet = BytesStart::new("sheet");
        sheet.push_attribute(("name", name.as_str()));
        sheet.push_attribute(("sheetId", (index + 1).to_string().as_str()));
        sheet.push_attribute(("r:id", format!("rId{}", index + 1).as_str()));
        writer.write_event(Event::Empty(sheet))?;
    }
    writer.write_event(Event::End(BytesEnd::new("sheets")))?;
    writer.write_event(Event::End(BytesEnd::new("workbook")))?;
    Ok(writer.into_inner().into_inner())
}

/// Builds one worksheet part; empty cells are simply not written.
fn worksheet_xml(grid: &Grid) -> Result<Vec<u8>, GridpressError> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut worksheet = BytesStart::new("worksheet");
    worksheet.push_attribute(("xmlns", XMLNS_MAIN));
    writer.write_event(Event::Start(worksheet))?;
    writer.write_event(Event::Start(BytesStart::new("sheetData")))?;

    for (row_index, row) in grid.rows().iter().enumerate() {
        let mut row_element = BytesStart::new("row");
        row_element.push_attribute(("r", (row_index + 1).to_string().as_str()));
        writer.write_event(Event::Start(row_element))?;
        for (col_index, cell) in row.iter().enumerate() {
            write_cell(&mut writer, row_index, col_index, cell)?;
        }
        writer.write_event(Event::End(BytesEnd::new("row")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(writer.into_inner().into_inner())
}

fn write_cell(
    writer: &mut Writer<Cursor<Vec<u8>>>,
    row: usize,
    col: usize,
    cell: &CellValue,
) -> Result<(), GridpressError> {
    let reference = index_to_reference(row, col);
    match cell {
        CellValue::Empty => (),
        CellValue::Number(value) => {
            let mut element = BytesStart::new("c");
            element.push_attribute(("r", reference.as_str()));
            writer.write_event(Event::Start(element))?;
            writer.write_event(Event::Start(BytesStart::new("v")))?;
            writer.write_event(Event::Text(BytesText::new(&format_number(*value))))?;
            writer.write_event(Event::End(BytesEnd::new("v")))?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
        CellValue::Text(value) => {
            let mut element = BytesStart::new("c");
            element.push_attribute(("r", reference.as_str()));
            element.push_attribute(("t", "inlineStr"));
            writer.write_event(Event::Start(element))?;
            writer.write_event(Event::Start(BytesStart::new("is")))?;
            let mut text = BytesStart::new("t");
            if value.trim() != value {
                text.push_attribute(("xml:space", "preserve"));
            }
            writer.write_event(Event::Start(text))?;
            writer.write_event(Event::Text(BytesText::new(value)))?;
            writer.write_event(Event::End(BytesEnd::new("t")))?;
            writer.write_event(Event::End(BytesEnd::new("is")))?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workbook::xlsx::read_workbook;

    #[test]
    fn written_workbook_reads_back() {
        let grid = Grid::from_rows(vec![
            vec![CellValue::text("name"), CellValue::text("count")],
            vec![CellValue::text("a & b"), CellValue::Number(10.0)],
            vec![CellValue::Empty, CellValue::Number(2.5)],
        ]);
        let bytes = write_workbook(&[("Datos <1>".to_string(), grid.clone())]).unwrap();

        let sheets = read_workbook(&bytes).unwrap();
        assert_eq!(sheets.len(), 1);
        assert_eq!(sheets[0].0, "Datos <1>");
        assert_eq!(sheets[0].1, grid);
    }
}
