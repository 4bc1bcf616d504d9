use crate::workbook::cell::format_number;
use crate::workbook::cell::CellValue;
use regex::Regex;

/// Sentinel token for headers that carry no usable name.
pub const UNNAMED: &str = "unnamed";

/// Converts an arbitrary header cell into a canonical identifier-like token.
///
/// Missing cells and NaN numbers yield [`UNNAMED`]. Otherwise the value's
/// string form is trimmed, every maximal run of non-word characters
/// (Unicode-aware) collapses to a single underscore, leading/trailing
/// underscores are stripped and the result is lower-cased. A token that ends
/// up empty also yields [`UNNAMED`]. Pure and total.
pub fn normalize_header(value: &CellValue) -> String {
    let text = match value {
        CellValue::Empty => return UNNAMED.to_owned(),
        CellValue::Number(number) if number.is_nan() => return UNNAMED.to_owned(),
        CellValue::Number(number) => format_number(*number),
        CellValue::Text(text) => text.trim().to_owned(),
    };
    let pattern = Regex::new(r"[^\w]+").expect("Hardcode regex pattern");
    let token = pattern
        .replace_all(&text, "_")
        .trim_matches('_')
        .to_lowercase();
    if token.is_empty() {
        UNNAMED.to_owned()
    } else {
        token
    }
}
