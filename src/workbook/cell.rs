use std::fmt::Display;

/// A single cell value after reading.
///
/// Everything a sheet can hold is reduced to three shapes: absent, free text,
/// or a 64-bit float. Booleans are read as the strings "true"/"false" and
/// error cells ("#N/A", "#REF!", ...) as [`CellValue::Empty`].
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> CellValue {
        CellValue::Text(value.into())
    }

    /// True when the cell holds no value at all.
    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// True when the cell is missing or holds only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(value) => value.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(value) => write!(f, "{}", value),
            CellValue::Number(value) => write!(f, "{}", format_number(*value)),
        }
    }
}

/// Formats a number the way spreadsheet users expect: integral values
/// without a trailing ".0", everything else with Rust's shortest form.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}
