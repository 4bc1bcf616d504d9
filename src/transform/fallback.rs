use crate::table::Table;
use crate::transform::rules::RuleSet;
use crate::workbook::cell::CellValue;

/// Column names that identify the unit-type column, checked in order.
const UNIT_TYPE_HEADERS: [&str; 4] = ["unidad", "unit_type", "tipo_unidad", "tipo"];

const DM_COVERAGE: &str = "DANOS MATERIALES";
const RT_COVERAGE: &str = "ROBO TOTAL";
const DM_LIMIT_COLUMN: &str = "DANOS MATERIALES LIMITES";
const RT_LIMIT_COLUMN: &str = "ROBO TOTAL LIMITES";
const DM_DEDUCTIBLE_COLUMN: &str = "DANOS MATERIALES DEDUCIBLES";
const RT_DEDUCTIBLE_COLUMN: &str = "ROBO TOTAL DEDUCIBLES";

const DEFAULT_DEDUCTIBLE: &str = "10 %";
const DEFAULT_LIMIT: &str = "25000";
const AGREED_VALUE: &str = "VALOR CONVENIDO";

/// Deterministic rule application used when the completion service is
/// unreachable or answers garbage.
///
/// Appends limit and deductible columns for the two standard coverages.
/// With a unit-type column the limits come from a keyword tier over the
/// unit description; without one every limit is the agreed-value marker.
/// Deductibles come from the rule lookup when one exists, else the default.
/// Total: the input table comes back with four extra columns and the same
/// rows.
pub fn apply_fallback(table: &Table, rules: &RuleSet) -> Table {
    let mut result = table.clone();

    let unit_col = UNIT_TYPE_HEADERS
        .iter()
        .find_map(|header| table.column_index(header));
    let units: Vec<Option<String>> = match unit_col {
        Some(col) => table
            .rows()
            .iter()
            .map(|row| match &row[col] {
                CellValue::Empty => None,
                value => Some(value.to_string()),
            })
            .collect(),
        None => vec![None; table.row_count()],
    };

    let limits: Vec<CellValue> = match unit_col {
        Some(_) => units
            .iter()
            .map(|unit| CellValue::text(infer_limit(unit.as_deref())))
            .collect(),
        None => vec![CellValue::text(AGREED_VALUE); table.row_count()],
    };
    result.push_column(DM_LIMIT_COLUMN, limits.clone());
    result.push_column(RT_LIMIT_COLUMN, limits);

    for (coverage, column) in [
        (DM_COVERAGE, DM_DEDUCTIBLE_COLUMN),
        (RT_COVERAGE, RT_DEDUCTIBLE_COLUMN),
    ] {
        let deductibles: Vec<CellValue> = units
            .iter()
            .map(|unit| {
                let from_rules = unit.as_deref().and_then(|unit| {
                    rules
                        .coverage_lookup()
                        .and_then(|lookup| lookup.deductible(unit, coverage))
                });
                CellValue::text(from_rules.unwrap_or(DEFAULT_DEDUCTIBLE))
            })
            .collect();
        result.push_column(column, deductibles);
    }

    result
}

/// Coverage limit tier keyed on keywords in the unit description.
fn infer_limit(unit: Option<&str>) -> &'static str {
    let Some(unit) = unit else {
        return DEFAULT_LIMIT;
    };
    let unit = unit.to_lowercase();
    if unit.contains("camion") || unit.contains("truck") {
        "100000"
    } else if unit.contains("auto") || unit.contains("car") || unit.contains("vehiculo") {
        "50000"
    } else {
        DEFAULT_LIMIT
    }
}
