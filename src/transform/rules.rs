use serde_json::Value;
use std::collections::HashMap;

/// Declarative transformation rules, as supplied by the caller.
///
/// The rules travel to the completion service verbatim as JSON. The one shape
/// the deterministic fallback also understands is `coberturas_por_tipo`, a
/// per-unit-type coverage map; everything else is carried opaquely.
#[derive(Clone, Debug)]
pub enum RuleSet {
    CoverageByUnit {
        document: Value,
        lookup: CoverageLookup,
    },
    Opaque(Value),
}

/// Deductibles per unit type and coverage name, extracted from the
/// `coberturas_por_tipo` rule shape.
#[derive(Clone, Debug, Default)]
pub struct CoverageLookup {
    entries: Vec<(String, HashMap<String, String>)>,
}

impl CoverageLookup {
    /// Deductible for a unit type and coverage, if the rules define one.
    ///
    /// Unit types match when the rule key appears inside the upper-cased
    /// unit description, so "CAMION 3.5 TON" matches a "CAMION" rule.
    pub fn deductible(&self, unit: &str, coverage: &str) -> Option<&str> {
        let unit = unit.to_uppercase();
        self.entries
            .iter()
            .find(|(key, _)| unit.contains(key.as_str()))
            .and_then(|(_, coverages)| coverages.get(coverage))
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    fn parse(value: &Value) -> Option<CoverageLookup> {
        let map = value.as_object()?;
        let mut entries = Vec::new();
        for (unit_type, body) in map {
            let coverages = body.get("coberturas")?.as_object()?;
            let mut deductibles = HashMap::new();
            for (coverage, detail) in coverages {
                if let Some(deductible) = detail.get("DEDUCIBLES").and_then(Value::as_str) {
                    deductibles.insert(coverage.to_uppercase(), deductible.to_owned());
                }
            }
            entries.push((unit_type.to_uppercase(), deductibles));
        }
        Some(CoverageLookup { entries })
    }
}

impl RuleSet {
    /// Classifies a raw JSON rule document.
    pub fn parse(document: Value) -> RuleSet {
        match document
            .get("coberturas_por_tipo")
            .and_then(CoverageLookup::parse)
        {
            Some(lookup) => RuleSet::CoverageByUnit { document, lookup },
            None => RuleSet::Opaque(document),
        }
    }

    /// Rules with nothing in them; the fallback then uses its defaults.
    pub fn empty() -> RuleSet {
        RuleSet::Opaque(Value::Object(serde_json::Map::new()))
    }

    /// The raw JSON document, for serialization into the service prompt.
    pub fn document(&self) -> &Value {
        match self {
            RuleSet::CoverageByUnit { document, .. } => document,
            RuleSet::Opaque(document) => document,
        }
    }

    /// The coverage lookup, when the rules define one.
    pub fn coverage_lookup(&self) -> Option<&CoverageLookup> {
        match self {
            RuleSet::CoverageByUnit { lookup, .. } => Some(lookup),
            RuleSet::Opaque(_) => None,
        }
    }
}
