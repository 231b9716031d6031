//! Row projection over parsed results, with provenance tagging.
//!
//! A `SparqlRecord` is one non-empty result row restricted to the
//! declared variables. Records emitted by the federation layer carry a
//! back-reference to the data source that produced them.

use crate::catalog::DataSource;
use crate::results::{SparqlJsonResult, SparqlValue};
use std::collections::HashMap;
use std::sync::Arc;

/// Reserved pseudo-variable under which the provenance source is exposed.
///
/// Never present in raw executor output; attached at merge time only.
pub const SOURCE_VAR: &str = "source";

#[derive(Debug, Clone)]
pub struct SparqlRecord {
    pub values: HashMap<String, SparqlValue>,
    pub source: Option<Arc<DataSource>>,
}

impl SparqlRecord {
    pub fn node(&self, var: &str) -> Option<&SparqlValue> {
        self.values.get(var)
    }

    /// The bound value of `var`, empty string when unbound
    pub fn value(&self, var: &str) -> &str {
        self.node(var).map_or("", |node| node.value.as_str())
    }

    /// JSON view of the record with the provenance source, when present,
    /// exposed under the reserved `source` variable
    pub fn to_json(&self) -> serde_json::Value {
        let mut row = serde_json::Map::new();
        for (var, value) in &self.values {
            row.insert(var.clone(), serde_json::to_value(value).unwrap_or_default());
        }
        if let Some(source) = &self.source {
            row.insert(
                SOURCE_VAR.to_string(),
                serde_json::Value::String(source.endpoint_url.clone()),
            );
        }
        serde_json::Value::Object(row)
    }
}

/// Turns a result into records, skipping rows where no declared variable
/// is bound and tagging each record with `source` when given.
pub fn parse_records(
    result: &SparqlJsonResult,
    source: Option<&Arc<DataSource>>,
) -> Vec<SparqlRecord> {
    let mut records = Vec::new();
    for row in &result.results.bindings {
        let mut values = HashMap::new();
        for var in &result.head.vars {
            if let Some(value) = row.get(var) {
                values.insert(var.clone(), value.clone());
            }
        }
        if !values.is_empty() {
            records.push(SparqlRecord { values, source: source.cloned() });
        }
    }
    records
}

/// First record's binding of `var`, `None` when there are no records
pub fn first_node<'a>(records: &'a [SparqlRecord], var: &str) -> Option<&'a SparqlValue> {
    records.first().and_then(|record| record.node(var))
}

/// First record's value of `var`, `None` when there are no records
pub fn first_value(records: &[SparqlRecord], var: &str) -> Option<String> {
    records.first().map(|record| record.value(var).to_string())
}

/// Values of `var` over all records, `None` when there are no records
pub fn value_list(records: &[SparqlRecord], var: &str) -> Option<Vec<String>> {
    if records.is_empty() {
        return None;
    }
    Some(records.iter().map(|record| record.value(var).to_string()).collect())
}

/// Records of an aggregate result, `None` when the result is the single
/// all-zero row a COUNT query produces over an empty selection
pub fn records_with_count(result: &SparqlJsonResult, var: &str) -> Option<Vec<SparqlRecord>> {
    let records = parse_records(result, None);
    if records.len() == 1 {
        let count = records[0].node(var).and_then(|value| value.as_integer());
        if count == Some(0) {
            return None;
        }
    }
    Some(records)
}

/// The integer value of `var` in the first row, `None` when unbound
pub fn count_value(result: &SparqlJsonResult, var: &str) -> Option<i64> {
    result.first_value(var).and_then(|value| value.as_integer().or_else(|| value.value.parse().ok()))
}
