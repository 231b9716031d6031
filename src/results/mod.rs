//! SPARQL 1.1 JSON results model and shape validation.
//!
//! The wire format is consumed and produced verbatim:
//! `{head: {vars: [...]}, results: {bindings: [{var: {type, value, datatype?, "xml:lang"?}}]}}`.
//!
//! # Example
//!
//! ```rust
//! use mimir::results::SparqlJsonResult;
//!
//! let json = serde_json::json!({
//!     "head": {"vars": ["name"]},
//!     "results": {"bindings": [
//!         {"name": {"type": "literal", "value": "well", "xml:lang": "en"}}
//!     ]}
//! });
//! let result = SparqlJsonResult::from_json(json).unwrap();
//! assert_eq!(result.first_value("name").unwrap().value, "well");
//! ```

use crate::error::FederationError;
use crate::vocab::XSD_INTEGER;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod record;

pub use record::{parse_records, SparqlRecord, SOURCE_VAR};

/// Kind of a bound RDF term in a SPARQL JSON result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    #[serde(rename = "uri")]
    Uri,
    // some endpoints emit "typed-literal" for literals carrying a datatype
    #[serde(rename = "literal", alias = "typed-literal")]
    Literal,
    #[serde(rename = "bnode")]
    Bnode,
}

/// A single bound value of one variable in one row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparqlValue {
    #[serde(rename = "type")]
    pub kind: ValueKind,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub datatype: Option<String>,
    #[serde(rename = "xml:lang", skip_serializing_if = "Option::is_none", default)]
    pub language: Option<String>,
}

impl SparqlValue {
    pub fn uri(value: impl Into<String>) -> Self {
        SparqlValue { kind: ValueKind::Uri, value: value.into(), datatype: None, language: None }
    }

    pub fn literal(value: impl Into<String>) -> Self {
        SparqlValue {
            kind: ValueKind::Literal,
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed_literal(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        SparqlValue {
            kind: ValueKind::Literal,
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    /// Numeric view of an integer-typed literal, `None` for anything else
    pub fn as_integer(&self) -> Option<i64> {
        match &self.datatype {
            Some(datatype) if datatype == XSD_INTEGER => self.value.parse().ok(),
            _ => None,
        }
    }
}

/// One row of a result: variable name to bound value, unbound variables absent
pub type BindingRow = HashMap<String, SparqlValue>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlHead {
    pub vars: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlResults {
    pub bindings: Vec<BindingRow>,
}

/// A SPARQL SELECT result in the W3C JSON results shape.
///
/// Row order is authoritative and preserved end-to-end; the caller's
/// ORDER BY is meaningful.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparqlJsonResult {
    pub head: SparqlHead,
    pub results: SparqlResults,
}

impl SparqlJsonResult {
    /// The empty result: no variables, no rows
    pub fn empty() -> Self {
        SparqlJsonResult::default()
    }

    /// Validates the four mandatory shape properties before decoding.
    ///
    /// Fails with `MalformedResult` naming the missing property, in the
    /// order head, head.vars, results, results.bindings.
    pub fn from_json(json: serde_json::Value) -> Result<Self, FederationError> {
        let head = json
            .get("head")
            .ok_or_else(|| malformed("SPARQL response is missing 'head' property"))?;
        if head.get("vars").is_none() {
            return Err(malformed("SPARQL response is missing 'head.vars' property"));
        }
        let results = json
            .get("results")
            .ok_or_else(|| malformed("SPARQL response is missing 'results' property"))?;
        if results.get("bindings").is_none() {
            return Err(malformed("SPARQL response is missing 'results.bindings' property"));
        }
        serde_json::from_value(json).map_err(|e| malformed(&e.to_string()))
    }

    /// True iff no declared variable holds a defined value in `row`
    pub fn is_empty_row(&self, row: &BindingRow) -> bool {
        self.head.vars.iter().all(|var| !row.contains_key(var))
    }

    /// The bound value of `var` in `row`, `None` when unbound
    pub fn project<'a>(&self, row: &'a BindingRow, var: &str) -> Option<&'a SparqlValue> {
        row.get(var)
    }

    /// First defined value of `var` across all rows
    pub fn first_value(&self, var: &str) -> Option<&SparqlValue> {
        self.results.bindings.iter().find_map(|row| row.get(var))
    }

    /// All defined values of `var` across all rows, in row order
    pub fn values_of(&self, var: &str) -> Vec<&SparqlValue> {
        self.results.bindings.iter().filter_map(|row| row.get(var)).collect()
    }
}

fn malformed(message: &str) -> FederationError {
    FederationError::MalformedResult(message.to_string())
}
