//! SPARQL engine seam and the Oxigraph-backed implementation.
//!
//! The executor for the local store talks to its engine through the
//! [`SparqlEngine`] trait so tests can observe or replace engine
//! invocations.

use crate::results::{BindingRow, SparqlHead, SparqlJsonResult, SparqlResults, SparqlValue, ValueKind};
use oxigraph::model::vocab::xsd;
use oxigraph::model::Term;
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use oxigraph::store::Store;
use std::fmt;

pub trait SparqlEngine {
    type EngineError: std::error::Error + 'static;

    fn execute_query(
        &self,
        query: &str,
        store: &Store,
    ) -> Result<SparqlJsonResult, Self::EngineError>;
}

#[derive(Debug)]
pub struct OxigraphError(String);

impl fmt::Display for OxigraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oxigraph error: {}", self.0)
    }
}

impl std::error::Error for OxigraphError {}

impl From<oxigraph::sparql::QueryEvaluationError> for OxigraphError {
    fn from(err: oxigraph::sparql::QueryEvaluationError) -> Self {
        OxigraphError(err.to_string())
    }
}

/// Embedded engine evaluating queries against an Oxigraph store
pub struct OxigraphEngine;

impl OxigraphEngine {
    pub fn new() -> Self {
        OxigraphEngine
    }
}

impl SparqlEngine for OxigraphEngine {
    type EngineError = OxigraphError;

    fn execute_query(
        &self,
        query: &str,
        store: &Store,
    ) -> Result<SparqlJsonResult, Self::EngineError> {
        let evaluator = SparqlEvaluator::new();
        let parsed_query =
            evaluator.parse_query(query).map_err(|e| OxigraphError(e.to_string()))?;
        let results = parsed_query.on_store(store).execute()?;

        let mut vars = Vec::new();
        let mut bindings = Vec::new();

        // Only SELECT queries produce solutions; ASK and CONSTRUCT
        // results map to the empty binding table.
        if let QueryResults::Solutions(solutions) = results {
            vars = solutions.variables().iter().map(|v| v.as_str().to_string()).collect();
            for solution in solutions {
                let solution = solution?;
                let mut row = BindingRow::new();
                for (var, term) in solution.iter() {
                    row.insert(var.as_str().to_string(), term_to_value(term));
                }
                bindings.push(row);
            }
        }

        Ok(SparqlJsonResult {
            head: SparqlHead { vars },
            results: SparqlResults { bindings },
        })
    }
}

fn term_to_value(term: &Term) -> SparqlValue {
    match term {
        Term::NamedNode(node) => SparqlValue::uri(node.as_str()),
        Term::BlankNode(node) => SparqlValue {
            kind: ValueKind::Bnode,
            value: node.as_str().to_string(),
            datatype: None,
            language: None,
        },
        Term::Literal(literal) => {
            let mut value = SparqlValue::literal(literal.value());
            if let Some(language) = literal.language() {
                value.language = Some(language.to_string());
            } else if literal.datatype() != xsd::STRING {
                value.datatype = Some(literal.datatype().as_str().to_string());
            }
            value
        }
        other => SparqlValue::literal(other.to_string()),
    }
}
