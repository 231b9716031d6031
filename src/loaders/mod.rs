//! Federated domain data-loading operations.
//!
//! Each operation issues one logical request through the
//! [`Federator`](crate::federation::Federator): the concrete SPARQL
//! text plus the matching API call name. The operations here cover the
//! structural kinds the viewer needs: many-rows listings, single-value
//! lookups, value lists, free-text search, and statistics restricted to
//! the primary source.

use crate::error::FederationError;
use crate::federation::{FederatedOperation, Federator};
use crate::querying::parameters::QueryParameter;
use crate::results::{SparqlRecord, SparqlValue};
use crate::vocab::{ONTOLEX, SKOS};

/// An identified, named term of the thesaurus
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub iri: String,
    pub name: String,
}

impl Term {
    pub fn from_record(record: &SparqlRecord, var_iri: &str, var_name: &str) -> Self {
        Term { iri: record.value(var_iri).to_string(), name: record.value(var_name).to_string() }
    }
}

/// A term weighted for word-cloud style displays
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub term: Term,
    pub weight: f64,
}

/// Options narrowing a free-text search
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    pub limit: Option<usize>,
    pub kind: Option<SearchKind>,
    pub sort: Option<SearchSort>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Concept,
    Sense,
    Entry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchSort {
    Alphabetical,
    Length,
}

/// Triple pattern lexicalizing `var_item` into `var_concept`
fn lexicalization_pattern(var_item: &str, var_concept: &str) -> String {
    format!("?{} <{}isLexicalizedSenseOf> ?{} .", var_item, ONTOLEX, var_concept)
}

/// Triple pattern categorizing `var_item` under `var_concept` or any of
/// its descendants
fn categorization_pattern(var_item: &str, var_concept: &str) -> String {
    format!(
        "?{} <{}isLexicalizedSenseOf>/<{}broader>* ?{} .",
        var_item, ONTOLEX, SKOS, var_concept
    )
}

/// Escapes a user search key for use inside a SPARQL regex, keeping `*`
/// as a wildcard
fn escape_search_key(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for c in key.chars() {
        match c {
            '.' | '+' | '?' | '^' | '$' | '{' | '}' | '(' | ')' | '|' | '[' | ']' | '\\' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '*' => escaped.push_str("[^\\s]*"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Categories a term is located under, from every source
pub async fn load_category_location(
    federator: &Federator,
    iri: &str,
) -> Result<Vec<Term>, FederationError> {
    let query = r#"PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX ontolex: <http://www.w3.org/ns/lemon/ontolex#>
SELECT ?category ?categoryName
WHERE {
    # a term is possibly a category itself or a word sense
    {
        ?term a ontolex:LexicalConcept .
        ?term skos:broader* ?category .
    } UNION {
        ?term a ontolex:LexicalSense .
        ?term ontolex:isLexicalizedSenseOf/skos:broader* ?category .
    }
    ?category a ontolex:LexicalConcept .
    ?category skos:prefLabel ?categoryName .
}
ORDER BY ?categoryName"#;

    let mut operation = FederatedOperation::for_iri("loadCategoryLocation", query, iri);
    operation.query_parameters = vec![QueryParameter::uri("term", iri)];
    let records = federator.collect(&operation).await?;
    Ok(records
        .iter()
        .filter(|record| !record.value("category").is_empty())
        .map(|record| Term::from_record(record, "category", "categoryName"))
        .collect())
}

/// Top-level categories of the thesaurus, from every source
pub async fn load_top_categories(federator: &Federator) -> Result<Vec<Term>, FederationError> {
    let query = r#"PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
SELECT ?category ?categoryName
WHERE {
    ?category skos:topConceptOf ?thesaurus .
    ?category skos:prefLabel ?categoryName .
}
ORDER BY ?categoryName ?category"#;

    let operation = FederatedOperation {
        call: "loadTopCategories",
        call_parameters: Vec::new(),
        query,
        query_parameters: Vec::new(),
    };
    let records = federator.collect(&operation).await?;
    Ok(records
        .iter()
        .map(|record| Term::from_record(record, "category", "categoryName"))
        .collect())
}

/// Direct subcategories of a category, from every source
pub async fn load_sub_categories(
    federator: &Federator,
    iri: &str,
) -> Result<Vec<Term>, FederationError> {
    let query = r#"PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
SELECT ?category ?categoryName
WHERE {
    ?parentCategory ^skos:broader ?category .
    ?category skos:prefLabel ?categoryName .
}
ORDER BY ?categoryName ?category"#;

    let mut operation = FederatedOperation::for_iri("loadSubCategories", query, iri);
    operation.query_parameters = vec![QueryParameter::uri("parentCategory", iri)];
    let records = federator.collect(&operation).await?;
    Ok(records
        .iter()
        .map(|record| Term::from_record(record, "category", "categoryName"))
        .collect())
}

/// Classifies a resource IRI as concept, sense, entry, pos, annotation
/// or label; first answer wins
pub async fn load_resource_type(
    federator: &Federator,
    iri: &str,
) -> Result<Option<String>, FederationError> {
    let query = r#"PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX ontolex: <http://www.w3.org/ns/lemon/ontolex#>
PREFIX oa: <http://www.w3.org/ns/oa#>
SELECT DISTINCT ?type
WHERE {
    {
        ?this a/rdfs:subClassOf* ontolex:LexicalConcept .
        BIND ("concept" AS ?type) .
    } UNION {
        ?this a/rdfs:subClassOf* skos:Concept .
        FILTER NOT EXISTS {
            ?annotation oa:hasSource ?this .
        }
        BIND ("concept" AS ?type) .
    } UNION {
        ?this a/rdfs:subClassOf* ontolex:LexicalSense .
        BIND ("sense" AS ?type) .
    } UNION {
        ?this a ontolex:LexicalEntry .
        BIND ("entry" AS ?type) .
    } UNION {
        FILTER (CONTAINS(STR(?this), "pos/#")) .
        BIND ("pos" AS ?type) .
    } UNION {
        ?this a/rdfs:subClassOf* oa:Annotation .
        BIND ("annotation" AS ?type) .
    } UNION {
        FILTER EXISTS {
            ?annotation oa:hasSource ?this .
        }
        BIND ("label" AS ?type) .
    }
}
ORDER BY ?type
LIMIT 1"#;

    let operation = FederatedOperation::for_iri("loadResourceType", query, iri);
    let value = federator.first_value(&operation, "type").await?;
    Ok(value.map(|value| value.value))
}

/// Preferred display name of any resource, label language preferred
/// over plain tags; first answer wins
pub async fn load_resource_name(
    federator: &Federator,
    iri: &str,
) -> Result<Option<SparqlValue>, FederationError> {
    let query = r#"PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
SELECT ?name
WHERE {
    {
        ?this skos:prefLabel ?name .
        BIND (true AS ?prefPrio) .
    }
    UNION
    {
        ?this rdfs:label ?name .
    }
    BIND (LANG(?name) AS ?lang) .
    BIND (IF(?lang = "en", true, false) AS ?langPrio) .
}
ORDER BY DESC(?prefPrio) DESC(?langPrio) ?lang ?name
LIMIT 1"#;

    let operation = FederatedOperation::for_iri("loadResourceName", query, iri);
    federator.first_value(&operation, "name").await
}

async fn load_pref_label(
    federator: &Federator,
    call: &str,
    iri: &str,
) -> Result<Option<SparqlValue>, FederationError> {
    let query = r#"PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
SELECT ?name
WHERE {
    ?this skos:prefLabel ?name .
}
ORDER BY ?name
LIMIT 1"#;

    let operation = FederatedOperation::for_iri(call, query, iri);
    federator.first_value(&operation, "name").await
}

pub async fn load_concept_name(
    federator: &Federator,
    iri: &str,
) -> Result<Option<SparqlValue>, FederationError> {
    load_pref_label(federator, "loadConceptName", iri).await
}

pub async fn load_sense_name(
    federator: &Federator,
    iri: &str,
) -> Result<Option<SparqlValue>, FederationError> {
    load_pref_label(federator, "loadSenseName", iri).await
}

pub async fn load_entry_name(
    federator: &Federator,
    iri: &str,
) -> Result<Option<SparqlValue>, FederationError> {
    load_pref_label(federator, "loadEntryName", iri).await
}

/// The lexical entry a sense belongs to; first answer wins
pub async fn load_sense_entry(
    federator: &Federator,
    iri: &str,
) -> Result<Option<String>, FederationError> {
    let query = r#"PREFIX ontolex: <http://www.w3.org/ns/lemon/ontolex#>
SELECT ?entry
WHERE {
    ?this ontolex:isSenseOf ?entry .
}
ORDER BY ?entry"#;

    let operation = FederatedOperation::for_iri("loadSenseEntry", query, iri);
    let value = federator.first_value(&operation, "entry").await?;
    Ok(value.map(|value| value.value))
}

/// Label resources an annotation tags; first non-empty list wins
pub async fn load_annotation_labels(
    federator: &Federator,
    iri: &str,
) -> Result<Option<Vec<String>>, FederationError> {
    let query = r#"PREFIX oa: <http://www.w3.org/ns/oa#>
SELECT ?label
WHERE {
    ?this oa:hasBody/oa:hasSource ?label .
}
ORDER BY ?label"#;

    let operation = FederatedOperation::for_iri("loadAnnotationLabels", query, iri);
    federator.first_value_list(&operation, "label").await
}

/// Annotations targeting a resource, provenance-tagged, from every
/// source
pub async fn load_resource_annotations(
    federator: &Federator,
    iri: &str,
) -> Result<Vec<SparqlRecord>, FederationError> {
    let query = r#"PREFIX oa: <http://www.w3.org/ns/oa#>
PREFIX dcterms: <http://purl.org/dc/terms/>
SELECT DISTINCT ?entry ?creation
WHERE {
    ?entry oa:hasTarget ?this .
    OPTIONAL {
        ?entry dcterms:created ?creation .
    }
}
ORDER BY ?creation ?entry"#;

    let operation = FederatedOperation::for_iri("loadResourceAnnotations", query, iri);
    federator.collect(&operation).await
}

/// Senses of a concept grouped by their lexicalizing entry, from every
/// source
pub async fn load_entry_list(
    federator: &Federator,
    iri: &str,
) -> Result<Vec<SparqlRecord>, FederationError> {
    let query = format!(
        r#"PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX ontolex: <http://www.w3.org/ns/lemon/ontolex#>
SELECT DISTINCT ?group ?entry
WHERE {{
    ?entry ontolex:isSenseOf ?this .
    {}
}}
ORDER BY ?group ?entry"#,
        lexicalization_pattern("entry", "group")
    );

    let operation = FederatedOperation::for_iri("loadEntryList", &query, iri);
    federator.collect(&operation).await
}

/// Free-text search across all sources. Remote endpoints use their text
/// index; the local store falls back to substring containment after
/// rewriting. Returns `None` for an empty search key.
pub async fn load_search_results(
    federator: &Federator,
    search_key: &str,
    options: SearchOptions,
) -> Result<Option<Vec<SparqlRecord>>, FederationError> {
    if search_key.is_empty() {
        return Ok(None);
    }

    let mut group_types = Vec::new();
    if options.kind.is_none() || options.kind == Some(SearchKind::Concept) {
        group_types.push("skos:Concept");
        group_types.push("ontolex:LexicalConcept");
    }
    if options.kind.is_none() || options.kind == Some(SearchKind::Sense) {
        group_types.push("ontolex:LexicalSense");
    }
    if options.kind == Some(SearchKind::Entry) {
        group_types.push("ontolex:LexicalEntry");
    }

    let order = match options.sort {
        Some(SearchSort::Alphabetical) => {
            "ORDER BY ?group ?label ?labelLength ?superentry ?entry ?concept"
        }
        _ => "ORDER BY ?group ?labelLength ?label ?superentry ?entry ?concept",
    };
    let limit = match options.limit {
        Some(limit) if limit > 0 => format!("LIMIT {}", limit + 1),
        _ => String::new(),
    };

    let query = format!(
        r#"PREFIX fti: <http://franz.com/ns/allegrograph/2.2/textindex/>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX ontolex: <http://www.w3.org/ns/lemon/ontolex#>
SELECT DISTINCT ?group ?entry ?superentry ?concept
WHERE {{
    (?entry ?o) fti:match ?searchKey .

    ?entry a ?group .
    FILTER (?group IN ({})) .

    OPTIONAL {{
        ?entry skos:prefLabel|rdfs:label ?label .
        BIND (STRLEN(STR(?label)) AS ?labelLength) .
    }}
    OPTIONAL {{
        {}
    }}
    OPTIONAL {{
        ?entry ontolex:isSenseOf ?superentry .
    }}
}}
{}
{}"#,
        group_types.join(","),
        lexicalization_pattern("entry", "concept"),
        order,
        limit
    );

    let operation = FederatedOperation {
        call: "loadSearchResults",
        call_parameters: vec![
            crate::executors::api::ApiParameter::text("searchKey", search_key),
            crate::executors::api::ApiParameter::json(
                "options",
                serde_json::json!({
                    "limit": options.limit,
                    "type": options.kind.map(|kind| match kind {
                        SearchKind::Concept => "concept",
                        SearchKind::Sense => "sense",
                        SearchKind::Entry => "entry",
                    }),
                }),
            ),
        ],
        query: &query,
        query_parameters: vec![
            QueryParameter::text("searchKey", search_key),
            QueryParameter::text("regexPattern", escape_search_key(search_key)),
        ],
    };
    Ok(Some(federator.collect(&operation).await?))
}

/// Number of senses directly lexicalizing a concept; statistics source
/// only
pub async fn load_concept_statistics_lexicalizing(
    federator: &Federator,
    iri: &str,
) -> Result<i64, FederationError> {
    let query = r#"PREFIX ontolex: <http://www.w3.org/ns/lemon/ontolex#>
SELECT (COUNT(distinct ?sense) AS ?count)
WHERE {
    ?sense ontolex:isLexicalizedSenseOf ?this .
}"#;

    let operation = FederatedOperation::for_iri("loadConceptStatisticsLexicalizing", query, iri);
    Ok(federator.statistics_count(&operation, "count").await?.unwrap_or(0))
}

/// Number of senses evoking a concept or any of its descendants;
/// statistics source only
pub async fn load_concept_statistics_evoking(
    federator: &Federator,
    iri: &str,
) -> Result<i64, FederationError> {
    let query = format!(
        r#"PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX ontolex: <http://www.w3.org/ns/lemon/ontolex#>
SELECT (COUNT(distinct ?sense) AS ?count)
WHERE {{
    {}
    ?concept skos:broader* ?this .
}}"#,
        categorization_pattern("sense", "concept")
    );

    let operation = FederatedOperation::for_iri("loadConceptStatisticsEvoking", &query, iri);
    Ok(federator.statistics_count(&operation, "count").await?.unwrap_or(0))
}

/// Distribution of evoking senses over parts of speech; statistics
/// source only
pub async fn load_concept_statistics_per_pos(
    federator: &Federator,
    iri: &str,
) -> Result<Option<Vec<SparqlRecord>>, FederationError> {
    let query = format!(
        r#"PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX ontolex: <http://www.w3.org/ns/lemon/ontolex#>
SELECT ?iri ?label (COUNT(distinct ?sense) AS ?value)
WHERE {{
    {}
    ?concept skos:broader* ?this .
    ?sense ontolex:isSenseOf/rdf:type ?pos .
    FILTER (CONTAINS(STR(?pos), "pos/#")) .
    ?pos skos:prefLabel ?label .
    BIND (?pos AS ?iri) .
}}
GROUP BY ?iri ?label"#,
        categorization_pattern("sense", "concept")
    );

    let operation = FederatedOperation::for_iri("loadConceptStatisticsPerPos", &query, iri);
    federator.statistics_records(&operation, "value").await
}

/// Senses evoking a category, weighted for a word-cloud display, from
/// every source. Descendant senses arrive through a `skos:broader+`
/// union arm, so the local store only contributes direct senses.
pub async fn load_concept_wordcloud_senses(
    federator: &Federator,
    iri: &str,
) -> Result<Vec<WeightedTerm>, FederationError> {
    let query = r#"PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX ontolex: <http://www.w3.org/ns/lemon/ontolex#>
SELECT DISTINCT ?sense ?senseName ?level
WHERE {
    {
        SELECT ?sense ?level
        WHERE {
            ?sense ontolex:isLexicalizedSenseOf ?category .
            BIND (0 AS ?level) .
        }
    } UNION {
        SELECT ?sense ?level
        WHERE {
            ?sense ontolex:isLexicalizedSenseOf/skos:broader+ ?category .
            BIND (1 AS ?level) .
        }
        LIMIT 25
    }
    ?sense skos:prefLabel ?senseName .
}
ORDER BY ?level
LIMIT 25"#;

    let mut operation = FederatedOperation::for_iri("loadConceptWordcloudSenses", query, iri);
    operation.query_parameters = vec![QueryParameter::uri("category", iri)];
    let records = federator.collect(&operation).await?;
    Ok(weighted_terms(&records, "sense", "senseName"))
}

/// Weighted terms for a word-cloud display over result records
pub fn weighted_terms(records: &[SparqlRecord], var_iri: &str, var_name: &str) -> Vec<WeightedTerm> {
    records
        .iter()
        .map(|record| WeightedTerm {
            term: Term::from_record(record, var_iri, var_name),
            weight: 1.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_search_key() {
        assert_eq!(escape_search_key("well.spring"), "well\\.spring");
        assert_eq!(escape_search_key("wel*"), "wel[^\\s]*");
    }

    #[test]
    fn test_patterns_use_full_iris() {
        let pattern = lexicalization_pattern("sense", "concept");
        assert_eq!(
            pattern,
            "?sense <http://www.w3.org/ns/lemon/ontolex#isLexicalizedSenseOf> ?concept ."
        );
        assert!(categorization_pattern("sense", "concept")
            .contains("<http://www.w3.org/2004/02/skos/core#broader>*"));
    }
}
