use mimir::querying::parameters::{bind_parameters, QueryParameter};
use mimir::querying::rewriting::QueryRewriter;

fn rewriter() -> QueryRewriter {
    QueryRewriter::new().unwrap()
}

#[test]
fn test_strip_subclass_closure() {
    let query = "?this a/rdfs:subClassOf* ontolex:LexicalConcept .";
    assert_eq!(
        rewriter().strip_subclass_closure(query),
        "?this a ontolex:LexicalConcept ."
    );
}

#[test]
fn test_strip_subclass_closure_is_case_insensitive() {
    let query = "?this a/RDFS:SUBCLASSOF* skos:Concept .";
    assert_eq!(rewriter().strip_subclass_closure(query), "?this a skos:Concept .");
}

#[test]
fn test_expand_boundary_slash_keeps_star_on_preceding_step() {
    // the `*` on isSenseOf* is untouched; only the boundary slash-predicate is split
    let query = "?this ontolex:isSenseOf*/a ?pos .";
    assert_eq!(
        rewriter().expand_property_paths(query),
        "?this ontolex:isSenseOf* ?anon_path_var0 . ?anon_path_var0 a ?pos ."
    );
}

#[test]
fn test_expand_prefixed_predicate() {
    let query = "?sense ontolex:isLexicalizedSenseOf/skos:broader ?concept .";
    assert_eq!(
        rewriter().expand_property_paths(query),
        "?sense ontolex:isLexicalizedSenseOf ?anon_path_var0 . ?anon_path_var0 skos:broader ?concept ."
    );
}

#[test]
fn test_expand_full_iri_predicate() {
    let query = "?s <http://example.org/p>/<http://example.org/q> ?o .";
    assert_eq!(
        rewriter().expand_property_paths(query),
        "?s <http://example.org/p> ?anon_path_var0 . ?anon_path_var0 <http://example.org/q> ?o ."
    );
}

#[test]
fn test_expand_reaches_fixpoint_with_fresh_variables() {
    let query = "?x a/skos:broader/skos:related ?y .";
    let expanded = rewriter().expand_property_paths(query);
    assert_eq!(
        expanded,
        "?x a ?anon_path_var0 . ?anon_path_var0 skos:broader ?anon_path_var1 . ?anon_path_var1 skos:related ?y ."
    );
}

#[test]
fn test_expand_terminates_within_slash_count_bound() {
    // each iteration strictly removes one path slash
    let query = "?x p:a/p:b/p:c/p:d/p:e ?y .";
    let original_slashes = query.matches('/').count();
    let expanded = rewriter().expand_property_paths(query);
    assert_eq!(expanded.matches('/').count(), 0);
    assert_eq!(expanded.matches("?anon_path_var").count(), original_slashes * 2);
}

#[test]
fn test_expand_leaves_prefix_declarations_alone() {
    let query = "PREFIX skos: <http://www.w3.org/2004/02/skos/core#>\n?s skos:broader ?o .";
    assert_eq!(rewriter().expand_property_paths(query), query);
}

#[test]
fn test_union_branch_with_star_is_dropped() {
    let query = "WHERE { { ?a skos:prefLabel ?n . } UNION { ?a skos:broader* ?b . } }";
    assert_eq!(
        rewriter().drop_unions_with_path_operators(query),
        "WHERE { { ?a skos:prefLabel ?n . } }"
    );
}

#[test]
fn test_union_branch_with_plus_is_dropped() {
    let query = "WHERE { { ?a skos:prefLabel ?n . } UNION { ?a skos:broader+ ?b . } }";
    assert_eq!(
        rewriter().drop_unions_with_path_operators(query),
        "WHERE { { ?a skos:prefLabel ?n . } }"
    );
}

#[test]
fn test_union_branch_without_path_operator_is_kept() {
    let query = "WHERE { { ?a skos:prefLabel ?n . } UNION { ?a rdfs:label ?n . } }";
    assert_eq!(rewriter().drop_unions_with_path_operators(query), query);
}

#[test]
fn test_every_offending_union_branch_is_dropped() {
    let query = "WHERE { { ?a ?b ?c . } UNION { ?a skos:broader* ?d . } UNION { ?a rdfs:label ?n . } UNION { ?a skos:related+ ?e . } }";
    assert_eq!(
        rewriter().drop_unions_with_path_operators(query),
        "WHERE { { ?a ?b ?c . } UNION { ?a rdfs:label ?n . } }"
    );
}

#[test]
fn test_union_branch_with_nested_braces() {
    let query =
        "WHERE { { ?a ?b ?c . } UNION { ?a skos:broader* ?d . FILTER EXISTS { ?d ?e ?f . } } }";
    assert_eq!(rewriter().drop_unions_with_path_operators(query), "WHERE { { ?a ?b ?c . } }");
}

#[test]
fn test_text_search_prefixed_form() {
    let query = "(?entry ?o) fti:match \"well\" .";
    let rewritten = rewriter().rewrite_text_search(query);
    assert!(!rewritten.contains("fti:match"));
    assert!(rewritten.contains("?entry ?predicateForLocalSearch ?o"));
    // the search key capture keeps its trailing whitespace
    assert!(rewritten.contains("FILTER(CONTAINS(?o, \"well\" ))"));
}

#[test]
fn test_text_search_full_iri_form() {
    let query =
        "(?entry ?o) <http://franz.com/ns/allegrograph/2.2/textindex/match> \"well\" .";
    let rewritten = rewriter().rewrite_text_search(query);
    assert!(rewritten.contains("?entry ?predicateForLocalSearch ?o"));
    assert!(rewritten.contains("FILTER(CONTAINS(?o, \"well\" ))"));
}

#[test]
fn test_strip_order_by_keeps_limit() {
    let query = "SELECT ?name WHERE { ?this skos:prefLabel ?name } ORDER BY ?name LIMIT 1";
    let stripped = rewriter().strip_order_by(query);
    assert!(!stripped.contains("ORDER BY"));
    assert!(stripped.contains("LIMIT 1"));
}

#[test]
fn test_strip_order_by_with_direction_functions() {
    let query = "} ORDER BY DESC(?prefPrio) DESC(?langPrio) ?lang ?name\nLIMIT 1";
    let stripped = rewriter().strip_order_by(query);
    assert!(!stripped.contains("ORDER BY"));
    assert!(!stripped.contains("DESC"));
    assert!(stripped.contains("LIMIT 1"));
}

#[test]
fn test_strip_distinct() {
    let query = "SELECT DISTINCT ?group (COUNT(DISTINCT ?entry) AS ?count) WHERE { ?s ?group ?entry }";
    assert_eq!(
        rewriter().strip_distinct(query),
        "SELECT ?group (COUNT(?entry) AS ?count) WHERE { ?s ?group ?entry }"
    );
}

#[test]
fn test_bound_template_end_to_end() {
    let template = "SELECT ?name WHERE { ?this skos:prefLabel ?name } ORDER BY ?name LIMIT 1";
    let bound = bind_parameters(template, &[QueryParameter::uri("this", "http://x/1")]);
    let rewritten = rewriter().rewrite(&bound);
    assert!(rewritten.contains("<http://x/1>"));
    assert!(!rewritten.contains("ORDER BY"));
    assert!(rewritten.contains("LIMIT 1"));
}

#[test]
fn test_pipeline_is_idempotent() {
    let query = r#"PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
PREFIX ontolex: <http://www.w3.org/ns/lemon/ontolex#>
PREFIX fti: <http://franz.com/ns/allegrograph/2.2/textindex/>
SELECT DISTINCT ?group ?entry
WHERE {
    (?entry ?o) fti:match "well" .
    {
        ?entry a/rdfs:subClassOf* ontolex:LexicalConcept .
    } UNION {
        ?entry ontolex:isLexicalizedSenseOf/skos:broader* ?concept .
    }
    ?entry ontolex:isSenseOf*/a ?pos .
}
ORDER BY ?group ?entry
LIMIT 25"#;
    let rewriter = rewriter();
    let once = rewriter.rewrite(query);
    let twice = rewriter.rewrite(&once);
    assert_eq!(once, twice);
}

#[test]
fn test_pipeline_applies_steps_in_order() {
    // the subclass closure is removed before path expansion, so `a`
    // stays a plain predicate; the union arm still carrying a `*` is
    // dropped afterwards
    let query = "WHERE { { ?x a/rdfs:subClassOf* ?c . } UNION { ?x skos:broader* ?c . } }";
    let rewritten = rewriter().rewrite(query);
    assert_eq!(rewritten, "WHERE { { ?x a ?c . } }");
}
