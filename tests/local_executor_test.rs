use mimir::executors::{LocalQueryExecutor, QueryCache};
use mimir::querying::engine::SparqlEngine;
use mimir::querying::parameters::QueryParameter;
use mimir::results::{SparqlHead, SparqlJsonResult, SparqlResults, SparqlValue};
use mimir::store::LocalStore;
use oxigraph::store::Store;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

const TURTLE: &str = r#"@prefix skos: <http://www.w3.org/2004/02/skos/core#> .
<http://example.org/c/1> skos:prefLabel "Well"@en .
"#;

#[derive(Debug)]
struct TestEngineError(String);

impl fmt::Display for TestEngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TestEngineError: {}", self.0)
    }
}

impl std::error::Error for TestEngineError {}

/// Engine spy counting invocations and capturing the executed query
struct SpyEngine {
    invocations: Arc<AtomicUsize>,
    last_query: Arc<Mutex<Option<String>>>,
    fail: bool,
}

impl SpyEngine {
    fn new(fail: bool) -> Self {
        SpyEngine {
            invocations: Arc::new(AtomicUsize::new(0)),
            last_query: Arc::new(Mutex::new(None)),
            fail,
        }
    }
}

impl SparqlEngine for SpyEngine {
    type EngineError = TestEngineError;

    fn execute_query(
        &self,
        query: &str,
        _store: &Store,
    ) -> Result<SparqlJsonResult, Self::EngineError> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        *self.last_query.lock().unwrap() = Some(query.to_string());
        if self.fail {
            return Err(TestEngineError("engine exploded".to_string()));
        }
        let mut row = std::collections::HashMap::new();
        row.insert("name".to_string(), SparqlValue::literal("Well"));
        Ok(SparqlJsonResult {
            head: SparqlHead { vars: vec!["name".to_string()] },
            results: SparqlResults { bindings: vec![row] },
        })
    }
}

async fn populated_store() -> Arc<LocalStore> {
    let store = Arc::new(LocalStore::new().unwrap());
    store.populate(Some(TURTLE)).await;
    store
}

#[tokio::test]
async fn test_empty_store_short_circuits_without_engine_invocation() {
    let store = Arc::new(LocalStore::new().unwrap());
    store.populate(Some("")).await;

    let engine = SpyEngine::new(false);
    let invocations = engine.invocations.clone();
    let executor =
        LocalQueryExecutor::with_engine(store, engine, Arc::new(QueryCache::new())).unwrap();

    let result = executor.execute("SELECT ?name WHERE { ?s ?p ?name }", &[], false).await.unwrap();
    assert!(result.results.bindings.is_empty());
    assert_eq!(invocations.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_engine_failure_is_swallowed_into_empty_result() {
    let store = populated_store().await;
    let executor =
        LocalQueryExecutor::with_engine(store, SpyEngine::new(true), Arc::new(QueryCache::new()))
            .unwrap();

    let result = executor.execute("SELECT ?name WHERE { ?s ?p ?name }", &[], false).await;
    let result = result.unwrap();
    assert!(result.head.vars.is_empty());
    assert!(result.results.bindings.is_empty());
}

#[tokio::test]
async fn test_engine_receives_the_rewritten_query() {
    let store = populated_store().await;
    let engine = SpyEngine::new(false);
    let last_query = engine.last_query.clone();
    let executor =
        LocalQueryExecutor::with_engine(store, engine, Arc::new(QueryCache::new())).unwrap();

    let template = "SELECT DISTINCT ?name WHERE { ?this skos:prefLabel ?name } ORDER BY ?name LIMIT 1";
    executor
        .execute(template, &[QueryParameter::uri("this", "http://example.org/c/1")], false)
        .await
        .unwrap();

    let executed = last_query.lock().unwrap().clone().unwrap();
    assert!(executed.contains("<http://example.org/c/1>"));
    assert!(!executed.contains("DISTINCT"));
    assert!(!executed.contains("ORDER BY"));
    assert!(executed.contains("LIMIT 1"));
}

#[tokio::test]
async fn test_caching_uses_the_local_namespace_and_skips_the_engine() {
    let store = populated_store().await;
    let engine = SpyEngine::new(false);
    let invocations = engine.invocations.clone();
    let cache = Arc::new(QueryCache::new());
    let executor = LocalQueryExecutor::with_engine(store, engine, cache.clone()).unwrap();

    let template = "SELECT ?name WHERE { ?s skos:prefLabel ?name }";
    let first = executor.execute(template, &[], true).await.unwrap();
    let second = executor.execute(template, &[], true).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_execution_against_real_engine() {
    let store = populated_store().await;
    let executor = LocalQueryExecutor::new(store, Arc::new(QueryCache::new())).unwrap();

    let template = r#"PREFIX skos: <http://www.w3.org/2004/02/skos/core#>
SELECT ?name WHERE { ?this skos:prefLabel ?name }"#;
    let result = executor
        .execute(template, &[QueryParameter::uri("this", "http://example.org/c/1")], false)
        .await
        .unwrap();
    assert_eq!(result.results.bindings.len(), 1);
    assert_eq!(result.first_value("name").unwrap().value, "Well");
    assert_eq!(result.first_value("name").unwrap().language.as_deref(), Some("en"));
}
