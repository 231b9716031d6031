use mimir::store::{LocalData, LocalStore, StoreState};
use std::sync::Arc;

const TURTLE: &str = r#"@prefix skos: <http://www.w3.org/2004/02/skos/core#> .
<http://example.org/c/1> a <http://www.w3.org/ns/lemon/ontolex#LexicalConcept> ;
    skos:prefLabel "Well"@en .
"#;

const JSON_LD: &str = r#"{
    "@id": "http://example.org/c/2",
    "http://www.w3.org/2004/02/skos/core#prefLabel": "Spring"
}"#;

struct FixedLocalData(String);

impl LocalData for FixedLocalData {
    fn read(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

#[tokio::test]
async fn test_populate_from_turtle() {
    let store = LocalStore::new().unwrap();
    store.populate(Some(TURTLE)).await;
    assert_eq!(store.len().unwrap(), 2);
}

#[tokio::test]
async fn test_populate_from_json_ld_reaches_ready() {
    let store = LocalStore::new().unwrap();
    store.populate(Some(JSON_LD)).await;
    assert_eq!(store.len().unwrap(), 1);
    // a completed JSON-LD stream ends in Ready
    assert_eq!(store.state(), StoreState::Ready);
}

#[tokio::test]
async fn test_empty_input_goes_ready_with_empty_store() {
    let store = LocalStore::new().unwrap();
    store.populate(Some("")).await;
    assert_eq!(store.len().unwrap(), 0);
    assert_eq!(store.state(), StoreState::Ready);
}

#[tokio::test]
async fn test_missing_persistence_goes_ready_with_empty_store() {
    let store = LocalStore::new().unwrap();
    store.populate(None).await;
    assert_eq!(store.len().unwrap(), 0);
    assert_eq!(store.state(), StoreState::Ready);
}

#[tokio::test]
async fn test_populate_reads_persisted_data_when_no_input_given() {
    let store =
        LocalStore::with_persistence(Arc::new(FixedLocalData(TURTLE.to_string()))).unwrap();
    store.populate(None).await;
    assert_eq!(store.len().unwrap(), 2);
}

#[tokio::test]
async fn test_repopulation_discards_previous_contents() {
    let store = LocalStore::new().unwrap();
    store.populate(Some(TURTLE)).await;
    assert_eq!(store.len().unwrap(), 2);

    store.populate(Some(JSON_LD)).await;
    assert_eq!(store.len().unwrap(), 1);
}

#[tokio::test]
async fn test_garbage_input_is_swallowed() {
    let store = LocalStore::new().unwrap();
    store.populate(Some("this is neither turtle nor json-ld")).await;
    assert_eq!(store.len().unwrap(), 0);
    // no population left hanging: reads proceed immediately
    store.await_population().await;
    assert_ne!(store.state(), StoreState::Populating);
}

#[tokio::test]
async fn test_concurrent_population_requests_run_one_at_a_time() {
    let store = Arc::new(LocalStore::new().unwrap());
    let first = {
        let store = store.clone();
        tokio::spawn(async move { store.populate(Some(TURTLE)).await })
    };
    let second = {
        let store = store.clone();
        tokio::spawn(async move { store.populate(Some(TURTLE)).await })
    };
    first.await.unwrap();
    second.await.unwrap();
    // the later population discarded and reloaded the same document
    assert_eq!(store.len().unwrap(), 2);
    assert_ne!(store.state(), StoreState::Populating);
}

#[tokio::test]
async fn test_turtle_round_trip_preserves_cardinality() {
    let store = LocalStore::new().unwrap();
    store.populate(Some(TURTLE)).await;
    let serialized = store.serialize_to_turtle().await.unwrap();
    assert!(serialized.contains("skos:prefLabel"));

    let reloaded = LocalStore::new().unwrap();
    reloaded.populate(Some(&serialized)).await;
    assert_eq!(reloaded.len().unwrap(), store.len().unwrap());
}

#[tokio::test]
async fn test_json_ld_round_trips_through_turtle() {
    let store = LocalStore::new().unwrap();
    store.populate(Some(JSON_LD)).await;
    let serialized = store.serialize_to_turtle().await.unwrap();

    let reloaded = LocalStore::new().unwrap();
    reloaded.populate(Some(&serialized)).await;
    assert_eq!(reloaded.len().unwrap(), 1);
}
