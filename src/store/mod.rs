//! Local RDF store lifecycle.
//!
//! The store is populated asynchronously from a single serialized RDF
//! document held by the local persistence collaborator (or passed in
//! directly). The document may be in either of two serializations,
//! Turtle/N3-family or JSON-LD; both parse attempts run over the same
//! input and each fails silently on the wrong format, so no format
//! sniffing is needed. While a population is in progress every read
//! operation blocks on the state gate.

use crate::catalog::LOCAL_STORE_IRI;
use crate::error::FederationError;
use crate::vocab::TURTLE_PREFIXES;
use log::{debug, info};
use oxigraph::io::{RdfFormat, RdfParser, RdfSerializer};
use oxigraph::model::{GraphName, Quad};
use oxigraph::store::Store;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use tokio::sync::{watch, Mutex};

pub const JSON_LD_MEDIA_TYPE: &str = "application/ld+json";

/// Population state of the local store.
///
/// Transitions only on population requests: `Idle -> Populating`,
/// `Ready|Idle -> Populating`, and from `Populating` to `Ready` (stream
/// completed) or `Idle` (stream failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Idle,
    Populating,
    Ready,
}

/// Local persistence collaborator holding one serialized RDF document
/// under a well-known key. The store treats the document as an opaque
/// string blob.
pub trait LocalData: Send + Sync {
    fn read(&self) -> Option<String>;
}

/// File-backed local data under a fixed path
pub struct FileLocalData {
    path: PathBuf,
}

impl FileLocalData {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileLocalData { path: path.into() }
    }
}

impl LocalData for FileLocalData {
    fn read(&self) -> Option<String> {
        std::fs::read_to_string(&self.path).ok()
    }
}

/// In-process RDF store plus its population lifecycle
pub struct LocalStore {
    store: RwLock<Store>,
    state: watch::Sender<StoreState>,
    population_lock: Mutex<()>,
    persistence: Option<Arc<dyn LocalData>>,
}

impl LocalStore {
    pub fn new() -> Result<Self, FederationError> {
        LocalStore::build(None)
    }

    pub fn with_persistence(persistence: Arc<dyn LocalData>) -> Result<Self, FederationError> {
        LocalStore::build(Some(persistence))
    }

    fn build(persistence: Option<Arc<dyn LocalData>>) -> Result<Self, FederationError> {
        let (state, _) = watch::channel(StoreState::Idle);
        Ok(LocalStore {
            store: RwLock::new(Store::new()?),
            state,
            population_lock: Mutex::new(()),
            persistence,
        })
    }

    /// The IRI under which this store is addressed by caches
    pub fn sentinel_iri() -> &'static str {
        LOCAL_STORE_IRI
    }

    pub fn state(&self) -> StoreState {
        *self.state.borrow()
    }

    pub fn len(&self) -> Result<usize, FederationError> {
        let store = self.store.read().unwrap();
        Ok(store.len()?)
    }

    /// Runs `f` against the underlying store
    pub fn with_store<T>(&self, f: impl FnOnce(&Store) -> T) -> T {
        let store = self.store.read().unwrap();
        f(&store)
    }

    /// Blocks until no population is in progress.
    ///
    /// Population is expected to finish within a few seconds; waiters
    /// are woken by the state gate rather than polling.
    pub async fn await_population(&self) {
        let mut state = self.state.subscribe();
        // the sender lives in self, so the gate cannot close early
        let _ = state.wait_for(|state| *state != StoreState::Populating).await;
    }

    /// (Re)populates the store from `input`, or from the persisted local
    /// data when no explicit input is given.
    ///
    /// A request arriving while another population is running waits for
    /// its completion instead of starting a second one. A non-empty
    /// store is discarded for a fresh one before loading; an empty store
    /// is reused as-is. All parse errors are swallowed: the data simply
    /// did not load in that format.
    pub async fn populate(&self, input: Option<&str>) {
        let _guard = self.population_lock.lock().await;
        info!("Repopulating local store");
        self.state.send_replace(StoreState::Populating);

        let data = match input {
            Some(data) => Some(data.to_string()),
            None => self.persistence.as_ref().and_then(|persistence| persistence.read()),
        };

        {
            let mut store = self.store.write().unwrap();
            let occupied = store.len().map(|len| len > 0).unwrap_or(false);
            if occupied {
                if let Ok(fresh) = Store::new() {
                    *store = fresh;
                }
            }
        }

        let data = match data {
            Some(data) if !data.is_empty() => data,
            _ => {
                self.state.send_replace(StoreState::Ready);
                return;
            }
        };

        self.load_turtle(&data);
        let completed = self.load_json_ld(&data);
        self.state.send_replace(if completed { StoreState::Ready } else { StoreState::Idle });
    }

    fn load_turtle(&self, data: &str) {
        let store = self.store.read().unwrap();
        let parser = RdfParser::from_format(RdfFormat::Turtle).for_slice(data.as_bytes());
        let mut inserted = 0usize;
        for quad in parser {
            match quad {
                Ok(quad) => {
                    if store.insert(&quad).is_err() {
                        break;
                    }
                    inserted += 1;
                }
                Err(err) => {
                    debug!("Local data could not be read as Turtle: {}", err);
                    break;
                }
            }
        }
        if inserted > 0 {
            debug!("Loaded {} statements from Turtle input", inserted);
        }
    }

    fn load_json_ld(&self, data: &str) -> bool {
        let Some(format) = RdfFormat::from_media_type(JSON_LD_MEDIA_TYPE) else {
            debug!("JSON-LD parsing is unavailable in this engine build");
            return false;
        };
        let store = self.store.read().unwrap();
        let parser = RdfParser::from_format(format).for_slice(data.as_bytes());
        let mut inserted = 0usize;
        for quad in parser {
            match quad {
                Ok(quad) => {
                    let _ = store.insert(&quad);
                    inserted += 1;
                }
                Err(err) => {
                    debug!("Local data could not be read as JSON-LD: {}", err);
                    return false;
                }
            }
        }
        info!("Finished populating local store ({} statements)", inserted);
        true
    }

    /// Emits every stored triple in Turtle syntax with the common
    /// vocabulary prefixes, waiting for any running population first.
    pub async fn serialize_to_turtle(&self) -> Result<String, FederationError> {
        self.await_population().await;

        let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
        for (prefix, iri) in TURTLE_PREFIXES {
            serializer = serializer
                .with_prefix(prefix, iri)
                .map_err(|e| FederationError::Store(e.to_string()))?;
        }

        let store = self.store.read().unwrap();
        let mut writer = serializer.for_writer(Vec::new());
        for quad in store.iter() {
            let quad = quad?;
            // population only produces default-graph data
            let triple =
                Quad::new(quad.subject, quad.predicate, quad.object, GraphName::DefaultGraph);
            writer
                .serialize_quad(&triple)
                .map_err(|e| FederationError::Store(e.to_string()))?;
        }
        let bytes = writer.finish().map_err(|e| FederationError::Store(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| FederationError::Store(e.to_string()))
    }
}
