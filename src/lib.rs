//! # Mimir
//!
//! Mimir is a federated query layer for lexicographic linked data.
//!
//! The name "Mimir" is inspired by the Norse being Mímir, keeper of the
//! well of wisdom, who answers the questions brought to him. In the same
//! spirit this crate takes one logical question and draws the answer from
//! every well it knows about: remote SPARQL 1.1 endpoints, REST-style
//! JSON APIs, and an in-process RDF store populated from locally held
//! data. Results are merged in a fixed source order, cached per source,
//! and tagged with the backend that produced them.
//!
//! ## Features
//!
//! - One query contract across heterogeneous backends
//! - Text-level query rewriting for the embedded SPARQL engine
//! - Local store lifecycle with Turtle and JSON-LD ingestion
//! - Per-source result caching with explicit ownership
//!
//! ## Example
//!
//! ```rust
//! use mimir::querying::parameters::{bind_parameters, ParameterKind, QueryParameter};
//!
//! let query = bind_parameters(
//!     "SELECT ?name WHERE { ?this skos:prefLabel ?name }",
//!     &[QueryParameter::new("this", ParameterKind::Uri, "http://example.org/concept/1")],
//! );
//! assert!(query.contains("<http://example.org/concept/1>"));
//! ```

/// Catalog configuration and data source descriptions
pub mod catalog;

/// Error types and result definitions
pub mod error;

/// Executors for remote, REST-API and local data sources
pub mod executors;

/// Federated fan-out over the configured executor set
pub mod federation;

/// Domain data-loading operations built on the federation layer
pub mod loaders;

/// Query parameterization, rewriting and engine seam
pub mod querying;

/// SPARQL JSON results model and projection helpers
pub mod results;

/// Local RDF store lifecycle
pub mod store;

/// Common RDF vocabulary namespaces
pub mod vocab;

pub use error::{FederationError, Result};
