//! Catalog configuration and data source descriptions.
//!
//! The configuration shape follows W3C DCATv2 (`Catalog`, `DataService`,
//! `Dataset`). Schema validation happens upstream; this module only
//! turns an already-validated catalog plus the list of enabled datasets
//! into the immutable [`DataSource`] values the executors are built
//! from, including the per-source named-graph restrictions that must be
//! applied to every query issued to that source.

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Service description IRI identifying a SPARQL 1.1 protocol service
pub const SPARQL_SERVICE_DESCRIPTION: &str =
    "http://www.w3.org/ns/sparql-service-description#Service";

/// Service description IRI identifying the REST-style lexical data API
pub const API_SERVICE_DESCRIPTION: &str = "https://w3id.org/mimir/api";

/// Sentinel endpoint identifying the in-process local store
pub const LOCAL_STORE_IRI: &str = "urn:mimir:local-store";

/// Transport kind of one backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransportKind {
    HttpSparqlGet,
    HttpSparqlPost,
    RestApi,
    InMemory,
}

/// Basic-auth credentials for a protected endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// One backend a federated operation can be issued against.
///
/// Immutable once constructed from configuration; one instance per
/// configured dataset/service combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSource {
    pub id: String,
    pub title: String,
    pub identifier: String,
    pub kind: TransportKind,
    pub endpoint_url: String,
    pub auth: Option<BasicAuth>,
    /// Named graphs every query against this source is restricted to
    pub default_graphs: Vec<String>,
}

impl DataSource {
    /// The data source describing the in-process local store
    pub fn local() -> Self {
        DataSource {
            id: LOCAL_STORE_IRI.to_string(),
            title: "Local data store".to_string(),
            identifier: "LOCAL".to_string(),
            kind: TransportKind::InMemory,
            endpoint_url: LOCAL_STORE_IRI.to_string(),
            auth: None,
            default_graphs: Vec::new(),
        }
    }

    fn from_service(
        service: &DataServiceConfig,
        kind: TransportKind,
        default_graphs: Vec<String>,
    ) -> Self {
        let auth = match service.auth.as_deref() {
            Some("basic") => Some(BasicAuth {
                username: service.username.clone().unwrap_or_default(),
                password: service.password.clone().unwrap_or_default(),
            }),
            _ => None,
        };
        DataSource {
            id: service.id.clone(),
            title: service.title.clone(),
            identifier: service.identifier.clone(),
            kind,
            endpoint_url: service.endpoint_url.clone(),
            auth,
            default_graphs,
        }
    }
}

/// A string-or-array configuration value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn values(&self) -> Vec<String> {
        match self {
            OneOrMany::One(value) if value.is_empty() => Vec::new(),
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
    }
}

/// Catalog in line with W3C DCATv2
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub service: Vec<DataServiceConfig>,
    pub dataset: Vec<DatasetConfig>,
}

/// DataService in line with W3C DCATv2
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataServiceConfig {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub title: String,
    pub identifier: String,
    #[serde(rename = "landingPage", skip_serializing_if = "Option::is_none", default)]
    pub landing_page: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub license: Option<String>,
    #[serde(rename = "endpointURL")]
    pub endpoint_url: String,
    #[serde(rename = "endpointDescription")]
    pub endpoint_description: String,
    /// SPARQL protocol binding, "get" or "post"
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub auth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub password: Option<String>,
    #[serde(rename = "servesDataset", default)]
    pub serves_dataset: Vec<String>,
}

/// Dataset in line with W3C DCATv2
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type")]
    pub kind: String,
    pub title: String,
    pub identifier: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub requires: Option<Vec<String>>,
    pub distribution: DistributionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DistributionConfig {
    #[serde(rename = "accessService")]
    pub access_service: String,
    #[serde(rename = "accessGraph", skip_serializing_if = "Option::is_none", default)]
    pub access_graph: Option<OneOrMany>,
    #[serde(rename = "mediaType", skip_serializing_if = "Option::is_none", default)]
    pub media_type: Option<String>,
}

impl Catalog {
    /// Data sources for every enabled remote SPARQL service, in catalog order
    pub fn sparql_sources(&self, datasets_enabled: &[String]) -> Vec<Arc<DataSource>> {
        let mut sources = Vec::new();
        for service in &self.service {
            if service.endpoint_description == SPARQL_SERVICE_DESCRIPTION
                && service.endpoint_url != LOCAL_STORE_IRI
            {
                debug!("Detected remote SPARQL data service: {}", service.title);
                let kind = match service.mode.as_deref() {
                    Some("post") => TransportKind::HttpSparqlPost,
                    _ => TransportKind::HttpSparqlGet,
                };
                let graphs = self.access_graphs_for(service, datasets_enabled);
                sources.push(Arc::new(DataSource::from_service(service, kind, graphs)));
            }
        }
        sources
    }

    /// Data sources for every enabled REST-API service, in catalog order.
    ///
    /// A service serving none of the enabled datasets contributes no
    /// source.
    pub fn api_sources(&self, datasets_enabled: &[String]) -> Vec<Arc<DataSource>> {
        let mut sources = Vec::new();
        for service in &self.service {
            if service.endpoint_description == API_SERVICE_DESCRIPTION {
                debug!("Detected API data service: {}", service.title);
                let served = self.datasets_served_by(service, datasets_enabled);
                if served.is_empty() {
                    continue;
                }
                let graphs = self.access_graphs_for(service, datasets_enabled);
                sources.push(Arc::new(DataSource::from_service(
                    service,
                    TransportKind::RestApi,
                    graphs,
                )));
            }
        }
        sources
    }

    /// The data service serving the first enabled dataset.
    ///
    /// Statistics can be drawn from only a single service; this one is
    /// designated as the primary statistics source.
    pub fn main_data_service(&self, datasets_enabled: &[String]) -> Option<Arc<DataSource>> {
        let first = datasets_enabled.first()?;
        let dataset = self.dataset.iter().find(|dataset| &dataset.id == first)?;
        let service = self
            .service
            .iter()
            .find(|service| service.id == dataset.distribution.access_service)?;
        if service.endpoint_url == LOCAL_STORE_IRI {
            return Some(Arc::new(DataSource::local()));
        }
        let kind = match service.endpoint_description.as_str() {
            API_SERVICE_DESCRIPTION => TransportKind::RestApi,
            _ => match service.mode.as_deref() {
                Some("post") => TransportKind::HttpSparqlPost,
                _ => TransportKind::HttpSparqlGet,
            },
        };
        let graphs = self.access_graphs_for(service, datasets_enabled);
        Some(Arc::new(DataSource::from_service(service, kind, graphs)))
    }

    fn datasets_served_by<'a>(
        &'a self,
        service: &DataServiceConfig,
        datasets_enabled: &[String],
    ) -> Vec<&'a DatasetConfig> {
        self.dataset
            .iter()
            .filter(|dataset| {
                service.serves_dataset.contains(&dataset.id)
                    && datasets_enabled.contains(&dataset.id)
                    && dataset.distribution.access_service == service.id
            })
            .collect()
    }

    fn access_graphs_for(
        &self,
        service: &DataServiceConfig,
        datasets_enabled: &[String],
    ) -> Vec<String> {
        let mut graphs = Vec::new();
        for dataset in self.datasets_served_by(service, datasets_enabled) {
            if let Some(access_graph) = &dataset.distribution.access_graph {
                graphs.extend(access_graph.values());
            }
        }
        graphs
    }
}
