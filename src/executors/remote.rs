//! Executor for network-reachable SPARQL endpoints.
//!
//! GET-mode sources carry the bound query and the per-source default
//! parameters (restricted named graphs) in the URL; POST-mode sources
//! send the query as the request body with the SPARQL query content
//! type. Either way the cache entry is keyed by the full request URL
//! plus the bound query text, so distinct POST bodies against the same
//! endpoint never collide.

use crate::catalog::{Catalog, DataSource, TransportKind};
use crate::error::FederationError;
use crate::executors::cache::QueryCache;
use crate::querying::parameters::{bind_parameters, QueryParameter};
use crate::results::SparqlJsonResult;
use log::debug;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
const SPARQL_QUERY_CONTENT_TYPE: &str = "application/sparql-query";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Executor bound to one remote SPARQL data source
pub struct RemoteQueryExecutor {
    source: Arc<DataSource>,
    default_parameters: Vec<(String, String)>,
    client: Client,
    cache: Arc<QueryCache<SparqlJsonResult>>,
}

impl RemoteQueryExecutor {
    pub fn new(
        source: Arc<DataSource>,
        cache: Arc<QueryCache<SparqlJsonResult>>,
    ) -> Result<Self, FederationError> {
        if !matches!(source.kind, TransportKind::HttpSparqlGet | TransportKind::HttpSparqlPost) {
            return Err(FederationError::Configuration(format!(
                "Data source '{}' is not a remote SPARQL service",
                source.title
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let default_parameters = source
            .default_graphs
            .iter()
            .map(|graph| ("default-graph-uri".to_string(), graph.clone()))
            .collect();
        Ok(RemoteQueryExecutor { source, default_parameters, client, cache })
    }

    pub fn source(&self) -> &Arc<DataSource> {
        &self.source
    }

    /// Full request URL for a bound query. GET-mode sources append the
    /// query itself; POST-mode sources carry only the default
    /// parameters in the URL.
    pub fn request_url(&self, query: &str) -> String {
        let mut parameters = self.default_parameters.clone();
        if self.source.kind == TransportKind::HttpSparqlGet {
            parameters.push(("query".to_string(), query.to_string()));
        }
        let mut url = self.source.endpoint_url.clone();
        for (index, (name, value)) in parameters.iter().enumerate() {
            url.push(if index == 0 { '?' } else { '&' });
            url.push_str(name);
            url.push('=');
            url.push_str(&urlencoding::encode(value));
        }
        url
    }

    /// Binds the parameters and executes the query against the remote
    /// endpoint.
    ///
    /// Fails with `Transport` on a non-2xx status (the message carries
    /// the status line) and `MalformedResult` when the response fails
    /// shape validation.
    pub async fn execute(
        &self,
        template: &str,
        parameters: &[QueryParameter],
        use_cache: bool,
    ) -> Result<SparqlJsonResult, FederationError> {
        let query = bind_parameters(template, parameters);
        let url = self.request_url(&query);

        if use_cache {
            if let Some(hit) = self.cache.get(&url, &query) {
                return Ok(hit);
            }
        }

        let mut request = match self.source.kind {
            TransportKind::HttpSparqlPost => self
                .client
                .post(&url)
                .header(CONTENT_TYPE, SPARQL_QUERY_CONTENT_TYPE)
                .body(query.clone()),
            _ => self.client.get(&url),
        };
        request = request.header(ACCEPT, SPARQL_RESULTS_JSON);
        if let Some(auth) = &self.source.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(FederationError::Transport(format!(
                "SPARQL request failed: {}",
                response.status()
            )));
        }

        let json: serde_json::Value = response.json().await?;
        let result = SparqlJsonResult::from_json(json)?;

        if use_cache {
            self.cache.insert(&url, &query, result.clone());
        }
        Ok(result)
    }

    /// One executor per enabled remote SPARQL service, in catalog
    /// order, each owning a fresh cache
    pub fn from_catalog(
        catalog: &Catalog,
        datasets_enabled: &[String],
    ) -> Result<Vec<Self>, FederationError> {
        let mut executors = Vec::new();
        for source in catalog.sparql_sources(datasets_enabled) {
            debug!("Configuring SPARQL executor for {}", source.title);
            executors.push(RemoteQueryExecutor::new(source, Arc::new(QueryCache::new()))?);
        }
        Ok(executors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(kind: TransportKind) -> Arc<DataSource> {
        Arc::new(DataSource {
            id: "urn:svc:sparql".to_string(),
            title: "Thesaurus endpoint".to_string(),
            identifier: "TH".to_string(),
            kind,
            endpoint_url: "http://sparql.example.org/query".to_string(),
            auth: None,
            default_graphs: vec!["http://example.org/graph/thesaurus".to_string()],
        })
    }

    #[test]
    fn test_get_url_carries_query_and_graphs() {
        let executor =
            RemoteQueryExecutor::new(source(TransportKind::HttpSparqlGet), Arc::new(QueryCache::new()))
                .unwrap();
        let url = executor.request_url("SELECT ?s WHERE { ?s ?p ?o }");
        assert!(url.contains("default-graph-uri=http%3A%2F%2Fexample.org%2Fgraph%2Fthesaurus"));
        assert!(url.contains("query=SELECT%20%3Fs%20WHERE"));
    }

    #[test]
    fn test_post_url_omits_query() {
        let executor = RemoteQueryExecutor::new(
            source(TransportKind::HttpSparqlPost),
            Arc::new(QueryCache::new()),
        )
        .unwrap();
        let url = executor.request_url("SELECT ?s WHERE { ?s ?p ?o }");
        assert!(!url.contains("query=SELECT"));
        assert!(url.contains("default-graph-uri="));
    }

    #[test]
    fn test_rejects_non_sparql_source() {
        let mut wrong = (*source(TransportKind::HttpSparqlGet)).clone();
        wrong.kind = TransportKind::RestApi;
        let result = RemoteQueryExecutor::new(Arc::new(wrong), Arc::new(QueryCache::new()));
        assert!(result.is_err());
    }
}
