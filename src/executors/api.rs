//! Executor for REST-style API data sources.
//!
//! API calls place every argument, including JSON-encoded structured
//! values, as URL query parameters; the response is decoded as JSON or
//! plain text depending on the response content type.

use crate::catalog::{Catalog, DataSource, TransportKind};
use crate::error::FederationError;
use crate::executors::cache::QueryCache;
use crate::results::{parse_records, SparqlJsonResult, SparqlRecord};
use log::debug;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Value of one API call argument
#[derive(Debug, Clone, PartialEq)]
pub enum ApiValue {
    Text(String),
    Json(serde_json::Value),
}

impl ApiValue {
    fn rendered(&self) -> String {
        match self {
            ApiValue::Text(text) => text.clone(),
            ApiValue::Json(value) => value.to_string(),
        }
    }
}

/// A named API call argument
#[derive(Debug, Clone, PartialEq)]
pub struct ApiParameter {
    pub name: String,
    pub value: ApiValue,
}

impl ApiParameter {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        ApiParameter { name: name.into(), value: ApiValue::Text(value.into()) }
    }

    pub fn json(name: impl Into<String>, value: serde_json::Value) -> Self {
        ApiParameter { name: name.into(), value: ApiValue::Json(value) }
    }
}

/// Decoded API response
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(serde_json::Value),
    Text(String),
}

impl ApiResponse {
    /// Rows of a many-rows response: a JSON array whose elements are in
    /// the SPARQL binding row shape. Anything else contributes no rows.
    pub fn records(&self, source: Option<&Arc<DataSource>>) -> Vec<SparqlRecord> {
        let ApiResponse::Json(serde_json::Value::Array(rows)) = self else {
            return Vec::new();
        };
        let mut vars = Vec::new();
        let mut bindings = Vec::new();
        for row in rows {
            let Ok(row) = serde_json::from_value::<crate::results::BindingRow>(row.clone()) else {
                continue;
            };
            for var in row.keys() {
                if !vars.contains(var) {
                    vars.push(var.clone());
                }
            }
            bindings.push(row);
        }
        let result = SparqlJsonResult {
            head: crate::results::SparqlHead { vars },
            results: crate::results::SparqlResults { bindings },
        };
        parse_records(&result, source)
    }

    /// Scalar view of a single-value response, `None` for null/empty
    pub fn scalar_text(&self) -> Option<String> {
        match self {
            ApiResponse::Text(text) if !text.is_empty() => Some(text.clone()),
            ApiResponse::Json(serde_json::Value::String(text)) if !text.is_empty() => {
                Some(text.clone())
            }
            ApiResponse::Json(serde_json::Value::Number(number)) => Some(number.to_string()),
            _ => None,
        }
    }

    /// Integer view of a single-value response
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            ApiResponse::Text(text) => text.trim().parse().ok(),
            ApiResponse::Json(serde_json::Value::Number(number)) => number.as_i64(),
            ApiResponse::Json(serde_json::Value::String(text)) => text.trim().parse().ok(),
            _ => None,
        }
    }

    /// String list view of a list response
    pub fn string_list(&self) -> Option<Vec<String>> {
        let ApiResponse::Json(serde_json::Value::Array(items)) = self else {
            return None;
        };
        if items.is_empty() {
            return None;
        }
        Some(
            items
                .iter()
                .map(|item| match item {
                    serde_json::Value::String(text) => text.clone(),
                    other => other.to_string(),
                })
                .collect(),
        )
    }
}

/// Executor bound to one REST-API data source
pub struct RestApiExecutor {
    source: Arc<DataSource>,
    default_parameters: Vec<ApiParameter>,
    client: Client,
    cache: Arc<QueryCache<ApiResponse>>,
}

impl RestApiExecutor {
    pub fn new(
        source: Arc<DataSource>,
        cache: Arc<QueryCache<ApiResponse>>,
    ) -> Result<Self, FederationError> {
        if source.kind != TransportKind::RestApi {
            return Err(FederationError::Configuration(format!(
                "Data source '{}' is not a REST-API service",
                source.title
            )));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let default_parameters = source
            .default_graphs
            .iter()
            .map(|graph| ApiParameter::text("default-graph-uri", graph.clone()))
            .collect();
        Ok(RestApiExecutor { source, default_parameters, client, cache })
    }

    pub fn source(&self) -> &Arc<DataSource> {
        &self.source
    }

    /// Full call URL: endpoint, call name, then call arguments followed
    /// by the per-source default parameters
    pub fn build_call_url(&self, call: &str, parameters: &[ApiParameter]) -> String {
        let endpoint = &self.source.endpoint_url;
        let mut url = if endpoint.ends_with('/') {
            format!("{}{}", endpoint, call)
        } else {
            format!("{}/{}", endpoint, call)
        };
        let all = parameters.iter().chain(self.default_parameters.iter());
        for (index, parameter) in all.enumerate() {
            url.push(if index == 0 { '?' } else { '&' });
            url.push_str(&parameter.name);
            url.push('=');
            url.push_str(&urlencoding::encode(&parameter.value.rendered()));
        }
        url
    }

    /// Performs the API call; the cache is keyed by the full call URL
    pub async fn execute(
        &self,
        call: &str,
        parameters: &[ApiParameter],
        use_cache: bool,
    ) -> Result<ApiResponse, FederationError> {
        let url = self.build_call_url(call, parameters);

        if use_cache {
            if let Some(hit) = self.cache.get(&url, "") {
                return Ok(hit);
            }
        }

        let mut request = self.client.get(&url);
        if let Some(auth) = &self.source.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(FederationError::Transport(format!(
                "API request failed: {}",
                response.status()
            )));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        let result = if content_type.contains("application/json") {
            ApiResponse::Json(response.json().await?)
        } else {
            ApiResponse::Text(response.text().await?)
        };

        if use_cache {
            self.cache.insert(&url, "", result.clone());
        }
        Ok(result)
    }

    /// One executor per enabled API service, each owning a fresh cache
    pub fn from_catalog(
        catalog: &Catalog,
        datasets_enabled: &[String],
    ) -> Result<Vec<Self>, FederationError> {
        let mut executors = Vec::new();
        for source in catalog.api_sources(datasets_enabled) {
            debug!("Configuring API executor for {}", source.title);
            executors.push(RestApiExecutor::new(source, Arc::new(QueryCache::new()))?);
        }
        Ok(executors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_source() -> Arc<DataSource> {
        Arc::new(DataSource {
            id: "urn:svc:api".to_string(),
            title: "Lexical API".to_string(),
            identifier: "API".to_string(),
            kind: TransportKind::RestApi,
            endpoint_url: "http://api.example.org/lexical".to_string(),
            auth: None,
            default_graphs: vec!["http://example.org/graph/main".to_string()],
        })
    }

    #[test]
    fn test_call_url_encodes_structured_values() {
        let executor = RestApiExecutor::new(api_source(), Arc::new(QueryCache::new())).unwrap();
        let url = executor.build_call_url(
            "loadSearchResults",
            &[
                ApiParameter::text("searchKey", "well of wisdom"),
                ApiParameter::json("options", serde_json::json!({"limit": 10})),
            ],
        );
        assert!(url.starts_with("http://api.example.org/lexical/loadSearchResults?"));
        assert!(url.contains("searchKey=well%20of%20wisdom"));
        assert!(url.contains("options=%7B%22limit%22%3A10%7D"));
        // per-source graph restriction travels with every call
        assert!(url.contains("default-graph-uri=http%3A%2F%2Fexample.org%2Fgraph%2Fmain"));
    }

    #[test]
    fn test_records_from_binding_shaped_rows() {
        let response = ApiResponse::Json(serde_json::json!([
            {"entry": {"type": "uri", "value": "http://example.org/e/1"}}
        ]));
        let records = response.records(None);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value("entry"), "http://example.org/e/1");
    }

    #[test]
    fn test_scalar_views() {
        assert_eq!(ApiResponse::Text("12".to_string()).as_integer(), Some(12));
        assert_eq!(ApiResponse::Json(serde_json::json!(null)).scalar_text(), None);
        assert_eq!(
            ApiResponse::Json(serde_json::json!("noun")).scalar_text(),
            Some("noun".to_string())
        );
    }
}
