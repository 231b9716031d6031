//! Federated fan-out over the configured executor set.
//!
//! One logical operation is issued against every configured backend:
//! API executors first, then SPARQL executors in catalog order, each
//! awaited sequentially so that identical in-flight requests never race
//! against the shared caches. Many-rows results are concatenated in
//! that order with every record tagged with its originating source;
//! single-value operations short-circuit on the first answer; numeric
//! aggregates are drawn from the designated statistics source only,
//! because counts cannot be meaningfully summed across overlapping
//! backends.
//!
//! An error from any executor aborts the whole fan-out for that
//! operation; failures are not isolated between sources.

use crate::catalog::{Catalog, DataSource};
use crate::error::FederationError;
use crate::executors::api::{ApiParameter, RestApiExecutor};
use crate::executors::cache::QueryCache;
use crate::executors::local::LocalQueryExecutor;
use crate::executors::remote::RemoteQueryExecutor;
use crate::querying::parameters::QueryParameter;
use crate::results::{parse_records, record, SparqlJsonResult, SparqlRecord, SparqlValue};
use crate::store::LocalStore;
use log::debug;
use std::sync::Arc;

/// A SPARQL-capable executor, remote or local
pub enum SparqlExecutor {
    Remote(RemoteQueryExecutor),
    Local(LocalQueryExecutor),
}

impl SparqlExecutor {
    pub fn source(&self) -> &Arc<DataSource> {
        match self {
            SparqlExecutor::Remote(executor) => executor.source(),
            SparqlExecutor::Local(executor) => executor.source(),
        }
    }

    /// Executes with the per-kind caching default: remote queries are
    /// cached, local ones are not
    pub async fn execute(
        &self,
        template: &str,
        parameters: &[QueryParameter],
    ) -> Result<SparqlJsonResult, FederationError> {
        match self {
            SparqlExecutor::Remote(executor) => executor.execute(template, parameters, true).await,
            SparqlExecutor::Local(executor) => executor.execute(template, parameters, false).await,
        }
    }
}

/// One logical operation, bound for every kind of backend
pub struct FederatedOperation<'a> {
    /// API call name
    pub call: &'a str,
    pub call_parameters: Vec<ApiParameter>,
    /// SPARQL query template
    pub query: &'a str,
    pub query_parameters: Vec<QueryParameter>,
}

impl<'a> FederatedOperation<'a> {
    /// The common case: one IRI argument shared by the API call and the
    /// query template's `?this` placeholder
    pub fn for_iri(call: &'a str, query: &'a str, iri: &str) -> Self {
        FederatedOperation {
            call,
            call_parameters: vec![ApiParameter::text("iri", iri)],
            query,
            query_parameters: vec![QueryParameter::uri("this", iri)],
        }
    }
}

/// Fans logical operations out across the configured executors
pub struct Federator {
    api_executors: Vec<RestApiExecutor>,
    sparql_executors: Vec<SparqlExecutor>,
    statistics_source: Option<Arc<DataSource>>,
}

impl Federator {
    pub fn new(
        api_executors: Vec<RestApiExecutor>,
        sparql_executors: Vec<SparqlExecutor>,
        statistics_source: Option<Arc<DataSource>>,
    ) -> Self {
        Federator { api_executors, sparql_executors, statistics_source }
    }

    /// Builds the executor set from a catalog and the enabled datasets;
    /// the local store, when given, is appended after the remote
    /// sources. The service of the first enabled dataset becomes the
    /// statistics source.
    pub fn from_catalog(
        catalog: &Catalog,
        datasets_enabled: &[String],
        local_store: Option<Arc<LocalStore>>,
    ) -> Result<Self, FederationError> {
        let api_executors = RestApiExecutor::from_catalog(catalog, datasets_enabled)?;
        let mut sparql_executors: Vec<SparqlExecutor> =
            RemoteQueryExecutor::from_catalog(catalog, datasets_enabled)?
                .into_iter()
                .map(SparqlExecutor::Remote)
                .collect();
        if let Some(store) = local_store {
            sparql_executors.push(SparqlExecutor::Local(LocalQueryExecutor::new(
                store,
                Arc::new(QueryCache::new()),
            )?));
        }
        let statistics_source = catalog.main_data_service(datasets_enabled);
        debug!(
            "Federating over {} API and {} SPARQL executors",
            api_executors.len(),
            sparql_executors.len()
        );
        Ok(Federator::new(api_executors, sparql_executors, statistics_source))
    }

    pub fn sparql_executors(&self) -> &[SparqlExecutor] {
        &self.sparql_executors
    }

    pub fn statistics_source(&self) -> Option<&Arc<DataSource>> {
        self.statistics_source.as_ref()
    }

    /// Many-rows fan-out: every executor contributes its rows, in
    /// executor order, each record tagged with its originating source
    pub async fn collect(
        &self,
        operation: &FederatedOperation<'_>,
    ) -> Result<Vec<SparqlRecord>, FederationError> {
        let mut records = Vec::new();
        for executor in &self.api_executors {
            let response =
                executor.execute(operation.call, &operation.call_parameters, true).await?;
            records.extend(response.records(Some(executor.source())));
        }
        for executor in &self.sparql_executors {
            let result = executor.execute(operation.query, &operation.query_parameters).await?;
            records.extend(parse_records(&result, Some(executor.source())));
        }
        Ok(records)
    }

    /// Single-value operation: the first defined value wins and the
    /// remaining executors are skipped
    pub async fn first_value(
        &self,
        operation: &FederatedOperation<'_>,
        var: &str,
    ) -> Result<Option<SparqlValue>, FederationError> {
        for executor in &self.api_executors {
            let response =
                executor.execute(operation.call, &operation.call_parameters, true).await?;
            if let Some(text) = response.scalar_text() {
                return Ok(Some(SparqlValue::literal(text)));
            }
        }
        for executor in &self.sparql_executors {
            let result = executor.execute(operation.query, &operation.query_parameters).await?;
            if let Some(value) = result.first_value(var) {
                return Ok(Some(value.clone()));
            }
        }
        Ok(None)
    }

    /// List-valued operation: the first executor with a non-empty list
    /// wins
    pub async fn first_value_list(
        &self,
        operation: &FederatedOperation<'_>,
        var: &str,
    ) -> Result<Option<Vec<String>>, FederationError> {
        for executor in &self.api_executors {
            let response =
                executor.execute(operation.call, &operation.call_parameters, true).await?;
            if let Some(list) = response.string_list() {
                return Ok(Some(list));
            }
        }
        for executor in &self.sparql_executors {
            let result = executor.execute(operation.query, &operation.query_parameters).await?;
            let records = parse_records(&result, None);
            if let Some(list) = record::value_list(&records, var) {
                return Ok(Some(list));
            }
        }
        Ok(None)
    }

    /// Numeric aggregate restricted to the designated statistics
    /// source; other executors are skipped entirely. No statistics
    /// source configured means no answer, not an error.
    pub async fn statistics_count(
        &self,
        operation: &FederatedOperation<'_>,
        var: &str,
    ) -> Result<Option<i64>, FederationError> {
        let Some(statistics_source) = &self.statistics_source else {
            return Ok(None);
        };
        for executor in &self.api_executors {
            if executor.source() == statistics_source {
                let response =
                    executor.execute(operation.call, &operation.call_parameters, true).await?;
                return Ok(response.as_integer());
            }
        }
        for executor in &self.sparql_executors {
            if executor.source() == statistics_source {
                let result =
                    executor.execute(operation.query, &operation.query_parameters).await?;
                return Ok(record::count_value(&result, var));
            }
        }
        Ok(None)
    }

    /// Aggregate rows (e.g. a distribution) restricted to the
    /// designated statistics source. A single all-zero row counts as no
    /// answer.
    pub async fn statistics_records(
        &self,
        operation: &FederatedOperation<'_>,
        count_var: &str,
    ) -> Result<Option<Vec<SparqlRecord>>, FederationError> {
        let Some(statistics_source) = &self.statistics_source else {
            return Ok(None);
        };
        for executor in &self.api_executors {
            if executor.source() == statistics_source {
                let response =
                    executor.execute(operation.call, &operation.call_parameters, true).await?;
                let records = response.records(Some(executor.source()));
                return Ok(if records.is_empty() { None } else { Some(records) });
            }
        }
        for executor in &self.sparql_executors {
            if executor.source() == statistics_source {
                let result =
                    executor.execute(operation.query, &operation.query_parameters).await?;
                return Ok(record::records_with_count(&result, count_var));
            }
        }
        Ok(None)
    }
}
