//! Executors for the configured data sources

pub mod api;
pub mod cache;
pub mod local;
pub mod remote;

pub use api::{ApiParameter, ApiResponse, ApiValue, RestApiExecutor};
pub use cache::QueryCache;
pub use local::LocalQueryExecutor;
pub use remote::RemoteQueryExecutor;
