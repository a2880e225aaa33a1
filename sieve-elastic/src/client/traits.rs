use crate::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use sieve::query::CompiledQuery;

/// Read access to published index definitions
#[async_trait]
pub trait IndexDescriber: Send + Sync {
    async fn index_exists(&self, index: &str) -> Result<bool>;

    /// Raw `GET /{index}/_mapping` response, `None` if the index has no mapping
    async fn get_mapping(&self, index: &str) -> Result<Option<Value>>;

    /// Raw `GET /{index}/_settings` response including cluster defaults
    async fn get_settings(&self, index: &str) -> Result<Value>;
}

/// Additive changes to index definitions
#[async_trait]
pub trait IndexMutator: Send + Sync {
    async fn create_index(&self, index: &str) -> Result<()>;

    /// Set `index.mapping.total_fields.limit`
    async fn put_total_fields_limit(&self, index: &str, limit: u64) -> Result<()>;

    /// Push a `{"properties": {...}}` mapping. Returns the `acknowledged` flag.
    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<bool>;
}

/// Runs compiled searches
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// Raw search response; hits are not interpreted
    async fn search(&self, query: &CompiledQuery) -> Result<Value>;
}

/// Writes normalized documents
#[async_trait]
pub trait DocumentWriter: Send + Sync {
    /// Update or insert a document. Returns whether the write took effect
    /// (`created`, `updated` or `noop`).
    async fn upsert(&self, index: &str, id: &str, document: &Map<String, Value>) -> Result<bool>;
}
