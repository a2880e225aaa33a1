//! Pushing local schemas to remote indices
//!
//! Updates are additive: only fields the index does not have yet are sent,
//! and existing field definitions are never changed.

use crate::client::{IndexDescriber, IndexMutator};
use crate::mapping::{convert_es_mapping, total_fields_limit};
use crate::Result;
use sieve::schema::{SchemaCache, SchemaMap, SchemaSource};
use std::sync::Arc;

/// Outcome of a schema push
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// The index did not exist and was created
    pub created_index: bool,
    /// Fields sent to the index, in schema order
    pub added: Vec<String>,
    /// New total field limit, when it had to be raised
    pub limit_raised_to: Option<u64>,
    /// The index acknowledged the mapping update
    pub acknowledged: bool,
}

pub struct SchemaSync<C> {
    client: Arc<C>,
    cache: Option<SchemaCache>,
    min_total_fields_limit: u64,
}

impl<C> SchemaSync<C>
where
    C: IndexDescriber + IndexMutator,
{
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            cache: None,
            min_total_fields_limit: 0,
        }
    }

    /// Invalidate `cache` entries of every index this pushes to
    pub fn with_cache(mut self, cache: SchemaCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Never raise the total field limit to less than `limit`
    pub fn with_min_total_fields_limit(mut self, limit: u64) -> Self {
        self.min_total_fields_limit = limit;
        self
    }

    /// Push the fields of `local` that `index` lacks.
    ///
    /// Creates the index if needed, and raises its total field limit first
    /// when `local` needs more slots than the limit allows. The cached schema
    /// of `index` is dropped both before and after the remote writes.
    pub async fn push(&self, index: &str, local: &SchemaMap) -> Result<SyncReport> {
        self.invalidate(index);
        let report = self.apply(index, local).await;
        self.invalidate(index);
        report
    }

    fn invalidate(&self, index: &str) {
        if let Some(cache) = &self.cache {
            cache.invalidate(index);
        }
    }

    async fn apply(&self, index: &str, local: &SchemaMap) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        let remote = if self.client.index_exists(index).await? {
            match self.client.get_mapping(index).await? {
                Some(response) => convert_es_mapping(index, &response)?,
                None => SchemaMap::new(),
            }
        } else {
            self.client.create_index(index).await?;
            report.created_index = true;
            SchemaMap::new()
        };

        let diff = local.difference(&remote);
        report.added = diff.names().map(str::to_string).collect();

        let settings = self.client.get_settings(index).await?;
        let limit = total_fields_limit(index, &settings);
        let need = (local.field_budget() as u64).max(self.min_total_fields_limit);
        if limit.map_or(true, |limit| limit < need) {
            self.client.put_total_fields_limit(index, need).await?;
            tracing::info!(index, from = ?limit, to = need, "raised total fields limit");
            report.limit_raised_to = Some(need);
        }

        if diff.is_empty() {
            tracing::debug!(index, "mapping already up to date");
            report.acknowledged = true;
            return Ok(report);
        }

        report.acknowledged = self.client.put_mapping(index, &diff.to_mapping()).await?;
        tracing::info!(
            index,
            added = report.added.len(),
            acknowledged = report.acknowledged,
            "pushed mapping"
        );

        Ok(report)
    }

    /// Build the source schema of `source` and push it to `index`
    pub async fn push_source(
        &self,
        schema_source: &dyn SchemaSource,
        source: &str,
        index: &str,
    ) -> Result<SyncReport> {
        let local = schema_source.source_schema(source).await?;
        self.push(index, &local).await
    }
}
