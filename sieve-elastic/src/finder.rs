use crate::client::{IndexDescriber, QueryExecutor};
use crate::mapping::describe_index;
use crate::Result;
use serde_json::{Map, Value};
use sieve::query::{CompiledQuery, FilterCompiler, QueryAssembler, SortCompiler};
use sieve::schema::{SchemaCache, SchemaMap};
use sieve::SieveConfig;
use std::sync::Arc;

/// Compiles filters against the live schema of an index and runs them.
///
/// Index schemas are fetched once and kept in the shared [`SchemaCache`]
/// until something invalidates them.
pub struct Finder<C> {
    client: Arc<C>,
    cache: SchemaCache,
    filter: FilterCompiler,
    sort: SortCompiler,
    default_sort: Vec<(String, String)>,
}

impl<C> Finder<C>
where
    C: IndexDescriber + QueryExecutor,
{
    pub fn new(client: Arc<C>, cache: SchemaCache) -> Self {
        Self::from_config(client, cache, &SieveConfig::default())
    }

    pub fn from_config(client: Arc<C>, cache: SchemaCache, config: &SieveConfig) -> Self {
        Self {
            client,
            cache,
            filter: config.filter_compiler(),
            sort: config.sort_compiler(),
            default_sort: config.compiler.default_sort.clone(),
        }
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    /// Published schema of `index`, from the cache when possible
    pub async fn schema(&self, index: &str) -> Result<Arc<SchemaMap>> {
        if let Some(schema) = self.cache.get(index) {
            return Ok(schema);
        }
        let schema = describe_index(self.client.as_ref(), index).await?;
        Ok(self.cache.insert(index, schema))
    }

    /// Compile a search request without running it.
    ///
    /// `sort` of `None` applies the default sort; an empty object means no sort.
    pub async fn prepare(
        &self,
        index: &str,
        filter: &Map<String, Value>,
        sort: Option<&Map<String, Value>>,
        options: &Map<String, Value>,
    ) -> Result<CompiledQuery> {
        let schema = self.schema(index).await?;
        let query = self.filter.compile(&schema, filter)?;
        let sort = match sort {
            Some(sort) => self.sort.compile_map(&schema, sort)?,
            None => self.sort.compile(
                &schema,
                self.default_sort
                    .iter()
                    .map(|(field, directive)| (field.as_str(), directive.as_str())),
            )?,
        };
        let compiled = QueryAssembler::assemble(index, &query, &sort, options)?;
        tracing::debug!(index = %compiled.index, "prepared search");
        Ok(compiled)
    }

    /// Compile and run a search, returning the raw response
    pub async fn search(
        &self,
        index: &str,
        filter: &Map<String, Value>,
        sort: Option<&Map<String, Value>>,
        options: &Map<String, Value>,
    ) -> Result<Value> {
        let compiled = self.prepare(index, filter, sort, options).await?;
        self.client.search(&compiled).await
    }
}
