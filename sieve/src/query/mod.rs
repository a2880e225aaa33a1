//! Filter and sort compilation into Elasticsearch query DSL

mod assemble;
pub mod dsl;
mod filter;
mod key;
mod node;
mod preprocess;
mod sort;

pub use assemble::{CompiledQuery, QueryAssembler};
pub use dsl::{BoolQuery, BoolQueryBuilder, EsQuery, Missing, Occur, SortClause, SortOrder};
pub use filter::FilterCompiler;
pub use key::{FilterKey, Operator};
pub use node::{FilterGroup, FilterLeaf, FilterNode, Logic, LOGIC_KEY};
pub use preprocess::HierarchyFields;
pub use sort::{NullOrder, SortCompiler, SortDirective};

use crate::Result;

/// Propagate `result` in strict mode; otherwise log the failure and skip the entry.
pub(crate) fn skip_or_fail<T>(strict: bool, what: &str, entry: &str, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if strict => Err(err),
        Err(err) => {
            tracing::warn!(entry, kind = err.kind(), error = %err, "dropping {what}");
            Ok(None)
        }
    }
}
