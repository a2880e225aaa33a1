//! Collaborator seams and their Elasticsearch implementation

mod http;
mod traits;

pub use http::HttpElasticClient;
pub use traits::{DocumentWriter, IndexDescriber, IndexMutator, QueryExecutor};
