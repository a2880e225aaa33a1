//! Elasticsearch collaborators for sieve
//!
//! - [`SchemaSync`] pushes additive mapping updates and raises the index's
//!   total field limit when needed
//! - [`Finder`] compiles filters against an index's live schema and runs them
//! - [`HttpElasticClient`] talks to the Elasticsearch REST API and implements
//!   every collaborator trait in [`client`]

pub mod client;
pub mod error;
pub mod finder;
pub mod mapping;
pub mod sync;

pub use client::{DocumentWriter, HttpElasticClient, IndexDescriber, IndexMutator, QueryExecutor};
pub use error::ElasticError;
pub use finder::Finder;
pub use sync::{SchemaSync, SyncReport};

/// Result type for collaborator operations
pub type Result<T> = std::result::Result<T, ElasticError>;
