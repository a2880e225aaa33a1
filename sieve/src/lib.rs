//! Filter and sort compiler for Elasticsearch catalog indices
//!
//! Translates an operator-prefixed filter mini-language into bool queries,
//! compiles sort directives with explicit null placement, and keeps a typed
//! schema of the index that drives value normalization.
//!
//! ```
//! use serde_json::json;
//! use sieve::query::{FilterCompiler, QueryAssembler, SortCompiler};
//! use sieve::schema::{PropertyKind, SchemaMap};
//!
//! let schema = SchemaMap::new()
//!     .with("ID", PropertyKind::Integer)
//!     .with("PRICE", PropertyKind::Float);
//!
//! let filter = json!({">=PRICE": "100", "!ID": [1, 2]});
//! let query = FilterCompiler::strict()
//!     .compile(&schema, filter.as_object().unwrap())
//!     .unwrap();
//! let sort = SortCompiler::default()
//!     .compile(&schema, [("PRICE", "asc,nulls")])
//!     .unwrap();
//! let request = QueryAssembler::assemble("products", &query, &sort, &Default::default()).unwrap();
//! assert_eq!(request.index, "products");
//! ```

pub mod config;
pub mod error;
pub mod query;
pub mod schema;

pub use config::SieveConfig;
pub use error::{Error, Result};
