//! Schema model: field types, value normalization and source schemas

mod cache;
mod catalog;
pub mod date;
mod kind;
mod map;
mod property;

pub use cache::{SchemaCache, SchemaCacheStats};
pub use catalog::{
    standard_field_names, CatalogDescription, CatalogProperty, CatalogRegistry, CatalogSchema,
    SchemaSource,
};
pub use kind::PropertyKind;
pub use map::SchemaMap;
pub use property::PropertyType;
