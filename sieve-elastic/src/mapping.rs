//! Reading published index definitions back into schemas

use crate::client::IndexDescriber;
use crate::{ElasticError, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use sieve::schema::{PropertyKind, PropertyType, SchemaMap};
use std::collections::HashMap;

/// `GET /{index}/_mapping` response: index name to its mappings
#[derive(Debug, Deserialize)]
pub struct EsMappingResponse {
    #[serde(flatten)]
    pub indices: HashMap<String, EsIndexMapping>,
}

#[derive(Debug, Deserialize)]
pub struct EsIndexMapping {
    #[serde(default)]
    pub mappings: EsMappings,
}

#[derive(Debug, Default, Deserialize)]
pub struct EsMappings {
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// Schema of `index` from a raw mapping response.
///
/// Fields without a `type` default to keyword. Types the compiler has no
/// rules for are kept and their values pass through normalization untouched.
pub fn convert_es_mapping(index: &str, response: &Value) -> Result<SchemaMap> {
    let response: EsMappingResponse = serde_json::from_value(response.clone())
        .map_err(|e| ElasticError::malformed("mapping", e.to_string()))?;

    let Some(mapping) = response.indices.get(index) else {
        return Ok(SchemaMap::new());
    };

    let schema = SchemaMap::from_properties(&mapping.mappings.properties)?;
    for (name, property) in schema.iter() {
        if let PropertyKind::Other(kind) = property.kind() {
            tracing::warn!(index, field = name, kind = %kind, "unrecognized field type, values pass through");
        }
    }
    Ok(schema)
}

/// `index.mapping.total_fields.limit` from a settings response with defaults,
/// preferring the index's own setting over the cluster default
pub fn total_fields_limit(index: &str, settings: &Value) -> Option<u64> {
    let lookup = |section: &str| {
        settings
            .get(index)?
            .get(section)?
            .pointer("/index/mapping/total_fields/limit")
            .and_then(as_limit)
    };
    lookup("settings").or_else(|| lookup("defaults"))
}

/// Settings values arrive as strings (`"1000"`) or numbers
fn as_limit(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Currently published schema of `index`; empty if the index or its mapping is absent
pub async fn describe_index(describer: &dyn IndexDescriber, index: &str) -> Result<SchemaMap> {
    if !describer.index_exists(index).await? {
        tracing::debug!(index, "index does not exist");
        return Ok(SchemaMap::new());
    }
    match describer.get_mapping(index).await? {
        Some(response) => convert_es_mapping(index, &response),
        None => Ok(SchemaMap::new()),
    }
}

/// `PropertyType` of a single remote field definition
pub fn convert_field(definition: &Value) -> Result<PropertyType> {
    Ok(serde_json::from_value(definition.clone())?)
}
