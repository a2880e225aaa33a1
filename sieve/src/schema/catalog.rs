//! Source schema of catalog records
//!
//! A catalog content type has a fixed set of standard fields plus any number
//! of custom properties, optional stores and price groups. [`CatalogSchema`]
//! turns such a description into the ordered [`SchemaMap`] the index is
//! built from.

use super::date::INDEX_DATE_FORMAT;
use super::kind::PropertyKind;
use super::map::SchemaMap;
use super::property::PropertyType;
use crate::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

/// Standard record fields and their index kinds, in schema order.
/// Aliases carry their target as the second element.
const STANDARD_FIELDS: &[(&str, StandardField)] = &[
    ("LID", StandardField::Plain(PropertyKind::Keyword)),
    ("IBLOCK_TYPE_ID", StandardField::Plain(PropertyKind::Keyword)),
    ("IBLOCK_ID", StandardField::Plain(PropertyKind::Integer)),
    ("IBLOCK_CODE", StandardField::Plain(PropertyKind::Keyword)),
    ("IBLOCK_NAME", StandardField::Plain(PropertyKind::Keyword)),
    ("ID", StandardField::Plain(PropertyKind::Integer)),
    ("XML_ID", StandardField::Plain(PropertyKind::Keyword)),
    ("EXTERNAL_ID", StandardField::Alias("XML_ID")),
    ("CODE", StandardField::Plain(PropertyKind::Keyword)),
    ("NAME", StandardField::Plain(PropertyKind::Keyword)),
    ("ACTIVE", StandardField::Plain(PropertyKind::Boolean)),
    ("DETAIL_PAGE_URL", StandardField::Plain(PropertyKind::Keyword)),
    ("LIST_PAGE_URL", StandardField::Plain(PropertyKind::Keyword)),
    ("TIMESTAMP_X", StandardField::Plain(PropertyKind::Date)),
    ("DATE_CREATE", StandardField::Plain(PropertyKind::Date)),
    ("IBLOCK_SECTION_ID", StandardField::Plain(PropertyKind::Integer)),
    ("SECTION_ID", StandardField::Alias("IBLOCK_SECTION_ID")),
    ("SECTION_CODE", StandardField::Plain(PropertyKind::Keyword)),
    ("ACTIVE_FROM", StandardField::Plain(PropertyKind::Date)),
    ("ACTIVE_TO", StandardField::Plain(PropertyKind::Date)),
    ("SORT", StandardField::Plain(PropertyKind::Integer)),
    ("PREVIEW_PICTURE", StandardField::Plain(PropertyKind::Integer)),
    ("PREVIEW_TEXT", StandardField::Plain(PropertyKind::Keyword)),
    ("PREVIEW_TEXT_TYPE", StandardField::Plain(PropertyKind::Keyword)),
    ("DETAIL_PICTURE", StandardField::Plain(PropertyKind::Integer)),
    ("DETAIL_TEXT", StandardField::Plain(PropertyKind::Keyword)),
    ("DETAIL_TEXT_TYPE", StandardField::Plain(PropertyKind::Keyword)),
    ("SEARCHABLE_CONTENT", StandardField::Plain(PropertyKind::Keyword)),
    ("TAGS", StandardField::Plain(PropertyKind::Keyword)),
];

enum StandardField {
    Plain(PropertyKind),
    Alias(&'static str),
}

impl StandardField {
    fn to_property(&self) -> PropertyType {
        match self {
            Self::Plain(PropertyKind::Date) => date_property(),
            Self::Plain(kind) => kind.clone().into(),
            Self::Alias(path) => PropertyType::alias(*path),
        }
    }
}

fn date_property() -> PropertyType {
    PropertyType::new(PropertyKind::Date)
        .with_parameter("format", Value::String(INDEX_DATE_FORMAT.to_string()))
}

/// Names of the standard record fields, in schema order
pub fn standard_field_names() -> impl Iterator<Item = &'static str> {
    STANDARD_FIELDS.iter().map(|(name, _)| *name)
}

/// A custom property as the content system describes it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogProperty {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "CODE")]
    pub code: String,
    /// `S` string, `N` number, `L` list, `E` element link, `F` file, ...
    #[serde(rename = "PROPERTY_TYPE", default)]
    pub property_type: Option<String>,
    #[serde(rename = "USER_TYPE", default)]
    pub user_type: Option<String>,
}

impl CatalogProperty {
    pub fn new(id: u64, code: impl Into<String>, property_type: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            property_type: Some(property_type.into()),
            user_type: None,
        }
    }

    pub fn with_user_type(mut self, user_type: impl Into<String>) -> Self {
        self.user_type = Some(user_type.into());
        self
    }

    fn is_list(&self) -> bool {
        self.property_type.as_deref() == Some("L")
    }
}

impl PropertyType {
    /// Property type of a standard record field
    pub fn from_standard_field(name: &str) -> Result<Self> {
        STANDARD_FIELDS
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, field)| field.to_property())
            .ok_or_else(|| Error::Schema(format!("no predefined type for field {name}")))
    }

    /// Property type a custom property's values are indexed with
    pub fn from_catalog_property(property: &CatalogProperty) -> Result<Self> {
        let property_type = property
            .property_type
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::Schema(format!("property {} has no property type", property.code))
            })?;

        let user_type = property.user_type.as_deref().filter(|t| !t.is_empty());

        Ok(match (property_type, user_type) {
            ("S", Some("DateTime")) => date_property(),
            ("N", _) => PropertyKind::Float.into(),
            ("E" | "F", _) => PropertyKind::Integer.into(),
            _ => PropertyKind::Keyword.into(),
        })
    }
}

/// Everything the content system reports about one content type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogDescription {
    pub properties: Vec<CatalogProperty>,
    /// Warehouse ids, one stock amount field each
    pub stores: Vec<u64>,
    /// Price group ids, one price and one currency field each
    pub price_groups: Vec<u64>,
}

/// Builds the source schema of a catalog content type
#[derive(Debug, Clone, Default)]
pub struct CatalogSchema {
    description: CatalogDescription,
}

impl CatalogSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_description(description: CatalogDescription) -> Self {
        Self { description }
    }

    pub fn property(mut self, property: CatalogProperty) -> Self {
        self.description.properties.push(property);
        self
    }

    pub fn store(mut self, id: u64) -> Self {
        self.description.stores.push(id);
        self
    }

    pub fn price_group(mut self, id: u64) -> Self {
        self.description.price_groups.push(id);
        self
    }

    /// Assemble the ordered schema.
    ///
    /// Custom properties are addressed by code (`PROPERTY_<CODE>`) with an
    /// id alias (`PROPERTY_<ID>`). List properties store their enum code and
    /// get an extra `_VALUE` field holding the decoded value.
    pub fn build(&self) -> Result<SchemaMap> {
        let mut map: SchemaMap = STANDARD_FIELDS
            .iter()
            .map(|(name, field)| (name.to_string(), field.to_property()))
            .collect();

        for property in &self.description.properties {
            let by_code = format!("PROPERTY_{}", property.code);
            let by_id = format!("PROPERTY_{}", property.id);

            if property.is_list() {
                let value_by_code = format!("{by_code}_VALUE");
                map.insert(
                    by_code.clone(),
                    PropertyType::new(PropertyKind::Integer)
                        .with_parameter("fields", json!({"enum": {"type": "integer"}})),
                );
                map.insert(by_id.clone(), PropertyType::alias(by_code));
                map.insert(
                    value_by_code.clone(),
                    PropertyType::from_catalog_property(property)?,
                );
                map.insert(format!("{by_id}_VALUE"), PropertyType::alias(value_by_code));
            } else {
                map.insert(by_code.clone(), PropertyType::from_catalog_property(property)?);
                map.insert(by_id, PropertyType::alias(by_code));
            }
        }

        map.insert("GROUP_IDS", PropertyKind::Integer.into());
        map.insert("GROUP_CODES", PropertyKind::Keyword.into());
        map.insert("NAV_CHAIN_IDS", PropertyKind::Integer.into());
        map.insert("NAV_CHAIN_CODES", PropertyKind::Keyword.into());

        for store in &self.description.stores {
            map.insert(format!("CATALOG_STORE_AMOUNT_{store}"), PropertyKind::Integer.into());
        }

        for group in &self.description.price_groups {
            map.insert(format!("CATALOG_PRICE_{group}"), PropertyKind::Float.into());
            map.insert(format!("CATALOG_CURRENCY_{group}"), PropertyKind::Keyword.into());
        }

        tracing::debug!(
            fields = map.len(),
            properties = self.description.properties.len(),
            "built catalog schema"
        );

        Ok(map)
    }
}

/// Provides the authoritative source schema of a content type
#[async_trait]
pub trait SchemaSource: Send + Sync {
    /// `source` is an opaque content type identifier
    async fn source_schema(&self, source: &str) -> Result<SchemaMap>;
}

/// Source schemas from content type descriptions held in memory
#[derive(Debug, Clone, Default)]
pub struct CatalogRegistry {
    catalogs: HashMap<String, CatalogDescription>,
}

impl CatalogRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, source: impl Into<String>, description: CatalogDescription) {
        self.catalogs.insert(source.into(), description);
    }
}

#[async_trait]
impl SchemaSource for CatalogRegistry {
    async fn source_schema(&self, source: &str) -> Result<SchemaMap> {
        let description = self
            .catalogs
            .get(source)
            .ok_or_else(|| Error::Schema(format!("unknown content type {source}")))?;
        CatalogSchema::from_description(description.clone()).build()
    }
}
