use super::property::PropertyType;
use crate::{Error, Result};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Ordered, name-unique collection of schema fields.
///
/// Lookups are exact and case-sensitive. Serializes to
/// `{"properties": {name: {"type": ..., ...}}}`, the body an index mapping
/// API expects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaMap {
    entries: Vec<(String, PropertyType)>,
    positions: HashMap<String, usize>,
}

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field. Replacing keeps the original position.
    pub fn insert(&mut self, name: impl Into<String>, property: PropertyType) {
        let name = name.into();
        match self.positions.get(&name) {
            Some(&idx) => self.entries[idx].1 = property,
            None => {
                self.positions.insert(name.clone(), self.entries.len());
                self.entries.push((name, property));
            }
        }
    }

    pub fn with(mut self, name: impl Into<String>, property: impl Into<PropertyType>) -> Self {
        self.insert(name, property.into());
        self
    }

    pub fn get(&self, name: &str) -> Result<&PropertyType> {
        self.find(name)
            .ok_or_else(|| Error::UnknownProperty(name.to_string()))
    }

    pub fn find(&self, name: &str) -> Option<&PropertyType> {
        self.positions.get(name).map(|&idx| &self.entries[idx].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyType)> {
        self.entries.iter().map(|(name, prop)| (name.as_str(), prop))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Canonical field name for `name`, following at most one alias hop.
    ///
    /// Non-alias fields resolve to themselves. An alias must name a present,
    /// non-alias field; anything else is an `InvalidAliasPath`.
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> Result<&'a str> {
        let property = self.get(name)?;
        if !property.is_alias() {
            return Ok(name);
        }

        let invalid = |path: Option<&str>| Error::InvalidAliasPath {
            property: name.to_string(),
            path: path.map(str::to_string),
        };

        let path = property.alias_path().ok_or_else(|| invalid(None))?;
        match self.find(path) {
            Some(target) if !target.is_alias() => Ok(path),
            _ => Err(invalid(Some(path))),
        }
    }

    /// Exact name if present, otherwise the first case-insensitive match,
    /// otherwise `name` unchanged. For display purposes; never used to
    /// resolve filter or sort keys.
    pub fn normalize_name<'a>(&'a self, name: &'a str) -> &'a str {
        if self.contains(name) {
            return name;
        }
        self.names()
            .find(|existing| existing.to_lowercase() == name.to_lowercase())
            .unwrap_or(name)
    }

    /// Fields of `self` missing from `other`, in `self`'s order
    pub fn difference(&self, other: &SchemaMap) -> SchemaMap {
        self.iter()
            .filter(|(name, _)| !other.contains(name))
            .fold(SchemaMap::new(), |acc, (name, prop)| acc.with(name, prop.clone()))
    }

    /// Number of slots this schema occupies against an index's total field limit
    pub fn field_budget(&self) -> usize {
        self.entries.iter().map(|(_, p)| p.field_budget()).sum()
    }

    /// `{name: {"type": ..., ...}}` in field order
    pub fn to_properties(&self) -> Map<String, Value> {
        self.iter()
            .map(|(name, prop)| (name.to_string(), prop.to_value()))
            .collect()
    }

    /// `{"properties": {...}}`
    pub fn to_mapping(&self) -> Value {
        let mut out = Map::new();
        out.insert("properties".to_string(), Value::Object(self.to_properties()));
        Value::Object(out)
    }

    /// Build from a `properties` object. Fields whose definition is not an object are skipped.
    pub fn from_properties(properties: &Map<String, Value>) -> Result<Self> {
        let mut map = SchemaMap::new();
        for (name, definition) in properties {
            if !definition.is_object() {
                tracing::warn!(field = %name, "skipping non-object field definition");
                continue;
            }
            let property: PropertyType = serde_json::from_value(definition.clone())
                .map_err(|e| Error::Schema(format!("field {name}: {e}")))?;
            map.insert(name.clone(), property);
        }
        Ok(map)
    }

    /// Normalize a raw record into an index document.
    ///
    /// Every non-alias field appears in the output, in schema order; fields
    /// missing from `record` normalize from null.
    pub fn normalize_document(&self, record: &Map<String, Value>) -> Result<Map<String, Value>> {
        let mut document = Map::new();
        for (name, property) in self.iter() {
            if property.is_alias() {
                continue;
            }
            let raw = record.get(name).unwrap_or(&Value::Null);
            document.insert(name.to_string(), property.normalize(raw)?);
        }
        Ok(document)
    }
}

impl FromIterator<(String, PropertyType)> for SchemaMap {
    fn from_iter<I: IntoIterator<Item = (String, PropertyType)>>(iter: I) -> Self {
        let mut map = SchemaMap::new();
        for (name, prop) in iter {
            map.insert(name, prop);
        }
        map
    }
}

struct Properties<'a>(&'a SchemaMap);

impl Serialize for Properties<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, prop) in self.0.iter() {
            map.serialize_entry(name, prop)?;
        }
        map.end()
    }
}

impl Serialize for SchemaMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("properties", &Properties(self))?;
        map.end()
    }
}

impl<'de> Deserialize<'de> for SchemaMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = SchemaMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of field names to property definitions")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<SchemaMap, A::Error> {
                let mut map = SchemaMap::new();
                while let Some((name, prop)) = access.next_entry::<String, PropertyType>()? {
                    map.insert(name, prop);
                }
                Ok(map)
            }
        }

        struct PropertiesSeed;

        impl<'de> serde::de::DeserializeSeed<'de> for PropertiesSeed {
            type Value = SchemaMap;

            fn deserialize<D: Deserializer<'de>>(self, d: D) -> std::result::Result<SchemaMap, D::Error> {
                d.deserialize_map(PropertiesVisitor)
            }
        }

        struct MappingVisitor;

        impl<'de> Visitor<'de> for MappingVisitor {
            type Value = SchemaMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an index mapping with a `properties` object")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<SchemaMap, A::Error> {
                let mut schema = SchemaMap::new();
                while let Some(key) = access.next_key::<String>()? {
                    if key == "properties" {
                        schema = access.next_value_seed(PropertiesSeed)?;
                    } else {
                        access.next_value::<serde::de::IgnoredAny>()?;
                    }
                }
                Ok(schema)
            }
        }

        deserializer.deserialize_map(MappingVisitor)
    }
}
