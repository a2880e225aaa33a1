use super::date::normalize_date;
use super::kind::PropertyKind;
use crate::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::LazyLock;

static NUMERIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?\s*$").expect("valid regex")
});

/// One schema field: an index type plus its open-ended parameters.
///
/// Serializes to the flat shape index mappings use, e.g.
/// `{"type": "alias", "path": "XML_ID"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyType {
    #[serde(rename = "type", default)]
    kind: PropertyKind,
    #[serde(flatten)]
    parameters: Map<String, Value>,
}

impl PropertyType {
    pub fn new(kind: PropertyKind) -> Self {
        Self {
            kind,
            parameters: Map::new(),
        }
    }

    /// Alias pointing at another field of the same schema
    pub fn alias(path: impl Into<String>) -> Self {
        Self::new(PropertyKind::Alias).with_parameter("path", Value::String(path.into()))
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    /// Set a parameter. `type` is routed to the kind.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if name == "type" {
            if let Some(kind) = value.as_str() {
                self.kind = PropertyKind::from(kind);
            }
            return;
        }
        self.parameters.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.parameters.get(name)
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    pub fn is_alias(&self) -> bool {
        self.kind.is_alias()
    }

    /// Target of an alias, if one is declared
    pub fn alias_path(&self) -> Option<&str> {
        self.get("path").and_then(Value::as_str).filter(|p| !p.is_empty())
    }

    /// Whether the field stores enumeration codes with a decoded `enum` sub-field
    pub fn has_enum_field(&self) -> bool {
        self.get("fields")
            .and_then(|f| f.get("enum"))
            .is_some()
    }

    /// Weight of this field against an index's total field limit
    pub fn field_budget(&self) -> usize {
        if self.is_alias() {
            2
        } else {
            1
        }
    }

    /// Flat JSON representation, `{"type": ..., ...parameters}`
    pub fn to_value(&self) -> Value {
        let mut out = Map::with_capacity(self.parameters.len() + 1);
        out.insert("type".to_string(), Value::String(self.kind.to_string()));
        for (k, v) in &self.parameters {
            out.insert(k.clone(), v.clone());
        }
        Value::Object(out)
    }

    /// Normalize a raw value into the representation this field is indexed with.
    ///
    /// Arrays are normalized element-wise; rich-text payloads
    /// (`{"TYPE": "html", "TEXT": "..."}`) are unwrapped to their text first.
    pub fn normalize(&self, value: &Value) -> Result<Value> {
        if self.is_alias() {
            return Err(Error::InvalidOperation(
                "alias properties carry no values".to_string(),
            ));
        }

        match rich_text(value) {
            Value::Array(items) => items
                .iter()
                .map(|item| self.normalize_scalar(rich_text(item)))
                .collect::<Result<Vec<_>>>()
                .map(Value::Array),
            scalar => self.normalize_scalar(scalar),
        }
    }

    fn normalize_scalar(&self, value: &Value) -> Result<Value> {
        match &self.kind {
            PropertyKind::Keyword | PropertyKind::Text => to_keyword(value),
            PropertyKind::Integer | PropertyKind::Long => Ok(to_integer(value)),
            PropertyKind::Float | PropertyKind::Double => Ok(to_float(value)),
            PropertyKind::Boolean => Ok(to_boolean(value)),
            PropertyKind::Date => normalize_date(value),
            PropertyKind::Alias => Err(Error::InvalidOperation(
                "alias properties carry no values".to_string(),
            )),
            PropertyKind::Other(_) => Ok(value.clone()),
        }
    }
}

impl From<PropertyKind> for PropertyType {
    fn from(kind: PropertyKind) -> Self {
        Self::new(kind)
    }
}

/// Unwrap a `{type, text}` rich-text payload; anything else is returned as is.
fn rich_text(value: &Value) -> &Value {
    match value {
        Value::Object(map) => map
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("text"))
            .map(|(_, v)| v)
            .unwrap_or(value),
        _ => value,
    }
}

fn to_keyword(value: &Value) -> Result<Value> {
    match value {
        Value::Null | Value::Bool(false) => Ok(Value::Null),
        Value::Bool(true) => Ok(Value::String("1".to_string())),
        Value::String(s) => Ok(Value::String(s.clone())),
        Value::Number(n) => Ok(Value::String(match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                format!("{}", f as i64)
            }
            _ => n.to_string(),
        })),
        Value::Array(_) | Value::Object(_) => Err(Error::InvalidOperation(format!(
            "cannot convert {value} to a string"
        ))),
    }
}

/// Parse a number the way a lenient numeric check would: numbers and numeric strings only.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if NUMERIC.is_match(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn to_integer(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Value::Number(n.clone()),
        Value::String(s) => match s.trim().parse::<i64>() {
            Ok(i) => Value::from(i),
            Err(_) => numeric(value)
                .map(|f| Value::from(f.trunc() as i64))
                .unwrap_or(Value::Null),
        },
        _ => numeric(value)
            .map(|f| Value::from(f.trunc() as i64))
            .unwrap_or(Value::Null),
    }
}

fn to_float(value: &Value) -> Value {
    numeric(value).map(Value::from).unwrap_or(Value::Null)
}

fn to_boolean(value: &Value) -> Value {
    let truthy = match value {
        Value::Null => return Value::Null,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !(s.is_empty() || s == "0" || s == "N"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    };
    Value::Bool(truthy)
}
