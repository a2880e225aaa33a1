//! Filter key grammar: an optional non-word operator prefix followed by the field name

use crate::{Error, Result};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static FILTER_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\W*)(\w+)$").expect("valid regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `=` or no prefix
    Equals,
    /// `!`
    NotEquals,
    /// `%`, substring match
    Contains,
    /// `>`
    Gt,
    /// `>=`
    Gte,
    /// `<`
    Lt,
    /// `<=`
    Lte,
    /// `><`, inclusive range over a two-element array
    Between,
}

impl Operator {
    pub fn parse(prefix: &str) -> Option<Self> {
        Some(match prefix {
            "" | "=" => Self::Equals,
            "!" => Self::NotEquals,
            "%" => Self::Contains,
            ">" => Self::Gt,
            ">=" => Self::Gte,
            "<" => Self::Lt,
            "<=" => Self::Lte,
            "><" => Self::Between,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEquals => "!",
            Self::Contains => "%",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Between => "><",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed filter key, e.g. `>=PRICE` or `!ACTIVE`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterKey {
    pub operator: Operator,
    pub field: String,
}

impl FilterKey {
    pub fn new(operator: Operator, field: impl Into<String>) -> Self {
        Self {
            operator,
            field: field.into(),
        }
    }

    pub fn parse(key: &str) -> Result<Self> {
        let (prefix, field) =
            split(key).ok_or_else(|| Error::InvalidFilterKey(key.to_string()))?;
        let operator = Operator::parse(prefix).ok_or_else(|| Error::InvalidOperator {
            field: field.to_string(),
            operator: prefix.to_string(),
        })?;
        Ok(Self::new(operator, field))
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.operator {
            Operator::Equals => f.write_str(&self.field),
            op => write!(f, "{op}{}", self.field),
        }
    }
}

/// Split a raw key into its operator prefix and field name without
/// validating the prefix.
pub(crate) fn split(key: &str) -> Option<(&str, &str)> {
    let caps = FILTER_KEY.captures(key)?;
    let prefix = caps.get(1).map_or("", |m| m.as_str());
    let field = caps.get(2)?.as_str();
    Some((prefix, field))
}
