//! Elasticsearch query DSL types
//!
//! Only the subset the filter and sort compilers emit.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EsQuery {
    MatchAll(MatchAllQuery),

    /// Exact match on one field
    Term(HashMap<String, Value>),

    /// Exact match against any of several values
    Terms(HashMap<String, Vec<Value>>),

    Range(HashMap<String, RangeParams>),

    /// Pattern match, `*` and `?` wildcards
    Wildcard(HashMap<String, Value>),

    Exists(ExistsQuery),

    Bool(BoolQuery),
}

impl EsQuery {
    pub fn match_all() -> Self {
        Self::MatchAll(MatchAllQuery::default())
    }

    pub fn term(field: impl Into<String>, value: Value) -> Self {
        Self::Term(HashMap::from([(field.into(), value)]))
    }

    pub fn terms(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::Terms(HashMap::from([(field.into(), values)]))
    }

    pub fn range(field: impl Into<String>, params: RangeParams) -> Self {
        Self::Range(HashMap::from([(field.into(), params)]))
    }

    pub fn wildcard(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Wildcard(HashMap::from([(field.into(), Value::String(pattern.into()))]))
    }

    pub fn exists(field: impl Into<String>) -> Self {
        Self::Exists(ExistsQuery {
            field: field.into(),
        })
    }

    /// `{"bool": {"must_not": [query]}}`
    pub fn not(query: EsQuery) -> Self {
        Self::Bool(BoolQuery {
            must_not: vec![query],
            ..Default::default()
        })
    }

    pub fn is_match_all(&self) -> bool {
        matches!(self, Self::MatchAll(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchAllQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boost: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistsQuery {
    pub field: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<Value>,
}

impl RangeParams {
    pub fn between(min: Value, max: Value) -> Self {
        Self {
            gte: Some(min),
            lte: Some(max),
            ..Default::default()
        }
    }

    pub fn gt(value: Value) -> Self {
        Self {
            gt: Some(value),
            ..Default::default()
        }
    }

    pub fn gte(value: Value) -> Self {
        Self {
            gte: Some(value),
            ..Default::default()
        }
    }

    pub fn lt(value: Value) -> Self {
        Self {
            lt: Some(value),
            ..Default::default()
        }
    }

    pub fn lte(value: Value) -> Self {
        Self {
            lte: Some(value),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoolQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<EsQuery>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<EsQuery>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<EsQuery>,
}

impl BoolQuery {
    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty() && self.must_not.is_empty()
    }
}

/// Clause list a compiled condition joins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occur {
    Must,
    Should,
    MustNot,
}

/// Accumulates clauses into typed `must` / `should` / `must_not` lists
#[derive(Debug, Default)]
pub struct BoolQueryBuilder {
    query: BoolQuery,
}

impl BoolQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, occur: Occur, clause: EsQuery) {
        match occur {
            Occur::Must => self.query.must.push(clause),
            Occur::Should => self.query.should.push(clause),
            Occur::MustNot => self.query.must_not.push(clause),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// The accumulated bool query, or `match_all` when nothing was added
    pub fn build(self) -> EsQuery {
        if self.query.is_empty() {
            EsQuery::match_all()
        } else {
            EsQuery::Bool(self.query)
        }
    }
}

/// Sort order of a single clause
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Where documents without a value go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Missing {
    #[serde(rename = "_first")]
    First,
    #[serde(rename = "_last")]
    Last,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSort {
    pub order: SortOrder,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing: Option<Missing>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub lang: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub params: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptSort {
    #[serde(rename = "type")]
    pub sort_type: String,
    pub script: Script,
    pub order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SortClause {
    Script {
        #[serde(rename = "_script")]
        script: ScriptSort,
    },
    Field(HashMap<String, FieldSort>),
}

impl SortClause {
    pub fn field(field: impl Into<String>, order: SortOrder, missing: Option<Missing>) -> Self {
        Self::Field(HashMap::from([(field.into(), FieldSort { order, missing })]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leaf_shapes() {
        assert_eq!(
            serde_json::to_value(EsQuery::term("ID", json!(1))).unwrap(),
            json!({"term": {"ID": 1}})
        );
        assert_eq!(
            serde_json::to_value(EsQuery::terms("ID", vec![json!(1), json!(2)])).unwrap(),
            json!({"terms": {"ID": [1, 2]}})
        );
        assert_eq!(
            serde_json::to_value(EsQuery::exists("ID")).unwrap(),
            json!({"exists": {"field": "ID"}})
        );
        assert_eq!(
            serde_json::to_value(EsQuery::range("PRICE", RangeParams::gte(json!(10))))
                .unwrap(),
            json!({"range": {"PRICE": {"gte": 10}}})
        );
        assert_eq!(
            serde_json::to_value(EsQuery::wildcard("NAME", "*foo*")).unwrap(),
            json!({"wildcard": {"NAME": "*foo*"}})
        );
    }

    #[test]
    fn test_empty_builder_is_match_all() {
        let query = BoolQueryBuilder::new().build();
        assert_eq!(serde_json::to_value(query).unwrap(), json!({"match_all": {}}));
    }

    #[test]
    fn test_builder_appends_per_list() {
        let mut builder = BoolQueryBuilder::new();
        builder.push(Occur::Must, EsQuery::term("A", json!(1)));
        builder.push(Occur::MustNot, EsQuery::exists("B"));
        builder.push(Occur::Must, EsQuery::term("C", json!(3)));
        assert_eq!(
            serde_json::to_value(builder.build()).unwrap(),
            json!({"bool": {
                "must": [{"term": {"A": 1}}, {"term": {"C": 3}}],
                "must_not": [{"exists": {"field": "B"}}]
            }})
        );
    }

    #[test]
    fn test_sort_clause_shapes() {
        let clause = SortClause::field("PRICE", SortOrder::Asc, Some(Missing::First));
        assert_eq!(
            serde_json::to_value(clause).unwrap(),
            json!({"PRICE": {"order": "asc", "missing": "_first"}})
        );

        let clause = SortClause::field("ID", SortOrder::Desc, None);
        assert_eq!(
            serde_json::to_value(clause).unwrap(),
            json!({"ID": {"order": "desc"}})
        );
    }

    #[test]
    fn test_query_deserializes() {
        let query: EsQuery = serde_json::from_value(json!({
            "bool": {"should": [{"term": {"A": 1}}, {"match_all": {}}]}
        }))
        .unwrap();
        match query {
            EsQuery::Bool(b) => {
                assert_eq!(b.should.len(), 2);
                assert!(b.should[1].is_match_all());
            }
            other => panic!("expected bool, got {other:?}"),
        }
    }
}
