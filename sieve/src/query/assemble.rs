use super::dsl::{EsQuery, SortClause};
use crate::{Error, Result};
use serde::Serialize;
use serde_json::{Map, Value};

/// A search request ready for execution: the target index and the request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub index: String,
    pub body: Map<String, Value>,
}

impl CompiledQuery {
    pub fn query(&self) -> Option<&Value> {
        self.body.get("query")
    }

    pub fn sort(&self) -> Option<&Value> {
        self.body.get("sort")
    }

    /// `{"index": ..., "body": {...}}`
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        out.insert("index".to_string(), Value::String(self.index.clone()));
        out.insert("body".to_string(), Value::Object(self.body.clone()));
        Value::Object(out)
    }
}

/// Merges a compiled filter, compiled sort and caller options into one request
pub struct QueryAssembler;

impl QueryAssembler {
    /// Build `{index, body: {query, sort}}` and lay `options` over it.
    ///
    /// A string `index` in options replaces the target index and an object
    /// `body` replaces the whole body. Every other key, including an `index`
    /// or `body` of another shape, is set on the body as given, overriding
    /// computed keys such as `query` or `sort`. An empty sort leaves `sort` out.
    pub fn assemble(
        index: &str,
        query: &EsQuery,
        sort: &[SortClause],
        options: &Map<String, Value>,
    ) -> Result<CompiledQuery> {
        let mut body = Map::new();
        body.insert("query".to_string(), encode(query)?);
        if !sort.is_empty() {
            body.insert("sort".to_string(), encode(sort)?);
        }

        let mut compiled = CompiledQuery {
            index: index.to_string(),
            body,
        };

        for (key, value) in options {
            match (key.as_str(), value) {
                ("index", Value::String(index)) => compiled.index = index.clone(),
                ("body", Value::Object(body)) => compiled.body = body.clone(),
                _ => {
                    compiled.body.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(compiled)
    }
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| Error::InvalidOperation(format!("cannot encode query: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::dsl::SortOrder;
    use serde_json::json;

    fn options(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_assemble_query_and_sort() {
        let compiled = QueryAssembler::assemble(
            "products",
            &EsQuery::term("ID", json!(1)),
            &[SortClause::field("ID", SortOrder::Desc, None)],
            &Map::new(),
        )
        .unwrap();
        assert_eq!(
            compiled.to_value(),
            json!({
                "index": "products",
                "body": {
                    "query": {"term": {"ID": 1}},
                    "sort": [{"ID": {"order": "desc"}}]
                }
            })
        );
    }

    #[test]
    fn test_empty_sort_is_omitted() {
        let compiled =
            QueryAssembler::assemble("products", &EsQuery::match_all(), &[], &Map::new()).unwrap();
        assert!(compiled.sort().is_none());
        assert_eq!(compiled.query(), Some(&json!({"match_all": {}})));
    }

    #[test]
    fn test_options_override_computed_keys() {
        let compiled = QueryAssembler::assemble(
            "products",
            &EsQuery::match_all(),
            &[SortClause::field("ID", SortOrder::Asc, None)],
            &options(json!({"size": 20, "from": 40, "sort": ["_score"], "index": "archive"})),
        )
        .unwrap();
        assert_eq!(compiled.index, "archive");
        assert_eq!(compiled.body["size"], json!(20));
        assert_eq!(compiled.body["from"], json!(40));
        assert_eq!(compiled.sort(), Some(&json!(["_score"])));
    }

    #[test]
    fn test_body_option_replaces_body() {
        let compiled = QueryAssembler::assemble(
            "products",
            &EsQuery::match_all(),
            &[],
            &options(json!({"body": {"query": {"match_all": {}}, "size": 1}})),
        )
        .unwrap();
        assert_eq!(
            Value::Object(compiled.body),
            json!({"query": {"match_all": {}}, "size": 1})
        );
    }

    #[test]
    fn test_options_are_not_validated() {
        let compiled = QueryAssembler::assemble(
            "products",
            &EsQuery::match_all(),
            &[],
            &options(json!({"index": 5, "body": "raw", "size": "ten"})),
        )
        .unwrap();
        assert_eq!(compiled.index, "products");
        assert_eq!(
            Value::Object(compiled.body),
            json!({"query": {"match_all": {}}, "index": 5, "body": "raw", "size": "ten"})
        );
    }
}
