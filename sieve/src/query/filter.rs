//! Filter compiler
//!
//! A raw filter is an ordered JSON object. Keys are filter keys (`>=PRICE`,
//! `!ACTIVE`, ...) and values are the raw values to compare with. A value
//! that is itself an object with a `LOGIC` key is a nested group; its other
//! keys are the group's entries and its own key is ignored.
//!
//! ```text
//! {"ACTIVE": "Y", "any": {"LOGIC": "OR", "%NAME": "shoe", "<PRICE": 100}}
//! ```
//!
//! Compilation runs in two passes. [`FilterCompiler::normalize`] resolves
//! every key against the schema and normalizes every value into a
//! [`FilterGroup`] tree; [`FilterCompiler::compile_tree`] turns that tree
//! into a bool query.

use super::dsl::{BoolQueryBuilder, EsQuery, Occur, RangeParams};
use super::key::{FilterKey, Operator};
use super::node::{FilterGroup, FilterLeaf, FilterNode, Logic, LOGIC_KEY};
use super::preprocess::HierarchyFields;
use super::skip_or_fail;
use crate::schema::SchemaMap;
use crate::{Error, Result};
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::cmp::Ordering;

/// Compiles raw filters into bool queries.
///
/// In strict mode the first error aborts the compile. In lenient mode the
/// offending entry is logged and left out, and compilation always succeeds.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    strict: bool,
    hierarchy: Option<HierarchyFields>,
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl FilterCompiler {
    pub fn new(strict: bool) -> Self {
        Self {
            strict,
            hierarchy: Some(HierarchyFields::default()),
        }
    }

    pub fn strict() -> Self {
        Self::new(true)
    }

    pub fn lenient() -> Self {
        Self::new(false)
    }

    /// Rewrite hierarchy scope keys using these field names
    pub fn with_hierarchy(mut self, fields: HierarchyFields) -> Self {
        self.hierarchy = Some(fields);
        self
    }

    /// Skip hierarchy scope rewriting entirely
    pub fn without_hierarchy(mut self) -> Self {
        self.hierarchy = None;
        self
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Compile a raw filter into a query. An empty filter yields `match_all`.
    pub fn compile(&self, schema: &SchemaMap, filter: &Map<String, Value>) -> Result<EsQuery> {
        let tree = self.normalize(schema, filter)?;
        let query = self.compile_tree(&tree)?;
        tracing::debug!(
            entries = filter.len(),
            leaves = tree.children.iter().map(FilterNode::leaf_count).sum::<usize>(),
            match_all = query.is_match_all(),
            "compiled filter"
        );
        Ok(query)
    }

    /// Resolve and normalize a raw filter into a tree rooted at an AND group.
    ///
    /// Hierarchy rewriting applies to the top level only.
    pub fn normalize(&self, schema: &SchemaMap, filter: &Map<String, Value>) -> Result<FilterGroup> {
        let filter = match &self.hierarchy {
            Some(fields) => Cow::Owned(fields.rewrite(filter)),
            None => Cow::Borrowed(filter),
        };
        self.normalize_group(schema, Logic::And, &filter)
    }

    fn normalize_group(
        &self,
        schema: &SchemaMap,
        logic: Logic,
        entries: &Map<String, Value>,
    ) -> Result<FilterGroup> {
        let mut group = FilterGroup::new(logic);

        for (key, value) in entries {
            if let Some((sub, marker)) = group_marker(value) {
                let child = Logic::parse(marker).and_then(|logic| {
                    let rest: Map<String, Value> = sub
                        .iter()
                        .filter(|(k, _)| k.as_str() != LOGIC_KEY)
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    self.normalize_group(schema, logic, &rest)
                });
                if let Some(child) = skip_or_fail(self.strict, "filter group", key, child)? {
                    group.children.push(FilterNode::Group(child));
                }
                continue;
            }

            let leaf = normalize_leaf(schema, key, value);
            if let Some(leaf) = skip_or_fail(self.strict, "filter entry", key, leaf)? {
                group.children.push(FilterNode::Leaf(leaf));
            }
        }

        Ok(group)
    }

    /// Compile an already normalized tree.
    ///
    /// Nested groups become nested bool clauses in the parent's `must`
    /// (AND) or `should` (OR) list; they are never flattened.
    pub fn compile_tree(&self, group: &FilterGroup) -> Result<EsQuery> {
        let mut builder = BoolQueryBuilder::new();

        for child in &group.children {
            match child {
                FilterNode::Group(sub) => {
                    builder.push(occur(group.logic), self.compile_tree(sub)?);
                }
                FilterNode::Leaf(leaf) => {
                    let entry = FilterKey::new(leaf.operator, leaf.field.as_str()).to_string();
                    let clause = compile_leaf(leaf, group.logic);
                    if let Some((occur, clause)) =
                        skip_or_fail(self.strict, "filter entry", &entry, clause)?
                    {
                        builder.push(occur, clause);
                    }
                }
            }
        }

        Ok(builder.build())
    }
}

fn group_marker(value: &Value) -> Option<(&Map<String, Value>, &Value)> {
    let sub = value.as_object()?;
    Some((sub, sub.get(LOGIC_KEY)?))
}

fn normalize_leaf(schema: &SchemaMap, key: &str, value: &Value) -> Result<FilterLeaf> {
    let key = FilterKey::parse(key)?;
    let field = schema.resolve_alias(&key.field)?;
    let property = schema.get(field)?;
    Ok(FilterLeaf {
        operator: key.operator,
        field: field.to_string(),
        kind: property.kind().clone(),
        value: property.normalize(value)?,
    })
}

fn occur(logic: Logic) -> Occur {
    match logic {
        Logic::And => Occur::Must,
        Logic::Or => Occur::Should,
    }
}

/// Compile one condition into the clause list it joins.
///
/// Negations under OR stay inside their `should` alternative as a nested
/// `must_not` instead of being hoisted to the parent's `must_not`.
fn compile_leaf(leaf: &FilterLeaf, logic: Logic) -> Result<(Occur, EsQuery)> {
    let field = leaf.field.as_str();
    let positive = |query| (occur(logic), query);
    let negative = |query| match logic {
        Logic::And => (Occur::MustNot, query),
        Logic::Or => (Occur::Should, EsQuery::not(query)),
    };

    Ok(match leaf.operator {
        Operator::Equals if leaf.is_empty_value() => negative(EsQuery::exists(field)),
        Operator::Equals => positive(match_value(field, &leaf.value)),
        Operator::NotEquals if leaf.is_empty_value() => positive(EsQuery::exists(field)),
        Operator::NotEquals => negative(match_value(field, &leaf.value)),
        Operator::Contains => {
            let needle = match single_value(leaf)? {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            positive(EsQuery::wildcard(field, format!("*{needle}*")))
        }
        Operator::Gt => positive(range(leaf, RangeParams::gt)?),
        Operator::Gte => positive(range(leaf, RangeParams::gte)?),
        Operator::Lt => positive(range(leaf, RangeParams::lt)?),
        Operator::Lte => positive(range(leaf, RangeParams::lte)?),
        Operator::Between => positive(EsQuery::range(field, between(leaf)?)),
    })
}

fn match_value(field: &str, value: &Value) -> EsQuery {
    match value {
        Value::Array(items) => EsQuery::terms(field, items.clone()),
        other => EsQuery::term(field, other.clone()),
    }
}

fn range(leaf: &FilterLeaf, bound: fn(Value) -> RangeParams) -> Result<EsQuery> {
    let value = single_value(leaf)?.clone();
    Ok(EsQuery::range(leaf.field.as_str(), bound(value)))
}

fn single_value(leaf: &FilterLeaf) -> Result<&Value> {
    match &leaf.value {
        Value::Null | Value::Array(_) | Value::Object(_) => Err(Error::InvalidOperation(format!(
            "{}{} requires a single non-null value",
            leaf.operator, leaf.field
        ))),
        value => Ok(value),
    }
}

/// Inclusive range over the smaller and larger of exactly two values
fn between(leaf: &FilterLeaf) -> Result<RangeParams> {
    let pair: &[Value] = match &leaf.value {
        Value::Array(items) => items.as_slice(),
        _ => &[],
    };
    let [a, b] = pair else {
        return Err(Error::InvalidOperation(
            "between filter requires a two-element array".to_string(),
        ));
    };

    let ordering = compare(a, b).ok_or_else(|| {
        Error::InvalidOperation(format!(
            "between filter on {} cannot order {a} and {b}",
            leaf.field
        ))
    })?;

    let (min, max) = match ordering {
        Ordering::Greater => (b, a),
        _ => (a, b),
    };
    Ok(RangeParams::between(min.clone(), max.clone()))
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}
