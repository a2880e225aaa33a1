//! Property tests for value normalization and lenient compilation.
//!
//! Normalizing an already normalized value must give it back unchanged, and
//! a lenient compiler must produce a query for any filter whatsoever.

use proptest::prelude::*;
use serde_json::{json, Map, Value};
use sieve::query::{FilterCompiler, SortCompiler};
use sieve::schema::{PropertyKind, PropertyType, SchemaMap};

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|i| json!(i)),
        (-1.0e6f64..1.0e6).prop_map(|f| json!(f)),
        "[ -~]{0,16}".prop_map(Value::String),
        "-?[0-9]{1,6}(\\.[0-9]{1,3})?".prop_map(Value::String),
    ]
}

fn raw_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => scalar(),
        1 => prop::collection::vec(scalar(), 0..4).prop_map(Value::Array),
    ]
}

fn kind() -> impl Strategy<Value = PropertyKind> {
    prop_oneof![
        Just(PropertyKind::Keyword),
        Just(PropertyKind::Text),
        Just(PropertyKind::Integer),
        Just(PropertyKind::Long),
        Just(PropertyKind::Float),
        Just(PropertyKind::Double),
        Just(PropertyKind::Boolean),
    ]
}

fn filter_key() -> impl Strategy<Value = String> {
    let prefix = prop_oneof![
        Just(""),
        Just("="),
        Just("!"),
        Just("%"),
        Just(">"),
        Just(">="),
        Just("<"),
        Just("<="),
        Just("><"),
        Just("=>"),
        Just("~"),
    ];
    let field = prop_oneof![
        Just("ID"),
        Just("NAME"),
        Just("PRICE"),
        Just("ACTIVE"),
        Just("DATE_CREATE"),
        Just("EXTERNAL_ID"),
        Just("BROKEN"),
        Just("MISSING"),
        Just(""),
    ];
    (prefix, field).prop_map(|(p, f)| format!("{p}{f}"))
}

fn filter() -> impl Strategy<Value = Map<String, Value>> {
    let leaves = || prop::collection::vec((filter_key(), raw_value()), 0..6);
    let logic = prop_oneof![Just("AND"), Just("or"), Just("XOR")];
    (leaves(), prop::option::of((logic, leaves()))).prop_map(|(top, group)| {
        let mut map: Map<String, Value> = top.into_iter().collect();
        if let Some((logic, entries)) = group {
            let mut sub: Map<String, Value> = entries.into_iter().collect();
            sub.insert("LOGIC".to_string(), json!(logic));
            map.insert("group".to_string(), Value::Object(sub));
        }
        map
    })
}

fn schema() -> SchemaMap {
    SchemaMap::new()
        .with("ID", PropertyKind::Integer)
        .with("NAME", PropertyKind::Keyword)
        .with("PRICE", PropertyKind::Float)
        .with("ACTIVE", PropertyKind::Boolean)
        .with("DATE_CREATE", PropertyKind::Date)
        .with("XML_ID", PropertyKind::Keyword)
        .with("EXTERNAL_ID", PropertyType::alias("XML_ID"))
        .with("BROKEN", PropertyType::new(PropertyKind::Alias))
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_normalization_is_idempotent(kind in kind(), value in raw_value()) {
        let property = PropertyType::new(kind);
        if let Ok(once) = property.normalize(&value) {
            let twice = property.normalize(&once).unwrap();
            prop_assert_eq!(twice, once);
        }
    }

    #[test]
    fn test_null_stays_null(kind in kind()) {
        let property = PropertyType::new(kind);
        prop_assert_eq!(property.normalize(&Value::Null).unwrap(), Value::Null);
    }

    #[test]
    fn test_arrays_keep_length(kind in kind(), items in prop::collection::vec(scalar(), 0..8)) {
        let property = PropertyType::new(kind);
        if let Ok(Value::Array(out)) = property.normalize(&Value::Array(items.clone())) {
            prop_assert_eq!(out.len(), items.len());
        }
    }

    #[test]
    fn test_date_normalization_is_idempotent(secs in 1i64..4_000_000_000) {
        let property = PropertyType::new(PropertyKind::Date);
        let once = property.normalize(&json!(secs)).unwrap();
        prop_assert_eq!(property.normalize(&once).unwrap(), once);
    }

    #[test]
    fn test_lenient_filter_never_fails(filter in filter()) {
        let result = FilterCompiler::lenient().compile(&schema(), &filter);
        prop_assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_lenient_sort_never_fails(
        pairs in prop::collection::vec((filter_key(), "[ a-zA-Z,]{0,12}"), 0..5)
    ) {
        let result = SortCompiler::new(false).compile(&schema(), pairs);
        prop_assert!(result.is_ok(), "{:?}", result);
    }
}
