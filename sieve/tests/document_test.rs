//! Turning raw catalog records into index documents.

use serde_json::{json, Value};
use sieve::schema::{CatalogDescription, CatalogProperty, CatalogSchema, SchemaMap};
use sieve::Error;

fn schema() -> SchemaMap {
    CatalogSchema::from_description(CatalogDescription {
        properties: vec![
            CatalogProperty::new(30, "SIZE", "N"),
            CatalogProperty::new(31, "TAGS_LIST", "L"),
        ],
        stores: vec![4],
        price_groups: vec![],
    })
    .build()
    .unwrap()
}

#[test]
fn test_record_becomes_document() {
    let record = json!({
        "ID": "101",
        "NAME": "Trail boot",
        "ACTIVE": "Y",
        "DATE_CREATE": "14.06.2019 12:30:01",
        "PREVIEW_TEXT": {"TYPE": "html", "TEXT": "<b>Warm</b>"},
        "PROPERTY_SIZE": ["42", "43.5"],
        "PROPERTY_TAGS_LIST": [5, 6],
        "PROPERTY_TAGS_LIST_VALUE": ["winter", "outdoor"],
        "GROUP_IDS": [1, 3],
        "CATALOG_STORE_AMOUNT_4": "12",
        "EXTERNAL_ID": "ignored"
    });

    let doc = schema()
        .normalize_document(record.as_object().unwrap())
        .unwrap();

    assert_eq!(doc["ID"], json!(101));
    assert_eq!(doc["NAME"], json!("Trail boot"));
    assert_eq!(doc["ACTIVE"], json!(true));
    assert_eq!(doc["DATE_CREATE"], json!("2019-06-14 12:30:01"));
    assert_eq!(doc["PREVIEW_TEXT"], json!("<b>Warm</b>"));
    assert_eq!(doc["PROPERTY_SIZE"], json!([42.0, 43.5]));
    assert_eq!(doc["PROPERTY_TAGS_LIST"], json!([5, 6]));
    assert_eq!(doc["PROPERTY_TAGS_LIST_VALUE"], json!(["winter", "outdoor"]));
    assert_eq!(doc["CATALOG_STORE_AMOUNT_4"], json!(12));

    // aliases carry no data
    assert!(!doc.contains_key("EXTERNAL_ID"));
    assert!(!doc.contains_key("PROPERTY_30"));
    // absent fields are present as null
    assert_eq!(doc["XML_ID"], Value::Null);
}

#[test]
fn test_bad_date_fails_the_document() {
    let record = json!({"ACTIVE_FROM": "not a date"});
    let err = schema()
        .normalize_document(record.as_object().unwrap())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidOperation(_)));
}

#[test]
fn test_mapping_body() {
    let mapping = schema().to_mapping();
    let properties = mapping["properties"].as_object().unwrap();
    assert_eq!(properties["PROPERTY_30"], json!({"type": "alias", "path": "PROPERTY_SIZE"}));
    assert_eq!(
        properties["PROPERTY_TAGS_LIST"],
        json!({"type": "integer", "fields": {"enum": {"type": "integer"}}})
    );
    assert_eq!(
        properties["TIMESTAMP_X"],
        json!({"type": "date", "format": "yyyy-MM-dd HH:mm:ss||yyyy-MM-dd"})
    );
}
