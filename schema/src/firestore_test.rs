use super::*;
use serde_json::json;

#[test]
fn encode_tags_integers_as_strings_and_floats_as_doubles() {
    assert_eq!(encode_value(&json!(3)), json!({ "integerValue": "3" }));
    assert_eq!(encode_value(&json!(2.5)), json!({ "doubleValue": 2.5 }));
    assert_eq!(encode_value(&json!(null)), json!({ "nullValue": null }));
}

#[test]
fn encode_nests_maps_and_arrays() {
    let encoded = encode_value(&json!({ "scores": { "g1": 4 }, "tags": ["a"] }));
    assert_eq!(
        encoded,
        json!({
            "mapValue": { "fields": {
                "scores": { "mapValue": { "fields": { "g1": { "integerValue": "4" } } } },
                "tags": { "arrayValue": { "values": [{ "stringValue": "a" }] } }
            }}
        })
    );
}

#[test]
fn decode_accepts_rest_shapes() {
    assert_eq!(decode_value(&json!({ "integerValue": "42" })).unwrap(), json!(42));
    assert_eq!(decode_value(&json!({ "timestampValue": "2026-01-01T00:00:00Z" })).unwrap(), json!("2026-01-01T00:00:00Z"));
    assert_eq!(decode_value(&json!({ "arrayValue": {} })).unwrap(), json!([]));
    assert_eq!(decode_value(&json!({ "mapValue": {} })).unwrap(), json!({}));
}

#[test]
fn decode_rejects_unknown_tags_and_bad_integers() {
    assert_eq!(
        decode_value(&json!({ "mysteryValue": 1 })),
        Err(CodecError::UnsupportedValue("mysteryValue".to_owned()))
    );
    assert_eq!(
        decode_value(&json!({ "integerValue": "abc" })),
        Err(CodecError::InvalidInteger("abc".to_owned()))
    );
    assert!(decode_value(&json!("bare")).is_err());
}

#[test]
fn document_from_rest_injects_id() {
    let raw = json!({
        "name": "projects/p/databases/(default)/documents/users/u-1",
        "fields": { "email": { "stringValue": "a@b.com" } },
        "createTime": "2026-01-01T00:00:00Z"
    });
    let doc = Document::from_rest(&raw).unwrap();
    assert_eq!(doc.id(), "u-1");
    assert_eq!(doc.into_json(), json!({ "id": "u-1", "email": "a@b.com" }));
}

#[test]
fn document_without_name_is_rejected() {
    assert_eq!(Document::from_rest(&json!({ "fields": {} })), Err(CodecError::MissingField("name")));
}

#[test]
fn equality_query_uses_single_filter_or_composite() {
    let single = equality_query("goals", &[("tenantId".to_owned(), json!("t1"))]);
    assert_eq!(single["structuredQuery"]["where"]["fieldFilter"]["op"], "EQUAL");

    let composite = equality_query(
        "goals",
        &[("tenantId".to_owned(), json!("t1")), ("status".to_owned(), json!("pending"))],
    );
    let filters = &composite["structuredQuery"]["where"]["compositeFilter"]["filters"];
    assert_eq!(filters.as_array().map(Vec::len), Some(2));

    let unfiltered = equality_query("tenants", &[]);
    assert!(unfiltered["structuredQuery"].get("where").is_none());
    assert_eq!(unfiltered["structuredQuery"]["from"][0]["collectionId"], "tenants");
}

#[test]
fn query_response_skips_read_time_markers() {
    let raw = json!([
        { "document": { "name": "projects/p/databases/(default)/documents/goals/g1", "fields": {} }, "readTime": "t" },
        { "readTime": "t" }
    ]);
    let docs = parse_query_response(&raw).unwrap();
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id(), "g1");
}

#[test]
fn urls_and_update_mask() {
    assert_eq!(
        document_url(API_BASE, "demo", "users", "u1"),
        "https://firestore.googleapis.com/v1/projects/demo/databases/(default)/documents/users/u1"
    );
    assert_eq!(
        documents_url("http://localhost:8080/v1/", "demo"),
        "http://localhost:8080/v1/projects/demo/databases/(default)/documents"
    );
    assert_eq!(
        update_mask_query(["status", "tenantId"]),
        "updateMask.fieldPaths=status&updateMask.fieldPaths=tenantId"
    );
}
