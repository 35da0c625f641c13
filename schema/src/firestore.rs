//! Firestore v1 REST wire format.
//!
//! The REST API wraps every value in a single-key type tag
//! (`{"stringValue": "x"}`, `{"integerValue": "3"}`, ...). Records in this
//! crate are plain serde structs, so stores convert between the tagged form
//! and plain `serde_json::Value` at the boundary with [`encode_fields`] and
//! [`decode_fields`].

use serde_json::{Map, Number, Value};

/// Firestore REST API root. The local emulator serves the same paths under
/// `http://<host>:8080/v1`.
pub const API_BASE: &str = "https://firestore.googleapis.com/v1";

/// Error returned when a REST payload does not match the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error("unsupported firestore value: {0}")]
    UnsupportedValue(String),
    #[error("invalid integerValue: {0}")]
    InvalidInteger(String),
    #[error("document is missing `{0}`")]
    MissingField(&'static str),
}

// =============================================================================
// PATHS
// =============================================================================

/// Resource path of the default database's document root.
#[must_use]
pub fn database_path(project_id: &str) -> String {
    format!("projects/{project_id}/databases/(default)/documents")
}

/// Absolute URL of the document root under `api_base`.
#[must_use]
pub fn documents_url(api_base: &str, project_id: &str) -> String {
    format!("{}/{}", api_base.trim_end_matches('/'), database_path(project_id))
}

/// Absolute URL of a single document under `api_base`.
#[must_use]
pub fn document_url(api_base: &str, project_id: &str, collection: &str, id: &str) -> String {
    format!("{}/{collection}/{id}", documents_url(api_base, project_id))
}

/// Query string restricting a PATCH to the given top-level fields.
#[must_use]
pub fn update_mask_query<'a>(paths: impl IntoIterator<Item = &'a str>) -> String {
    paths
        .into_iter()
        .map(|path| format!("updateMask.fieldPaths={path}"))
        .collect::<Vec<_>>()
        .join("&")
}

// =============================================================================
// VALUE CODEC
// =============================================================================

/// Wrap a plain JSON value in Firestore's type tags.
#[must_use]
pub fn encode_value(value: &Value) -> Value {
    let (tag, inner) = match value {
        Value::Null => ("nullValue", Value::Null),
        Value::Bool(v) => ("booleanValue", Value::Bool(*v)),
        Value::Number(v) => {
            if let Some(i) = v.as_i64() {
                ("integerValue", Value::String(i.to_string()))
            } else if let Some(u) = v.as_u64() {
                ("integerValue", Value::String(u.to_string()))
            } else {
                ("doubleValue", Value::Number(v.clone()))
            }
        }
        Value::String(v) => ("stringValue", Value::String(v.clone())),
        Value::Array(v) => (
            "arrayValue",
            serde_json::json!({ "values": v.iter().map(encode_value).collect::<Vec<_>>() }),
        ),
        Value::Object(v) => ("mapValue", serde_json::json!({ "fields": encode_fields(v) })),
    };

    let mut tagged = Map::new();
    tagged.insert(tag.to_owned(), inner);
    Value::Object(tagged)
}

/// Strip Firestore's type tags from a value.
///
/// # Errors
///
/// Returns [`CodecError`] for unknown tags or malformed integers.
pub fn decode_value(value: &Value) -> Result<Value, CodecError> {
    let Some((tag, inner)) = value.as_object().and_then(|o| o.iter().next()) else {
        return Err(CodecError::UnsupportedValue(value.to_string()));
    };

    match tag.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(Value::Bool(inner.as_bool().unwrap_or(false))),
        "integerValue" => decode_integer(inner),
        "doubleValue" => Ok(inner
            .as_f64()
            .and_then(Number::from_f64)
            .map_or(Value::Null, Value::Number)),
        "stringValue" | "timestampValue" | "referenceValue" | "bytesValue" => {
            Ok(Value::String(inner.as_str().unwrap_or_default().to_owned()))
        }
        "geoPointValue" => Ok(inner.clone()),
        "arrayValue" => {
            let values = inner
                .get("values")
                .and_then(Value::as_array)
                .map(|values| values.iter().map(decode_value).collect::<Result<Vec<_>, _>>())
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Array(values))
        }
        "mapValue" => {
            let fields = inner
                .get("fields")
                .and_then(Value::as_object)
                .map(decode_fields)
                .transpose()?
                .unwrap_or_default();
            Ok(Value::Object(fields))
        }
        other => Err(CodecError::UnsupportedValue(other.to_owned())),
    }
}

fn decode_integer(inner: &Value) -> Result<Value, CodecError> {
    if let Some(n) = inner.as_i64() {
        return Ok(Value::from(n));
    }
    let raw = inner.as_str().unwrap_or_default();
    raw.parse::<i64>()
        .map(Value::from)
        .map_err(|_| CodecError::InvalidInteger(raw.to_owned()))
}

/// Encode every field of a plain JSON object.
#[must_use]
pub fn encode_fields(fields: &Map<String, Value>) -> Map<String, Value> {
    fields.iter().map(|(k, v)| (k.clone(), encode_value(v))).collect()
}

/// Decode every field of a tagged `fields` object.
///
/// # Errors
///
/// Returns the first [`CodecError`] encountered.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, CodecError> {
    fields
        .iter()
        .map(|(k, v)| decode_value(v).map(|v| (k.clone(), v)))
        .collect()
}

/// Request body for a document write: `{"fields": {...}}`.
#[must_use]
pub fn document_body(fields: &Map<String, Value>) -> Value {
    serde_json::json!({ "fields": encode_fields(fields) })
}

// =============================================================================
// DOCUMENTS & QUERIES
// =============================================================================

/// A decoded REST document.
#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    /// Full resource name, e.g. `projects/p/databases/(default)/documents/users/u1`.
    pub name: String,
    /// Decoded (untagged) fields.
    pub fields: Map<String, Value>,
}

impl Document {
    /// Decode a REST document resource.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::MissingField`] when `name` is absent, or a value
    /// decode error.
    pub fn from_rest(raw: &Value) -> Result<Self, CodecError> {
        let name = raw
            .get("name")
            .and_then(Value::as_str)
            .ok_or(CodecError::MissingField("name"))?
            .to_owned();
        let fields = match raw.get("fields").and_then(Value::as_object) {
            Some(fields) => decode_fields(fields)?,
            None => Map::new(),
        };
        Ok(Self { name, fields })
    }

    /// Last segment of the resource name.
    #[must_use]
    pub fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    /// Plain JSON object with the document id injected as `id`.
    #[must_use]
    pub fn into_json(self) -> Value {
        let id = self.id().to_owned();
        let mut fields = self.fields;
        fields.insert("id".to_owned(), Value::String(id));
        Value::Object(fields)
    }
}

/// `runQuery` body selecting documents of `collection` where every
/// `(field, value)` pair is equal.
#[must_use]
pub fn equality_query(collection: &str, filters: &[(String, Value)]) -> Value {
    let field_filters = filters
        .iter()
        .map(|(field, value)| {
            serde_json::json!({
                "fieldFilter": {
                    "field": { "fieldPath": field },
                    "op": "EQUAL",
                    "value": encode_value(value),
                }
            })
        })
        .collect::<Vec<_>>();

    let mut query = serde_json::json!({ "from": [{ "collectionId": collection }] });
    let where_clause = match field_filters.len() {
        0 => None,
        1 => field_filters.into_iter().next(),
        _ => Some(serde_json::json!({
            "compositeFilter": { "op": "AND", "filters": field_filters }
        })),
    };
    if let (Some(clause), Some(obj)) = (where_clause, query.as_object_mut()) {
        obj.insert("where".to_owned(), clause);
    }
    serde_json::json!({ "structuredQuery": query })
}

/// Decode a `runQuery` response stream. Entries without a `document` (the
/// trailing read-time marker) are skipped.
///
/// # Errors
///
/// Returns a [`CodecError`] when the response is not an array or a document
/// fails to decode.
pub fn parse_query_response(raw: &Value) -> Result<Vec<Document>, CodecError> {
    let entries = raw
        .as_array()
        .ok_or_else(|| CodecError::UnsupportedValue("runQuery response is not an array".to_owned()))?;
    entries
        .iter()
        .filter_map(|entry| entry.get("document"))
        .map(Document::from_rest)
        .collect()
}

#[cfg(test)]
#[path = "firestore_test.rs"]
mod tests;
