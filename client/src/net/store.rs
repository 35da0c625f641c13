//! Document store seam.
//!
//! ARCHITECTURE
//! ============
//! Pages talk to `DataStore` with plain JSON objects keyed by collection and
//! document id. The typed helpers below convert to and from the record types
//! in `schema`. Read results always carry the document id as `id`.

use async_trait::async_trait;
use schema::Collection;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Fields of one document.
pub type Fields = Map<String, Value>;

/// Error returned by every store operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("not signed in to the document store")]
    Unauthenticated,
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("document store unreachable: {0}")]
    Transport(String),
    #[error("document store returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("malformed document: {0}")]
    Decode(String),
}

impl StoreError {
    #[must_use]
    pub fn not_found(collection: Collection, id: &str) -> Self {
        Self::Status { status: 404, message: format!("{collection}/{id} does not exist") }
    }
}

/// Equality filter on a top-level field.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

impl Filter {
    #[must_use]
    pub fn eq(field: &str, value: impl Into<Value>) -> Self {
        Self { field: field.to_owned(), value: value.into() }
    }

    #[must_use]
    pub fn matches(&self, fields: &Fields) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}

#[async_trait(?Send)]
pub trait DataStore {
    /// Document with `id` injected, or `None` when it does not exist.
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError>;

    /// Documents matching every filter.
    async fn query(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<Value>, StoreError>;

    /// Create or replace a document.
    async fn set(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Overwrite the listed fields of an existing document.
    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Create a document with a generated id and return the id.
    async fn add(&self, collection: Collection, fields: Fields) -> Result<String, StoreError>;
}

// =============================================================================
// TYPED HELPERS
// =============================================================================

/// Serialize a record to document fields.
///
/// # Errors
///
/// [`StoreError::Decode`] when the record does not serialize to an object.
pub fn to_fields<T: Serialize>(record: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(other) => Err(StoreError::Decode(format!("expected an object, got {other}"))),
        Err(e) => Err(StoreError::Decode(e.to_string())),
    }
}

fn from_value<T: DeserializeOwned>(value: Value) -> Result<T, StoreError> {
    serde_json::from_value(value).map_err(|e| StoreError::Decode(e.to_string()))
}

/// [`DataStore::get`] decoded into `T`.
///
/// # Errors
///
/// Store errors, or [`StoreError::Decode`] when the document does not fit `T`.
pub async fn get_record<T: DeserializeOwned>(
    store: &dyn DataStore,
    collection: Collection,
    id: &str,
) -> Result<Option<T>, StoreError> {
    store.get(collection, id).await?.map(from_value).transpose()
}

/// [`DataStore::query`] decoded into `T`.
///
/// # Errors
///
/// Store errors, or [`StoreError::Decode`] for the first document that does
/// not fit `T`.
pub async fn query_records<T: DeserializeOwned>(
    store: &dyn DataStore,
    collection: Collection,
    filters: &[Filter],
) -> Result<Vec<T>, StoreError> {
    store.query(collection, filters).await?.into_iter().map(from_value).collect()
}

/// [`DataStore::set`] from a record.
///
/// # Errors
///
/// Store or serialization errors.
pub async fn set_record<T: Serialize>(store: &dyn DataStore, collection: Collection, id: &str, record: &T) -> Result<(), StoreError> {
    store.set(collection, id, to_fields(record)?).await
}

/// [`DataStore::add`] from a record.
///
/// # Errors
///
/// Store or serialization errors.
pub async fn add_record<T: Serialize>(store: &dyn DataStore, collection: Collection, record: &T) -> Result<String, StoreError> {
    store.add(collection, to_fields(record)?).await
}

/// Build a field map from `(name, value)` pairs.
#[must_use]
pub fn fields<const N: usize>(pairs: [(&str, Value); N]) -> Fields {
    pairs.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
}
