//! Firestore v1 REST implementation of `DataStore`.
//!
//! Requests carry the signed-in user's identity token as a bearer token;
//! access control is enforced by the backend's security rules, which surface
//! here as 401/403 responses.

use std::rc::Rc;

use async_trait::async_trait;
use schema::Collection;
use schema::firestore::{self, Document};
use serde_json::Value;

use super::http::{HttpRequest, HttpResponse, HttpTransport};
use super::store::{DataStore, Fields, Filter, StoreError};
use super::token::SharedToken;

#[cfg(test)]
#[path = "firestore_test.rs"]
mod firestore_test;

pub struct FirestoreClient {
    transport: Rc<dyn HttpTransport>,
    api_base: String,
    project_id: String,
    token: SharedToken,
}

impl FirestoreClient {
    #[must_use]
    pub fn new(transport: Rc<dyn HttpTransport>, api_base: &str, project_id: &str, token: SharedToken) -> Self {
        Self {
            transport,
            api_base: api_base.to_owned(),
            project_id: project_id.to_owned(),
            token,
        }
    }

    fn document_url(&self, collection: Collection, id: &str) -> String {
        firestore::document_url(&self.api_base, &self.project_id, collection.as_str(), &urlencoding::encode(id))
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, StoreError> {
        let request = request.with_bearer(self.token.get());
        log::debug!("firestore {} {}", request.method.as_str(), request.url);
        self.transport.send(request).await.map_err(StoreError::Transport)
    }
}

fn status_error(resp: &HttpResponse) -> StoreError {
    let message = resp
        .json()
        .ok()
        .and_then(|v| v.pointer("/error/message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_default();
    match resp.status {
        401 => StoreError::Unauthenticated,
        403 => StoreError::PermissionDenied(message),
        status => StoreError::Status { status, message },
    }
}

fn decode_document(resp: &HttpResponse) -> Result<Document, StoreError> {
    let raw = resp.json().map_err(|e| StoreError::Decode(e.to_string()))?;
    Document::from_rest(&raw).map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait(?Send)]
impl DataStore for FirestoreClient {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        let resp = self.send(HttpRequest::get(self.document_url(collection, id))).await?;
        if resp.status == 404 {
            return Ok(None);
        }
        if !resp.ok() {
            return Err(status_error(&resp));
        }
        Ok(Some(decode_document(&resp)?.into_json()))
    }

    async fn query(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<Value>, StoreError> {
        let url = format!("{}:runQuery", firestore::documents_url(&self.api_base, &self.project_id));
        let pairs = filters
            .iter()
            .map(|f| (f.field.clone(), f.value.clone()))
            .collect::<Vec<_>>();
        let body = firestore::equality_query(collection.as_str(), &pairs);
        let resp = self.send(HttpRequest::post(url, body)).await?;
        if !resp.ok() {
            return Err(status_error(&resp));
        }
        let raw = resp.json().map_err(|e| StoreError::Decode(e.to_string()))?;
        let docs = firestore::parse_query_response(&raw).map_err(|e| StoreError::Decode(e.to_string()))?;
        Ok(docs.into_iter().map(Document::into_json).collect())
    }

    async fn set(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError> {
        let resp = self
            .send(HttpRequest::patch(self.document_url(collection, id), firestore::document_body(&fields)))
            .await?;
        if !resp.ok() {
            return Err(status_error(&resp));
        }
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mask = firestore::update_mask_query(fields.keys().map(String::as_str));
        let url = format!("{}?{mask}&currentDocument.exists=true", self.document_url(collection, id));
        let resp = self.send(HttpRequest::patch(url, firestore::document_body(&fields))).await?;
        if resp.status == 404 {
            return Err(StoreError::not_found(collection, id));
        }
        if !resp.ok() {
            return Err(status_error(&resp));
        }
        Ok(())
    }

    async fn add(&self, collection: Collection, fields: Fields) -> Result<String, StoreError> {
        let url = format!("{}/{collection}", firestore::documents_url(&self.api_base, &self.project_id));
        let resp = self.send(HttpRequest::post(url, firestore::document_body(&fields))).await?;
        if !resp.ok() {
            return Err(status_error(&resp));
        }
        Ok(decode_document(&resp)?.id().to_owned())
    }
}
