//! Minimal Firestore REST client for operator tasks.

use schema::firestore::{self, Document};
use serde_json::{Map, Value};

use crate::CliError;

pub const PAGE_SIZE: u32 = 300;

pub struct RestClient {
    http: reqwest::Client,
    api_base: String,
    project_id: String,
    token: Option<String>,
}

impl RestClient {
    #[must_use]
    pub fn new(api_base: &str, project_id: &str, token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_owned(),
            project_id: project_id.to_owned(),
            token,
        }
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// One page of `collection`, plus the token for the next page.
    ///
    /// # Errors
    ///
    /// Transport, status and decode failures.
    pub async fn list_page(&self, collection: &str, page_token: Option<&str>) -> Result<(Vec<Document>, Option<String>), CliError> {
        let mut url = format!(
            "{}/{collection}?pageSize={PAGE_SIZE}",
            firestore::documents_url(&self.api_base, &self.project_id)
        );
        if let Some(token) = page_token {
            url.push_str("&pageToken=");
            url.push_str(&urlencoding::encode(token));
        }
        let body = self.send(self.authorize(self.http.get(url))).await?;

        let documents = match body.get("documents").and_then(Value::as_array) {
            Some(raw) => raw.iter().map(Document::from_rest).collect::<Result<Vec<_>, _>>()?,
            None => Vec::new(),
        };
        let next = body
            .get("nextPageToken")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .map(str::to_owned);
        Ok((documents, next))
    }

    /// PATCH only `fields` of an existing document.
    ///
    /// # Errors
    ///
    /// Transport and status failures. A document deleted since it was listed
    /// comes back as a 404 status error.
    pub async fn patch_fields(&self, collection: &str, id: &str, fields: &Map<String, Value>) -> Result<(), CliError> {
        let url = format!(
            "{}?{}&currentDocument.exists=true",
            firestore::document_url(&self.api_base, &self.project_id, collection, id),
            firestore::update_mask_query(fields.keys().map(String::as_str))
        );
        let request = self.authorize(self.http.patch(url)).json(&firestore::document_body(fields));
        self.send(request).await.map(|_| ())
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, CliError> {
        let response = request.send().await?;
        let status = response.status();
        let body: Value = response.json().await.unwrap_or(Value::Null);
        if !status.is_success() {
            let message = body
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("no error message")
                .to_owned();
            return Err(CliError::Status { status: status.as_u16(), message });
        }
        Ok(body)
    }
}
