//! HTTP transport seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! The identity client and the Firestore client build requests as plain
//! values and hand them to an `HttpTransport`. The browser build sends them
//! with `gloo-net`; tests script responses with `ScriptedTransport` and
//! inspect what was sent.

use std::cell::RefCell;
use std::collections::VecDeque;

use async_trait::async_trait;
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Patch => "PATCH",
        }
    }
}

/// Outgoing JSON request.
#[derive(Clone, Debug, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    /// Bearer token for the `Authorization` header.
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

impl HttpRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self { method: Method::Get, url: url.into(), bearer: None, body: None }
    }

    #[must_use]
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self { method: Method::Post, url: url.into(), bearer: None, body: Some(body) }
    }

    #[must_use]
    pub fn patch(url: impl Into<String>, body: Value) -> Self {
        Self { method: Method::Patch, url: url.into(), bearer: None, body: Some(body) }
    }

    #[must_use]
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

/// Status and raw body of a completed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    #[must_use]
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON; an empty body reads as `null`.
    ///
    /// # Errors
    ///
    /// Returns the parse error for a malformed body.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body)
    }
}

/// Sends requests. `Err` means the request never produced a response
/// (network failure, refused connection, CORS).
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, String>;
}

// =============================================================================
// BROWSER
// =============================================================================

/// `fetch` through `gloo-net`.
#[derive(Clone, Copy, Debug, Default)]
pub struct GlooTransport;

#[async_trait(?Send)]
impl HttpTransport for GlooTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        #[cfg(feature = "csr")]
        {
            use gloo_net::http::RequestBuilder;

            let mut builder = match request.method {
                Method::Get => RequestBuilder::new(&request.url).method(gloo_net::http::Method::GET),
                Method::Post => RequestBuilder::new(&request.url).method(gloo_net::http::Method::POST),
                Method::Patch => RequestBuilder::new(&request.url).method(gloo_net::http::Method::PATCH),
            };
            if let Some(token) = &request.bearer {
                builder = builder.header("Authorization", &format!("Bearer {token}"));
            }
            let sent = match &request.body {
                Some(body) => builder.json(body).map_err(|e| e.to_string())?.send().await,
                None => builder.send().await,
            };
            let resp = sent.map_err(|e| e.to_string())?;
            let status = resp.status();
            let body = resp.text().await.map_err(|e| e.to_string())?;
            Ok(HttpResponse { status, body })
        }
        #[cfg(not(feature = "csr"))]
        {
            Err(format!("{} {}: no network outside the browser", request.method.as_str(), request.url))
        }
    }
}

// =============================================================================
// SCRIPTED
// =============================================================================

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<Result<HttpResponse, String>>>,
    requests: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response with a JSON body.
    pub fn respond(&self, status: u16, body: &Value) {
        self.responses
            .borrow_mut()
            .push_back(Ok(HttpResponse::new(status, body.to_string())));
    }

    /// Queue a transport failure.
    pub fn fail(&self, message: &str) {
        self.responses.borrow_mut().push_back(Err(message.to_owned()));
    }

    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.borrow().clone()
    }
}

#[async_trait(?Send)]
impl HttpTransport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, String> {
        self.requests.borrow_mut().push(request);
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err("no scripted response".to_owned()))
    }
}
