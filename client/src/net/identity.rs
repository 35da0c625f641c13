//! Identity Toolkit v1 REST client (email/password accounts).

use std::rc::Rc;

use serde::Deserialize;
use serde_json::{Value, json};

use super::http::{HttpRequest, HttpTransport};
use crate::auth::AuthError;
use crate::auth::messages::rejection;

#[cfg(test)]
#[path = "identity_test.rs"]
mod identity_test;

/// Account returned by sign-in and sign-up.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityAccount {
    #[serde(rename = "localId")]
    pub uid: String,
    #[serde(default)]
    pub email: String,
    pub id_token: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

pub struct IdentityClient {
    transport: Rc<dyn HttpTransport>,
    api_base: String,
    api_key: String,
}

impl IdentityClient {
    #[must_use]
    pub fn new(transport: Rc<dyn HttpTransport>, api_base: &str, api_key: &str) -> Self {
        Self {
            transport,
            api_base: api_base.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        }
    }

    fn endpoint(&self, method: &str) -> String {
        format!("{}/accounts:{method}?key={}", self.api_base, urlencoding::encode(&self.api_key))
    }

    /// `accounts:signInWithPassword`.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unreachable`] when no response arrives (or the service
    /// fails with 5xx), otherwise the mapped rejection.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<IdentityAccount, AuthError> {
        let body = json!({ "email": email, "password": password, "returnSecureToken": true });
        self.call("signInWithPassword", body).await
    }

    /// `accounts:signUp`.
    ///
    /// # Errors
    ///
    /// Same as [`IdentityClient::sign_in`].
    pub async fn sign_up(&self, email: &str, password: &str, display_name: &str) -> Result<IdentityAccount, AuthError> {
        let body = json!({
            "email": email,
            "password": password,
            "displayName": display_name,
            "returnSecureToken": true,
        });
        self.call("signUp", body).await
    }

    async fn call(&self, method: &str, body: Value) -> Result<IdentityAccount, AuthError> {
        let resp = self
            .transport
            .send(HttpRequest::post(self.endpoint(method), body))
            .await
            .map_err(AuthError::Unreachable)?;

        if resp.status >= 500 {
            return Err(AuthError::Unreachable(format!("identity service returned {}", resp.status)));
        }
        let payload = resp.json().unwrap_or(Value::Null);
        if !resp.ok() {
            let raw = payload
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or_default();
            log::debug!("identity {method} rejected: {raw}");
            return Err(rejection(raw));
        }
        serde_json::from_value(payload).map_err(|e| AuthError::Rejected {
            code: "MALFORMED_RESPONSE".to_owned(),
            message: e.to_string(),
        })
    }
}
