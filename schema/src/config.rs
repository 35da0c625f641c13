//! Connection configuration for the hosted identity service and document store.
//!
//! DESIGN
//! ======
//! The same six keys appear in three places: the `/config.json` document
//! served by the static host, the `<meta>` tags embedded in the HTML shell,
//! and the build-time overrides of the client. `ConfigKey` names all three
//! spellings so they cannot drift apart.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known path of the configuration document.
pub const CONFIG_DOCUMENT_PATH: &str = "/config.json";

/// Paths the single-page app routes itself. The static host answers each with
/// the HTML shell.
pub const SPA_PATHS: [&str; 12] = [
    "/",
    "/login",
    "/register",
    "/register-admin",
    "/dashboard",
    "/users",
    "/goal-setting",
    "/goal-approvals",
    "/evaluation-form",
    "/evaluations",
    "/settings",
    "/developer",
];

/// A required configuration key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigKey {
    ApiKey,
    AuthDomain,
    ProjectId,
    StorageBucket,
    MessagingSenderId,
    AppId,
}

impl ConfigKey {
    /// Every required key, in document order.
    pub const ALL: [Self; 6] = [
        Self::ApiKey,
        Self::AuthDomain,
        Self::ProjectId,
        Self::StorageBucket,
        Self::MessagingSenderId,
        Self::AppId,
    ];

    /// Field name inside the configuration document.
    #[must_use]
    pub fn json_name(self) -> &'static str {
        match self {
            Self::ApiKey => "apiKey",
            Self::AuthDomain => "authDomain",
            Self::ProjectId => "projectId",
            Self::StorageBucket => "storageBucket",
            Self::MessagingSenderId => "messagingSenderId",
            Self::AppId => "appId",
        }
    }

    /// `name` attribute of the fallback `<meta>` tag.
    #[must_use]
    pub fn meta_name(self) -> &'static str {
        match self {
            Self::ApiKey => "evalhub-api-key",
            Self::AuthDomain => "evalhub-auth-domain",
            Self::ProjectId => "evalhub-project-id",
            Self::StorageBucket => "evalhub-storage-bucket",
            Self::MessagingSenderId => "evalhub-messaging-sender-id",
            Self::AppId => "evalhub-app-id",
        }
    }

    /// Environment variable read by the static host and the build.
    #[must_use]
    pub fn env_name(self) -> &'static str {
        match self {
            Self::ApiKey => "EVALHUB_API_KEY",
            Self::AuthDomain => "EVALHUB_AUTH_DOMAIN",
            Self::ProjectId => "EVALHUB_PROJECT_ID",
            Self::StorageBucket => "EVALHUB_STORAGE_BUCKET",
            Self::MessagingSenderId => "EVALHUB_MESSAGING_SENDER_ID",
            Self::AppId => "EVALHUB_APP_ID",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_name())
    }
}

/// Resolved connection configuration.
///
/// Every field defaults to empty so a partial document still parses; use
/// [`AppConfig::missing_keys`] to decide whether it is usable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    pub api_key: String,
    pub auth_domain: String,
    pub project_id: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
}

impl AppConfig {
    /// Build a config by asking `lookup` for each required key.
    pub fn from_lookup<F>(mut lookup: F) -> Self
    where
        F: FnMut(ConfigKey) -> Option<String>,
    {
        let mut config = Self::default();
        for key in ConfigKey::ALL {
            if let Some(value) = lookup(key) {
                config.set(key, value);
            }
        }
        config
    }

    #[must_use]
    pub fn get(&self, key: ConfigKey) -> &str {
        match key {
            ConfigKey::ApiKey => &self.api_key,
            ConfigKey::AuthDomain => &self.auth_domain,
            ConfigKey::ProjectId => &self.project_id,
            ConfigKey::StorageBucket => &self.storage_bucket,
            ConfigKey::MessagingSenderId => &self.messaging_sender_id,
            ConfigKey::AppId => &self.app_id,
        }
    }

    /// Set `key`, trimming surrounding whitespace.
    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        let value = value.into().trim().to_owned();
        let slot = match key {
            ConfigKey::ApiKey => &mut self.api_key,
            ConfigKey::AuthDomain => &mut self.auth_domain,
            ConfigKey::ProjectId => &mut self.project_id,
            ConfigKey::StorageBucket => &mut self.storage_bucket,
            ConfigKey::MessagingSenderId => &mut self.messaging_sender_id,
            ConfigKey::AppId => &mut self.app_id,
        };
        *slot = value;
    }

    /// Fill every empty key from `other`. Keys already set are kept.
    pub fn fill_from(&mut self, other: &Self) {
        for key in ConfigKey::ALL {
            if self.get(key).is_empty() && !other.get(key).is_empty() {
                self.set(key, other.get(key));
            }
        }
        if self.measurement_id.is_none() {
            self.measurement_id.clone_from(&other.measurement_id);
        }
    }

    /// Required keys whose value is empty.
    #[must_use]
    pub fn missing_keys(&self) -> Vec<ConfigKey> {
        ConfigKey::ALL
            .into_iter()
            .filter(|key| self.get(*key).is_empty())
            .collect()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        ConfigKey::ALL.iter().all(|key| !self.get(*key).is_empty())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
