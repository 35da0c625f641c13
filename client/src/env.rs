//! Runtime environment: host classification and configuration loading.
//!
//! DESIGN
//! ======
//! The static hosting target cannot embed per-environment secrets, so the
//! client rebuilds its connection configuration from whatever the deployment
//! exposes. `Environment::load_config` walks a three-tier ladder:
//!
//! 1. inline constants, only on development hosts,
//! 2. the `/config.json` document,
//! 3. `<meta name="evalhub-...">` tags in the HTML shell.
//!
//! Earlier tiers win; later tiers only fill keys that are still empty. The
//! result is cached until `reload`.
//!
//! TRADE-OFFS
//! ==========
//! Only sequential calls share the cache. Two first calls racing each other
//! may both walk the ladder; both produce the same answer.

use std::cell::RefCell;
use std::net::Ipv4Addr;
use std::rc::Rc;

use async_trait::async_trait;
use schema::config::CONFIG_DOCUMENT_PATH;
use schema::{AppConfig, ConfigKey};

#[cfg(test)]
#[path = "env_test.rs"]
mod env_test;

/// Identity Toolkit REST root in production.
pub const IDENTITY_API_BASE: &str = "https://identitytoolkit.googleapis.com/v1";
/// Port of the local auth emulator.
pub const AUTH_EMULATOR_PORT: u16 = 9099;
/// Port of the local document-store emulator.
pub const FIRESTORE_EMULATOR_PORT: u16 = 8080;

// =============================================================================
// HOST CLASSIFICATION
// =============================================================================

/// Deployment mode derived from the page URL.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RuntimeMode {
    Development,
    Staging,
    Production,
}

impl RuntimeMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Staging => "staging",
            Self::Production => "production",
        }
    }
}

/// The URL parts classification looks at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostContext {
    /// Lowercase scheme without the trailing `:`.
    pub protocol: String,
    /// Lowercase hostname without IPv6 brackets.
    pub hostname: String,
    /// Explicit port, if the URL carried one.
    pub port: Option<u16>,
}

impl HostContext {
    #[must_use]
    pub fn new(protocol: &str, hostname: &str, port: Option<u16>) -> Self {
        Self {
            protocol: protocol.trim().trim_end_matches(':').to_ascii_lowercase(),
            hostname: hostname
                .trim()
                .trim_start_matches('[')
                .trim_end_matches(']')
                .to_ascii_lowercase(),
            port,
        }
    }

    /// Parse an absolute URL.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let url = url::Url::parse(raw).ok()?;
        Some(Self::new(url.scheme(), url.host_str().unwrap_or_default(), url.port()))
    }

    /// Read `window.location`.
    #[cfg(feature = "csr")]
    #[must_use]
    pub fn from_window() -> Option<Self> {
        let location = web_sys::window()?.location();
        let protocol = location.protocol().ok()?;
        let hostname = location.hostname().ok()?;
        let port = location.port().ok().and_then(|p| p.parse::<u16>().ok());
        Some(Self::new(&protocol, &hostname, port))
    }
}

/// Classify a host. Pure function of the URL parts.
///
/// - development: loopback and `.local`/`.localhost` names, private IPv4,
///   an empty hostname, or `file:`
/// - staging: a label containing `staging`/`stg` or starting with
///   `dev`/`test`/`preview`, hosting
///   preview channels (`site--channel-hash.web.app`), or plain `http` on an
///   explicit non-default port
/// - production: everything else
#[must_use]
pub fn classify(host: &HostContext) -> RuntimeMode {
    if host.protocol == "file" || is_local_host(&host.hostname) {
        return RuntimeMode::Development;
    }
    if is_staging_host(&host.hostname) || is_plain_http_on_custom_port(host) {
        return RuntimeMode::Staging;
    }
    RuntimeMode::Production
}

fn is_local_host(hostname: &str) -> bool {
    hostname.is_empty()
        || matches!(hostname, "localhost" | "127.0.0.1" | "0.0.0.0" | "::1")
        || hostname.ends_with(".localhost")
        || hostname.ends_with(".local")
        || hostname
            .parse::<Ipv4Addr>()
            .is_ok_and(|ip| ip.is_private() || ip.is_loopback())
}

fn is_staging_host(hostname: &str) -> bool {
    let hosting_domain = hostname.ends_with(".web.app") || hostname.ends_with(".firebaseapp.com");
    if hosting_domain && hostname.contains("--") {
        return true;
    }
    // The top-level domain is not a label of interest (`.dev` is a public TLD).
    let labels = hostname.rsplit_once('.').map_or(hostname, |(rest, _)| rest);
    labels
        .split('.')
        .flat_map(|label| label.split('-'))
        .any(is_staging_token)
}

/// `staging`, `stg`, `dev`, `test` or `preview`, optionally numbered
/// (`dev2`). Matched per `-`-delimited token so `bestgames` or `developer`
/// stay production.
fn is_staging_token(token: &str) -> bool {
    let word = token.trim_end_matches(|c: char| c.is_ascii_digit());
    matches!(word, "staging" | "stg" | "dev" | "test" | "preview")
}

fn is_plain_http_on_custom_port(host: &HostContext) -> bool {
    host.protocol == "http" && host.port.is_some_and(|p| p != 80)
}

// =============================================================================
// CONFIG SOURCES
// =============================================================================

/// Where tiers 2 and 3 of the ladder read from.
#[async_trait(?Send)]
pub trait ConfigSource {
    /// GET `path` and return the body.
    async fn fetch_document(&self, path: &str) -> Result<String, String>;

    /// `content` of the named `<meta>` tag.
    fn meta_content(&self, name: &str) -> Option<String>;
}

/// The browser: `fetch` for the document, the live DOM for metadata.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserConfigSource;

#[async_trait(?Send)]
impl ConfigSource for BrowserConfigSource {
    async fn fetch_document(&self, path: &str) -> Result<String, String> {
        #[cfg(feature = "csr")]
        {
            let resp = gloo_net::http::Request::get(path)
                .send()
                .await
                .map_err(|e| e.to_string())?;
            if !resp.ok() {
                return Err(format!("config document request failed: {}", resp.status()));
            }
            resp.text().await.map_err(|e| e.to_string())
        }
        #[cfg(not(feature = "csr"))]
        {
            let _ = path;
            Err("not available outside the browser".to_owned())
        }
    }

    fn meta_content(&self, name: &str) -> Option<String> {
        crate::util::dom::meta_content(name)
    }
}

/// Which ladder tier completed the configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigTier {
    Embedded,
    Document,
    Metadata,
}

/// Error returned when every tier was exhausted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration is missing required keys: {}", format_keys(.missing))]
    Missing { missing: Vec<ConfigKey> },
}

fn format_keys(keys: &[ConfigKey]) -> String {
    keys.iter().map(|k| k.json_name()).collect::<Vec<_>>().join(", ")
}

/// Values compiled into development builds. `EVALHUB_*` variables set at
/// build time override the emulator demo project.
#[must_use]
pub fn embedded_config() -> AppConfig {
    let mut config = AppConfig::from_lookup(|key| {
        let value = match key {
            ConfigKey::ApiKey => option_env!("EVALHUB_API_KEY"),
            ConfigKey::AuthDomain => option_env!("EVALHUB_AUTH_DOMAIN"),
            ConfigKey::ProjectId => option_env!("EVALHUB_PROJECT_ID"),
            ConfigKey::StorageBucket => option_env!("EVALHUB_STORAGE_BUCKET"),
            ConfigKey::MessagingSenderId => option_env!("EVALHUB_MESSAGING_SENDER_ID"),
            ConfigKey::AppId => option_env!("EVALHUB_APP_ID"),
        };
        value.map(str::to_owned)
    });
    config.fill_from(&AppConfig {
        api_key: "demo-api-key".to_owned(),
        auth_domain: "demo-evalhub.firebaseapp.com".to_owned(),
        project_id: "demo-evalhub".to_owned(),
        storage_bucket: "demo-evalhub.appspot.com".to_owned(),
        messaging_sender_id: "000000000000".to_owned(),
        app_id: "1:000000000000:web:0000000000000000".to_owned(),
        measurement_id: None,
    });
    config
}

// =============================================================================
// ENVIRONMENT
// =============================================================================

/// REST roots for the identity service and the document store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceEndpoints {
    pub identity: String,
    pub firestore: String,
}

struct LoadedConfig {
    config: Rc<AppConfig>,
    tier: ConfigTier,
}

/// Host classification plus the cached configuration ladder.
pub struct Environment {
    host: HostContext,
    mode: RuntimeMode,
    source: Rc<dyn ConfigSource>,
    loaded: RefCell<Option<LoadedConfig>>,
}

impl Environment {
    /// Classify `host` once; nothing is fetched until `load_config`.
    #[must_use]
    pub fn new(host: HostContext, source: Rc<dyn ConfigSource>) -> Self {
        let mode = classify(&host);
        log::debug!("environment: {} ({})", mode.as_str(), host.hostname);
        Self { host, mode, source, loaded: RefCell::new(None) }
    }

    #[must_use]
    pub fn host(&self) -> &HostContext {
        &self.host
    }

    #[must_use]
    pub fn mode(&self) -> RuntimeMode {
        self.mode
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        self.mode == RuntimeMode::Development
    }

    /// Emulators on the page's host in development, hosted APIs otherwise.
    #[must_use]
    pub fn endpoints(&self) -> ServiceEndpoints {
        if self.is_development() {
            let host = if self.host.hostname.is_empty() { "localhost" } else { &self.host.hostname };
            ServiceEndpoints {
                identity: format!("http://{host}:{AUTH_EMULATOR_PORT}/identitytoolkit.googleapis.com/v1"),
                firestore: format!("http://{host}:{FIRESTORE_EMULATOR_PORT}/v1"),
            }
        } else {
            ServiceEndpoints {
                identity: IDENTITY_API_BASE.to_owned(),
                firestore: schema::firestore::API_BASE.to_owned(),
            }
        }
    }

    /// Cached configuration, if loaded.
    #[must_use]
    pub fn config(&self) -> Option<Rc<AppConfig>> {
        self.loaded.borrow().as_ref().map(|l| Rc::clone(&l.config))
    }

    /// Tier that completed the cached configuration.
    #[must_use]
    pub fn loaded_from(&self) -> Option<ConfigTier> {
        self.loaded.borrow().as_ref().map(|l| l.tier)
    }

    /// Return the cached configuration, or walk the ladder once.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] when no tier supplies every required key.
    pub async fn load_config(&self) -> Result<Rc<AppConfig>, ConfigError> {
        if let Some(config) = self.config() {
            return Ok(config);
        }
        let (config, tier) = self.resolve().await?;
        let config = Rc::new(config);
        *self.loaded.borrow_mut() = Some(LoadedConfig { config: Rc::clone(&config), tier });
        Ok(config)
    }

    /// Drop the cache and walk the ladder again.
    ///
    /// # Errors
    ///
    /// Same as [`Environment::load_config`].
    pub async fn reload(&self) -> Result<Rc<AppConfig>, ConfigError> {
        self.loaded.borrow_mut().take();
        self.load_config().await
    }

    async fn resolve(&self) -> Result<(AppConfig, ConfigTier), ConfigError> {
        let mut config = AppConfig::default();

        if self.is_development() {
            config.fill_from(&embedded_config());
            if config.is_complete() {
                log::info!("config: using embedded development values");
                return Ok((config, ConfigTier::Embedded));
            }
        }

        match self.source.fetch_document(CONFIG_DOCUMENT_PATH).await {
            Ok(body) => match serde_json::from_str::<AppConfig>(&body) {
                Ok(document) => config.fill_from(&document),
                Err(e) => log::warn!("config: {CONFIG_DOCUMENT_PATH} is not a config document: {e}"),
            },
            Err(e) => log::warn!("config: fetching {CONFIG_DOCUMENT_PATH} failed: {e}"),
        }
        if config.is_complete() {
            log::info!("config: loaded from {CONFIG_DOCUMENT_PATH}");
            return Ok((config, ConfigTier::Document));
        }

        let from_meta = AppConfig::from_lookup(|key| self.source.meta_content(key.meta_name()));
        config.fill_from(&from_meta);
        if config.is_complete() {
            log::info!("config: completed from page metadata");
            return Ok((config, ConfigTier::Metadata));
        }

        let missing = config.missing_keys();
        log::error!("config: missing {}", format_keys(&missing));
        Err(ConfigError::Missing { missing })
    }
}
