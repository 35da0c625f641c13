//! Static host configuration parsed from environment variables.

use std::path::PathBuf;

use schema::{AppConfig, ConfigKey};

use crate::error::ServerError;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_STATIC_DIR: &str = "dist";
pub const MEASUREMENT_ID_VAR: &str = "EVALHUB_MEASUREMENT_ID";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Build output of the client (`index.html`, WASM, assets).
    pub static_dir: PathBuf,
    /// Published as `/config.json` and as `<meta>` tags in the shell.
    pub app: AppConfig,
}

impl ServerConfig {
    /// Build from the process environment.
    ///
    /// Optional:
    /// - `PORT`: default 5000
    /// - `STATIC_DIR`: default `dist`
    /// - `EVALHUB_API_KEY` .. `EVALHUB_APP_ID`: the six connection keys
    /// - `EVALHUB_MEASUREMENT_ID`
    ///
    /// # Errors
    ///
    /// [`ServerError::InvalidPort`] when `PORT` is not a port number.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    ///
    /// # Errors
    ///
    /// [`ServerError::InvalidPort`] when `PORT` is not a port number.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ServerError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };
        let static_dir = var("STATIC_DIR").map_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR), PathBuf::from);

        let mut app = AppConfig::from_lookup(|key| var(key.env_name()));
        app.measurement_id = var(MEASUREMENT_ID_VAR).map(|v| v.trim().to_owned());

        Ok(Self { port, static_dir, app })
    }

    /// Required keys the environment did not provide.
    #[must_use]
    pub fn missing_keys(&self) -> Vec<ConfigKey> {
        self.app.missing_keys()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
