//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. Both
//! responses it serves are computed once at startup: the configuration
//! document and the rendered shell. Nothing changes while the process runs.

use std::path::PathBuf;
use std::sync::Arc;

use schema::AppConfig;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::shell;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Rendered HTML shell served for every SPA route.
    pub shell: Arc<str>,
    pub static_dir: PathBuf,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, template: &str, static_dir: PathBuf) -> Self {
        let shell = shell::render(template, &config);
        Self { config: Arc::new(config), shell: shell.into(), static_dir }
    }

    /// Load the shell template from the static directory and render it.
    ///
    /// # Errors
    ///
    /// [`ServerError::Template`] when `index.html` exists but is unreadable.
    pub fn from_config(config: &ServerConfig) -> Result<Self, ServerError> {
        let template = match shell::load_template(&config.static_dir)? {
            Some(template) => template,
            None => {
                tracing::warn!(dir = %config.static_dir.display(), "no index.html in static dir; using built-in shell");
                shell::DEFAULT_TEMPLATE.to_owned()
            }
        };
        Ok(Self::new(config.app.clone(), &template, config.static_dir.clone()))
    }
}
