mod config;
mod error;
mod routes;
mod shell;
mod state;

use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // A missing .env is normal in deployed environments.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    let config = ServerConfig::from_env()?;
    let missing = config.missing_keys();
    if !missing.is_empty() {
        let names: Vec<_> = missing.iter().map(|k| k.env_name()).collect();
        tracing::warn!(missing = ?names, "connection keys not set; /config.json will be incomplete");
    }

    let state = AppState::from_config(&config)?;
    let app = routes::app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind { addr: addr.clone(), source })?;

    tracing::info!(port = config.port, static_dir = %config.static_dir.display(), "evalhub listening");
    axum::serve(listener, app).await.map_err(ServerError::Serve)
}
