//! Startup errors of the static host.

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid PORT: {0}")]
    InvalidPort(String),
    #[error("cannot read shell template {path}: {source}")]
    Template {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server failed: {0}")]
    Serve(#[source] std::io::Error),
}
