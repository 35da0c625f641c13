//! Authentication: session model, fallback provider, and the composed service.
//!
//! SYSTEM CONTEXT
//! ==============
//! `AuthService` is the single session source for the router's auth gate and
//! for pages. It signs in against the hosted identity service and falls back
//! to `TempAuth` (a fixed demo credential table) when that service cannot be
//! reached.

pub mod messages;
pub mod service;
pub mod session;
pub mod temp;

pub use service::{AuthService, ListenerId, PrimaryAuth, SESSION_KEY};
pub use session::Session;
pub use temp::{DEMO_ACCOUNTS, DEMO_TENANT_ID, TempAuth};

/// Error returned by sign-in, sign-up and session persistence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The identity service refused the request with `code`.
    #[error("{message}")]
    Rejected { code: String, message: String },
    /// No response from the identity service.
    #[error("identity service unreachable: {0}")]
    Unreachable(String),
    #[error("no user profile exists for {0}")]
    ProfileMissing(String),
    #[error("could not load the user profile: {0}")]
    Profile(String),
    #[error("this account is not active")]
    Inactive,
    #[error("session storage failed: {0}")]
    Storage(String),
}
