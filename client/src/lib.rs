//! EvalHub browser client.
//!
//! SYSTEM CONTEXT
//! ==============
//! Compiled to WASM with the `csr` feature and served by the `server` crate
//! as a single-page app. Without `csr` the crate builds natively so the
//! router, auth ladder and page logic run under `cargo test` against
//! in-memory fakes.
//!
//! ARCHITECTURE
//! ============
//! - `env`: host classification and the configuration ladder
//! - `net`: HTTP transport, identity REST client, document store clients
//! - `auth`: primary and fallback authentication behind one `AuthService`
//! - `router`: route table, auth gate and page lifecycle
//! - `components`: shared Leptos view pieces (frames, tables, panels)
//! - `pages`: one page object per route, each rendering a Leptos view
//! - `app`: shared context, Leptos shell and the WASM entry point

pub mod app;
pub mod auth;
#[cfg(feature = "csr")]
pub mod browser;
pub mod components;
pub mod env;
pub mod net;
pub mod pages;
pub mod router;
pub mod util;
