//! Shared contract between the EvalHub client, server and CLI.
//!
//! This crate owns the configuration key set (document field names and
//! fallback metadata tag names), the stored record types, and the Firestore
//! REST value codec. It intentionally has no I/O so every consumer can use it
//! on both native and WASM targets.

pub mod config;
pub mod firestore;
pub mod records;

pub use config::{AppConfig, ConfigKey, SPA_PATHS};
pub use records::{Collection, Evaluation, EvaluationStatus, Goal, GoalStatus, Invitation, Role, Tenant, UserRecord, UserStatus};
