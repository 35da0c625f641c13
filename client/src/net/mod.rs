//! Networking: HTTP transport, identity service, and document stores.
//!
//! SYSTEM CONTEXT
//! ==============
//! `http` is the transport seam, `identity` speaks the Identity Toolkit REST
//! API, and `store` defines the `DataStore` trait implemented by
//! `firestore` (REST) and `memory` (demo data and tests).

pub mod firestore;
pub mod http;
pub mod identity;
pub mod memory;
pub mod store;
pub mod token;

pub use store::{DataStore, Fields, Filter, StoreError};
pub use token::SharedToken;
