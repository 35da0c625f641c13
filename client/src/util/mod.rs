//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser concerns (DOM lookups, storage, timers, task
//! spawning) from page and auth logic so that logic compiles and is tested
//! natively. Every browser-only path is gated on the `csr` feature.

pub mod dates;
pub mod dom;
pub mod storage;
pub mod task;
pub mod timer;
