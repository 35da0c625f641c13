//! Local task spawning and wall-clock time.
//!
//! TRADE-OFFS
//! ==========
//! Outside the browser `spawn_local` drives the future to completion on the
//! calling thread. That keeps event-handler code paths testable natively, but
//! it must not be called from inside another `block_on`.

use std::future::Future;

/// Spawn a `!Send` future on the browser event loop.
pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    #[cfg(feature = "csr")]
    {
        wasm_bindgen_futures::spawn_local(future);
    }
    #[cfg(not(feature = "csr"))]
    {
        futures::executor::block_on(future);
    }
}

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_ms() -> i64 {
    #[cfg(feature = "csr")]
    {
        #[allow(clippy::cast_possible_truncation)]
        let now = js_sys::Date::now() as i64;
        now
    }
    #[cfg(not(feature = "csr"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_millis()).unwrap_or(i64::MAX))
    }
}
