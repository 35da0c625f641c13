//! Error panels.
//!
//! DESIGN
//! ======
//! `ErrorPanel` is terminal: the page cannot continue and only offers the
//! way back to sign-in. `ReloadPanel` is what the router shows when a page
//! fails to render; it offers a manual reload.

use leptos::prelude::*;

use super::page_frame::AppLink;

#[component]
pub fn ErrorPanel(#[prop(into)] title: String, #[prop(into)] message: String) -> impl IntoView {
    view! {
        <div class="error-panel" role="alert">
            <h2 class="error-panel__title">{title}</h2>
            <p class="error-panel__message">{message}</p>
            <AppLink href="/login">"Back to sign in"</AppLink>
        </div>
    }
}

#[component]
pub fn ReloadPanel(#[prop(into)] message: String) -> impl IntoView {
    let on_reload = move |_| {
        #[cfg(feature = "csr")]
        {
            if let Some(window) = web_sys::window() {
                let _ = window.location().reload();
            }
        }
    };
    view! {
        <div class="error-panel error-panel--navigation" role="alert">
            <h2 class="error-panel__title">"This page failed to load"</h2>
            <p class="error-panel__message">{message}</p>
            <button type="button" class="btn" on:click=on_reload>
                "Reload"
            </button>
        </div>
    }
}
