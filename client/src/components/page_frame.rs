//! Page chrome: frame, badges, empty states and in-app links.

use leptos::prelude::*;

#[cfg(test)]
#[path = "page_frame_test.rs"]
mod page_frame_test;

/// Section with the page heading.
#[component]
pub fn PageFrame(#[prop(into)] class: String, #[prop(into)] title: String, children: Children) -> impl IntoView {
    view! {
        <section class=format!("page page--{class}")>
            <h1 class="page__title">{title}</h1>
            {children()}
        </section>
    }
}

#[component]
pub fn Badge(#[prop(into)] label: String) -> impl IntoView {
    let class = format!("badge badge--{}", label.to_ascii_lowercase().replace(' ', "-"));
    view! { <span class=class>{label}</span> }
}

#[component]
pub fn EmptyState(#[prop(into)] message: String) -> impl IntoView {
    view! { <p class="empty-state">{message}</p> }
}

/// Link followed by the router instead of a full page load.
#[component]
pub fn AppLink(#[prop(into)] href: String, children: Children) -> impl IntoView {
    view! { <a href=href data-link="">{children()}</a> }
}

/// Status line under a form, bound to `message`.
#[component]
pub fn FormMessage(message: RwSignal<String>) -> impl IntoView {
    view! { <p class="form-message" aria-live="polite">{move || message.get()}</p> }
}

/// Registration link produced by an invitation form, once there is one.
#[component]
pub fn InvitationLink(link: RwSignal<Option<String>>) -> impl IntoView {
    view! {
        <Show when=move || link.get().is_some()>
            <p class="invite-link">
                "Send this link: " <code>{move || link.get().unwrap_or_default()}</code>
            </p>
        </Show>
    }
}

/// Table with a fixed header row; rows come from `children`.
#[component]
pub fn DataTable(headers: &'static [&'static str], children: Children) -> impl IntoView {
    view! {
        <table class="data-table">
            <thead>
                <tr>{headers.iter().map(|h| view! { <th>{*h}</th> }).collect_view()}</tr>
            </thead>
            <tbody>{children()}</tbody>
        </table>
    }
}
