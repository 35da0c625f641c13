//! Email/password sign-in.

use async_trait::async_trait;
use leptos::prelude::*;

use super::{Page, PageError, PageRequest, PageView, valid_email};
use crate::app::AppContext;
use crate::auth::messages::user_message;
use crate::auth::{DEMO_ACCOUNTS, Session};
use crate::components::page_frame::{FormMessage, PageFrame};
use crate::util::task::spawn_local;

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

/// Local check before contacting the identity service.
///
/// # Errors
///
/// The message to show next to the form.
pub fn validate(email: &str, password: &str) -> Result<(), &'static str> {
    if email.trim().is_empty() {
        return Err("Enter your email address.");
    }
    if !valid_email(email) {
        return Err("Enter a valid email address.");
    }
    if password.is_empty() {
        return Err("Enter your password.");
    }
    Ok(())
}

/// Sign in and go to the dashboard.
///
/// # Errors
///
/// The user-facing failure message.
pub async fn submit(ctx: &AppContext, email: &str, password: &str) -> Result<Session, String> {
    validate(email, password).map_err(str::to_owned)?;
    let session = ctx
        .auth()
        .login(email.trim(), password)
        .await
        .map_err(|e| user_message(&e))?;
    ctx.navigator().go("/dashboard");
    Ok(session)
}

#[component]
fn DemoHint() -> impl IntoView {
    view! {
        <aside class="demo-hint">
            <p>"The sign-in service is not configured. Use a demo account:"</p>
            <ul>
                {DEMO_ACCOUNTS
                    .into_iter()
                    .map(|a| {
                        view! {
                            <li>
                                <code>{a.email}</code>" / "<code>{a.password}</code>
                                " (" {a.role.label()} ")"
                            </li>
                        }
                    })
                    .collect_view()}
            </ul>
        </aside>
    }
}

#[component]
fn LoginForm(ctx: AppContext) -> impl IntoView {
    let demo = !ctx.auth().has_primary();
    let ctx = StoredValue::new_local(ctx);
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let message = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let ctx = ctx.get_value();
        let email = email.get_untracked();
        let password = password.get_untracked();
        busy.set(true);
        message.set("Signing in...".to_owned());
        spawn_local(async move {
            if let Err(text) = submit(&ctx, &email, &password).await {
                message.set(text);
                busy.set(false);
            }
        });
    };

    view! {
        <PageFrame class="login" title="Sign in to EvalHub">
            <form class="form" novalidate on:submit=on_submit>
                <label>
                    "Email"
                    <input
                        type="email"
                        autocomplete="username"
                        required
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                </label>
                <label>
                    "Password"
                    <input
                        type="password"
                        autocomplete="current-password"
                        required
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                </label>
                <button type="submit" class="btn btn--primary" disabled=move || busy.get()>
                    "Sign in"
                </button>
                <FormMessage message=message />
            </form>
            {demo.then(|| view! { <DemoHint /> })}
        </PageFrame>
    }
}

pub struct LoginPage {
    ctx: AppContext,
}

impl LoginPage {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

#[async_trait(?Send)]
impl Page for LoginPage {
    async fn render(&mut self, _request: &PageRequest) -> Result<PageView, PageError> {
        let ctx = self.ctx.clone();
        Ok(PageView::new(move || view! { <LoginForm ctx=ctx /> }))
    }
}
