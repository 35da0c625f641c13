//! Profile and organization settings.

use async_trait::async_trait;
use leptos::prelude::*;
use schema::{Collection, Role, Tenant};
use serde_json::json;

use super::{Page, PageError, PageRequest, PageView, require_session};
use crate::app::AppContext;
use crate::components::page_frame::{FormMessage, PageFrame};
use crate::net::store::{fields, get_record};
use crate::util::task::spawn_local;

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

/// Update the signed-in user's display name in the store and the session.
///
/// # Errors
///
/// Validation and store failures as user-facing messages.
pub async fn save_profile(ctx: &AppContext, display_name: &str) -> Result<(), String> {
    let session = require_session(ctx).map_err(|e| e.to_string())?;
    let display_name = display_name.trim();
    if display_name.is_empty() {
        return Err("Enter your name.".to_owned());
    }
    ctx.store()
        .update(Collection::Users, &session.uid, fields([("displayName", json!(display_name))]))
        .await
        .map_err(|e| format!("Could not save your profile: {e}"))?;
    ctx.auth().rename(display_name);
    Ok(())
}

/// Rename the admin's organization.
///
/// # Errors
///
/// Permission, validation and store failures as user-facing messages.
pub async fn save_organization(ctx: &AppContext, name: &str) -> Result<(), String> {
    let session = require_session(ctx).map_err(|e| e.to_string())?;
    if session.role != Role::Admin {
        return Err(PageError::Forbidden.to_string());
    }
    let Some(tenant_id) = session.tenant_id.as_deref() else {
        return Err("Your account is not part of an organization.".to_owned());
    };
    let name = name.trim();
    if name.is_empty() {
        return Err("Enter the organization name.".to_owned());
    }
    ctx.store()
        .update(Collection::Tenants, tenant_id, fields([("name", json!(name))]))
        .await
        .map_err(|e| format!("Could not save the organization: {e}"))
}

/// Which single-field form is being saved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Setting {
    DisplayName,
    OrganizationName,
}

impl Setting {
    fn label(self) -> &'static str {
        match self {
            Self::DisplayName => "Display name",
            Self::OrganizationName => "Organization name",
        }
    }

    fn button(self) -> &'static str {
        match self {
            Self::DisplayName => "Save profile",
            Self::OrganizationName => "Save organization",
        }
    }

    /// # Errors
    ///
    /// As [`save_profile`] and [`save_organization`].
    pub async fn save(self, ctx: &AppContext, value: &str) -> Result<(), String> {
        match self {
            Self::DisplayName => save_profile(ctx, value).await,
            Self::OrganizationName => save_organization(ctx, value).await,
        }
    }
}

#[component]
fn SettingForm(ctx: AppContext, setting: Setting, initial: String) -> impl IntoView {
    let ctx = StoredValue::new_local(ctx);
    let value = RwSignal::new(initial.clone());
    let message = RwSignal::new(String::new());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let ctx = ctx.get_value();
        let value = value.get_untracked();
        spawn_local(async move {
            match setting.save(&ctx, &value).await {
                Ok(()) => message.set("Saved.".to_owned()),
                Err(text) => message.set(text),
            }
        });
    };

    view! {
        <form class="form" novalidate on:submit=on_submit>
            <label>
                {setting.label()}
                <input
                    type="text"
                    required
                    value=initial
                    on:input=move |ev| value.set(event_target_value(&ev))
                />
            </label>
            <button type="submit" class="btn btn--primary">{setting.button()}</button>
            <FormMessage message=message />
        </form>
    }
}

pub struct SettingsPage {
    ctx: AppContext,
}

impl SettingsPage {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

#[async_trait(?Send)]
impl Page for SettingsPage {
    async fn render(&mut self, _request: &PageRequest) -> Result<PageView, PageError> {
        let session = require_session(&self.ctx)?;
        let mut organization = None;
        if session.role == Role::Admin {
            if let Some(tenant_id) = session.tenant_id.as_deref() {
                let store = self.ctx.store();
                let tenant: Option<Tenant> = get_record(store.as_ref(), Collection::Tenants, tenant_id).await?;
                organization = Some(tenant.map(|t| t.name).unwrap_or_default());
            }
        }

        let ctx = self.ctx.clone();
        Ok(PageView::new(move || {
            let profile = view! { <SettingForm ctx=ctx.clone() setting=Setting::DisplayName initial=session.display_name /> };
            let organization = organization.map(|current| {
                view! {
                    <h2>"Organization"</h2>
                    <SettingForm ctx=ctx setting=Setting::OrganizationName initial=current />
                }
            });
            view! {
                <PageFrame class="settings" title="Settings">
                    <h2>"Profile"</h2>
                    <label class="form__readonly">
                        "Email" <input type="email" value=session.email readonly />
                    </label>
                    {profile}
                    {organization}
                </PageFrame>
            }
        }))
    }
}
