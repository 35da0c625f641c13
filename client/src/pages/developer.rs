//! Platform console: every tenant, and onboarding of new organizations.
//!
//! A new organization starts as an admin invitation carrying a fresh tenant
//! id. The tenant document itself is written when that admin registers.

use async_trait::async_trait;
use leptos::prelude::*;
use schema::{Collection, Invitation, Role, Tenant, UserRecord};

use super::{Page, PageError, PageRequest, PageView, require_role, valid_email};
use crate::app::AppContext;
use crate::components::page_frame::{Badge, DataTable, EmptyState, FormMessage, InvitationLink, PageFrame};
use crate::net::store::{query_records, set_record};
use crate::router::DEVELOPERS;
use crate::util::dates::{INVITATION_TTL_MS, date_label};
use crate::util::task::{now_ms, spawn_local};

#[cfg(test)]
#[path = "developer_test.rs"]
mod developer_test;

/// Create an admin invitation for a new organization and return its
/// `/register-admin` link.
///
/// # Errors
///
/// Validation and store failures as user-facing messages.
pub async fn create_tenant_invitation(ctx: &AppContext, org_name: &str, admin_email: &str) -> Result<String, String> {
    let session = require_role(ctx, DEVELOPERS).map_err(|e| e.to_string())?;
    let org_name = org_name.trim();
    if org_name.is_empty() {
        return Err("Enter the organization name.".to_owned());
    }
    let email = admin_email.trim().to_ascii_lowercase();
    if !valid_email(&email) {
        return Err("Enter a valid email address.".to_owned());
    }

    let token = uuid::Uuid::new_v4().to_string();
    let invitation = Invitation {
        id: token.clone(),
        email,
        role: Role::Admin,
        tenant_id: uuid::Uuid::new_v4().to_string(),
        tenant_name: Some(org_name.to_owned()),
        used: false,
        expires_at: Some(now_ms() + INVITATION_TTL_MS),
        created_by: Some(session.uid.clone()),
    };
    set_record(ctx.store().as_ref(), Collection::Invitations, &token, &invitation)
        .await
        .map_err(|e| format!("Could not create the invitation: {e}"))?;
    log::info!("developer: invited {} to set up {org_name} ({})", invitation.email, invitation.tenant_id);
    Ok(format!("/register-admin?token={token}"))
}

/// One organization as listed on the console.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantSummary {
    pub name: String,
    pub members: usize,
    pub active: bool,
    pub created: String,
}

/// Tenants sorted by name, each with its member count.
#[must_use]
pub fn summarize(mut tenants: Vec<Tenant>, users: &[UserRecord]) -> Vec<TenantSummary> {
    tenants.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
    tenants
        .into_iter()
        .map(|t| TenantSummary {
            members: users.iter().filter(|u| u.tenant_id.as_deref() == Some(t.id.as_str())).count(),
            active: t.active,
            created: t.created_at.map(date_label).unwrap_or_default(),
            name: t.name,
        })
        .collect()
}

#[component]
fn TenantTable(tenants: Vec<TenantSummary>) -> impl IntoView {
    if tenants.is_empty() {
        return view! { <EmptyState message="No organizations yet." /> }.into_any();
    }
    let rows = tenants
        .into_iter()
        .map(|t| {
            let status = if t.active { "active" } else { "inactive" };
            view! {
                <tr>
                    <td>{t.name}</td>
                    <td>{t.members.to_string()}</td>
                    <td><Badge label=status /></td>
                    <td>{t.created}</td>
                </tr>
            }
        })
        .collect_view();
    view! { <DataTable headers=&["Organization", "Members", "Status", "Created"]>{rows}</DataTable> }.into_any()
}

#[component]
fn OnboardingForm(ctx: AppContext) -> impl IntoView {
    let ctx = StoredValue::new_local(ctx);
    let org_name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let message = RwSignal::new(String::new());
    let link = RwSignal::new(None::<String>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let ctx = ctx.get_value();
        let org_name = org_name.get_untracked();
        let email = email.get_untracked();
        spawn_local(async move {
            match create_tenant_invitation(&ctx, &org_name, &email).await {
                Ok(path) => {
                    message.set("Invitation created.".to_owned());
                    link.set(Some(path));
                }
                Err(text) => {
                    message.set(text);
                    link.set(None);
                }
            }
        });
    };

    view! {
        <h2>"New organization"</h2>
        <form class="form" novalidate on:submit=on_submit>
            <label>
                "Organization name"
                <input
                    type="text"
                    required
                    prop:value=move || org_name.get()
                    on:input=move |ev| org_name.set(event_target_value(&ev))
                />
            </label>
            <label>
                "Admin email"
                <input
                    type="email"
                    required
                    prop:value=move || email.get()
                    on:input=move |ev| email.set(event_target_value(&ev))
                />
            </label>
            <button type="submit" class="btn btn--primary">"Create admin invitation"</button>
            <FormMessage message=message />
            <InvitationLink link=link />
        </form>
    }
}

pub struct DeveloperPage {
    ctx: AppContext,
}

impl DeveloperPage {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

#[async_trait(?Send)]
impl Page for DeveloperPage {
    async fn render(&mut self, _request: &PageRequest) -> Result<PageView, PageError> {
        require_role(&self.ctx, DEVELOPERS)?;
        let store = self.ctx.store();
        let tenants: Vec<Tenant> = query_records(store.as_ref(), Collection::Tenants, &[]).await?;
        let users: Vec<UserRecord> = query_records(store.as_ref(), Collection::Users, &[]).await?;
        let tenants = summarize(tenants, &users);

        let ctx = self.ctx.clone();
        Ok(PageView::new(move || {
            let form = view! { <OnboardingForm ctx=ctx /> };
            view! {
                <PageFrame class="developer" title="Organizations">
                    <TenantTable tenants=tenants />
                    {form}
                </PageFrame>
            }
        }))
    }
}
