//! Tenant user administration: list, activate / deactivate, invite.

use async_trait::async_trait;
use leptos::prelude::*;
use schema::{Collection, Invitation, Role, Tenant, UserRecord, UserStatus};
use serde_json::json;

use super::{Page, PageError, PageRequest, PageView, require_role, valid_email};
use crate::app::AppContext;
use crate::auth::Session;
use crate::components::page_frame::{Badge, DataTable, EmptyState, FormMessage, InvitationLink, PageFrame};
use crate::net::store::{DataStore, Filter, fields, get_record, query_records, set_record};
use crate::router::STAFF;
use crate::util::dates::INVITATION_TTL_MS;
use crate::util::task::{now_ms, spawn_local};

#[cfg(test)]
#[path = "users_test.rs"]
mod users_test;

/// Roles an organization admin may invite into their own tenant.
pub const INVITABLE_ROLES: [Role; 3] = [Role::Worker, Role::Evaluator, Role::Admin];

/// Create a member invitation into the caller's tenant and return its
/// registration link.
///
/// # Errors
///
/// Validation failures and store errors as user-facing messages.
pub async fn create_invitation(ctx: &AppContext, email: &str, role: Role) -> Result<String, String> {
    let session = require_role(ctx, STAFF).map_err(|e| e.to_string())?;
    let email = email.trim().to_ascii_lowercase();
    if !valid_email(&email) {
        return Err("Enter a valid email address.".to_owned());
    }
    if !INVITABLE_ROLES.contains(&role) {
        return Err("That role cannot be invited here.".to_owned());
    }
    let Some(tenant_id) = session.tenant_id.clone() else {
        return Err("Your account is not part of an organization.".to_owned());
    };

    let store = ctx.store();
    let tenant_name = match get_record::<Tenant>(store.as_ref(), Collection::Tenants, &tenant_id).await {
        Ok(tenant) => tenant.map(|t| t.name),
        Err(e) => return Err(format!("Could not read your organization: {e}")),
    };
    let token = uuid::Uuid::new_v4().to_string();
    let invitation = Invitation {
        id: token.clone(),
        email,
        role,
        tenant_id,
        tenant_name,
        used: false,
        expires_at: Some(now_ms() + INVITATION_TTL_MS),
        created_by: Some(session.uid.clone()),
    };
    set_record(store.as_ref(), Collection::Invitations, &token, &invitation)
        .await
        .map_err(|e| format!("Could not create the invitation: {e}"))?;
    log::info!("users: {} invited {} as {}", session.uid, invitation.email, role.as_str());
    Ok(format!("/register?token={token}"))
}

/// Activate or deactivate `uid`. Admins are confined to their own tenant and
/// cannot change their own status.
///
/// # Errors
///
/// Permission and store errors as user-facing messages.
pub async fn set_user_status(ctx: &AppContext, uid: &str, status: UserStatus) -> Result<(), String> {
    let session = require_role(ctx, STAFF).map_err(|e| e.to_string())?;
    if uid == session.uid {
        return Err("You cannot change your own status.".to_owned());
    }
    let store = ctx.store();
    let user = get_record::<UserRecord>(store.as_ref(), Collection::Users, uid)
        .await
        .map_err(|e| e.to_string())?
        .ok_or_else(|| "That user no longer exists.".to_owned())?;
    if session.role != Role::Developer && user.tenant_id.as_deref() != Some(session.tenant()) {
        return Err(PageError::Forbidden.to_string());
    }
    store
        .update(Collection::Users, uid, fields([("status", json!(status.as_str()))]))
        .await
        .map_err(|e| e.to_string())
}

/// Users visible to `session`: every user for developers, the tenant
/// otherwise.
///
/// # Errors
///
/// Store failures.
pub async fn visible_users(store: &dyn DataStore, session: &Session) -> Result<Vec<UserRecord>, PageError> {
    let filters = if session.role == Role::Developer {
        Vec::new()
    } else {
        vec![Filter::eq("tenantId", session.tenant())]
    };
    let mut users: Vec<UserRecord> = query_records(store, Collection::Users, &filters).await?;
    users.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
    Ok(users)
}

/// The status a row's button switches to, with its label.
#[must_use]
pub fn status_toggle(status: UserStatus) -> (UserStatus, &'static str) {
    match status {
        UserStatus::Active => (UserStatus::Inactive, "Deactivate"),
        UserStatus::Inactive | UserStatus::Pending => (UserStatus::Active, "Activate"),
    }
}

#[component]
fn UserTable(ctx: AppContext, users: Vec<UserRecord>, me: String) -> impl IntoView {
    let ctx = StoredValue::new_local(ctx);
    let change_status = move |uid: String, status: UserStatus| {
        let ctx = ctx.get_value();
        spawn_local(async move {
            match set_user_status(&ctx, &uid, status).await {
                Ok(()) => ctx.navigator().refresh(),
                Err(message) => log::warn!("users: status change for {uid} failed: {message}"),
            }
        });
    };

    let rows = users
        .into_iter()
        .map(|user| {
            let action = (user.id != me).then(|| {
                let (next, label) = status_toggle(user.status);
                let uid = user.id.clone();
                view! {
                    <button
                        type="button"
                        class="btn btn--small"
                        data-id=uid.clone()
                        on:click=move |_| change_status(uid.clone(), next)
                    >
                        {label}
                    </button>
                }
            });
            let name = user.name().to_owned();
            view! {
                <tr>
                    <td>{name}</td>
                    <td>{user.email}</td>
                    <td><Badge label=user.role.label() /></td>
                    <td>{user.status.as_str()}</td>
                    <td>{action}</td>
                </tr>
            }
        })
        .collect_view();

    view! { <DataTable headers=&["Name", "Email", "Role", "Status", ""]>{rows}</DataTable> }
}

#[component]
fn InviteForm(ctx: AppContext) -> impl IntoView {
    let ctx = StoredValue::new_local(ctx);
    let email = RwSignal::new(String::new());
    let role = RwSignal::new(Role::Worker);
    let message = RwSignal::new(String::new());
    let link = RwSignal::new(None::<String>);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        let ctx = ctx.get_value();
        let email = email.get_untracked();
        let role = role.get_untracked();
        spawn_local(async move {
            match create_invitation(&ctx, &email, role).await {
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
        <h2>"Invite a user"</h2>
        <form class="form form--inline" novalidate on:submit=on_submit>
            <label>
                "Email"
                <input
                    type="email"
                    required
                    prop:value=move || email.get()
                    on:input=move |ev| email.set(event_target_value(&ev))
                />
            </label>
            <label>
                "Role"
                <select on:change=move |ev| {
                    if let Some(parsed) = Role::parse(&event_target_value(&ev)) {
                        role.set(parsed);
                    }
                }>
                    {INVITABLE_ROLES
                        .into_iter()
                        .map(|r| view! { <option value=r.as_str()>{r.label()}</option> })
                        .collect_view()}
                </select>
            </label>
            <button type="submit" class="btn btn--primary">"Create invitation"</button>
            <FormMessage message=message />
            <InvitationLink link=link />
        </form>
    }
}

pub struct UsersPage {
    ctx: AppContext,
}

impl UsersPage {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

#[async_trait(?Send)]
impl Page for UsersPage {
    async fn render(&mut self, _request: &PageRequest) -> Result<PageView, PageError> {
        let session = require_role(&self.ctx, STAFF)?;
        let store = self.ctx.store();
        let users = visible_users(store.as_ref(), &session).await?;
        let can_invite = session.tenant_id.is_some();
        let me = session.uid;
        let ctx = self.ctx.clone();

        Ok(PageView::new(move || {
            let list = if users.is_empty() {
                view! { <EmptyState message="No users yet." /> }.into_any()
            } else {
                view! { <UserTable ctx=ctx.clone() users=users me=me /> }.into_any()
            };
            let invite = can_invite.then(|| view! { <InviteForm ctx=ctx /> });
            view! {
                <PageFrame class="users" title="Users">
                    {list}
                    {invite}
                </PageFrame>
            }
        }))
    }
}
