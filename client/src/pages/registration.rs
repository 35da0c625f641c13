//! Invitation-based registration shared by `/register` and `/register-admin`.
//!
//! DESIGN
//! ======
//! Rendering looks the invitation up by the `token` query parameter and
//! refuses unknown, used or expired invitations with a terminal panel.
//! Submission validates locally, creates the identity account, writes the
//! profile (and, for organization admins, the tenant), marks the invitation
//! used and starts the session.
//!
//! Both registration pages render through [`render_page`]; only the
//! [`RegistrationKind`] differs.

use leptos::prelude::*;
use schema::{Collection, Invitation, Role, Tenant, UserRecord, UserStatus};
use serde_json::json;

use super::{PageRequest, PageView};
use crate::app::AppContext;
use crate::auth::Session;
use crate::auth::messages::user_message;
use crate::components::error_panel::ErrorPanel;
use crate::components::page_frame::{Badge, FormMessage, PageFrame};
use crate::net::DataStore;
use crate::net::store::{fields, get_record, set_record};
use crate::util::task::{now_ms, spawn_local};

#[cfg(test)]
#[path = "registration_test.rs"]
mod registration_test;

pub const PASSWORD_MISMATCH: &str = "Passwords do not match.";

/// Why an invitation cannot be used.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvitationProblem {
    MissingToken,
    Unknown,
    Used,
    Expired,
    /// An organization invitation opened on the member page, or vice versa.
    WrongKind,
}

impl InvitationProblem {
    /// Panel title and explanation.
    #[must_use]
    pub fn describe(self) -> (&'static str, &'static str) {
        match self {
            Self::MissingToken => (
                "Invitation required",
                "This registration link is missing its invitation token. Ask your administrator for a new link.",
            ),
            Self::Unknown => ("Invitation not found", "This invitation does not exist. Check the link you were sent."),
            Self::Used => ("Invitation already used", "This invitation has already been used. Sign in instead."),
            Self::Expired => ("Invitation expired", "This invitation has expired. Ask your administrator for a new one."),
            Self::WrongKind => ("Wrong registration page", "This invitation cannot be used here. Open the exact link you were sent."),
        }
    }

    pub fn panel(self) -> impl IntoView {
        let (title, message) = self.describe();
        view! { <ErrorPanel title=title message=message /> }
    }
}

/// Which registration page is asking.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationKind {
    Member,
    OrganizationAdmin,
}

impl RegistrationKind {
    /// Page class and heading.
    fn heading(self) -> (&'static str, &'static str) {
        match self {
            Self::Member => ("register", "Create your account"),
            Self::OrganizationAdmin => ("register-admin", "Register your organization"),
        }
    }

    fn accepts(self, role: Role) -> bool {
        match self {
            Self::Member => role != Role::Admin,
            Self::OrganizationAdmin => role == Role::Admin,
        }
    }
}

/// Resolve `token` to a usable invitation. A missing token never touches
/// the store.
///
/// # Errors
///
/// The [`InvitationProblem`] to render.
pub async fn load_invitation(
    store: &dyn DataStore,
    token: Option<&str>,
    kind: RegistrationKind,
    now: i64,
) -> Result<Invitation, InvitationProblem> {
    let token = token.ok_or(InvitationProblem::MissingToken)?;
    let invitation = match get_record::<Invitation>(store, Collection::Invitations, token).await {
        Ok(Some(invitation)) => invitation,
        Ok(None) => return Err(InvitationProblem::Unknown),
        Err(e) => {
            log::warn!("register: invitation lookup failed: {e}");
            return Err(InvitationProblem::Unknown);
        }
    };
    if invitation.used {
        return Err(InvitationProblem::Used);
    }
    if !invitation.is_usable(now) {
        return Err(InvitationProblem::Expired);
    }
    if !kind.accepts(invitation.role) {
        return Err(InvitationProblem::WrongKind);
    }
    Ok(invitation)
}

/// Values taken from the form at submit time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub display_name: String,
    pub password: String,
    pub confirm: String,
    /// Only collected on the organization page.
    pub organization: Option<String>,
}

impl RegistrationForm {
    /// # Errors
    ///
    /// The first problem, as a user-facing message.
    pub fn validate(&self) -> Result<(), String> {
        if self.display_name.trim().is_empty() {
            return Err("Enter your name.".to_owned());
        }
        if self.organization.as_deref().is_some_and(|o| o.trim().is_empty()) {
            return Err("Enter the organization name.".to_owned());
        }
        if self.password.is_empty() {
            return Err("Choose a password.".to_owned());
        }
        if self.password != self.confirm {
            return Err(PASSWORD_MISMATCH.to_owned());
        }
        Ok(())
    }
}

/// Create the account for `invitation` and start its session.
///
/// # Errors
///
/// The user-facing failure message.
pub async fn submit(ctx: &AppContext, invitation: &Invitation, form: &RegistrationForm) -> Result<Session, String> {
    form.validate()?;
    let name = form.display_name.trim();
    let account = ctx
        .auth()
        .register(&invitation.email, &form.password, name)
        .await
        .map_err(|e| user_message(&e))?;

    let store = ctx.store();
    let now = now_ms();
    let save_failed = |e: crate::net::StoreError| {
        log::error!("register: account {} created but profile write failed: {e}", account.uid);
        format!("Your account was created but your profile could not be saved ({e}). Contact your administrator.")
    };

    if let Some(organization) = &form.organization {
        let tenant = Tenant {
            id: invitation.tenant_id.clone(),
            name: organization.trim().to_owned(),
            active: true,
            created_at: Some(now),
        };
        set_record(store.as_ref(), Collection::Tenants, &invitation.tenant_id, &tenant)
            .await
            .map_err(save_failed)?;
    }

    let record = UserRecord {
        id: account.uid.clone(),
        email: invitation.email.clone(),
        display_name: name.to_owned(),
        role: invitation.role,
        tenant_id: Some(invitation.tenant_id.clone()),
        status: UserStatus::Active,
        created_at: Some(now),
    };
    set_record(store.as_ref(), Collection::Users, &account.uid, &record)
        .await
        .map_err(save_failed)?;
    store
        .update(
            Collection::Invitations,
            &invitation.id,
            fields([("used", json!(true)), ("usedBy", json!(account.uid))]),
        )
        .await
        .map_err(save_failed)?;

    let session = ctx.auth().adopt(&account, &record).map_err(|e| user_message(&e))?;
    ctx.navigator().go("/dashboard");
    Ok(session)
}

/// Hint under the confirmation field; empty until there is a mismatch.
#[must_use]
pub fn mismatch_hint(password: &str, confirm: &str) -> &'static str {
    if confirm.is_empty() || confirm == password { "" } else { PASSWORD_MISMATCH }
}

/// Lead line above the form.
#[must_use]
pub fn joining_text(kind: RegistrationKind, tenant_name: Option<&str>) -> String {
    match (tenant_name, kind) {
        (_, RegistrationKind::OrganizationAdmin) => "You are setting up a new organization.".to_owned(),
        (Some(tenant), RegistrationKind::Member) => format!("You were invited to join {tenant}."),
        (None, RegistrationKind::Member) => "You were invited to join EvalHub.".to_owned(),
    }
}

/// Look the invitation up and build the page: the form, or the terminal
/// panel for an unusable invitation.
pub async fn render_page(ctx: &AppContext, request: &PageRequest, kind: RegistrationKind) -> PageView {
    let store = ctx.store();
    let outcome = load_invitation(store.as_ref(), request.param("token"), kind, now_ms()).await;
    let ctx = ctx.clone();
    let (class, title) = kind.heading();
    PageView::new(move || {
        let body = match outcome {
            Ok(invitation) => view! { <InvitationForm ctx=ctx kind=kind invitation=invitation /> }.into_any(),
            Err(problem) => problem.panel().into_any(),
        };
        view! { <PageFrame class=class title=title>{body}</PageFrame> }
    })
}

#[component]
fn InvitationForm(ctx: AppContext, kind: RegistrationKind, invitation: Invitation) -> impl IntoView {
    let ctx = StoredValue::new_local(ctx);
    let lead = joining_text(kind, invitation.tenant_name.as_deref());
    let role = invitation.role.label();
    let email = invitation.email.clone();
    let initial_organization = invitation.tenant_name.clone().unwrap_or_default();
    let invitation = StoredValue::new(invitation);

    let name = RwSignal::new(String::new());
    let organization = RwSignal::new(initial_organization.clone());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let message = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get_untracked() {
            return;
        }
        let form = RegistrationForm {
            display_name: name.get_untracked(),
            password: password.get_untracked(),
            confirm: confirm.get_untracked(),
            organization: (kind == RegistrationKind::OrganizationAdmin).then(|| organization.get_untracked()),
        };
        if let Err(text) = form.validate() {
            message.set(text);
            return;
        }
        busy.set(true);
        message.set("Creating your account...".to_owned());
        let ctx = ctx.get_value();
        let invitation = invitation.get_value();
        spawn_local(async move {
            if let Err(text) = submit(&ctx, &invitation, &form).await {
                message.set(text);
                busy.set(false);
            }
        });
    };

    let organization_field = (kind == RegistrationKind::OrganizationAdmin).then(|| {
        view! {
            <label>
                "Organization name"
                <input
                    type="text"
                    required
                    value=initial_organization
                    on:input=move |ev| organization.set(event_target_value(&ev))
                />
            </label>
        }
    });

    view! {
        <p class="page__lead">{lead} " Role: " <Badge label=role /></p>
        <form class="form" novalidate on:submit=on_submit>
            <label>"Email" <input type="email" value=email readonly /></label>
            {organization_field}
            <label>
                "Your name"
                <input
                    type="text"
                    autocomplete="name"
                    required
                    prop:value=move || name.get()
                    on:input=move |ev| name.set(event_target_value(&ev))
                />
            </label>
            <label>
                "Password"
                <input
                    type="password"
                    autocomplete="new-password"
                    required
                    prop:value=move || password.get()
                    on:input=move |ev| password.set(event_target_value(&ev))
                />
            </label>
            <label>
                "Confirm password"
                <input
                    type="password"
                    autocomplete="new-password"
                    required
                    prop:value=move || confirm.get()
                    on:input=move |ev| confirm.set(event_target_value(&ev))
                />
            </label>
            <p class="form-hint" aria-live="polite">
                {move || mismatch_hint(&password.get(), &confirm.get())}
            </p>
            <button type="submit" class="btn btn--primary" disabled=move || busy.get()>
                "Create account"
            </button>
            <FormMessage message=message />
        </form>
    }
}
