//! Page objects for the routed screens.
//!
//! ARCHITECTURE
//! ============
//! A page is a render / init / cleanup unit. The router builds one per
//! navigation through a `PageFactory` and awaits `render`, which loads the
//! page's data and returns a [`PageView`]: the Leptos view to mount, not yet
//! built. The router mounts it into the content container only if no newer
//! navigation started meanwhile, then awaits `init`. `cleanup` runs when the
//! page is replaced or discarded.
//!
//! Views bind their own handlers (`on:submit`, `on:click`). The handlers call
//! plain async functions taking the `AppContext` and form values, which the
//! tests call directly.

use async_trait::async_trait;
use leptos::prelude::*;
use schema::Role;

use crate::app::AppContext;
use crate::auth::{AuthError, Session};
use crate::net::StoreError;

pub mod dashboard;
pub mod developer;
pub mod evaluation_form;
pub mod evaluations;
pub mod goal_approvals;
pub mod goal_setting;
pub mod login;
pub mod register;
pub mod register_admin;
pub(crate) mod registration;
pub mod settings;
pub mod users;

#[cfg(test)]
#[path = "test_support.rs"]
pub(crate) mod test_support;

/// Error surfaced by a page's `render` or `init`. The router turns it into
/// the reload panel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("you do not have access to this page")]
    Forbidden,
    #[error("{0}")]
    Missing(String),
}

/// Closed set of pages the router can build.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PageId {
    Login,
    Register,
    RegisterAdmin,
    Dashboard,
    Users,
    GoalSetting,
    GoalApprovals,
    EvaluationForm,
    Evaluations,
    Settings,
    Developer,
}

/// Path and query of the navigation being rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl PageRequest {
    /// Split `path?query` and decode the query pairs.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (path, query) = raw.split_once('?').unwrap_or((raw, ""));
        let query = url::form_urlencoded::parse(query.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { path: path.to_owned(), query }
    }

    /// First non-blank value of `name`.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, v)| k == name && !v.trim().is_empty())
            .map(|(_, v)| v.trim())
    }
}

/// A page's view, built when the router mounts it.
///
/// Building is deferred so the view's signals and effects are created under
/// the owner of the mount and disposed with it.
pub struct PageView(Box<dyn FnOnce() -> AnyView>);

impl PageView {
    pub fn new<F, V>(build: F) -> Self
    where
        F: FnOnce() -> V + 'static,
        V: IntoView + 'static,
    {
        Self(Box::new(move || build().into_any()))
    }

    #[must_use]
    pub fn build(self) -> AnyView {
        (self.0)()
    }

    /// Server-render the view under a throwaway owner. Needs Leptos' `ssr`
    /// feature, which only the test build enables.
    #[cfg(test)]
    #[must_use]
    pub fn to_html(self) -> String {
        let owner = Owner::new();
        owner.with(|| self.build().to_html())
    }
}

impl std::fmt::Debug for PageView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageView").finish_non_exhaustive()
    }
}

#[async_trait(?Send)]
pub trait Page {
    /// Load what the page shows and describe its view.
    async fn render(&mut self, request: &PageRequest) -> Result<PageView, PageError>;

    /// Runs once the view is mounted.
    async fn init(&mut self) -> Result<(), PageError> {
        Ok(())
    }

    /// Release handlers. Runs when the page is replaced or discarded.
    fn cleanup(&mut self) {}
}

pub trait PageFactory {
    /// # Errors
    ///
    /// Returns [`PageError`] when the page cannot be constructed.
    fn create(&self, id: PageId) -> Result<Box<dyn Page>, PageError>;
}

/// Builds every page with the shared application context.
pub struct StandardPages {
    ctx: AppContext,
}

impl StandardPages {
    #[must_use]
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }
}

impl PageFactory for StandardPages {
    fn create(&self, id: PageId) -> Result<Box<dyn Page>, PageError> {
        let ctx = self.ctx.clone();
        Ok(match id {
            PageId::Login => Box::new(login::LoginPage::new(ctx)),
            PageId::Register => Box::new(register::RegisterPage::new(ctx)),
            PageId::RegisterAdmin => Box::new(register_admin::RegisterAdminPage::new(ctx)),
            PageId::Dashboard => Box::new(dashboard::DashboardPage::new(ctx)),
            PageId::Users => Box::new(users::UsersPage::new(ctx)),
            PageId::GoalSetting => Box::new(goal_setting::GoalSettingPage::new(ctx)),
            PageId::GoalApprovals => Box::new(goal_approvals::GoalApprovalsPage::new(ctx)),
            PageId::EvaluationForm => Box::new(evaluation_form::EvaluationFormPage::new(ctx)),
            PageId::Evaluations => Box::new(evaluations::EvaluationsPage::new(ctx)),
            PageId::Settings => Box::new(settings::SettingsPage::new(ctx)),
            PageId::Developer => Box::new(developer::DeveloperPage::new(ctx)),
        })
    }
}

// =============================================================================
// SHARED HELPERS
// =============================================================================

/// Current session, or [`PageError::Forbidden`] when signed out.
///
/// # Errors
///
/// [`PageError::Forbidden`] without a session.
pub fn require_session(ctx: &AppContext) -> Result<Session, PageError> {
    ctx.auth().current_session().ok_or(PageError::Forbidden)
}

/// Current session with one of `roles`.
///
/// # Errors
///
/// [`PageError::Forbidden`] when signed out or the role is not listed.
pub fn require_role(ctx: &AppContext, roles: &[Role]) -> Result<Session, PageError> {
    let session = require_session(ctx)?;
    if session.has_role(roles) { Ok(session) } else { Err(PageError::Forbidden) }
}

/// Loose shape check; the identity service does the real validation.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    }
}
