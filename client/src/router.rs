//! Client-side router.
//!
//! SYSTEM CONTEXT
//! ==============
//! The router owns the fixed route table, listens to browser history, checks
//! the auth gate for each route, and hands rendering to page objects built by
//! a `PageFactory`. It is the only writer of the content container.
//!
//! DESIGN
//! ======
//! Every navigation takes a generation number. A page whose `render` or
//! `init` completes after a newer navigation started is discarded: its view
//! is never mounted and its `cleanup` runs. Redirect targets (`/login`,
//! `/dashboard`) are rendered directly, so a redirect never re-enters the
//! gate.
//!
//! ERROR HANDLING
//! ==============
//! `navigate` never fails. Unknown paths redirect to `/login`; errors from
//! page construction, `render` or `init` are logged and replaced by an inline
//! panel with a reload action.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use schema::Role;

use leptos::prelude::*;

use crate::auth::Session;
use crate::components::error_panel::ReloadPanel;
use crate::pages::{Page, PageError, PageFactory, PageId, PageRequest, PageView};

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

// =============================================================================
// SEAMS
// =============================================================================

/// Session source consulted before protected routes.
pub trait AuthGate {
    fn session(&self) -> Option<Session>;

    fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }

    fn role(&self) -> Option<Role> {
        self.session().map(|s| s.role)
    }
}

/// Browser history.
pub trait History {
    /// Path plus query of the current entry.
    fn current_path(&self) -> String;
    fn push(&self, path: &str);
    fn replace(&self, path: &str);
    /// Call `on_pop` with the new path on back/forward navigation.
    fn listen(&self, on_pop: Box<dyn Fn(String)>);
}

/// The content container. Mounting a view unmounts the previous one.
pub trait Outlet {
    fn mount(&self, view: PageView);
}

// =============================================================================
// ROUTES
// =============================================================================

pub const STAFF: &[Role] = &[Role::Admin, Role::Developer];
pub const GOAL_OWNERS: &[Role] = &[Role::Worker, Role::Evaluator, Role::Admin];
pub const REVIEWERS: &[Role] = &[Role::Evaluator, Role::Admin];
pub const DEVELOPERS: &[Role] = &[Role::Developer];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
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

impl Route {
    pub const ALL: [Self; 12] = [
        Self::Root,
        Self::Login,
        Self::Register,
        Self::RegisterAdmin,
        Self::Dashboard,
        Self::Users,
        Self::GoalSetting,
        Self::GoalApprovals,
        Self::EvaluationForm,
        Self::Evaluations,
        Self::Settings,
        Self::Developer,
    ];

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::RegisterAdmin => "/register-admin",
            Self::Dashboard => "/dashboard",
            Self::Users => "/users",
            Self::GoalSetting => "/goal-setting",
            Self::GoalApprovals => "/goal-approvals",
            Self::EvaluationForm => "/evaluation-form",
            Self::Evaluations => "/evaluations",
            Self::Settings => "/settings",
            Self::Developer => "/developer",
        }
    }

    /// Exact match on a normalized path without query.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.path() == path)
    }

    #[must_use]
    pub fn requires_auth(self) -> bool {
        !matches!(self, Self::Root | Self::Login | Self::Register | Self::RegisterAdmin)
    }

    /// Roles admitted to a protected route; `None` admits every signed-in user.
    #[must_use]
    pub fn allowed_roles(self) -> Option<&'static [Role]> {
        match self {
            Self::Users => Some(STAFF),
            Self::GoalSetting => Some(GOAL_OWNERS),
            Self::GoalApprovals | Self::EvaluationForm => Some(REVIEWERS),
            Self::Developer => Some(DEVELOPERS),
            _ => None,
        }
    }

    /// Page rendered for this route. `/` only redirects.
    #[must_use]
    pub fn page(self) -> Option<PageId> {
        match self {
            Self::Root => None,
            Self::Login => Some(PageId::Login),
            Self::Register => Some(PageId::Register),
            Self::RegisterAdmin => Some(PageId::RegisterAdmin),
            Self::Dashboard => Some(PageId::Dashboard),
            Self::Users => Some(PageId::Users),
            Self::GoalSetting => Some(PageId::GoalSetting),
            Self::GoalApprovals => Some(PageId::GoalApprovals),
            Self::EvaluationForm => Some(PageId::EvaluationForm),
            Self::Evaluations => Some(PageId::Evaluations),
            Self::Settings => Some(PageId::Settings),
            Self::Developer => Some(PageId::Developer),
        }
    }

    /// Whether `session` may open this route.
    #[must_use]
    pub fn admits(self, session: &Session) -> bool {
        self.allowed_roles().is_none_or(|roles| session.has_role(roles))
    }
}

/// Empty becomes `/`; a trailing slash on the path part is dropped.
#[must_use]
pub fn normalize(path: &str) -> String {
    let path = path.trim();
    let (path, query) = match path.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (path, None),
    };
    let trimmed = path.trim_end_matches('/');
    let path = if trimmed.is_empty() { "/" } else { trimmed };
    match query {
        Some(q) if !q.is_empty() => format!("{path}?{q}"),
        _ => path.to_owned(),
    }
}

// =============================================================================
// ROUTER
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Navigating,
    Rendered,
}

/// Outcome of one `navigate` call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Rendered(Route),
    Redirected(Route),
    /// A newer navigation started before this one finished.
    Superseded,
    /// The error panel was shown.
    Failed(String),
}

pub struct Router {
    routes: RefCell<HashMap<&'static str, Route>>,
    history: Rc<dyn History>,
    outlet: Rc<dyn Outlet>,
    pages: Rc<dyn PageFactory>,
    gate: Rc<dyn AuthGate>,
    generation: Cell<u64>,
    state: Cell<RouterState>,
    current: RefCell<Option<Box<dyn Page>>>,
    current_route: Cell<Option<Route>>,
}

impl Router {
    #[must_use]
    pub fn new(history: Rc<dyn History>, outlet: Rc<dyn Outlet>, pages: Rc<dyn PageFactory>, gate: Rc<dyn AuthGate>) -> Self {
        Self {
            routes: RefCell::new(HashMap::new()),
            history,
            outlet,
            pages,
            gate,
            generation: Cell::new(0),
            state: Cell::new(RouterState::Idle),
            current: RefCell::new(None),
            current_route: Cell::new(None),
        }
    }

    /// Populate the route table and re-navigate (without pushing) on
    /// back/forward.
    pub fn initialize(self: &Rc<Self>) {
        {
            let mut routes = self.routes.borrow_mut();
            for route in Route::ALL {
                routes.insert(route.path(), route);
            }
        }
        let weak: Weak<Self> = Rc::downgrade(self);
        self.history.listen(Box::new(move |path| {
            let Some(router) = weak.upgrade() else {
                return;
            };
            crate::util::task::spawn_local(async move {
                router.navigate(&path, false).await;
            });
        }));
        log::debug!("router: {} routes registered", Route::ALL.len());
    }

    #[must_use]
    pub fn state(&self) -> RouterState {
        self.state.get()
    }

    /// Route whose page currently owns the container.
    #[must_use]
    pub fn current_route(&self) -> Option<Route> {
        self.current_route.get()
    }

    /// Route table lookup, ignoring any query string.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<Route> {
        let path = path.split('?').next().unwrap_or_default();
        self.routes.borrow().get(path).copied()
    }

    pub async fn navigate(&self, path: &str, push_history: bool) -> Navigation {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.state.set(RouterState::Navigating);

        let path = normalize(path);
        if push_history {
            self.history.push(&path);
        }
        log::debug!("router: navigate {path} (#{generation})");

        let Some(route) = self.lookup(&path) else {
            log::info!("router: no route for {path}, redirecting to /login");
            return self.redirect(Route::Login, generation).await;
        };
        if route == Route::Root {
            let target = if self.gate.is_authenticated() { Route::Dashboard } else { Route::Login };
            return self.redirect(target, generation).await;
        }
        self.load_page(route, &PageRequest::parse(&path), route.requires_auth(), generation)
            .await
    }

    /// Re-render the current history entry without pushing.
    pub async fn refresh(&self) -> Navigation {
        let path = self.history.current_path();
        self.navigate(&path, false).await
    }

    async fn load_page(&self, route: Route, request: &PageRequest, require_authentication: bool, generation: u64) -> Navigation {
        if require_authentication {
            let Some(session) = self.gate.session() else {
                log::info!("router: {} requires sign-in", route.path());
                return self.redirect(Route::Login, generation).await;
            };
            if !route.admits(&session) {
                log::info!("router: {} is not available to {}", route.path(), session.role);
                return self.redirect(Route::Dashboard, generation).await;
            }
        }
        let Some(id) = route.page() else {
            return self.fail(generation, &format!("{} has no page", route.path()));
        };
        match self.render(route, id, request, generation).await {
            Navigation::Rendered(_) => Navigation::Rendered(route),
            other => other,
        }
    }

    /// Replace the history entry with `target` and render it without a
    /// gate check.
    async fn redirect(&self, target: Route, generation: u64) -> Navigation {
        self.history.replace(target.path());
        let Some(id) = target.page() else {
            return self.fail(generation, "redirect target has no page");
        };
        match self.render(target, id, &PageRequest::parse(target.path()), generation).await {
            Navigation::Rendered(route) => Navigation::Redirected(route),
            other => other,
        }
    }

    async fn render(&self, route: Route, id: PageId, request: &PageRequest, generation: u64) -> Navigation {
        let mut page = match self.pages.create(id) {
            Ok(page) => page,
            Err(e) => return self.fail(generation, &e.to_string()),
        };

        let view = match page.render(request).await {
            Ok(view) => view,
            Err(e) => {
                page.cleanup();
                return self.fail_page(generation, route, &e);
            }
        };
        if self.is_stale(generation) {
            log::debug!("router: discarding stale render of {} (#{generation})", route.path());
            page.cleanup();
            return Navigation::Superseded;
        }

        self.outlet.mount(view);
        self.release_current();
        self.current_route.set(Some(route));

        if let Err(e) = page.init().await {
            page.cleanup();
            return self.fail_page(generation, route, &e);
        }
        if self.is_stale(generation) {
            log::debug!("router: discarding stale init of {} (#{generation})", route.path());
            page.cleanup();
            return Navigation::Superseded;
        }

        *self.current.borrow_mut() = Some(page);
        self.state.set(RouterState::Rendered);
        Navigation::Rendered(route)
    }

    fn is_stale(&self, generation: u64) -> bool {
        generation != self.generation.get()
    }

    fn release_current(&self) {
        let previous = self.current.borrow_mut().take();
        if let Some(mut previous) = previous {
            previous.cleanup();
        }
    }

    fn fail_page(&self, generation: u64, route: Route, error: &PageError) -> Navigation {
        log::error!("router: {} failed: {error}", route.path());
        self.fail(generation, &error.to_string())
    }

    fn fail(&self, generation: u64, message: &str) -> Navigation {
        if self.is_stale(generation) {
            return Navigation::Superseded;
        }
        let panel_message = message.to_owned();
        self.outlet.mount(PageView::new(move || view! { <ReloadPanel message=panel_message /> }));
        self.release_current();
        self.current_route.set(None);
        self.state.set(RouterState::Rendered);
        Navigation::Failed(message.to_owned())
    }
}

// =============================================================================
// IN-MEMORY HISTORY & OUTLET
// =============================================================================

/// History stack without a browser. `pop` simulates back/forward.
#[derive(Default)]
pub struct MemoryHistory {
    entries: RefCell<Vec<String>>,
    listener: RefCell<Option<Rc<dyn Fn(String)>>>,
}

impl MemoryHistory {
    #[must_use]
    pub fn new(initial: &str) -> Self {
        Self { entries: RefCell::new(vec![initial.to_owned()]), listener: RefCell::new(None) }
    }

    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }

    /// Go back one entry and notify the listener.
    pub fn back(&self) {
        let path = {
            let mut entries = self.entries.borrow_mut();
            if entries.len() > 1 {
                entries.pop();
            }
            entries.last().cloned().unwrap_or_else(|| "/".to_owned())
        };
        let listener = self.listener.borrow().clone();
        if let Some(listener) = listener {
            listener(path);
        }
    }
}

impl History for MemoryHistory {
    fn current_path(&self) -> String {
        self.entries.borrow().last().cloned().unwrap_or_else(|| "/".to_owned())
    }

    fn push(&self, path: &str) {
        self.entries.borrow_mut().push(path.to_owned());
    }

    fn replace(&self, path: &str) {
        let mut entries = self.entries.borrow_mut();
        entries.pop();
        entries.push(path.to_owned());
    }

    fn listen(&self, on_pop: Box<dyn Fn(String)>) {
        *self.listener.borrow_mut() = Some(Rc::from(on_pop));
    }
}

/// Container that server-renders each mounted view and keeps the markup.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryOutlet {
    html: RefCell<String>,
    writes: Cell<usize>,
}

#[cfg(test)]
impl MemoryOutlet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn html(&self) -> String {
        self.html.borrow().clone()
    }

    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.get()
    }
}

#[cfg(test)]
impl Outlet for MemoryOutlet {
    fn mount(&self, view: PageView) {
        *self.html.borrow_mut() = view.to_html();
        self.writes.set(self.writes.get() + 1);
    }
}
