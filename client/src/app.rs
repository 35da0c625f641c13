//! Application context, shell component and browser entry point.
//!
//! SYSTEM CONTEXT
//! ==============
//! `start` classifies the host, walks the configuration ladder, builds the
//! services into an `AppContext`, mounts the Leptos shell (header plus the
//! content container) and hands the container to the router. Without a
//! configuration the app still starts, with `TempAuth` and the in-memory demo
//! store only.
//!
//! DESIGN
//! ======
//! There are no global singletons: the context is built once and passed to
//! the page factory and the shell. It holds `Rc` services and is `!Send`, so
//! the shell keeps it in a local `StoredValue` and exposes reactive state only
//! through signals of plain data.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use leptos::prelude::*;
use schema::AppConfig;

use crate::auth::{AuthService, PrimaryAuth, TempAuth};
use crate::env::Environment;
use crate::net::firestore::FirestoreClient;
use crate::net::http::HttpTransport;
use crate::net::identity::IdentityClient;
use crate::net::memory::MemoryStore;
use crate::net::{DataStore, SharedToken};
use crate::router::Router;
use crate::util::dom::CONTENT_ID;
use crate::util::storage::KeyValueStore;
use crate::util::timer::Scheduler;

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

// =============================================================================
// CONTEXT
// =============================================================================

/// Navigation requests from pages and the shell.
#[derive(Default)]
pub struct Navigator {
    router: RefCell<Weak<Router>>,
    /// Request log for handler tests; absent from real builds.
    #[cfg(test)]
    requested: RefCell<Vec<String>>,
}

impl Navigator {
    pub fn attach(&self, router: &Rc<Router>) {
        *self.router.borrow_mut() = Rc::downgrade(router);
    }

    /// Navigate to `path`, pushing history.
    pub fn go(&self, path: &str) {
        #[cfg(test)]
        self.requested.borrow_mut().push(path.to_owned());
        let Some(router) = self.router.borrow().upgrade() else {
            log::debug!("navigator: no router attached, dropping {path}");
            return;
        };
        let path = path.to_owned();
        crate::util::task::spawn_local(async move {
            router.navigate(&path, true).await;
        });
    }

    /// Re-render the current entry (after a page changed its data).
    pub fn refresh(&self) {
        #[cfg(test)]
        self.requested.borrow_mut().push(String::from("(refresh)"));
        let Some(router) = self.router.borrow().upgrade() else {
            return;
        };
        crate::util::task::spawn_local(async move {
            router.refresh().await;
        });
    }

    /// Every path requested so far, oldest first.
    #[cfg(test)]
    #[must_use]
    pub fn requested(&self) -> Vec<String> {
        self.requested.borrow().clone()
    }
}

struct ContextInner {
    environment: Rc<Environment>,
    auth: Rc<AuthService>,
    primary_store: Option<Rc<dyn DataStore>>,
    demo_store: Rc<dyn DataStore>,
    navigator: Navigator,
}

/// Services shared by the router, pages and shell. Cloning shares them.
#[derive(Clone)]
pub struct AppContext(Rc<ContextInner>);

impl AppContext {
    #[must_use]
    pub fn new(
        environment: Rc<Environment>,
        auth: Rc<AuthService>,
        primary_store: Option<Rc<dyn DataStore>>,
        demo_store: Rc<dyn DataStore>,
    ) -> Self {
        Self(Rc::new(ContextInner {
            environment,
            auth,
            primary_store,
            demo_store,
            navigator: Navigator::default(),
        }))
    }

    #[must_use]
    pub fn environment(&self) -> &Environment {
        &self.0.environment
    }

    #[must_use]
    pub fn auth(&self) -> &Rc<AuthService> {
        &self.0.auth
    }

    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.0.navigator
    }

    /// Store for the current session: the demo store for fallback sessions
    /// or when no primary store is configured.
    #[must_use]
    pub fn store(&self) -> Rc<dyn DataStore> {
        match &self.0.primary_store {
            Some(store) if !self.0.auth.is_temp() => Rc::clone(store),
            _ => Rc::clone(&self.0.demo_store),
        }
    }

    /// True when pages are backed by the demo store.
    #[must_use]
    pub fn is_demo(&self) -> bool {
        self.0.primary_store.is_none() || self.0.auth.is_temp()
    }
}

/// Wire the services for `config`. `None` means no configuration could be
/// loaded: only the fallback provider and the demo store are available.
#[must_use]
pub fn build_context(
    environment: Rc<Environment>,
    config: Option<&AppConfig>,
    transport: Rc<dyn HttpTransport>,
    storage: Rc<dyn KeyValueStore>,
    scheduler: Rc<dyn Scheduler>,
) -> AppContext {
    let token = SharedToken::new();
    let endpoints = environment.endpoints();

    let (primary, primary_store) = match config {
        Some(config) => {
            let store: Rc<dyn DataStore> = Rc::new(FirestoreClient::new(
                Rc::clone(&transport),
                &endpoints.firestore,
                &config.project_id,
                token.clone(),
            ));
            let identity = IdentityClient::new(Rc::clone(&transport), &endpoints.identity, &config.api_key);
            (Some(PrimaryAuth { identity, store: Rc::clone(&store) }), Some(store))
        }
        None => (None, None),
    };

    let temp = TempAuth::new(Rc::clone(&storage), scheduler);
    let auth = Rc::new(AuthService::new(primary, temp, storage, token));
    AppContext::new(environment, auth, primary_store, Rc::new(MemoryStore::demo()))
}

// =============================================================================
// SHELL
// =============================================================================

/// Header with the signed-in user and the router's content container.
#[component]
pub fn App(ctx: AppContext) -> impl IntoView {
    let user = RwSignal::new(ctx.auth().current_session().map(|s| s.name().to_owned()));
    let demo = RwSignal::new(ctx.is_demo());

    let ctx = StoredValue::new_local(ctx);
    ctx.with_value(|ctx| {
        let watched = ctx.clone();
        ctx.auth().subscribe(move |session| {
            user.set(session.map(|s| s.name().to_owned()));
            demo.set(watched.is_demo());
        });
    });

    let on_logout = move |_| {
        ctx.with_value(|ctx| {
            ctx.auth().logout();
            ctx.navigator().go("/login");
        });
    };

    view! {
        <header class="app-header">
            <a class="app-header__brand" href="/" data-link>"EvalHub"</a>
            <Show when=move || demo.get()>
                <span class="badge badge--demo">"Demo mode"</span>
            </Show>
            <Show when=move || user.get().is_some()>
                <nav class="app-header__user">
                    <a href="/settings" data-link>{move || user.get().unwrap_or_default()}</a>
                    <button type="button" class="btn btn--ghost" on:click=on_logout>"Sign out"</button>
                </nav>
            </Show>
        </header>
        <main id=CONTENT_ID class="app-content"></main>
    }
}

// =============================================================================
// ENTRY POINT
// =============================================================================

#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    wasm_bindgen_futures::spawn_local(bootstrap());
}

#[cfg(feature = "csr")]
async fn bootstrap() {
    use crate::browser::{BrowserHistory, DomOutlet, intercept_links};
    use crate::env::{BrowserConfigSource, HostContext};
    use crate::net::http::GlooTransport;
    use crate::pages::StandardPages;
    use crate::router::{AuthGate, History, Outlet};
    use crate::util::storage::LocalStorage;
    use crate::util::timer::TimerScheduler;

    let host = HostContext::from_window().unwrap_or_else(|| HostContext::new("https", "", None));
    let environment = Rc::new(Environment::new(host, Rc::new(BrowserConfigSource)));
    let config = match environment.load_config().await {
        Ok(config) => Some(config),
        Err(e) => {
            log::warn!("{e}; starting with demo accounts only");
            None
        }
    };

    let ctx = build_context(
        Rc::clone(&environment),
        config.as_deref(),
        Rc::new(GlooTransport),
        Rc::new(LocalStorage),
        Rc::new(TimerScheduler),
    );
    ctx.auth().restore();
    if !ctx.auth().has_primary() {
        ctx.auth().watch_temp();
    }

    let shell_ctx = ctx.clone();
    leptos::mount::mount_to_body(move || view! { <App ctx=shell_ctx /> });

    let history = Rc::new(BrowserHistory);
    let router = Rc::new(Router::new(
        Rc::clone(&history) as Rc<dyn History>,
        Rc::new(DomOutlet::default()) as Rc<dyn Outlet>,
        Rc::new(StandardPages::new(ctx.clone())),
        Rc::clone(ctx.auth()) as Rc<dyn AuthGate>,
    ));
    ctx.navigator().attach(&router);
    router.initialize();
    intercept_links(ctx.clone());

    log::info!("evalhub: {} mode", environment.mode().as_str());
    router.navigate(&history.current_path(), false).await;
}
