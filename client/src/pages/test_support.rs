//! Contexts for page tests.

use std::rc::Rc;

use async_trait::async_trait;
use futures::executor::block_on;

use super::{Page, PageError, PageRequest, PageView};
use crate::app::AppContext;
use crate::auth::{AuthService, PrimaryAuth, TempAuth};
use crate::env::{ConfigSource, Environment, HostContext};
use crate::net::http::{HttpTransport, ScriptedTransport};
use crate::net::identity::IdentityClient;
use crate::net::memory::MemoryStore;
use crate::net::{DataStore, SharedToken};
use crate::util::storage::{KeyValueStore, MemoryKv};
use crate::util::timer::{ManualScheduler, Scheduler};

struct Offline;

#[async_trait(?Send)]
impl ConfigSource for Offline {
    async fn fetch_document(&self, _path: &str) -> Result<String, String> {
        Err("offline".to_owned())
    }

    fn meta_content(&self, _name: &str) -> Option<String> {
        None
    }
}

pub(crate) struct TestApp {
    pub ctx: AppContext,
    pub store: Rc<MemoryStore>,
    pub transport: Rc<ScriptedTransport>,
}

impl TestApp {
    /// Sign in through the auth service (fallback accounts in demo apps).
    pub fn sign_in(&self, email: &str, password: &str) {
        block_on(self.ctx.auth().login(email, password)).unwrap();
    }
}

/// Render `page` for `path` and flatten the view to markup.
pub(crate) fn render_html(page: &mut dyn Page, path: &str) -> Result<String, PageError> {
    let request = PageRequest::parse(path);
    block_on(page.render(&request)).map(PageView::to_html)
}

fn environment() -> Rc<Environment> {
    Rc::new(Environment::new(HostContext::new("http", "localhost", Some(5000)), Rc::new(Offline)))
}

fn temp_auth(kv: &Rc<MemoryKv>) -> TempAuth {
    TempAuth::new(Rc::clone(kv) as Rc<dyn KeyValueStore>, Rc::new(ManualScheduler::new()) as Rc<dyn Scheduler>)
}

/// No identity service: demo accounts and the seeded demo store.
pub(crate) fn demo_app() -> TestApp {
    let kv = Rc::new(MemoryKv::new());
    let store = Rc::new(MemoryStore::demo());
    let auth = Rc::new(AuthService::new(None, temp_auth(&kv), kv as Rc<dyn KeyValueStore>, SharedToken::new()));
    let ctx = AppContext::new(environment(), auth, None, Rc::clone(&store) as Rc<dyn DataStore>);
    TestApp { ctx, store, transport: Rc::new(ScriptedTransport::new()) }
}

/// Scripted identity service with `store` (the demo data set) as the
/// primary store.
pub(crate) fn primary_app() -> TestApp {
    let kv = Rc::new(MemoryKv::new());
    let store = Rc::new(MemoryStore::demo());
    let transport = Rc::new(ScriptedTransport::new());
    let primary = PrimaryAuth {
        identity: IdentityClient::new(Rc::clone(&transport) as Rc<dyn HttpTransport>, "http://id.test/v1", "key"),
        store: Rc::clone(&store) as Rc<dyn DataStore>,
    };
    let auth = Rc::new(AuthService::new(Some(primary), temp_auth(&kv), kv as Rc<dyn KeyValueStore>, SharedToken::new()));
    let ctx = AppContext::new(
        environment(),
        auth,
        Some(Rc::clone(&store) as Rc<dyn DataStore>),
        Rc::new(MemoryStore::new()) as Rc<dyn DataStore>,
    );
    TestApp { ctx, store, transport }
}
