use futures::executor::block_on;

use super::*;
use crate::env::{ConfigSource, HostContext};
use crate::net::http::ScriptedTransport;
use crate::util::storage::MemoryKv;
use crate::util::timer::ManualScheduler;

struct NoSource;

#[async_trait::async_trait(?Send)]
impl ConfigSource for NoSource {
    async fn fetch_document(&self, _path: &str) -> Result<String, String> {
        Err("none".into())
    }

    fn meta_content(&self, _name: &str) -> Option<String> {
        None
    }
}

fn context(config: Option<&AppConfig>) -> AppContext {
    let environment = Rc::new(Environment::new(HostContext::new("https", "evalhub.com", None), Rc::new(NoSource)));
    build_context(
        environment,
        config,
        Rc::new(ScriptedTransport::new()),
        Rc::new(MemoryKv::new()),
        Rc::new(ManualScheduler::new()),
    )
}

#[test]
fn without_config_everything_runs_on_demo_data() {
    let ctx = context(None);
    assert!(!ctx.auth().has_primary());
    assert!(ctx.is_demo());
    let invite = block_on(ctx.store().get(schema::Collection::Invitations, "demo-invite")).unwrap();
    assert!(invite.is_some());
}

#[test]
fn fallback_session_switches_to_demo_store() {
    let config = crate::env::embedded_config();
    let ctx = context(Some(&config));
    assert!(ctx.auth().has_primary());
    assert!(!ctx.is_demo());

    // The scripted transport has no responses, so sign-in is unreachable.
    block_on(ctx.auth().login("evaluator@demo.com", "evaluator123")).unwrap();
    assert!(ctx.is_demo());
}

#[test]
fn navigator_records_requests_without_a_router() {
    let ctx = context(None);
    ctx.navigator().go("/dashboard");
    ctx.navigator().refresh();
    assert_eq!(ctx.navigator().requested(), vec!["/dashboard", "(refresh)"]);
}
