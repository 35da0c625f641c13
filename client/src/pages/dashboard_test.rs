use futures::executor::block_on;

use super::*;
use crate::pages::test_support::{demo_app, render_html};

#[test]
fn signed_out_render_is_forbidden() {
    let app = demo_app();
    let err = block_on(DashboardPage::new(app.ctx.clone()).render(&PageRequest::default())).unwrap_err();
    assert_eq!(err, PageError::Forbidden);
}

#[test]
fn admin_sees_tenant_counts() {
    let app = demo_app();
    app.sign_in("admin@demo.com", "admin123");
    let session = app.ctx.auth().current_session().unwrap();

    let cards = block_on(cards(app.store.as_ref(), &session)).unwrap();
    let titles: Vec<_> = cards.iter().map(|c| c.title).collect();
    assert_eq!(titles, vec!["Users", "Goals awaiting approval", "Evaluations"]);
    assert_eq!(cards[0].value, "3");
    assert_eq!(cards[1].value, "1");
}

#[test]
fn worker_sees_own_goal_weight() {
    let app = demo_app();
    app.sign_in("worker@demo.com", "worker123");
    let session = app.ctx.auth().current_session().unwrap();

    let cards = block_on(cards(app.store.as_ref(), &session)).unwrap();
    assert_eq!(cards[0].value, "3 (90% weighted)");
    assert_eq!(cards[1].href, "/evaluations");
}

#[test]
fn demo_render_carries_notice_and_links() {
    let app = demo_app();
    app.sign_in("evaluator@demo.com", "evaluator123");
    let markup = render_html(&mut DashboardPage::new(app.ctx.clone()), "/dashboard").unwrap();
    assert!(markup.contains("Demo mode"));
    assert!(markup.contains(r#"href="/goal-approvals" data-link"#));
    assert!(markup.contains("badge--evaluator"));
}
