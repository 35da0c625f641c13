use futures::executor::block_on;

use super::*;
use crate::pages::test_support::{demo_app, render_html};

fn status_of(app: &crate::pages::test_support::TestApp, id: &str) -> Goal {
    block_on(get_record(app.store.as_ref(), Collection::Goals, id)).unwrap().unwrap()
}

#[test]
fn evaluator_approves_pending_goal() {
    let app = demo_app();
    app.sign_in("evaluator@demo.com", "evaluator123");

    assert_eq!(block_on(decide(&app.ctx, "demo-goal-3", true)), Ok(GoalStatus::Approved));
    let goal = status_of(&app, "demo-goal-3");
    assert_eq!(goal.status, GoalStatus::Approved);
    assert_eq!(goal.approver_id.as_deref(), Some("demo-evaluator"));
}

#[test]
fn rejection_records_the_reviewer() {
    let app = demo_app();
    app.sign_in("admin@demo.com", "admin123");
    assert_eq!(block_on(decide(&app.ctx, "demo-goal-3", false)), Ok(GoalStatus::Rejected));
    assert_eq!(status_of(&app, "demo-goal-3").approver_id.as_deref(), Some("demo-admin"));
}

#[test]
fn only_pending_goals_can_be_decided() {
    let app = demo_app();
    app.sign_in("evaluator@demo.com", "evaluator123");
    assert!(block_on(decide(&app.ctx, "demo-goal-1", false)).is_err());
    assert_eq!(status_of(&app, "demo-goal-1").status, GoalStatus::Approved);
}

#[test]
fn workers_cannot_decide() {
    let app = demo_app();
    app.sign_in("worker@demo.com", "worker123");
    assert!(block_on(decide(&app.ctx, "demo-goal-3", true)).is_err());
}

#[test]
fn render_names_the_owner() {
    let app = demo_app();
    app.sign_in("evaluator@demo.com", "evaluator123");
    let markup = render_html(&mut GoalApprovalsPage::new(app.ctx.clone()), "/goal-approvals").unwrap();
    assert!(markup.contains("Demo Worker"));
    assert!(markup.contains("Mentor a new team member"));
    assert!(!markup.contains("Ship the onboarding revamp"));
    assert!(markup.contains(r#"data-id="demo-goal-3""#));
    assert!(markup.contains("Approve"));
    assert!(markup.contains("Reject"));
}
