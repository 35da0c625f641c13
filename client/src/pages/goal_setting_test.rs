use futures::executor::block_on;

use super::*;
use crate::pages::test_support::{demo_app, render_html};

fn goal(weight: u32, status: GoalStatus) -> Goal {
    Goal {
        id: String::new(),
        tenant_id: "t".into(),
        user_id: "u".into(),
        title: "g".into(),
        description: String::new(),
        weight,
        status,
        approver_id: None,
    }
}

#[test]
fn weight_bounds() {
    assert!(check_weight(&[], 0).is_err());
    assert!(check_weight(&[], 101).is_err());
    assert!(check_weight(&[], 100).is_ok());
}

#[test]
fn rejected_goals_free_their_weight() {
    let goals = [goal(60, GoalStatus::Approved), goal(40, GoalStatus::Rejected)];
    assert_eq!(committed_weight(&goals), 60);
    assert!(check_weight(&goals, 40).is_ok());
    assert_eq!(check_weight(&goals, 41), Err("Total weight would be 101%. Only 40% remains.".to_owned()));
}

#[test]
fn add_goal_respects_remaining_weight() {
    let app = demo_app();
    app.sign_in("worker@demo.com", "worker123");

    assert!(block_on(add_goal(&app.ctx, "Too heavy", "", 11)).is_err());
    let id = block_on(add_goal(&app.ctx, " Write docs ", "", 10)).unwrap();

    let saved: Goal = block_on(get_record(app.store.as_ref(), Collection::Goals, &id)).unwrap().unwrap();
    assert_eq!(saved.title, "Write docs");
    assert_eq!(saved.status, GoalStatus::Draft);
    assert_eq!(saved.tenant_id, "demo-tenant");
    assert_eq!(saved.user_id, "demo-worker");
}

#[test]
fn blank_title_is_refused() {
    let app = demo_app();
    app.sign_in("worker@demo.com", "worker123");
    assert_eq!(block_on(add_goal(&app.ctx, "  ", "", 5)), Err("Enter a goal title.".to_owned()));
}

#[test]
fn submit_moves_draft_to_pending() {
    let app = demo_app();
    app.sign_in("worker@demo.com", "worker123");
    let id = block_on(add_goal(&app.ctx, "Write docs", "", 10)).unwrap();

    block_on(submit_goal(&app.ctx, &id)).unwrap();
    let saved: Goal = block_on(get_record(app.store.as_ref(), Collection::Goals, &id)).unwrap().unwrap();
    assert_eq!(saved.status, GoalStatus::Pending);

    assert_eq!(block_on(submit_goal(&app.ctx, &id)), Err("Only drafts can be submitted.".to_owned()));
}

#[test]
fn submit_refuses_someone_elses_goal() {
    let app = demo_app();
    app.sign_in("evaluator@demo.com", "evaluator123");
    assert!(block_on(submit_goal(&app.ctx, "demo-goal-3")).is_err());
}

#[test]
fn weight_must_be_a_whole_number() {
    assert_eq!(parse_weight(" 20 "), Ok(20));
    assert_eq!(parse_weight("12.5"), Err("Weight must be a whole number."));
    assert_eq!(parse_weight(""), Err("Weight must be a whole number."));
}

#[test]
fn render_shows_total_and_actions() {
    let app = demo_app();
    app.sign_in("worker@demo.com", "worker123");
    block_on(add_goal(&app.ctx, "Write docs", "", 5)).unwrap();

    let markup = render_html(&mut GoalSettingPage::new(app.ctx.clone()), "/goal-setting").unwrap();
    assert!(markup.contains("<strong>95%</strong>"));
    assert!(markup.contains(r#"max="5""#));
    assert!(markup.contains("Submit for approval"));
    assert!(markup.contains("Ship the onboarding revamp"));
}
