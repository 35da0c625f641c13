use futures::executor::block_on;
use schema::UserRecord;

use super::*;
use crate::pages::test_support::{demo_app, render_html};

#[test]
fn profile_rename_updates_store_and_session() {
    let app = demo_app();
    app.sign_in("worker@demo.com", "worker123");

    block_on(save_profile(&app.ctx, "  Wanda Worker ")).unwrap();
    let user: UserRecord = block_on(get_record(app.store.as_ref(), Collection::Users, "demo-worker")).unwrap().unwrap();
    assert_eq!(user.display_name, "Wanda Worker");
    assert_eq!(app.ctx.auth().current_session().unwrap().name(), "Wanda Worker");
}

#[test]
fn blank_name_is_refused() {
    let app = demo_app();
    app.sign_in("worker@demo.com", "worker123");
    assert_eq!(block_on(save_profile(&app.ctx, " ")), Err("Enter your name.".to_owned()));
}

#[test]
fn admin_renames_organization() {
    let app = demo_app();
    app.sign_in("admin@demo.com", "admin123");
    block_on(save_organization(&app.ctx, "Demo Org II")).unwrap();
    let tenant: Tenant = block_on(get_record(app.store.as_ref(), Collection::Tenants, "demo-tenant")).unwrap().unwrap();
    assert_eq!(tenant.name, "Demo Org II");
}

#[test]
fn non_admins_cannot_rename_organization() {
    let app = demo_app();
    app.sign_in("evaluator@demo.com", "evaluator123");
    assert!(block_on(save_organization(&app.ctx, "Mine now")).is_err());
}

#[test]
fn organization_form_only_for_admins() {
    let app = demo_app();
    app.sign_in("admin@demo.com", "admin123");
    let markup = render_html(&mut SettingsPage::new(app.ctx.clone()), "/settings").unwrap();
    assert!(markup.contains(r#"value="Demo Organization""#));

    let app = demo_app();
    app.sign_in("worker@demo.com", "worker123");
    let markup = render_html(&mut SettingsPage::new(app.ctx.clone()), "/settings").unwrap();
    assert!(!markup.contains("Save organization"));
    assert!(markup.contains(r#"value="Demo Worker""#));
}
