use futures::executor::block_on;

use super::*;
use crate::pages::test_support::{demo_app, render_html};

#[test]
fn invitation_is_keyed_by_its_token() {
    let app = demo_app();
    app.sign_in("admin@demo.com", "admin123");

    let link = block_on(create_invitation(&app.ctx, " New.Person@Demo.com ", Role::Evaluator)).unwrap();
    let token = link.strip_prefix("/register?token=").unwrap();
    assert_eq!(token.len(), 36);

    let invite: Invitation = block_on(get_record(app.store.as_ref(), Collection::Invitations, token)).unwrap().unwrap();
    assert_eq!(invite.email, "new.person@demo.com");
    assert_eq!(invite.role, Role::Evaluator);
    assert_eq!(invite.tenant_name.as_deref(), Some("Demo Organization"));
    assert_eq!(invite.created_by.as_deref(), Some("demo-admin"));
    assert!(invite.is_usable(now_ms()));
    assert!(!invite.is_usable(now_ms() + INVITATION_TTL_MS + 1));
}

#[test]
fn invitation_rejects_bad_email() {
    let app = demo_app();
    app.sign_in("admin@demo.com", "admin123");
    let before = app.store.len(Collection::Invitations);
    let err = block_on(create_invitation(&app.ctx, "not-an-email", Role::Worker)).unwrap_err();
    assert_eq!(err, "Enter a valid email address.");
    assert_eq!(app.store.len(Collection::Invitations), before);
}

#[test]
fn workers_cannot_invite() {
    let app = demo_app();
    app.sign_in("worker@demo.com", "worker123");
    assert!(block_on(create_invitation(&app.ctx, "a@b.com", Role::Worker)).is_err());
}

#[test]
fn deactivate_and_reactivate() {
    let app = demo_app();
    app.sign_in("admin@demo.com", "admin123");

    block_on(set_user_status(&app.ctx, "demo-worker", UserStatus::Inactive)).unwrap();
    let worker: UserRecord = block_on(get_record(app.store.as_ref(), Collection::Users, "demo-worker")).unwrap().unwrap();
    assert_eq!(worker.status, UserStatus::Inactive);

    block_on(set_user_status(&app.ctx, "demo-worker", UserStatus::Active)).unwrap();
    let worker: UserRecord = block_on(get_record(app.store.as_ref(), Collection::Users, "demo-worker")).unwrap().unwrap();
    assert_eq!(worker.status, UserStatus::Active);
}

#[test]
fn admins_cannot_touch_themselves_or_other_tenants() {
    let app = demo_app();
    app.sign_in("admin@demo.com", "admin123");
    app.store.seed(
        Collection::Users,
        "outsider",
        serde_json::json!({ "email": "x@other.com", "role": "worker", "tenantId": "other", "status": "active" }),
    );

    assert!(block_on(set_user_status(&app.ctx, "demo-admin", UserStatus::Inactive)).is_err());
    assert!(block_on(set_user_status(&app.ctx, "outsider", UserStatus::Inactive)).is_err());
}

#[test]
fn render_lists_tenant_users_with_actions() {
    let app = demo_app();
    app.sign_in("admin@demo.com", "admin123");
    app.store.seed(
        Collection::Users,
        "outsider",
        serde_json::json!({ "email": "x@other.com", "role": "worker", "tenantId": "other" }),
    );

    let markup = render_html(&mut UsersPage::new(app.ctx.clone()), "/users").unwrap();
    assert!(markup.contains("worker@demo.com"));
    assert!(!markup.contains("x@other.com"));
    assert!(markup.contains(r#"data-id="demo-worker""#));
    assert!(markup.contains("Deactivate"));
    assert!(!markup.contains(r#"data-id="demo-admin""#));
    assert!(markup.contains("Create invitation"));
    assert!(markup.contains(r#"<option value="evaluator">"#));
}

#[test]
fn toggle_flips_between_active_and_inactive() {
    assert_eq!(status_toggle(UserStatus::Active), (UserStatus::Inactive, "Deactivate"));
    assert_eq!(status_toggle(UserStatus::Inactive), (UserStatus::Active, "Activate"));
    assert_eq!(status_toggle(UserStatus::Pending), (UserStatus::Active, "Activate"));
}
