use futures::executor::block_on;
use serde_json::json;

use super::*;
use crate::net::store::get_record;
use crate::pages::test_support::{TestApp, demo_app, primary_app, render_html};

fn developer_app() -> TestApp {
    let app = primary_app();
    app.store.seed(
        Collection::Users,
        "dev-1",
        json!({ "email": "dev@evalhub.io", "displayName": "Dev", "role": "developer", "status": "active" }),
    );
    app.transport.respond(200, &json!({ "localId": "dev-1", "email": "dev@evalhub.io", "idToken": "tok" }));
    app.sign_in("dev@evalhub.io", "secret");
    app
}

#[test]
fn tenant_invitation_carries_a_fresh_tenant() {
    let app = developer_app();
    let link = block_on(create_tenant_invitation(&app.ctx, " Acme ", "Boss@Acme.com")).unwrap();
    let token = link.strip_prefix("/register-admin?token=").unwrap();

    let invite: Invitation = block_on(get_record(app.store.as_ref(), Collection::Invitations, token)).unwrap().unwrap();
    assert_eq!(invite.role, Role::Admin);
    assert_eq!(invite.email, "boss@acme.com");
    assert_eq!(invite.tenant_name.as_deref(), Some("Acme"));
    assert_ne!(invite.tenant_id, "demo-tenant");
    assert_eq!(invite.created_by.as_deref(), Some("dev-1"));
}

#[test]
fn validation_happens_before_writes() {
    let app = developer_app();
    let before = app.store.len(Collection::Invitations);
    assert!(block_on(create_tenant_invitation(&app.ctx, "", "boss@acme.com")).is_err());
    assert!(block_on(create_tenant_invitation(&app.ctx, "Acme", "boss")).is_err());
    assert_eq!(app.store.len(Collection::Invitations), before);
}

#[test]
fn admins_cannot_onboard_organizations() {
    let app = demo_app();
    app.sign_in("admin@demo.com", "admin123");
    assert!(block_on(create_tenant_invitation(&app.ctx, "Acme", "boss@acme.com")).is_err());
}

#[test]
fn render_lists_tenants_with_member_counts() {
    let app = developer_app();
    let markup = render_html(&mut DeveloperPage::new(app.ctx.clone()), "/developer").unwrap();
    assert!(markup.contains("<td>Demo Organization</td>"));
    assert!(markup.contains("<td>3</td>"));
    assert!(markup.contains("Create admin invitation"));
}

#[test]
fn summaries_sort_by_name_and_count_members() {
    let tenant = |id: &str, name: &str| Tenant { id: id.into(), name: name.into(), active: true, created_at: None };
    let member = |uid: &str, tenant: &str| UserRecord {
        id: uid.into(),
        email: format!("{uid}@x.com"),
        display_name: String::new(),
        role: Role::Worker,
        tenant_id: Some(tenant.into()),
        status: schema::UserStatus::Active,
        created_at: None,
    };
    let summaries = summarize(
        vec![tenant("b", "beta"), tenant("a", "Alpha")],
        &[member("u1", "b"), member("u2", "b"), member("u3", "a")],
    );
    assert_eq!(summaries[0].name, "Alpha");
    assert_eq!(summaries[0].members, 1);
    assert_eq!(summaries[1].members, 2);
    assert_eq!(summaries[1].created, "");
}
