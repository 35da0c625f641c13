use super::*;
use crate::net::memory::DEMO_INVITATION_ID;
use crate::pages::test_support::{demo_app, render_html};

#[test]
fn without_token_renders_panel_and_skips_lookup() {
    let app = demo_app();
    let markup = render_html(&mut RegisterPage::new(app.ctx.clone()), "/register").unwrap();

    assert!(markup.contains("Invitation required"));
    assert!(!markup.contains("Create account"));
    assert_eq!(app.store.reads(), 0);
}

#[test]
fn blank_token_counts_as_missing() {
    let app = demo_app();
    let markup = render_html(&mut RegisterPage::new(app.ctx.clone()), "/register?token=%20").unwrap();
    assert!(markup.contains("Invitation required"));
    assert_eq!(app.store.reads(), 0);
}

#[test]
fn unknown_token_renders_not_found() {
    let app = demo_app();
    let markup = render_html(&mut RegisterPage::new(app.ctx.clone()), "/register?token=bogus").unwrap();
    assert!(markup.contains("Invitation not found"));
    assert_eq!(app.store.reads(), 1);
}

#[test]
fn valid_token_renders_form() {
    let app = demo_app();
    let path = format!("/register?token={DEMO_INVITATION_ID}");
    let markup = render_html(&mut RegisterPage::new(app.ctx.clone()), &path).unwrap();
    assert!(markup.contains("Create account"));
    assert!(markup.contains("Create your account"));
}
