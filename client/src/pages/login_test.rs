use futures::executor::block_on;

use super::*;
use crate::pages::test_support::{demo_app, primary_app, render_html};

#[test]
fn validation_messages() {
    assert_eq!(validate("", "x"), Err("Enter your email address."));
    assert_eq!(validate("nobody", "x"), Err("Enter a valid email address."));
    assert_eq!(validate("a@b.com", ""), Err("Enter your password."));
    assert_eq!(validate("a@b.com", "x"), Ok(()));
}

#[test]
fn demo_mode_shows_demo_accounts() {
    let app = demo_app();
    let markup = render_html(&mut LoginPage::new(app.ctx.clone()), "/login").unwrap();
    assert!(markup.contains("admin@demo.com"));
    assert!(markup.contains(r#"autocomplete="current-password""#));
}

#[test]
fn configured_mode_hides_demo_accounts() {
    let app = primary_app();
    let markup = render_html(&mut LoginPage::new(app.ctx.clone()), "/login").unwrap();
    assert!(!markup.contains("admin@demo.com"));
    assert!(markup.contains("Sign in to EvalHub"));
}

#[test]
fn successful_submit_goes_to_dashboard() {
    let app = demo_app();
    let session = block_on(submit(&app.ctx, " admin@demo.com ", "admin123")).unwrap();
    assert_eq!(session.uid, "demo-admin");
    assert_eq!(app.ctx.navigator().requested(), vec!["/dashboard"]);
}

#[test]
fn failed_submit_reports_and_stays() {
    let app = demo_app();
    let message = block_on(submit(&app.ctx, "admin@demo.com", "wrong")).unwrap_err();
    assert_eq!(message, "Invalid email or password.");
    assert!(app.ctx.navigator().requested().is_empty());
}
