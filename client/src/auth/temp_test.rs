use std::cell::RefCell;

use super::*;
use crate::util::storage::MemoryKv;
use crate::util::timer::ManualScheduler;

fn temp_auth() -> (TempAuth, Rc<MemoryKv>, Rc<ManualScheduler>) {
    let kv = Rc::new(MemoryKv::new());
    let scheduler = Rc::new(ManualScheduler::new());
    let auth = TempAuth::new(Rc::clone(&kv) as Rc<dyn KeyValueStore>, Rc::clone(&scheduler) as Rc<dyn Scheduler>);
    (auth, kv, scheduler)
}

#[test]
fn each_demo_account_signs_in_with_its_role() {
    let (auth, _, _) = temp_auth();
    for account in DEMO_ACCOUNTS {
        let session = auth.login(account.email, account.password).unwrap();
        assert_eq!(session.role, account.role);
        assert_eq!(session.tenant_id.as_deref(), Some(DEMO_TENANT_ID));
        assert!(session.is_temp);
    }
    assert_eq!(auth.login("admin@demo.com", "admin123").unwrap().role, Role::Admin);
}

#[test]
fn login_requires_an_exact_pair() {
    let (auth, kv, _) = temp_auth();
    for (email, password) in [
        ("admin@demo.com", "evaluator123"),
        ("Admin@demo.com", "admin123"),
        ("admin@demo.com ", "admin123"),
        ("admin@demo.com", ""),
        ("nobody@demo.com", "admin123"),
    ] {
        assert_eq!(auth.login(email, password), Err(AuthError::InvalidCredentials), "{email}/{password}");
    }
    assert!(kv.is_empty());
}

#[test]
fn session_survives_a_new_provider_instance() {
    let (auth, kv, scheduler) = temp_auth();
    auth.login("worker@demo.com", "worker123").unwrap();

    let again = TempAuth::new(kv as Rc<dyn KeyValueStore>, scheduler as Rc<dyn Scheduler>);
    assert_eq!(again.current_user().map(|s| s.uid), Some("demo-worker".to_owned()));
}

#[test]
fn logout_removes_the_record() {
    let (auth, kv, _) = temp_auth();
    auth.login("evaluator@demo.com", "evaluator123").unwrap();
    auth.logout();
    assert!(auth.current_user().is_none());
    assert!(kv.get(TEMP_SESSION_KEY).is_none());
}

#[test]
fn corrupt_record_is_discarded() {
    let (auth, kv, _) = temp_auth();
    kv.set(TEMP_SESSION_KEY, "{not json").unwrap();
    assert!(auth.current_user().is_none());
    assert!(kv.get(TEMP_SESSION_KEY).is_none());
}

#[test]
fn auth_state_callback_fires_once_after_delay() {
    let (auth, _, scheduler) = temp_auth();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&seen);
    let handle = auth.on_auth_state_changed(move |user| sink.borrow_mut().push(user.map(|s| s.email)));
    assert_eq!(scheduler.pending_delays(), vec![AUTH_STATE_DELAY]);
    assert!(seen.borrow().is_empty());

    // The callback reads the user at fire time, not at subscription time.
    auth.login("admin@demo.com", "admin123").unwrap();
    assert_eq!(scheduler.run_pending(), 1);
    assert_eq!(*seen.borrow(), vec![Some("admin@demo.com".to_owned())]);

    auth.logout();
    assert_eq!(scheduler.run_pending(), 0);
    assert_eq!(seen.borrow().len(), 1);
    handle.unsubscribe();
}
