//! Fallback authentication against a fixed demo credential table.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used when the hosted identity service is unconfigured or unreachable. It
//! exposes the same login / logout / current-user contract as the primary
//! path, so the router and pages never branch on which one is active beyond
//! reading `Session::is_temp`.
//!
//! TRADE-OFFS
//! ==========
//! `on_auth_state_changed` fires exactly once, after `AUTH_STATE_DELAY`, with
//! whatever user is stored at that moment. Later logins and logouts are not
//! pushed to the callback; callers that need live updates subscribe to
//! `AuthService` instead.

use std::rc::Rc;
use std::time::Duration;

use schema::{Role, UserStatus};

use super::{AuthError, Session};
use crate::util::storage::{KeyValueStore, load_json, save_json};
use crate::util::timer::Scheduler;

#[cfg(test)]
#[path = "temp_test.rs"]
mod temp_test;

/// Local storage key of the fallback session record.
pub const TEMP_SESSION_KEY: &str = "evalhub.tempAuth.session";
/// Delay before the single `on_auth_state_changed` callback.
pub const AUTH_STATE_DELAY: Duration = Duration::from_millis(100);
/// Tenant every demo account belongs to.
pub const DEMO_TENANT_ID: &str = "demo-tenant";

/// One row of the demo credential table.
#[derive(Clone, Copy, Debug)]
pub struct DemoAccount {
    pub uid: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub display_name: &'static str,
    pub role: Role,
}

impl DemoAccount {
    fn session(&self) -> Session {
        Session {
            uid: self.uid.to_owned(),
            email: self.email.to_owned(),
            display_name: self.display_name.to_owned(),
            role: self.role,
            tenant_id: Some(DEMO_TENANT_ID.to_owned()),
            status: UserStatus::Active,
            is_temp: true,
        }
    }
}

pub const DEMO_ACCOUNTS: [DemoAccount; 3] = [
    DemoAccount {
        uid: "demo-admin",
        email: "admin@demo.com",
        password: "admin123",
        display_name: "Demo Admin",
        role: Role::Admin,
    },
    DemoAccount {
        uid: "demo-evaluator",
        email: "evaluator@demo.com",
        password: "evaluator123",
        display_name: "Demo Evaluator",
        role: Role::Evaluator,
    },
    DemoAccount {
        uid: "demo-worker",
        email: "worker@demo.com",
        password: "worker123",
        display_name: "Demo Worker",
        role: Role::Worker,
    },
];

/// Handle returned by [`TempAuth::on_auth_state_changed`]. Unsubscribing
/// does nothing: the callback fires once regardless.
#[derive(Debug, Default)]
pub struct Unsubscribe;

impl Unsubscribe {
    pub fn unsubscribe(self) {}
}

pub struct TempAuth {
    store: Rc<dyn KeyValueStore>,
    scheduler: Rc<dyn Scheduler>,
}

impl TempAuth {
    #[must_use]
    pub fn new(store: Rc<dyn KeyValueStore>, scheduler: Rc<dyn Scheduler>) -> Self {
        Self { store, scheduler }
    }

    /// Exact-match lookup in the demo table; persists the session on success.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] when no tuple matches, or
    /// [`AuthError::Storage`] when the session cannot be persisted.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let account = DEMO_ACCOUNTS
            .iter()
            .find(|a| a.email == email && a.password == password)
            .ok_or(AuthError::InvalidCredentials)?;
        let session = account.session();
        save_json(self.store.as_ref(), TEMP_SESSION_KEY, &session).map_err(|e| AuthError::Storage(e.to_string()))?;
        log::info!("temp auth: signed in {} ({})", session.email, session.role);
        Ok(session)
    }

    pub fn logout(&self) {
        self.store.remove(TEMP_SESSION_KEY);
    }

    /// Stored session, if any. A record that does not parse is cleared.
    #[must_use]
    pub fn current_user(&self) -> Option<Session> {
        read_session(self.store.as_ref())
    }

    /// Call `callback` once, after [`AUTH_STATE_DELAY`], with the user stored
    /// at that time.
    pub fn on_auth_state_changed<F>(&self, callback: F) -> Unsubscribe
    where
        F: FnOnce(Option<Session>) + 'static,
    {
        let store = Rc::clone(&self.store);
        self.scheduler.defer(
            AUTH_STATE_DELAY,
            Box::new(move || callback(read_session(store.as_ref()))),
        );
        Unsubscribe
    }
}

fn read_session(store: &dyn KeyValueStore) -> Option<Session> {
    match load_json::<Session>(store, TEMP_SESSION_KEY)? {
        Ok(session) => Some(session),
        Err(e) => {
            log::warn!("temp auth: discarding unreadable session record: {e}");
            store.remove(TEMP_SESSION_KEY);
            None
        }
    }
}
