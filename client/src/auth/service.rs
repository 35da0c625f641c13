//! Composed authentication service.
//!
//! DESIGN
//! ======
//! Sign-in goes to the identity service first. Only an unreachable (or
//! unconfigured) identity service falls back to `TempAuth`; a rejection of
//! the credentials is final. A primary session pairs the identity token with
//! the user's profile document, so `login` reads `users/{uid}` before the
//! session exists.
//!
//! Listeners registered with `subscribe` fire on every session change,
//! unlike the single-shot `TempAuth::on_auth_state_changed`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use schema::{Collection, UserRecord, UserStatus};
use serde::{Deserialize, Serialize};

use super::{AuthError, Session, TempAuth};
use crate::net::identity::{IdentityAccount, IdentityClient};
use crate::net::store::{DataStore, StoreError, get_record};
use crate::net::token::SharedToken;
use crate::router::AuthGate;
use crate::util::storage::{KeyValueStore, load_json, save_json};

#[cfg(test)]
#[path = "service_test.rs"]
mod service_test;

/// Local storage key of the primary session record.
pub const SESSION_KEY: &str = "evalhub.session";

/// The hosted identity service and the store holding user profiles.
pub struct PrimaryAuth {
    pub identity: IdentityClient,
    pub store: Rc<dyn DataStore>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredSession {
    session: Session,
    id_token: String,
}

/// Handle for [`AuthService::unsubscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(Option<&Session>)>;

pub struct AuthService {
    primary: Option<PrimaryAuth>,
    temp: TempAuth,
    storage: Rc<dyn KeyValueStore>,
    token: SharedToken,
    current: RefCell<Option<Session>>,
    listeners: RefCell<Vec<(ListenerId, Listener)>>,
    next_listener: Cell<u64>,
}

impl AuthService {
    /// `primary` is `None` when no configuration could be loaded; every
    /// sign-in then goes to `temp`.
    #[must_use]
    pub fn new(primary: Option<PrimaryAuth>, temp: TempAuth, storage: Rc<dyn KeyValueStore>, token: SharedToken) -> Self {
        Self {
            primary,
            temp,
            storage,
            token,
            current: RefCell::new(None),
            listeners: RefCell::new(Vec::new()),
            next_listener: Cell::new(0),
        }
    }

    #[must_use]
    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    #[must_use]
    pub fn temp(&self) -> &TempAuth {
        &self.temp
    }

    #[must_use]
    pub fn token(&self) -> &SharedToken {
        &self.token
    }

    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    /// True when the current session came from the fallback provider.
    #[must_use]
    pub fn is_temp(&self) -> bool {
        self.current.borrow().as_ref().is_some_and(|s| s.is_temp)
    }

    /// Rehydrate the session from local storage: a primary record first,
    /// then the fallback provider's record.
    pub fn restore(&self) -> Option<Session> {
        let restored = match load_json::<StoredSession>(self.storage.as_ref(), SESSION_KEY) {
            Some(Ok(stored)) if self.primary.is_some() => {
                self.token.set(Some(stored.id_token));
                Some(stored.session)
            }
            Some(Ok(_)) => {
                log::warn!("auth: ignoring stored session, identity service is not configured");
                None
            }
            Some(Err(e)) => {
                log::warn!("auth: discarding unreadable session record: {e}");
                self.storage.remove(SESSION_KEY);
                None
            }
            None => None,
        };
        let session = restored.or_else(|| self.temp.current_user());
        self.set_session(session.clone());
        session
    }

    /// Sync with the fallback provider's state callback. Only meaningful in
    /// fallback mode, and only fires once.
    pub fn watch_temp(self: &Rc<Self>) {
        let weak = Rc::downgrade(self);
        self.temp.on_auth_state_changed(move |user| {
            let Some(service) = weak.upgrade() else {
                return;
            };
            if service.current_session().is_none_or(|s| s.is_temp) && service.current_session() != user {
                service.set_session(user);
            }
        });
    }

    /// Sign in. Falls back to the demo accounts only when the identity
    /// service is unconfigured or unreachable.
    ///
    /// # Errors
    ///
    /// Any [`AuthError`] from the identity service, the profile read, or the
    /// fallback provider.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let Some(primary) = &self.primary else {
            return self.login_temp(email, password);
        };
        match primary.identity.sign_in(email, password).await {
            Ok(account) => self.start_primary_session(primary, &account).await,
            Err(AuthError::Unreachable(reason)) => {
                log::warn!("auth: identity service unreachable ({reason}); using demo accounts");
                self.login_temp(email, password)
            }
            Err(e) => Err(e),
        }
    }

    fn login_temp(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let session = self.temp.login(email, password)?;
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    async fn start_primary_session(&self, primary: &PrimaryAuth, account: &IdentityAccount) -> Result<Session, AuthError> {
        self.token.set(Some(account.id_token.clone()));
        let record = match get_record::<UserRecord>(primary.store.as_ref(), Collection::Users, &account.uid).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.token.clear();
                return Err(AuthError::ProfileMissing(account.email.clone()));
            }
            Err(e) => {
                self.token.clear();
                return Err(match e {
                    StoreError::Transport(reason) => AuthError::Unreachable(reason),
                    other => AuthError::Profile(other.to_string()),
                });
            }
        };
        if record.status == UserStatus::Inactive {
            self.token.clear();
            return Err(AuthError::Inactive);
        }
        self.adopt(account, &record)
    }

    /// Create an identity account. Requires the identity service; the
    /// fallback provider has no sign-up. On success the account's token is
    /// active so the caller can write the profile document.
    ///
    /// # Errors
    ///
    /// [`AuthError::Unreachable`] without an identity service, otherwise the
    /// mapped sign-up rejection.
    pub async fn register(&self, email: &str, password: &str, display_name: &str) -> Result<IdentityAccount, AuthError> {
        let Some(primary) = &self.primary else {
            return Err(AuthError::Unreachable("identity service is not configured".to_owned()));
        };
        let account = primary.identity.sign_up(email, password, display_name).await?;
        self.token.set(Some(account.id_token.clone()));
        log::info!("auth: registered {}", account.email);
        Ok(account)
    }

    /// Make `account` with profile `record` the current primary session.
    ///
    /// # Errors
    ///
    /// [`AuthError::Storage`] when the session cannot be persisted.
    pub fn adopt(&self, account: &IdentityAccount, record: &UserRecord) -> Result<Session, AuthError> {
        let session = Session::from_record(&account.uid, record, false);
        let stored = StoredSession { session: session.clone(), id_token: account.id_token.clone() };
        save_json(self.storage.as_ref(), SESSION_KEY, &stored).map_err(|e| AuthError::Storage(e.to_string()))?;
        // A leftover demo record would outlive this session on reload.
        self.temp.logout();
        self.token.set(Some(account.id_token.clone()));
        self.set_session(Some(session.clone()));
        log::info!("auth: signed in {} ({})", session.email, session.role);
        Ok(session)
    }

    /// Replace the display name of the current session (after a profile edit).
    pub fn rename(&self, display_name: &str) {
        let Some(mut session) = self.current_session() else {
            return;
        };
        session.display_name = display_name.to_owned();
        if !session.is_temp {
            if let Some(token) = self.token.get() {
                let stored = StoredSession { session: session.clone(), id_token: token };
                if let Err(e) = save_json(self.storage.as_ref(), SESSION_KEY, &stored) {
                    log::warn!("auth: could not persist renamed session: {e}");
                }
            }
        }
        self.set_session(Some(session));
    }

    pub fn logout(&self) {
        self.temp.logout();
        self.storage.remove(SESSION_KEY);
        self.token.clear();
        self.set_session(None);
        log::info!("auth: signed out");
    }

    /// Register `listener` for every session change.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(Option<&Session>) + 'static,
    {
        let id = ListenerId(self.next_listener.get());
        self.next_listener.set(id.0 + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.listeners.borrow_mut().retain(|(l, _)| *l != id);
    }

    fn set_session(&self, session: Option<Session>) {
        *self.current.borrow_mut() = session.clone();
        // Listeners may call back into the service.
        let listeners: Vec<Listener> = self.listeners.borrow().iter().map(|(_, l)| Rc::clone(l)).collect();
        for listener in listeners {
            listener(session.as_ref());
        }
    }
}

impl AuthGate for AuthService {
    fn session(&self) -> Option<Session> {
        self.current_session()
    }
}
