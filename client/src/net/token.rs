//! Bearer token shared between the auth service and the Firestore client.

use std::cell::RefCell;
use std::rc::Rc;

/// The current identity token. Cloning shares the slot.
#[derive(Clone, Debug, Default)]
pub struct SharedToken(Rc<RefCell<Option<String>>>);

impl SharedToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self) -> Option<String> {
        self.0.borrow().clone()
    }

    pub fn set(&self, token: Option<String>) {
        *self.0.borrow_mut() = token;
    }

    pub fn clear(&self) {
        self.set(None);
    }
}
