//! In-memory `DataStore`.
//!
//! SYSTEM CONTEXT
//! ==============
//! Paired with `TempAuth`: when the identity service is unavailable the app
//! runs against `MemoryStore::demo()`, so the fallback mode is a working demo
//! rather than an empty shell. Tests use it as the store fake.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use async_trait::async_trait;
use schema::Collection;
use serde_json::{Value, json};

use super::store::{DataStore, Fields, Filter, StoreError};
use crate::auth::DEMO_TENANT_ID;

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

/// Id of the open invitation in the demo data set.
pub const DEMO_INVITATION_ID: &str = "demo-invite";

#[derive(Default)]
pub struct MemoryStore {
    docs: RefCell<BTreeMap<(Collection, String), Fields>>,
    next_id: Cell<u64>,
    reads: Cell<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with the demo tenant, its three users, goals, one draft
    /// evaluation and an open worker invitation.
    #[must_use]
    pub fn demo() -> Self {
        let store = Self::new();
        store.seed(Collection::Tenants, DEMO_TENANT_ID, json!({ "name": "Demo Organization", "active": true }));
        for (uid, email, name, role) in [
            ("demo-admin", "admin@demo.com", "Demo Admin", "admin"),
            ("demo-evaluator", "evaluator@demo.com", "Demo Evaluator", "evaluator"),
            ("demo-worker", "worker@demo.com", "Demo Worker", "worker"),
        ] {
            store.seed(
                Collection::Users,
                uid,
                json!({ "email": email, "displayName": name, "role": role, "tenantId": DEMO_TENANT_ID, "status": "active" }),
            );
        }
        for (id, title, weight, status) in [
            ("demo-goal-1", "Ship the onboarding revamp", 40, "approved"),
            ("demo-goal-2", "Cut support backlog in half", 30, "approved"),
            ("demo-goal-3", "Mentor a new team member", 20, "pending"),
        ] {
            store.seed(
                Collection::Goals,
                id,
                json!({
                    "tenantId": DEMO_TENANT_ID,
                    "userId": "demo-worker",
                    "title": title,
                    "description": "",
                    "weight": weight,
                    "status": status,
                }),
            );
        }
        store.seed(
            Collection::Evaluations,
            "demo-evaluation-1",
            json!({
                "tenantId": DEMO_TENANT_ID,
                "targetUserId": "demo-worker",
                "evaluatorId": "demo-evaluator",
                "period": "2026-H1",
                "scores": { "demo-goal-1": 4 },
                "comment": "Solid progress on onboarding.",
                "totalScore": 4.0,
                "status": "draft",
            }),
        );
        store.seed(
            Collection::Invitations,
            DEMO_INVITATION_ID,
            json!({
                "email": "new.worker@demo.com",
                "role": "worker",
                "tenantId": DEMO_TENANT_ID,
                "tenantName": "Demo Organization",
                "used": false,
                "createdBy": "demo-admin",
            }),
        );
        store
    }

    /// Insert a document from a JSON object literal. Non-object values are
    /// ignored.
    pub fn seed(&self, collection: Collection, id: &str, value: Value) {
        if let Value::Object(fields) = value {
            self.docs.borrow_mut().insert((collection, id.to_owned()), fields);
        }
    }

    /// Number of `get` and `query` calls served.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.get()
    }

    #[must_use]
    pub fn len(&self, collection: Collection) -> usize {
        self.docs.borrow().keys().filter(|(c, _)| *c == collection).count()
    }

    fn count_read(&self) {
        self.reads.set(self.reads.get() + 1);
    }
}

fn with_id(id: &str, fields: &Fields) -> Value {
    let mut out = fields.clone();
    out.insert("id".to_owned(), Value::String(id.to_owned()));
    Value::Object(out)
}

fn strip_id(mut fields: Fields) -> Fields {
    fields.remove("id");
    fields
}

#[async_trait(?Send)]
impl DataStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &str) -> Result<Option<Value>, StoreError> {
        self.count_read();
        Ok(self
            .docs
            .borrow()
            .get(&(collection, id.to_owned()))
            .map(|fields| with_id(id, fields)))
    }

    async fn query(&self, collection: Collection, filters: &[Filter]) -> Result<Vec<Value>, StoreError> {
        self.count_read();
        Ok(self
            .docs
            .borrow()
            .iter()
            .filter(|((c, _), fields)| *c == collection && filters.iter().all(|f| f.matches(fields)))
            .map(|((_, id), fields)| with_id(id, fields))
            .collect())
    }

    async fn set(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.docs.borrow_mut().insert((collection, id.to_owned()), strip_id(fields));
        Ok(())
    }

    async fn update(&self, collection: Collection, id: &str, fields: Fields) -> Result<(), StoreError> {
        let mut docs = self.docs.borrow_mut();
        let doc = docs
            .get_mut(&(collection, id.to_owned()))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        doc.extend(strip_id(fields));
        Ok(())
    }

    async fn add(&self, collection: Collection, fields: Fields) -> Result<String, StoreError> {
        let n = self.next_id.get() + 1;
        self.next_id.set(n);
        let id = format!("{collection}-{n}");
        self.docs.borrow_mut().insert((collection, id.clone()), strip_id(fields));
        Ok(id)
    }
}
