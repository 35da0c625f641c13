use futures::executor::block_on;
use schema::{Goal, GoalStatus, Invitation, UserRecord};

use super::*;
use crate::net::store::{fields, get_record, query_records, set_record};

#[test]
fn demo_data_matches_demo_accounts() {
    let store = MemoryStore::demo();
    for account in crate::auth::DEMO_ACCOUNTS {
        let user: UserRecord = block_on(get_record(&store, Collection::Users, account.uid)).unwrap().unwrap();
        assert_eq!(user.email, account.email);
        assert_eq!(user.role, account.role);
        assert_eq!(user.id, account.uid);
    }
    let invite: Invitation = block_on(get_record(&store, Collection::Invitations, DEMO_INVITATION_ID)).unwrap().unwrap();
    assert!(invite.is_usable(0));
}

#[test]
fn query_applies_every_filter() {
    let store = MemoryStore::demo();
    let pending: Vec<Goal> = block_on(query_records(
        &store,
        Collection::Goals,
        &[Filter::eq("tenantId", DEMO_TENANT_ID), Filter::eq("status", "pending")],
    ))
    .unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].status, GoalStatus::Pending);
    assert_eq!(store.reads(), 1);
}

#[test]
fn update_merges_fields_and_rejects_missing_documents() {
    let store = MemoryStore::demo();
    block_on(store.update(Collection::Users, "demo-worker", fields([("status", json!("inactive"))]))).unwrap();
    let user: UserRecord = block_on(get_record(&store, Collection::Users, "demo-worker")).unwrap().unwrap();
    assert_eq!(user.status, schema::UserStatus::Inactive);
    assert_eq!(user.email, "worker@demo.com");

    let err = block_on(store.update(Collection::Users, "ghost", fields([("status", json!("active"))]))).unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 404, .. }));
}

#[test]
fn add_generates_ids_and_set_drops_id_field() {
    let store = MemoryStore::new();
    let a = block_on(store.add(Collection::Goals, fields([("title", json!("A"))]))).unwrap();
    let b = block_on(store.add(Collection::Goals, fields([("title", json!("B"))]))).unwrap();
    assert_ne!(a, b);
    assert_eq!(store.len(Collection::Goals), 2);

    let tenant = schema::Tenant { id: "t1".into(), name: "Acme".into(), active: true, created_at: None };
    block_on(set_record(&store, Collection::Tenants, "t1", &tenant)).unwrap();
    let raw = block_on(store.get(Collection::Tenants, "t1")).unwrap().unwrap();
    assert_eq!(raw["id"], "t1");
    assert_eq!(raw["name"], "Acme");
}
