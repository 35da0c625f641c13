use futures::executor::block_on;
use serde_json::json;

use super::*;
use crate::net::http::{Method, ScriptedTransport};
use crate::net::store::fields;

const BASE: &str = "http://localhost:8080/v1";

fn client(transport: &Rc<ScriptedTransport>, token: &SharedToken) -> FirestoreClient {
    FirestoreClient::new(Rc::clone(transport) as Rc<dyn HttpTransport>, BASE, "demo", token.clone())
}

fn user_doc(id: &str) -> serde_json::Value {
    json!({
        "name": format!("projects/demo/databases/(default)/documents/users/{id}"),
        "fields": { "email": { "stringValue": "a@b.com" }, "role": { "stringValue": "admin" } }
    })
}

#[test]
fn get_decodes_document_and_sends_bearer() {
    let transport = Rc::new(ScriptedTransport::new());
    let token = SharedToken::new();
    token.set(Some("id-token".into()));
    transport.respond(200, &user_doc("u1"));

    let doc = block_on(client(&transport, &token).get(Collection::Users, "u1")).unwrap().unwrap();
    assert_eq!(doc, json!({ "id": "u1", "email": "a@b.com", "role": "admin" }));

    let sent = &transport.requests()[0];
    assert_eq!(sent.method, Method::Get);
    assert_eq!(sent.url, format!("{BASE}/projects/demo/databases/(default)/documents/users/u1"));
    assert_eq!(sent.bearer.as_deref(), Some("id-token"));
}

#[test]
fn get_missing_document_is_none() {
    let transport = Rc::new(ScriptedTransport::new());
    transport.respond(404, &json!({ "error": { "code": 404, "message": "not found" } }));
    let found = block_on(client(&transport, &SharedToken::new()).get(Collection::Invitations, "nope")).unwrap();
    assert!(found.is_none());
}

#[test]
fn auth_failures_are_classified() {
    let transport = Rc::new(ScriptedTransport::new());
    transport.respond(401, &json!({}));
    transport.respond(403, &json!({ "error": { "message": "Missing or insufficient permissions." } }));
    transport.fail("offline");

    let c = client(&transport, &SharedToken::new());
    assert_eq!(block_on(c.get(Collection::Users, "u1")), Err(StoreError::Unauthenticated));
    assert_eq!(
        block_on(c.get(Collection::Users, "u1")),
        Err(StoreError::PermissionDenied("Missing or insufficient permissions.".into()))
    );
    assert_eq!(block_on(c.get(Collection::Users, "u1")), Err(StoreError::Transport("offline".into())));
}

#[test]
fn query_posts_structured_query() {
    let transport = Rc::new(ScriptedTransport::new());
    transport.respond(200, &json!([{ "document": user_doc("u1") }, { "document": user_doc("u2") }, { "readTime": "t" }]));

    let docs = block_on(client(&transport, &SharedToken::new()).query(Collection::Users, &[Filter::eq("tenantId", "t1")])).unwrap();
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[1]["id"], "u2");

    let sent = &transport.requests()[0];
    assert_eq!(sent.url, format!("{BASE}/projects/demo/databases/(default)/documents:runQuery"));
    let body = sent.body.as_ref().unwrap();
    assert_eq!(body["structuredQuery"]["from"][0]["collectionId"], "users");
    assert_eq!(body["structuredQuery"]["where"]["fieldFilter"]["value"], json!({ "stringValue": "t1" }));
}

#[test]
fn update_masks_fields_and_requires_existing_document() {
    let transport = Rc::new(ScriptedTransport::new());
    transport.respond(200, &user_doc("u1"));
    transport.respond(404, &json!({}));

    let c = client(&transport, &SharedToken::new());
    block_on(c.update(Collection::Users, "u1", fields([("status", json!("inactive"))]))).unwrap();
    let sent = &transport.requests()[0];
    assert_eq!(sent.method, Method::Patch);
    assert!(sent.url.ends_with("/users/u1?updateMask.fieldPaths=status&currentDocument.exists=true"));
    assert_eq!(sent.body.as_ref().unwrap()["fields"]["status"], json!({ "stringValue": "inactive" }));

    let err = block_on(c.update(Collection::Users, "gone", fields([("status", json!("active"))]))).unwrap_err();
    assert!(matches!(err, StoreError::Status { status: 404, .. }));
}

#[test]
fn add_returns_generated_id() {
    let transport = Rc::new(ScriptedTransport::new());
    transport.respond(200, &json!({ "name": "projects/demo/databases/(default)/documents/goals/AbC123", "fields": {} }));

    let id = block_on(client(&transport, &SharedToken::new()).add(Collection::Goals, fields([("title", json!("Ship"))]))).unwrap();
    assert_eq!(id, "AbC123");
    assert_eq!(transport.requests()[0].url, format!("{BASE}/projects/demo/databases/(default)/documents/goals"));
}
