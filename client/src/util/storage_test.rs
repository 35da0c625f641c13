use super::*;

#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
struct Draft {
    text: String,
}

#[test]
fn memory_kv_set_get_remove() {
    let store = MemoryKv::new();
    assert!(store.is_empty());
    store.set("k", "v").unwrap();
    assert_eq!(store.get("k").as_deref(), Some("v"));
    store.remove("k");
    assert_eq!(store.get("k"), None);
}

#[test]
fn json_helpers_distinguish_absent_from_corrupt() {
    let store = MemoryKv::new();
    assert!(load_json::<Draft>(&store, "draft").is_none());

    save_json(&store, "draft", &Draft { text: "hi".into() }).unwrap();
    let loaded = load_json::<Draft>(&store, "draft").unwrap().unwrap();
    assert_eq!(loaded, Draft { text: "hi".into() });

    store.set("draft", "{not json").unwrap();
    assert!(matches!(load_json::<Draft>(&store, "draft"), Some(Err(_))));
}

#[cfg(not(feature = "csr"))]
#[test]
fn local_storage_is_unavailable_outside_the_browser() {
    let store = LocalStorage;
    assert_eq!(store.get("anything"), None);
    assert_eq!(store.set("k", "v"), Err(StorageError::Unavailable));
    store.remove("k");
}
