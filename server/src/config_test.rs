use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_when_nothing_is_set() {
    let cfg = ServerConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert_eq!(cfg.static_dir, PathBuf::from("dist"));
    assert_eq!(cfg.missing_keys(), ConfigKey::ALL.to_vec());
    assert_eq!(cfg.app.measurement_id, None);
}

#[test]
fn reads_connection_keys_by_env_name() {
    let cfg = ServerConfig::from_lookup(lookup(&[
        ("EVALHUB_API_KEY", "key"),
        ("EVALHUB_PROJECT_ID", " evalhub-prod "),
        ("EVALHUB_MEASUREMENT_ID", "G-1"),
        ("PORT", "9000"),
        ("STATIC_DIR", "/srv/app"),
    ]))
    .unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.static_dir, PathBuf::from("/srv/app"));
    assert_eq!(cfg.app.api_key, "key");
    assert_eq!(cfg.app.project_id, "evalhub-prod");
    assert_eq!(cfg.app.measurement_id.as_deref(), Some("G-1"));
    assert_eq!(
        cfg.missing_keys(),
        vec![ConfigKey::AuthDomain, ConfigKey::StorageBucket, ConfigKey::MessagingSenderId, ConfigKey::AppId]
    );
}

#[test]
fn blank_values_count_as_unset() {
    let cfg = ServerConfig::from_lookup(lookup(&[("PORT", "  "), ("EVALHUB_APP_ID", " ")])).unwrap();
    assert_eq!(cfg.port, DEFAULT_PORT);
    assert!(cfg.missing_keys().contains(&ConfigKey::AppId));
}

#[test]
fn bad_port_is_an_error() {
    let err = ServerConfig::from_lookup(lookup(&[("PORT", "http")])).unwrap_err();
    assert!(matches!(err, ServerError::InvalidPort(raw) if raw == "http"));
}
