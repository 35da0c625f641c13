use super::*;

fn full_config() -> AppConfig {
    AppConfig::from_lookup(|key| Some(format!("value-{}", key.json_name())))
}

#[test]
fn partial_document_parses_and_reports_missing_keys() {
    let config: AppConfig = serde_json::from_str(r#"{"apiKey":"k","projectId":"p"}"#).unwrap();
    assert_eq!(config.api_key, "k");
    assert_eq!(config.project_id, "p");
    assert_eq!(
        config.missing_keys(),
        vec![ConfigKey::AuthDomain, ConfigKey::StorageBucket, ConfigKey::MessagingSenderId, ConfigKey::AppId]
    );
    assert!(!config.is_complete());
}

#[test]
fn from_lookup_sets_every_key() {
    let config = full_config();
    assert!(config.is_complete());
    assert_eq!(config.get(ConfigKey::AppId), "value-appId");
}

#[test]
fn set_trims_whitespace_so_blank_values_stay_missing() {
    let mut config = full_config();
    config.set(ConfigKey::ApiKey, "   ");
    assert_eq!(config.missing_keys(), vec![ConfigKey::ApiKey]);
}

#[test]
fn fill_from_keeps_existing_values() {
    let mut config = AppConfig { api_key: "first".into(), ..AppConfig::default() };
    config.fill_from(&full_config());
    assert_eq!(config.api_key, "first");
    assert_eq!(config.app_id, "value-appId");
    assert!(config.is_complete());
}

#[test]
fn serialized_document_uses_camel_case_and_omits_absent_measurement_id() {
    let json = serde_json::to_value(full_config()).unwrap();
    assert_eq!(json["messagingSenderId"], "value-messagingSenderId");
    assert!(json.get("measurementId").is_none());
}

#[test]
fn key_names_are_distinct_across_spellings() {
    for key in ConfigKey::ALL {
        assert!(key.meta_name().starts_with("evalhub-"));
        assert!(key.env_name().starts_with("EVALHUB_"));
        assert_eq!(key.to_string(), key.json_name());
    }
}
