use super::*;

#[test]
fn document_gaps_lists_empty_keys() {
    let body = r#"{"apiKey":"k","authDomain":"d","projectId":"p","storageBucket":"","messagingSenderId":"m","appId":"a"}"#;
    assert_eq!(document_gaps(body), vec![ConfigKey::StorageBucket]);
}

#[test]
fn unparseable_document_misses_everything() {
    assert_eq!(document_gaps("<html>"), ConfigKey::ALL.to_vec());
}

#[test]
fn shell_gaps_ignore_empty_content() {
    let html = r#"<head><meta name="evalhub-api-key" content="k"><meta name="evalhub-app-id" content=""></head>"#;
    let gaps = shell_gaps(html);
    assert!(!gaps.contains(&ConfigKey::ApiKey));
    assert!(gaps.contains(&ConfigKey::AppId));
    assert_eq!(gaps.len(), 5);
}

#[test]
fn usable_when_sources_cover_each_other() {
    let report = Report {
        document_missing: vec![ConfigKey::AppId],
        shell_missing: vec![ConfigKey::ApiKey],
        cacheable: false,
    };
    assert!(report.is_usable());

    let report = Report {
        document_missing: vec![ConfigKey::AppId],
        shell_missing: vec![ConfigKey::AppId],
        cacheable: false,
    };
    assert!(!report.is_usable());
}
