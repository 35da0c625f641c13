use super::*;

#[test]
fn code_is_read_before_detail_suffix() {
    assert_eq!(error_code("WEAK_PASSWORD : Password should be at least 6 characters"), "WEAK_PASSWORD");
    assert_eq!(error_code("EMAIL_EXISTS"), "EMAIL_EXISTS");
}

#[test]
fn registration_codes_map_to_distinct_messages() {
    let codes = ["EMAIL_EXISTS", "INVALID_EMAIL", "WEAK_PASSWORD", "OPERATION_NOT_ALLOWED", "TOO_MANY_ATTEMPTS_TRY_LATER"];
    let messages: std::collections::HashSet<_> = codes.iter().map(|c| message_for_code(c)).collect();
    assert_eq!(messages.len(), codes.len());
    assert!(!messages.contains(GENERIC_MESSAGE));
}

#[test]
fn unknown_code_is_generic() {
    assert_eq!(message_for_code("QUOTA_EXCEEDED"), GENERIC_MESSAGE);
    assert_eq!(
        rejection("QUOTA_EXCEEDED"),
        AuthError::Rejected { code: "QUOTA_EXCEEDED".into(), message: GENERIC_MESSAGE.into() }
    );
}

#[test]
fn credential_codes_become_invalid_credentials() {
    for raw in ["EMAIL_NOT_FOUND", "INVALID_PASSWORD", "INVALID_LOGIN_CREDENTIALS"] {
        assert_eq!(rejection(raw), AuthError::InvalidCredentials);
    }
}

#[test]
fn rejected_user_message_is_the_mapped_text() {
    let err = rejection("EMAIL_EXISTS");
    assert_eq!(user_message(&err), "An account with this email already exists.");
}
