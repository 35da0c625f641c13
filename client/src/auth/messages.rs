//! User-facing text for identity service error codes.
//!
//! The identity service reports failures as `{"error": {"message": CODE}}`,
//! sometimes with a detail suffix (`WEAK_PASSWORD : Password should be at
//! least 6 characters`). Only the code before ` : ` is significant.

use super::AuthError;

#[cfg(test)]
#[path = "messages_test.rs"]
mod messages_test;

pub const GENERIC_MESSAGE: &str = "Something went wrong. Please try again.";

/// Leading error code of a raw identity message.
#[must_use]
pub fn error_code(raw: &str) -> &str {
    raw.split(" : ").next().unwrap_or_default().trim()
}

/// Message shown for an identity error code.
#[must_use]
pub fn message_for_code(code: &str) -> &'static str {
    match code {
        "EMAIL_EXISTS" => "An account with this email already exists.",
        "INVALID_EMAIL" => "The email address is not valid.",
        "WEAK_PASSWORD" => "The password is too weak. Use at least 6 characters.",
        "OPERATION_NOT_ALLOWED" => "Email and password sign-up is disabled for this project.",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "Too many attempts. Please wait a moment and try again.",
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => "Invalid email or password.",
        "USER_DISABLED" => "This account has been disabled.",
        _ => GENERIC_MESSAGE,
    }
}

fn is_credential_code(code: &str) -> bool {
    matches!(code, "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS")
}

/// Classify a raw identity error message.
#[must_use]
pub fn rejection(raw: &str) -> AuthError {
    let code = error_code(raw);
    if is_credential_code(code) {
        return AuthError::InvalidCredentials;
    }
    AuthError::Rejected { code: code.to_owned(), message: message_for_code(code).to_owned() }
}

/// Text shown to the user for any auth failure.
#[must_use]
pub fn user_message(error: &AuthError) -> String {
    match error {
        AuthError::InvalidCredentials => message_for_code("INVALID_LOGIN_CREDENTIALS").to_owned(),
        AuthError::Rejected { message, .. } => message.clone(),
        AuthError::Unreachable(_) => "The sign-in service is unavailable. Please try again later.".to_owned(),
        AuthError::ProfileMissing(_) | AuthError::Profile(_) => {
            "Your account has no profile in this organization. Contact your administrator.".to_owned()
        }
        AuthError::Inactive => "Your account is not active. Contact your administrator.".to_owned(),
        AuthError::Storage(_) => GENERIC_MESSAGE.to_owned(),
    }
}
