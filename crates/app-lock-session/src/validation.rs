//! Client-side checks run before any request is sent.

use crate::{messages, AuthError, AuthResult};
use auth_api_client::Credentials;

/// Minimum app password length.
pub const MIN_APP_PASSWORD_LEN: usize = 4;

/// Trim both fields and reject empties.
pub fn credentials(username: &str, password: &str) -> AuthResult<Credentials> {
    let username = username.trim();
    let password = password.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AuthError::Validation(messages::FIELDS_REQUIRED.to_string()));
    }
    Ok(Credentials::new(username, password))
}

/// Check a new app password. Length counts characters, not bytes.
pub fn app_password(password: &str) -> AuthResult<()> {
    if password.chars().count() < MIN_APP_PASSWORD_LEN {
        return Err(AuthError::Validation(
            messages::APP_PASSWORD_TOO_SHORT.to_string(),
        ));
    }
    Ok(())
}

/// Check a new app password and its confirmation.
pub fn app_password_change(new_password: &str, confirmation: &str) -> AuthResult<()> {
    app_password(new_password)?;
    if new_password != confirmation {
        return Err(AuthError::Validation(
            messages::APP_PASSWORDS_DO_NOT_MATCH.to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation_message(result: AuthResult<impl std::fmt::Debug>) -> String {
        match result {
            Err(AuthError::Validation(message)) => message,
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_credentials_are_trimmed() {
        let credentials = credentials("  ayse ", " pw\t").unwrap();
        assert_eq!(credentials.username, "ayse");
        assert_eq!(credentials.password, "pw");
    }

    #[test]
    fn test_blank_credentials_rejected() {
        assert_eq!(
            validation_message(credentials("   ", "pw")),
            messages::FIELDS_REQUIRED
        );
        assert_eq!(
            validation_message(credentials("ayse", "")),
            messages::FIELDS_REQUIRED
        );
    }

    #[test]
    fn test_app_password_minimum_length() {
        assert!(app_password("1234").is_ok());
        assert_eq!(
            validation_message(app_password("123")),
            messages::APP_PASSWORD_TOO_SHORT
        );
        // Multi-byte characters count once.
        assert!(app_password("şğüö").is_ok());
        assert!(app_password("şğü").is_err());
    }

    #[test]
    fn test_app_password_change_requires_matching_confirmation() {
        assert!(app_password_change("1234", "1234").is_ok());
        assert_eq!(
            validation_message(app_password_change("1234", "1235")),
            messages::APP_PASSWORDS_DO_NOT_MATCH
        );
        // Length is checked before the confirmation.
        assert_eq!(
            validation_message(app_password_change("12", "34")),
            messages::APP_PASSWORD_TOO_SHORT
        );
    }
}
