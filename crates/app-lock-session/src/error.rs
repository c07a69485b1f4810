//! Session core error types.

use crate::messages;
use auth_api_client::ApiError;
use secure_token_store::StorageError;
use thiserror::Error;

/// Session core error type.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Input rejected before any request was made; carries the text shown
    /// to the user
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Auth backend call failed
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Token store error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Login/register answered without a session token
    #[error("Server response did not contain a session token")]
    MissingToken,

    /// The action needs a signed-in session
    #[error("Not signed in")]
    NotSignedIn,

    /// Server answered with an unexpected message
    #[error("Unexpected server response: {0}")]
    UnexpectedResponse(String),

    /// The current app password did not match
    #[error("Current app password is incorrect")]
    InvalidAppPassword,

    /// Invalid state transition in the lock FSM
    #[error("Invalid lock state transition: {0}")]
    InvalidStateTransition(String),
}

impl AuthError {
    /// Returns true if this error is transient and the action can be retried.
    pub fn is_transient(&self) -> bool {
        match self {
            AuthError::Api(e) => e.is_transient(),
            _ => false,
        }
    }

    /// Localized text for the UI.
    ///
    /// Errors that carry their own explanation return it; everything else
    /// gets the generic failure text, which callers usually replace with an
    /// action-specific message.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::Validation(message) => message.clone(),
            AuthError::InvalidAppPassword => messages::CURRENT_APP_PASSWORD_WRONG.to_string(),
            _ => messages::GENERIC_FAILURE.to_string(),
        }
    }

    /// True when [`user_message`](Self::user_message) is more specific than
    /// the action's own failure text.
    pub(crate) fn has_own_message(&self) -> bool {
        matches!(self, AuthError::Validation(_) | AuthError::InvalidAppPassword)
    }
}

/// Result type alias using AuthError.
pub type AuthResult<T> = Result<T, AuthError>;
