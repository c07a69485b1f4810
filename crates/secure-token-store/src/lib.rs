//! Secure token persistence for the Moodlog client.
//!
//! The session token and user id live in an OS-backed keystore:
//! - **macOS**: Keychain Access via `security-framework`
//! - **Linux**: Secret Service (GNOME Keyring / KWallet) via `secret-service`
//!
//! [`MemoryStorage`] is a process-local backend for tests and for platforms
//! without a keystore.

mod keys;
mod memory;
mod token_store;
mod traits;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "linux")]
mod linux;

pub use keys::StorageKeys;
pub use memory::MemoryStorage;
pub use token_store::TokenStore;
pub use traits::SecureStorage;

use std::sync::Arc;
use thiserror::Error;

/// Service name used for all keystore entries.
pub const SERVICE_NAME: &str = "app.moodlog.client";

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Platform-specific storage error
    #[error("Platform storage error: {0}")]
    Platform(String),

    /// Encoding/decoding error
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// No keystore available on this platform
    #[error("Secure storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Create the default platform-specific storage implementation.
pub fn create_storage() -> StorageResult<Arc<dyn SecureStorage>> {
    #[cfg(target_os = "macos")]
    {
        let storage = macos::KeychainStorage::new(SERVICE_NAME);
        Ok(Arc::new(storage))
    }

    #[cfg(target_os = "linux")]
    {
        let storage = linux::SecretServiceStorage::new(SERVICE_NAME)?;
        Ok(Arc::new(storage))
    }

    #[cfg(not(any(target_os = "macos", target_os = "linux")))]
    {
        Err(StorageError::Unavailable(
            "No secure storage implementation available for this platform".to_string(),
        ))
    }
}

/// Create a [`TokenStore`] backed by the default platform keystore.
pub fn create_token_store() -> StorageResult<TokenStore> {
    Ok(TokenStore::new(create_storage()?))
}
