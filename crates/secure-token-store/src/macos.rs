//! macOS Keychain implementation.

use crate::{SecureStorage, StorageError, StorageResult};
use security_framework::base::Error as KeychainError;
use security_framework::passwords::{
    delete_generic_password, get_generic_password, set_generic_password,
};
use security_framework_sys::base::errSecItemNotFound;
use tracing::debug;

/// Keychain-backed generic-password storage, one item per key.
pub struct KeychainStorage {
    service_name: String,
}

impl KeychainStorage {
    pub fn new(service_name: &str) -> Self {
        Self {
            service_name: service_name.to_string(),
        }
    }
}

fn is_not_found(error: &KeychainError) -> bool {
    error.code() == errSecItemNotFound
}

impl SecureStorage for KeychainStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        debug!(service = %self.service_name, key = %key, "Writing keychain item");
        set_generic_password(&self.service_name, key, value.as_bytes())
            .map_err(|e| StorageError::Platform(format!("Failed to write keychain item: {}", e)))
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        debug!(service = %self.service_name, key = %key, "Reading keychain item");
        match get_generic_password(&self.service_name, key) {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| StorageError::Encoding(e.to_string())),
            Err(e) if is_not_found(&e) => Ok(None),
            Err(e) => Err(StorageError::Platform(format!(
                "Failed to read keychain item: {}",
                e
            ))),
        }
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        debug!(service = %self.service_name, key = %key, "Deleting keychain item");
        match delete_generic_password(&self.service_name, key) {
            Ok(()) => Ok(true),
            Err(e) if is_not_found(&e) => Ok(false),
            Err(e) => Err(StorageError::Platform(format!(
                "Failed to delete keychain item: {}",
                e
            ))),
        }
    }
}
