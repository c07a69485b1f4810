//! Storage trait definitions.

use crate::StorageResult;

/// Trait for secure key/value backends.
pub trait SecureStorage: Send + Sync {
    /// Store a value securely, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Delete a value. Returns whether something was removed.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Check if a key exists
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
