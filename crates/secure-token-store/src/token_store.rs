//! High-level API for the persisted session credentials.

use crate::{SecureStorage, StorageKeys, StorageResult};
use std::sync::Arc;
use tracing::debug;

/// Typed access to the session token and user id.
///
/// Cloning is cheap; all clones share one backend.
#[derive(Clone)]
pub struct TokenStore {
    storage: Arc<dyn SecureStorage>,
}

impl TokenStore {
    /// Create a token store over the given storage backend.
    pub fn new(storage: Arc<dyn SecureStorage>) -> Self {
        Self { storage }
    }

    // ==========================================
    // Session Token
    // ==========================================

    /// Persist the session token.
    pub fn set_token(&self, token: &str) -> StorageResult<()> {
        debug!("Persisting session token");
        self.storage.set(StorageKeys::USER_TOKEN, token)
    }

    /// Retrieve the session token.
    pub fn token(&self) -> StorageResult<Option<String>> {
        self.storage.get(StorageKeys::USER_TOKEN)
    }

    /// Check whether a session token is stored.
    pub fn has_token(&self) -> StorageResult<bool> {
        self.storage.has(StorageKeys::USER_TOKEN)
    }

    /// Remove the session token.
    pub fn remove_token(&self) -> StorageResult<bool> {
        self.storage.delete(StorageKeys::USER_TOKEN)
    }

    // ==========================================
    // User Id
    // ==========================================

    /// Persist the signed-in user's id.
    pub fn set_user_id(&self, user_id: &str) -> StorageResult<()> {
        debug!(user_id = %user_id, "Persisting user id");
        self.storage.set(StorageKeys::USER_ID, user_id)
    }

    /// Retrieve the signed-in user's id.
    pub fn user_id(&self) -> StorageResult<Option<String>> {
        self.storage.get(StorageKeys::USER_ID)
    }

    /// Remove the user id.
    pub fn remove_user_id(&self) -> StorageResult<bool> {
        self.storage.delete(StorageKeys::USER_ID)
    }

    // ==========================================
    // Clear All
    // ==========================================

    /// Remove both keys. Both deletes are attempted; the first failure is
    /// returned.
    pub fn clear(&self) -> StorageResult<()> {
        let token = self.remove_token();
        let user_id = self.remove_user_id();
        token?;
        user_id?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStorage, StorageError};

    struct BrokenDeleteStorage {
        inner: MemoryStorage,
    }

    impl SecureStorage for BrokenDeleteStorage {
        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            self.inner.set(key, value)
        }

        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.inner.get(key)
        }

        fn delete(&self, key: &str) -> StorageResult<bool> {
            if key == StorageKeys::USER_TOKEN {
                return Err(StorageError::Platform("keystore locked".to_string()));
            }
            self.inner.delete(key)
        }
    }

    fn memory_store() -> TokenStore {
        TokenStore::new(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_token_lifecycle() {
        let store = memory_store();
        assert!(!store.has_token().unwrap());

        store.set_token("jwt-abc").unwrap();
        assert!(store.has_token().unwrap());
        assert_eq!(store.token().unwrap(), Some("jwt-abc".to_string()));

        assert!(store.remove_token().unwrap());
        assert_eq!(store.token().unwrap(), None);
    }

    #[test]
    fn test_clones_share_backend() {
        let store = memory_store();
        let other = store.clone();

        store.set_user_id("42").unwrap();
        assert_eq!(other.user_id().unwrap(), Some("42".to_string()));
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let store = memory_store();
        store.set_token("jwt-abc").unwrap();
        store.set_user_id("42").unwrap();

        store.clear().unwrap();
        assert_eq!(store.token().unwrap(), None);
        assert_eq!(store.user_id().unwrap(), None);

        // Clearing an empty store is fine.
        store.clear().unwrap();
    }

    #[test]
    fn test_clear_attempts_every_key_before_failing() {
        let store = TokenStore::new(Arc::new(BrokenDeleteStorage {
            inner: MemoryStorage::new(),
        }));
        store.set_token("jwt-abc").unwrap();
        store.set_user_id("42").unwrap();

        assert!(store.clear().is_err());
        assert_eq!(store.user_id().unwrap(), None);
    }

    #[test]
    fn test_storage_keys_match_persisted_layout() {
        assert_eq!(StorageKeys::USER_TOKEN, "userToken");
        assert_eq!(StorageKeys::USER_ID, "userId");
    }
}
