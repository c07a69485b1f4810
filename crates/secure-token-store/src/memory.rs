//! In-memory storage backend.

use crate::{SecureStorage, StorageResult};
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local [`SecureStorage`]. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStorage {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecureStorage for MemoryStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.data
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        Ok(self.data.lock().unwrap().remove(key).is_some())
    }
}
