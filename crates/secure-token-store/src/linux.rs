//! Linux Secret Service implementation.

use crate::{SecureStorage, StorageError, StorageResult};
use secret_service::blocking::{Collection, SecretService};
use secret_service::EncryptionType;
use std::collections::HashMap;
use tracing::debug;

/// Secret Service backed storage. Items are tagged with `service` and `key`
/// attributes inside the default collection.
pub struct SecretServiceStorage {
    service_name: String,
}

fn platform<E: std::fmt::Display>(context: &str) -> impl FnOnce(E) -> StorageError + '_ {
    move |e| StorageError::Platform(format!("{}: {}", context, e))
}

impl SecretServiceStorage {
    /// Connect once up front so a missing D-Bus session fails at startup
    /// rather than on the first token read.
    pub fn new(service_name: &str) -> StorageResult<Self> {
        SecretService::connect(EncryptionType::Dh)
            .map_err(platform("Failed to connect to Secret Service"))?;

        Ok(Self {
            service_name: service_name.to_string(),
        })
    }

    fn with_collection<F, T>(&self, f: F) -> StorageResult<T>
    where
        F: FnOnce(&Collection) -> StorageResult<T>,
    {
        let ss = SecretService::connect(EncryptionType::Dh)
            .map_err(platform("Failed to connect to Secret Service"))?;
        let collection = ss
            .get_default_collection()
            .map_err(platform("Failed to open default collection"))?;

        if collection.is_locked().unwrap_or(false) {
            collection
                .unlock()
                .map_err(platform("Failed to unlock collection"))?;
        }

        f(&collection)
    }

    fn attributes<'a>(&'a self, key: &'a str) -> HashMap<&'a str, &'a str> {
        HashMap::from([("service", self.service_name.as_str()), ("key", key)])
    }
}

impl SecureStorage for SecretServiceStorage {
    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        debug!(service = %self.service_name, key = %key, "Writing secret");

        self.with_collection(|collection| {
            let label = format!("{}/{}", self.service_name, key);
            collection
                .create_item(&label, self.attributes(key), value.as_bytes(), true, "text/plain")
                .map_err(platform("Failed to write secret"))?;
            Ok(())
        })
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        debug!(service = %self.service_name, key = %key, "Reading secret");

        self.with_collection(|collection| {
            let items = collection
                .search_items(self.attributes(key))
                .map_err(platform("Failed to search secrets"))?;

            let Some(item) = items.first() else {
                return Ok(None);
            };

            let secret = item.get_secret().map_err(platform("Failed to read secret"))?;
            String::from_utf8(secret)
                .map(Some)
                .map_err(|e| StorageError::Encoding(e.to_string()))
        })
    }

    fn delete(&self, key: &str) -> StorageResult<bool> {
        debug!(service = %self.service_name, key = %key, "Deleting secret");

        self.with_collection(|collection| {
            let items = collection
                .search_items(self.attributes(key))
                .map_err(platform("Failed to search secrets"))?;

            if items.is_empty() {
                return Ok(false);
            }
            for item in &items {
                item.delete().map_err(platform("Failed to delete secret"))?;
            }
            Ok(true)
        })
    }
}
