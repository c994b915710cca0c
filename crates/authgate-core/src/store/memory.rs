use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{SecureStore, StoreError, StoreKey};

/// In-process implementation of [`SecureStore`] with the same contract as
/// the keychain backend. Used by the test suite and by hosts without an OS
/// keyring.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> Result<MutexGuard<'_, HashMap<StoreKey, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("storage mutex poisoned".to_string()))
    }
}

impl SecureStore for MemoryStore {
    fn store(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        let mut entries = self.guard()?;
        if entries.contains_key(&key) {
            return Err(StoreError::DuplicateEntry(key));
        }
        entries.insert(key, value.to_string());
        Ok(())
    }

    fn retrieve(&self, key: StoreKey) -> Result<String, StoreError> {
        self.guard()?
            .get(&key)
            .cloned()
            .ok_or(StoreError::NotFound(key))
    }

    fn erase(&self, key: StoreKey) -> Result<(), StoreError> {
        self.guard()?.remove(&key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_retrieve_erase() {
        let store = MemoryStore::new();
        store.store(StoreKey::Username, "tesonet").unwrap();
        assert_eq!(store.retrieve(StoreKey::Username).unwrap(), "tesonet");
        store.erase(StoreKey::Username).unwrap();
        assert_eq!(
            store.retrieve(StoreKey::Username),
            Err(StoreError::NotFound(StoreKey::Username))
        );
    }

    #[test]
    fn test_duplicate_entry_leaves_original_untouched() {
        let store = MemoryStore::new();
        store.store(StoreKey::Token, "first").unwrap();
        assert_eq!(
            store.store(StoreKey::Token, "second"),
            Err(StoreError::DuplicateEntry(StoreKey::Token))
        );
        assert_eq!(store.retrieve(StoreKey::Token).unwrap(), "first");
    }

    #[test]
    fn test_erase_absent_key_is_a_noop() {
        let store = MemoryStore::new();
        assert_eq!(store.erase(StoreKey::Password), Ok(()));
    }

    #[test]
    fn test_contains_probe() {
        let store = MemoryStore::new();
        assert!(!store.contains(StoreKey::Password));
        store.store(StoreKey::Password, "partyanimal").unwrap();
        assert!(store.contains(StoreKey::Password));
    }
}
