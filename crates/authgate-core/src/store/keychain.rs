use keyring::Entry;

use super::{SecureStore, StoreError, StoreKey};

/// Default keyring service name entries are scoped under.
pub const DEFAULT_SERVICE: &str = "authgate";

/// OS keychain storage. Each [`StoreKey`] maps to one keyring entry under
/// the configured service name.
pub struct KeychainStore {
    service: String,
}

impl KeychainStore {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    fn entry(&self, key: StoreKey) -> Result<Entry, StoreError> {
        Entry::new(&self.service, key.as_str())
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl Default for KeychainStore {
    fn default() -> Self {
        Self::new(DEFAULT_SERVICE)
    }
}

impl SecureStore for KeychainStore {
    fn store(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
        let entry = self.entry(key)?;
        // The keyring replaces silently on set; probe first so an occupied
        // slot is rejected rather than overwritten.
        match entry.get_password() {
            Ok(_) => Err(StoreError::DuplicateEntry(key)),
            Err(keyring::Error::NoEntry) => entry
                .set_password(value)
                .map_err(|e| StoreError::Unavailable(e.to_string())),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    fn retrieve(&self, key: StoreKey) -> Result<String, StoreError> {
        match self.entry(key)?.get_password() {
            Ok(value) => Ok(value),
            Err(keyring::Error::NoEntry) => Err(StoreError::NotFound(key)),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }

    fn erase(&self, key: StoreKey) -> Result<(), StoreError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(StoreError::Unavailable(e.to_string())),
        }
    }
}
