//! Secure key/value storage for credentials and the session token.
//!
//! This module provides:
//! - `SecureStore`: the storage capability the flow depends on
//! - `KeychainStore`: OS-level secure storage via keyring
//! - `MemoryStore`: in-process storage for tests and keyring-less hosts
//!
//! The namespace is the closed three-key set in [`StoreKey`]. Writing to an
//! occupied key is a [`StoreError::DuplicateEntry`], not an overwrite;
//! callers that mean to replace a value erase first. Erasing an absent key
//! succeeds.

pub mod keychain;
pub mod memory;

pub use keychain::KeychainStore;
pub use memory::MemoryStore;

use std::fmt;

use thiserror::Error;

/// The full set of purposes a stored value can have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Username,
    Password,
    Token,
}

impl StoreKey {
    /// Stable identifier used as the per-entry account name in the backing
    /// store.
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Username => "username",
            StoreKey::Password => "password",
            StoreKey::Token => "token",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No value is stored under the key. A logical condition, not a fault.
    #[error("no value stored under `{0}`")]
    NotFound(StoreKey),

    /// The key already holds a value; it was left untouched.
    #[error("a value already exists under `{0}`")]
    DuplicateEntry(StoreKey),

    /// The backing store itself failed (OS denial, encryption unavailable,
    /// broken state). Callers treat this as fatal to the operation.
    #[error("secure storage unavailable: {0}")]
    Unavailable(String),
}

/// Durable, tamper-resistant string storage keyed by [`StoreKey`].
///
/// Operations never partially apply: a failed `store` leaves no entry, a
/// failed `erase` leaves the prior entry untouched.
pub trait SecureStore: Send + Sync {
    fn store(&self, key: StoreKey, value: &str) -> Result<(), StoreError>;

    fn retrieve(&self, key: StoreKey) -> Result<String, StoreError>;

    /// Idempotent: erasing an absent key is not an error.
    fn erase(&self, key: StoreKey) -> Result<(), StoreError>;

    /// Existence probe. Any retrieval failure counts as absent.
    fn contains(&self, key: StoreKey) -> bool {
        self.retrieve(key).is_ok()
    }
}
