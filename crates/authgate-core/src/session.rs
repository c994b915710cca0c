//! Session lifecycle: the single current token and its subscribers.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::warn;

use crate::models::SessionToken;
use crate::observers::{ObserverId, ObserverRegistry};
use crate::store::{SecureStore, StoreError, StoreKey};

/// Holds the single current session token, mirrors it into the secure
/// store, and publishes authenticated/unauthenticated transitions.
///
/// Constructed once by the application's composition root and shared by
/// reference with the flow controller and the outgoing-request signer.
/// This registry is the only writer to [`StoreKey::Token`].
pub struct SessionRegistry {
    store: Arc<dyn SecureStore>,
    token: Mutex<Option<SessionToken>>,
    observers: ObserverRegistry<bool>,
}

impl SessionRegistry {
    pub fn new(store: Arc<dyn SecureStore>) -> Self {
        Self {
            store,
            token: Mutex::new(None),
            observers: ObserverRegistry::new(),
        }
    }

    fn token_slot(&self) -> MutexGuard<'_, Option<SessionToken>> {
        match self.token.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Restores a previously persisted session, if any. An empty,
    /// absent, or unreadable entry counts as no session.
    pub fn restore(&self) -> bool {
        let restored = match self.store.retrieve(StoreKey::Token) {
            Ok(raw) if !raw.is_empty() => Some(SessionToken::new(raw)),
            Ok(_) => None,
            Err(StoreError::NotFound(_)) => None,
            Err(e) => {
                warn!(error = %e, "could not read persisted session token");
                None
            }
        };

        let authenticated = restored.is_some();
        *self.token_slot() = restored;
        self.publish(authenticated);
        authenticated
    }

    /// Makes `token` the current session and persists it. If the durable
    /// write fails, the in-memory token is discarded as well: the
    /// published state never claims a session the store does not hold.
    pub fn set_token(&self, token: SessionToken) {
        *self.token_slot() = Some(token.clone());

        // The slot may still hold a previous session's token; erasing
        // first makes the replacement explicit under the duplicate-entry
        // contract.
        let persisted = self
            .store
            .erase(StoreKey::Token)
            .and_then(|_| self.store.store(StoreKey::Token, token.as_str()));

        match persisted {
            Ok(()) => self.publish(true),
            Err(e) => {
                warn!(error = %e, "failed to persist session token, discarding session");
                *self.token_slot() = None;
                self.publish(false);
            }
        }
    }

    /// Ends the current session. Erasure of the durable copy is
    /// best-effort; a failure is logged, not surfaced.
    pub fn clear(&self) {
        *self.token_slot() = None;
        if let Err(e) = self.store.erase(StoreKey::Token) {
            warn!(error = %e, "failed to erase persisted session token");
        }
        self.publish(false);
    }

    /// The current token, for request signing.
    pub fn token(&self) -> Option<SessionToken> {
        self.token_slot().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token_slot().is_some()
    }

    /// Subscribes to authenticated/unauthenticated transitions. Delivery
    /// happens synchronously with the mutation that caused it.
    pub fn subscribe(&self, callback: impl Fn(&bool) + Send + 'static) -> ObserverId {
        self.observers.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: ObserverId) {
        self.observers.unsubscribe(id);
    }

    fn publish(&self, authenticated: bool) {
        self.observers.notify(&authenticated);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    /// Store whose writes always fail; reads and erases pass through.
    struct BrokenWrites {
        inner: MemoryStore,
    }

    impl SecureStore for BrokenWrites {
        fn store(&self, _key: StoreKey, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("write refused".to_string()))
        }

        fn retrieve(&self, key: StoreKey) -> Result<String, StoreError> {
            self.inner.retrieve(key)
        }

        fn erase(&self, key: StoreKey) -> Result<(), StoreError> {
            self.inner.erase(key)
        }
    }

    /// Store whose erases always fail; everything else passes through.
    struct BrokenErase {
        inner: MemoryStore,
    }

    impl SecureStore for BrokenErase {
        fn store(&self, key: StoreKey, value: &str) -> Result<(), StoreError> {
            self.inner.store(key, value)
        }

        fn retrieve(&self, key: StoreKey) -> Result<String, StoreError> {
            self.inner.retrieve(key)
        }

        fn erase(&self, _key: StoreKey) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("erase refused".to_string()))
        }
    }

    fn registry_over(store: Arc<dyn SecureStore>) -> SessionRegistry {
        SessionRegistry::new(store)
    }

    #[test]
    fn test_set_token_persists_and_publishes_synchronously() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_over(Arc::clone(&store) as Arc<dyn SecureStore>);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.subscribe(move |authenticated| sink.lock().unwrap().push(*authenticated));

        registry.set_token(SessionToken::new("abc"));

        // The subscriber already saw the transition by the time set_token
        // returned.
        assert_eq!(*seen.lock().unwrap(), vec![true]);
        assert!(registry.is_authenticated());
        assert_eq!(store.retrieve(StoreKey::Token).unwrap(), "abc");
    }

    #[test]
    fn test_set_token_replaces_a_previous_session() {
        let store = Arc::new(MemoryStore::new());
        store.store(StoreKey::Token, "stale").unwrap();
        let registry = registry_over(Arc::clone(&store) as Arc<dyn SecureStore>);

        registry.set_token(SessionToken::new("fresh"));

        assert_eq!(store.retrieve(StoreKey::Token).unwrap(), "fresh");
    }

    #[test]
    fn test_failed_persistence_discards_the_session() {
        let store = Arc::new(BrokenWrites {
            inner: MemoryStore::new(),
        });
        let registry = registry_over(Arc::clone(&store) as Arc<dyn SecureStore>);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        registry.subscribe(move |authenticated| sink.lock().unwrap().push(*authenticated));

        registry.set_token(SessionToken::new("abc"));

        assert!(!registry.is_authenticated());
        assert!(registry.token().is_none());
        assert!(!store.inner.contains(StoreKey::Token));
        assert_eq!(*seen.lock().unwrap(), vec![false]);
    }

    #[test]
    fn test_clear_is_best_effort_about_durable_erasure() {
        let store = Arc::new(BrokenErase {
            inner: MemoryStore::new(),
        });
        let registry = registry_over(Arc::clone(&store) as Arc<dyn SecureStore>);
        store.inner.store(StoreKey::Token, "abc").unwrap();

        registry.clear();

        // The durable copy could not be removed, but the in-memory
        // session is gone regardless.
        assert!(!registry.is_authenticated());
    }

    #[test]
    fn test_restore_picks_up_a_persisted_token() {
        let store = Arc::new(MemoryStore::new());
        store.store(StoreKey::Token, "abc").unwrap();
        let registry = registry_over(Arc::clone(&store) as Arc<dyn SecureStore>);

        assert!(registry.restore());
        assert!(registry.is_authenticated());
        assert_eq!(registry.token().unwrap().as_str(), "abc");
    }

    #[test]
    fn test_restore_treats_empty_or_absent_tokens_as_no_session() {
        let empty = Arc::new(MemoryStore::new());
        empty.store(StoreKey::Token, "").unwrap();
        let registry = registry_over(Arc::clone(&empty) as Arc<dyn SecureStore>);
        assert!(!registry.restore());
        assert!(!registry.is_authenticated());

        let absent = Arc::new(MemoryStore::new());
        let registry = registry_over(absent as Arc<dyn SecureStore>);
        assert!(!registry.restore());
        assert!(!registry.is_authenticated());
    }

    #[test]
    fn test_clear_erases_the_durable_copy() {
        let store = Arc::new(MemoryStore::new());
        let registry = registry_over(Arc::clone(&store) as Arc<dyn SecureStore>);

        registry.set_token(SessionToken::new("abc"));
        registry.clear();

        assert!(!registry.is_authenticated());
        assert!(!store.contains(StoreKey::Token));
    }
}
