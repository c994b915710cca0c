//! Minimal synchronous publish/subscribe registry.
//!
//! Observers are plain callbacks keyed by a handle. `notify` delivers the
//! latest value to every current observer, in subscription order, before it
//! returns. There is no buffering: only the latest value matters to
//! subscribers of flow status, alerts, and session state.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Handle returned by [`ObserverRegistry::subscribe`]; used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverId(u64);

type Callback<T> = Box<dyn Fn(&T) + Send>;

pub struct ObserverRegistry<T> {
    inner: Mutex<Inner<T>>,
}

struct Inner<T> {
    next_id: u64,
    observers: BTreeMap<u64, Callback<T>>,
}

impl<T> Default for ObserverRegistry<T> {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner {
                next_id: 0,
                observers: BTreeMap::new(),
            }),
        }
    }
}

impl<T> ObserverRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        // A poisoned registry still holds a usable map; keep delivering.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn subscribe(&self, callback: impl Fn(&T) + Send + 'static) -> ObserverId {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.observers.insert(id, Box::new(callback));
        ObserverId(id)
    }

    pub fn unsubscribe(&self, id: ObserverId) {
        self.lock().observers.remove(&id.0);
    }

    /// Invokes every current observer with the value before returning.
    /// Delivery is serialized by the registry lock; callbacks must not call
    /// back into the same registry.
    pub fn notify(&self, value: &T) {
        let inner = self.lock();
        for callback in inner.observers.values() {
            callback(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[test]
    fn test_notify_delivers_in_subscription_order() {
        let registry = ObserverRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&seen);
        registry.subscribe(move |v: &i32| first.lock().unwrap().push(("first", *v)));
        let second = Arc::clone(&seen);
        registry.subscribe(move |v: &i32| second.lock().unwrap().push(("second", *v)));

        registry.notify(&7);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![("first", 7), ("second", 7)]
        );
    }

    #[test]
    fn test_unsubscribed_observer_stops_receiving() {
        let registry = ObserverRegistry::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&seen);
        let id = registry.subscribe(move |v: &i32| sink.lock().unwrap().push(*v));

        registry.notify(&1);
        registry.unsubscribe(id);
        registry.notify(&2);

        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }
}
