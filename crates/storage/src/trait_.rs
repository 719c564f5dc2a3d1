//! Key store trait abstraction.

use std::sync::Arc;
use codex_core::SubscriptionId;
use crate::notify::{ChangeNotifier, Listener};

/// Error type for storage backends.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur inside a storage backend.
///
/// These never cross the `KeyStore` data operations; backends log and
/// swallow them. They surface only from fallible constructors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Write rejected because the backend is full
    #[error("quota exceeded: {needed} bytes needed, {limit} allowed")]
    QuotaExceeded {
        /// Size the store would have after the write
        needed: usize,
        /// Configured limit
        limit: usize,
    },

    /// Lock poisoned by a panicking writer
    #[error("store lock poisoned")]
    Poisoned,
}

/// Synchronous key/value persistence.
///
/// Data operations never fail from the caller's point of view: a backend
/// that cannot read returns `None`, and a backend that cannot write leaves
/// the previous state in place.
pub trait KeyStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value.
    fn set(&self, key: &str, value: &str);

    /// Delete a value. Missing keys are ignored.
    fn remove(&self, key: &str);

    /// All stored keys accepted by `predicate`, in sorted order.
    fn scan_keys(&self, predicate: &dyn Fn(&str) -> bool) -> Vec<String>;

    /// Change notifier owned by this store.
    fn notifier(&self) -> &ChangeNotifier;

    /// Tell every listener that something changed.
    fn notify_changed(&self) {
        self.notifier().notify();
    }

    /// Register a change listener.
    fn subscribe(&self, listener: Listener) -> SubscriptionId {
        self.notifier().subscribe(listener)
    }

    /// Remove a change listener. Returns false if it was not registered.
    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier().unsubscribe(id)
    }

    /// Monotonic counter bumped by every `notify_changed`.
    fn version(&self) -> u64 {
        self.notifier().version()
    }
}

impl<S: KeyStore + ?Sized> KeyStore for Arc<S> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }

    fn scan_keys(&self, predicate: &dyn Fn(&str) -> bool) -> Vec<String> {
        (**self).scan_keys(predicate)
    }

    fn notifier(&self) -> &ChangeNotifier {
        (**self).notifier()
    }
}
