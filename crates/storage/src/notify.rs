//! Same-process change notification.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use codex_core::SubscriptionId;

/// Callback invoked with the new store version after each change.
pub type Listener = Box<dyn Fn(u64) + Send + Sync>;

/// Explicit subscription list plus a monotonic version counter.
///
/// Consumers either register a listener or poll `version()` and recompute
/// whenever it moved.
#[derive(Default)]
pub struct ChangeNotifier {
    version: AtomicU64,
    next_id: AtomicU64,
    listeners: Mutex<Vec<(SubscriptionId, Arc<dyn Fn(u64) + Send + Sync>)>>,
}

impl ChangeNotifier {
    /// Create a notifier at version 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current version.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    /// Register a listener.
    pub fn subscribe(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        listeners.push((id, Arc::from(listener)));
        id
    }

    /// Remove a listener.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(|e| e.into_inner());
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    /// Bump the version and call every listener.
    pub fn notify(&self) -> u64 {
        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;

        // Listeners may subscribe or unsubscribe while being called.
        let listeners: Vec<_> = self
            .listeners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        tracing::debug!(version, listeners = listeners.len(), "store changed");
        for listener in listeners {
            listener(version);
        }
        version
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("version", &self.version())
            .field("listeners", &self.listener_count())
            .finish()
    }
}
