//! In-memory key store.

use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::warn;
use crate::notify::ChangeNotifier;
use crate::{KeyStore, Result, StorageError};

/// Volatile store backed by a sorted map.
///
/// An optional byte quota emulates browser storage limits: writes that would
/// grow the store past it are dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
    notifier: ChangeNotifier,
}

impl MemoryStore {
    /// Create an empty store without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size of keys plus values.
    pub fn with_quota(mut self, bytes: usize) -> Self {
        self.quota = Some(bytes);
        self
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.data.read().map(|d| d.len()).unwrap_or(0)
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn try_set(&self, key: &str, value: &str) -> Result<()> {
        let mut data = self.data.write().map_err(|_| StorageError::Poisoned)?;

        if let Some(limit) = self.quota {
            let current: usize = data
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = current + key.len() + value.len();
            if needed > limit {
                return Err(StorageError::QuotaExceeded { needed, limit });
            }
        }

        data.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn try_remove(&self, key: &str) -> Result<()> {
        let mut data = self.data.write().map_err(|_| StorageError::Poisoned)?;
        data.remove(key);
        Ok(())
    }
}

impl KeyStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.try_set(key, value) {
            warn!(key, error = %e, "write dropped");
        }
    }

    fn remove(&self, key: &str) {
        if let Err(e) = self.try_remove(key) {
            warn!(key, error = %e, "remove dropped");
        }
    }

    fn scan_keys(&self, predicate: &dyn Fn(&str) -> bool) -> Vec<String> {
        match self.data.read() {
            Ok(data) => data.keys().filter(|k| predicate(k)).cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }
}
