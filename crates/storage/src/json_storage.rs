//! JSON file key store.
//!
//! Keeps every key in a single JSON object on disk. The file is rewritten
//! through a temporary sibling on each write so a crash never leaves a
//! half-written store behind.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, warn};
use crate::notify::ChangeNotifier;
use crate::{KeyStore, Result, StorageError};

/// File-based key store.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    data: RwLock<BTreeMap<String, String>>,
    notifier: ChangeNotifier,
}

impl JsonFileStore {
    /// Open (or create) the store file at `path`.
    ///
    /// The parent directory is created if needed. A missing file starts an
    /// empty store; an unreadable or corrupt one is logged and also starts
    /// empty.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = match read_map(&path) {
            Ok(map) => map,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "store file unreadable, starting empty");
                BTreeMap::new()
            }
        };
        debug!(path = %path.display(), entries = data.len(), "opened store");

        Ok(Self {
            path,
            data: RwLock::new(data),
            notifier: ChangeNotifier::new(),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the map and commit it only if the file
    /// write succeeds.
    fn update(&self, change: impl FnOnce(&mut BTreeMap<String, String>)) -> Result<()> {
        let mut data = self.data.write().map_err(|_| StorageError::Poisoned)?;
        let mut next = data.clone();
        change(&mut next);

        let json = serde_json::to_string_pretty(&next)?;
        let tmp = self.path.with_extension("json.tmp");
        let written = fs::write(&tmp, json.as_bytes()).and_then(|_| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }

        *data = next;
        Ok(())
    }
}

impl KeyStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.data.read().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let result = self.update(|map| {
            map.insert(key.to_string(), value.to_string());
        });
        if let Err(e) = result {
            warn!(key, error = %e, "write dropped");
        }
    }

    fn remove(&self, key: &str) {
        let present = self
            .data
            .read()
            .map(|d| d.contains_key(key))
            .unwrap_or(false);
        if !present {
            return;
        }

        let result = self.update(|map| {
            map.remove(key);
        });
        if let Err(e) = result {
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

fn read_map(path: &Path) -> Result<BTreeMap<String, String>> {
    match fs::read_to_string(path) {
        Ok(json) => Ok(serde_json::from_str(&json)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
        Err(e) => Err(e.into()),
    }
}
