//! Fallback-on-failure JSON helpers for values kept under a single key.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use crate::KeyStore;

/// Parse the JSON stored under `key`, or `T::default()` when the key is
/// missing or the value does not parse.
pub fn read_json_or_default<T>(store: &dyn KeyStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = store.get(key) else {
        return T::default();
    };
    match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "discarding unparseable stored value");
            T::default()
        }
    }
}

/// Serialize `value` under `key`. Serialization failures are logged and
/// leave the stored value untouched.
pub fn write_json<T>(store: &dyn KeyStore, key: &str, value: &T)
where
    T: Serialize + ?Sized,
{
    match serde_json::to_string(value) {
        Ok(json) => store.set(key, &json),
        Err(e) => warn!(key, error = %e, "value not serializable, write dropped"),
    }
}
