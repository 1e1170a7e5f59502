use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// String key-value storage that survives process restarts.
///
/// Implementations must make `set` atomic per key: a reader observes either
/// the previous value or the new one, never a torn write.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Removing a key that does not exist is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Read and decode a JSON value stored under `key`.
pub fn get_json<T>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StoreError>
where
    T: DeserializeOwned,
{
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| StoreError::json_parse(key, source))
}

/// Encode `value` as JSON and store it under `key`, replacing the previous value.
pub fn set_json<T>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StoreError>
where
    T: Serialize + ?Sized,
{
    let raw = serde_json::to_string(value).map_err(|source| StoreError::json_serialize(key, source))?;
    store.set(key, &raw)
}
