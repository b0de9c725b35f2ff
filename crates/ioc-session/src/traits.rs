use ioc_types::Value;

use crate::error::SessionResult;

/// Keyed store backing session-scoped instances.
///
/// The container only ever calls `get` and `set`; the store decides how long
/// a session lives and how it is shared. Implementations must be safe to call
/// from several threads, but the container takes no position on the store's
/// own consistency guarantees.
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Ok(None)` if nothing is stored.
    fn get(&self, key: &str) -> SessionResult<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: Value) -> SessionResult<()>;

    /// Remove the value under `key`. Returns `true` if it existed.
    fn remove(&self, key: &str) -> SessionResult<bool>;

    /// Check whether a value is stored under `key`.
    ///
    /// Default implementation calls `get()`.
    fn contains(&self, key: &str) -> SessionResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
