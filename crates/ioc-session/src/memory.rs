use std::collections::HashMap;

use ioc_types::Value;
use parking_lot::RwLock;

use crate::error::SessionResult;
use crate::traits::SessionStore;

/// In-memory, HashMap-based session store.
///
/// Intended for tests, single-process embedding, and as the default store of
/// a container built without one. Values are held behind a non-poisoning
/// `RwLock`, so no operation can fail; cloning a stored object value shares
/// the instance rather than copying it.
pub struct InMemorySessionStore {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemorySessionStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every stored value, ending the session.
    pub fn clear(&self) {
        self.values.write().clear();
    }

    /// Return a sorted list of all keys in the store.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, key: &str) -> SessionResult<Option<Value>> {
        Ok(self.values.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> SessionResult<()> {
        self.values.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> SessionResult<bool> {
        Ok(self.values.write().remove(key).is_some())
    }

    fn contains(&self, key: &str) -> SessionResult<bool> {
        Ok(self.values.read().contains_key(key))
    }
}

impl std::fmt::Debug for InMemorySessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemorySessionStore")
            .field("value_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ioc_types::ObjectRef;

    #[test]
    fn get_missing_is_none() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
        assert!(!store.contains("nope").unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn set_then_get() {
        let store = InMemorySessionStore::new();
        store.set("k", Value::Int(7)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(Value::Int(7)));
        assert!(store.contains("k").unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn set_replaces_previous_value() {
        let store = InMemorySessionStore::new();
        store.set("k", Value::Int(1)).unwrap();
        store.set("k", Value::Int(2)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(Value::Int(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn stored_objects_keep_identity() {
        let store = InMemorySessionStore::new();
        let obj = ObjectRef::new("Cart", Vec::<String>::new());
        store.set("cart", Value::Object(obj.clone())).unwrap();
        let back = store.get("cart").unwrap().unwrap();
        assert!(back.as_object().unwrap().ptr_eq(&obj));
    }

    #[test]
    fn remove_and_clear() {
        let store = InMemorySessionStore::new();
        store.set("a", Value::Null).unwrap();
        store.set("b", Value::Null).unwrap();
        assert!(store.remove("a").unwrap());
        assert!(!store.remove("a").unwrap());
        assert_eq!(store.keys(), vec!["b".to_string()]);
        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn len_survives_a_panicking_writer() {
        let store = std::sync::Arc::new(InMemorySessionStore::new());
        store.set("a", Value::Int(1)).unwrap();
        let writer = std::sync::Arc::clone(&store);
        let outcome = std::thread::spawn(move || {
            let mut map = writer.values.write();
            map.insert("b".to_string(), Value::Int(2));
            panic!("writer gave up while holding the lock");
        })
        .join();
        assert!(outcome.is_err());
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b").unwrap(), Some(Value::Int(2)));
    }

    #[test]
    fn stored_null_is_present() {
        let store = InMemorySessionStore::new();
        store.set("n", Value::Null).unwrap();
        assert_eq!(store.get("n").unwrap(), Some(Value::Null));
    }
}
