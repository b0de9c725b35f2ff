//! Scope-aware instance storage and the resolution stack.

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use indexmap::IndexSet;
use ioc_session::SessionStore;
use ioc_types::{ContextHash, Scope, Value};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};

use crate::error::{ContainerError, ContainerResult};

/// Instances of cached scopes, shared by every call on a container.
///
/// Singletons live in the container. Session-scoped instances are written
/// to the injected [`SessionStore`] under `<namespace>::<context>::<id>`, so
/// containers built from different documents never share an entry.
pub struct ScopeCache {
    singletons: RwLock<HashMap<String, Value>>,
    session: Arc<dyn SessionStore>,
    session_prefix: String,
    construction: ReentrantMutex<()>,
    depth: Arc<AtomicUsize>,
}

impl ScopeCache {
    pub fn new(session: Arc<dyn SessionStore>, namespace: &str, context: &ContextHash) -> Self {
        Self {
            singletons: RwLock::new(HashMap::new()),
            session,
            session_prefix: format!("{namespace}::{}", context.to_hex()),
            construction: ReentrantMutex::new(()),
            depth: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Key under which a session-scoped `id` is stored.
    pub fn session_key(&self, id: &str) -> String {
        format!("{}::{id}", self.session_prefix)
    }

    /// A previously cached instance. The session store is consulted first.
    pub fn get_cached(&self, id: &str) -> ContainerResult<Option<Value>> {
        if let Some(value) = self.session.get(&self.session_key(id))? {
            return Ok(Some(value));
        }
        Ok(self.singletons.read().get(id).cloned())
    }

    /// Store an instance according to its scope. Prototypes are not stored.
    pub fn cache(&self, id: &str, value: Value, scope: Scope) -> ContainerResult<()> {
        match scope {
            Scope::Singleton => {
                self.singletons.write().insert(id.to_string(), value);
            }
            Scope::Session => self.session.set(&self.session_key(id), value)?,
            Scope::Prototype => {}
        }
        Ok(())
    }

    pub fn singleton_count(&self) -> usize {
        self.singletons.read().len()
    }

    /// Serializes construction of cached scopes. Reentrant, so a definition
    /// under construction can resolve its own cached dependencies.
    pub fn lock_construction(&self) -> ReentrantMutexGuard<'_, ()> {
        self.construction.lock()
    }

    /// A fresh resolution stack for one top-level call.
    pub fn stack(&self) -> ResolutionStack {
        ResolutionStack {
            ids: IndexSet::new(),
            depth: Some(Arc::clone(&self.depth)),
        }
    }

    /// Number of definitions currently under construction, over all calls.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for ScopeCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeCache")
            .field("session_prefix", &self.session_prefix)
            .field("singletons", &self.singleton_count())
            .field("depth", &self.depth())
            .finish()
    }
}

/// Identifiers under construction in one top-level call, in entry order.
#[derive(Debug, Default)]
pub struct ResolutionStack {
    ids: IndexSet<String>,
    depth: Option<Arc<AtomicUsize>>,
}

impl ResolutionStack {
    /// A stack not tied to any container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `id`, failing if it is already under construction.
    ///
    /// The returned frame pops `id` when dropped, on every exit path.
    pub fn enter(&mut self, id: &str) -> ContainerResult<StackFrame<'_>> {
        if self.ids.contains(id) {
            let mut path: Vec<String> = self.ids.iter().cloned().collect();
            path.push(id.to_string());
            return Err(ContainerError::CircularReference { path });
        }
        self.ids.insert(id.to_string());
        if let Some(depth) = &self.depth {
            depth.fetch_add(1, Ordering::SeqCst);
        }
        Ok(StackFrame { stack: self })
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn path(&self) -> Vec<&str> {
        self.ids.iter().map(String::as_str).collect()
    }

    fn leave(&mut self) {
        if self.ids.pop().is_some() {
            if let Some(depth) = &self.depth {
                depth.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }
}

/// Guard for one entry on a [`ResolutionStack`].
#[derive(Debug)]
pub struct StackFrame<'a> {
    stack: &'a mut ResolutionStack,
}

impl Deref for StackFrame<'_> {
    type Target = ResolutionStack;

    fn deref(&self) -> &ResolutionStack {
        self.stack
    }
}

impl DerefMut for StackFrame<'_> {
    fn deref_mut(&mut self) -> &mut ResolutionStack {
        self.stack
    }
}

impl Drop for StackFrame<'_> {
    fn drop(&mut self) {
        self.stack.leave();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ioc_session::InMemorySessionStore;
    use ioc_types::ObjectRef;

    fn cache_with(store: Arc<InMemorySessionStore>) -> ScopeCache {
        ScopeCache::new(store, "ioc", &ContextHash::from_document("doc"))
    }

    // -----------------------------------------------------------------------
    // Resolution stack
    // -----------------------------------------------------------------------

    #[test]
    fn frames_pop_in_reverse_order() {
        let mut stack = ResolutionStack::new();
        {
            let mut a = stack.enter("a").unwrap();
            {
                let b = a.enter("b").unwrap();
                assert_eq!(b.path(), vec!["a", "b"]);
            }
            assert_eq!(a.path(), vec!["a"]);
        }
        assert!(stack.is_empty());
    }

    #[test]
    fn reentry_reports_full_path() {
        let mut stack = ResolutionStack::new();
        let mut a = stack.enter("a").unwrap();
        let mut b = a.enter("b").unwrap();
        let err = b.enter("a").unwrap_err();
        match err {
            ContainerError::CircularReference { path } => assert_eq!(path, vec!["a", "b", "a"]),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(b.len(), 2);
    }

    #[test]
    fn stack_unwinds_through_error_propagation() {
        fn descend(stack: &mut ResolutionStack, ids: &[&str]) -> ContainerResult<()> {
            let Some((first, rest)) = ids.split_first() else {
                return Ok(());
            };
            let mut frame = stack.enter(first)?;
            descend(&mut frame, rest)
        }

        let mut stack = ResolutionStack::new();
        assert!(descend(&mut stack, &["a", "b", "c", "b"]).unwrap_err().is_cycle());
        assert!(stack.is_empty());
        descend(&mut stack, &["a", "b"]).unwrap();
    }

    #[test]
    fn container_depth_tracks_open_frames() {
        let cache = cache_with(Arc::new(InMemorySessionStore::new()));
        let mut stack = cache.stack();
        {
            let mut frame = stack.enter("a").unwrap();
            let _inner = frame.enter("b").unwrap();
            assert_eq!(cache.depth(), 2);
        }
        assert_eq!(cache.depth(), 0);
    }

    // -----------------------------------------------------------------------
    // Scoped storage
    // -----------------------------------------------------------------------

    #[test]
    fn singleton_and_prototype_storage() {
        let store = Arc::new(InMemorySessionStore::new());
        let cache = cache_with(Arc::clone(&store));
        cache.cache("s", Value::Int(1), Scope::Singleton).unwrap();
        cache.cache("p", Value::Int(2), Scope::Prototype).unwrap();
        assert_eq!(cache.get_cached("s").unwrap(), Some(Value::Int(1)));
        assert_eq!(cache.get_cached("p").unwrap(), None);
        assert_eq!(cache.singleton_count(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn session_values_go_to_the_store() {
        let store = Arc::new(InMemorySessionStore::new());
        let cache = cache_with(Arc::clone(&store));
        let obj = ObjectRef::new("Cart", ());
        cache.cache("cart", Value::Object(obj.clone()), Scope::Session).unwrap();

        let key = cache.session_key("cart");
        assert!(key.starts_with("ioc::"));
        assert!(key.ends_with("::cart"));
        assert!(store.contains(&key).unwrap());
        assert_eq!(cache.singleton_count(), 0);

        let cached = cache.get_cached("cart").unwrap().unwrap();
        assert!(cached.as_object().unwrap().ptr_eq(&obj));
    }

    #[test]
    fn session_keys_are_qualified_by_context() {
        let store: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        let a = ScopeCache::new(Arc::clone(&store), "ioc", &ContextHash::from_document("a"));
        let b = ScopeCache::new(Arc::clone(&store), "ioc", &ContextHash::from_document("b"));
        a.cache("cart", Value::Int(1), Scope::Session).unwrap();
        assert_ne!(a.session_key("cart"), b.session_key("cart"));
        assert_eq!(b.get_cached("cart").unwrap(), None);
    }

    #[test]
    fn construction_lock_is_reentrant() {
        let cache = cache_with(Arc::new(InMemorySessionStore::new()));
        let _outer = cache.lock_construction();
        let _inner = cache.lock_construction();
    }
}
