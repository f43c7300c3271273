use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, RwLock};

/// In-memory entity repository with sequential ids.
///
/// Cheaply cloneable; clones share the same underlying map. Locks are held
/// only for the duration of one map operation and never across await
/// points, so handlers can use the store freely under concurrency.
pub struct Store<T> {
    inner: Arc<Inner<T>>,
}

struct Inner<T> {
    entries: RwLock<BTreeMap<i64, T>>,
    next_id: AtomicI64,
}

impl<T: Clone> Store<T> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: RwLock::new(BTreeMap::new()),
                next_id: AtomicI64::new(1),
            }),
        }
    }

    /// Insert a new entity, handing the assigned id to the constructor.
    pub fn insert_with(&self, build: impl FnOnce(i64) -> T) -> T {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let entity = build(id);
        self.inner
            .entries
            .write()
            .expect("store lock poisoned")
            .insert(id, entity.clone());
        entity
    }

    /// All entities in id order.
    pub fn list(&self) -> Vec<T> {
        self.inner
            .entries
            .read()
            .expect("store lock poisoned")
            .values()
            .cloned()
            .collect()
    }

    pub fn get(&self, id: i64) -> Option<T> {
        self.inner
            .entries
            .read()
            .expect("store lock poisoned")
            .get(&id)
            .cloned()
    }

    /// Apply a partial update in place, returning the updated entity.
    pub fn update(&self, id: i64, apply: impl FnOnce(&mut T)) -> Option<T> {
        let mut entries = self.inner.entries.write().expect("store lock poisoned");
        let entity = entries.get_mut(&id)?;
        apply(entity);
        Some(entity.clone())
    }

    pub fn remove(&self, id: i64) -> Option<T> {
        self.inner
            .entries
            .write()
            .expect("store lock poisoned")
            .remove(&id)
    }
}

impl<T: Clone> Default for Store<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}
