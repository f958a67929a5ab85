use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::response::CachedResponse;
use super::store::{Cache, CacheStore};
use crate::error::CacheError;

type Entries = Arc<Mutex<HashMap<String, CachedResponse>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panic while holding the lock cannot leave a map half-updated
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-process cache store. Clones share the same caches.
#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStore {
    caches: Arc<Mutex<BTreeMap<String, Entries>>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Handle to one in-memory cache. Stays usable after its cache is deleted
/// from the store, but is then detached from it.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    name: String,
    entries: Entries,
}

#[async_trait]
impl Cache for MemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, id: &str, response: CachedResponse) -> Result<(), CacheError> {
        lock(&self.entries).insert(id.to_string(), response);
        Ok(())
    }

    async fn match_request(&self, id: &str) -> Result<Option<CachedResponse>, CacheError> {
        Ok(lock(&self.entries).get(id).cloned())
    }

    async fn len(&self) -> Result<usize, CacheError> {
        Ok(lock(&self.entries).len())
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    type Cache = MemoryCache;

    async fn open(&self, name: &str) -> Result<MemoryCache, CacheError> {
        let entries = lock(&self.caches).entry(name.to_string()).or_default().clone();
        Ok(MemoryCache {
            name: name.to_string(),
            entries,
        })
    }

    async fn get(&self, name: &str) -> Result<Option<MemoryCache>, CacheError> {
        Ok(lock(&self.caches).get(name).map(|entries| MemoryCache {
            name: name.to_string(),
            entries: entries.clone(),
        }))
    }

    async fn has(&self, name: &str) -> Result<bool, CacheError> {
        Ok(lock(&self.caches).contains_key(name))
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        Ok(lock(&self.caches).keys().cloned().collect())
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        Ok(lock(&self.caches).remove(name).is_some())
    }
}
