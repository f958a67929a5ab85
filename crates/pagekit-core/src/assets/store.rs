use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::debug;

use super::fetch::Fetcher;
use super::response::CachedResponse;
use crate::error::{CacheError, FetchError};

/// Maximum concurrent network fetches while pre-caching.
const MAX_CONCURRENT_FETCHES: usize = 4;

/// One named cache: request identifier → stored response.
#[async_trait]
pub trait Cache: Send + Sync {
    fn name(&self) -> &str;

    /// Store `response` under `id`, replacing any previous entry.
    async fn put(&self, id: &str, response: CachedResponse) -> Result<(), CacheError>;

    /// Exact-identifier lookup.
    async fn match_request(&self, id: &str) -> Result<Option<CachedResponse>, CacheError>;

    async fn len(&self) -> Result<usize, CacheError>;

    /// Fetch every identifier and store the responses.
    ///
    /// Fails on the first transport error or non-success status. Entries
    /// stored before the failure stay in the cache; re-running simply
    /// overwrites them.
    async fn add_all(&self, fetcher: &dyn Fetcher, ids: &[String]) -> Result<usize, CacheError> {
        let mut fetches = stream::iter(ids.iter().cloned())
            .map(|id| async move { let result = fetcher.fetch(&id).await; (id, result) })
            .buffered(MAX_CONCURRENT_FETCHES);

        let mut stored = 0;
        while let Some((id, result)) = fetches.next().await {
            let response = result.map_err(|source| CacheError::Fetch {
                id: id.clone(),
                source,
            })?;
            if !response.is_success() {
                let body = String::from_utf8_lossy(&response.body);
                return Err(CacheError::Fetch {
                    id: id.clone(),
                    source: FetchError::from_status(response.status, &body),
                });
            }
            debug!(cache = self.name(), id = %id, "Cached asset");
            self.put(&id, response).await?;
            stored += 1;
        }
        Ok(stored)
    }
}

/// Collection of named caches owned by the host.
#[async_trait]
pub trait CacheStore: Send + Sync {
    type Cache: Cache;

    /// Open the named cache, creating it empty if missing.
    async fn open(&self, name: &str) -> Result<Self::Cache, CacheError>;

    /// Handle to the named cache if it exists. Never creates one.
    async fn get(&self, name: &str) -> Result<Option<Self::Cache>, CacheError>;

    async fn has(&self, name: &str) -> Result<bool, CacheError>;

    /// Names of all existing caches.
    async fn keys(&self) -> Result<Vec<String>, CacheError>;

    /// Delete the named cache. Returns false if it did not exist.
    async fn delete(&self, name: &str) -> Result<bool, CacheError>;
}
