use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::cached::CachedData;
use super::response::CachedResponse;
use super::store::{Cache, CacheStore};
use crate::error::CacheError;

/// Extension of cache files under the store root.
const CACHE_EXTENSION: &str = "json";

type Entries = BTreeMap<String, CachedResponse>;

/// Status line for one cache listed under the store root.
#[derive(Debug)]
pub struct CacheSummary {
    pub name: String,
    /// Entry count, or why the cache could not be read.
    pub entries: Result<usize, CacheError>,
    pub age: Option<String>,
}

/// Cache store keeping one JSON file per named cache under a root directory.
#[derive(Debug, Clone)]
pub struct DiskCacheStore {
    root: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl DiskCacheStore {
    pub fn new(root: PathBuf) -> Result<Self, CacheError> {
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cache_path(&self, name: &str) -> Result<PathBuf, CacheError> {
        validate_name(name)?;
        Ok(self.root.join(format!("{}.{}", name, CACHE_EXTENSION)))
    }

    /// Summarize every listed cache without creating or modifying any.
    ///
    /// A cache that cannot be read is reported in its own summary and does
    /// not stop the listing.
    pub async fn summaries(&self) -> Result<Vec<CacheSummary>, CacheError> {
        let mut summaries = Vec::new();
        for name in self.keys().await? {
            let loaded = match self.get(&name).await {
                Ok(Some(cache)) => cache.load().await,
                Ok(None) => Ok(None),
                Err(e) => Err(e),
            };
            let summary = match loaded {
                Ok(Some(cached)) => CacheSummary {
                    entries: Ok(cached.data.len()),
                    age: Some(cached.age_display()),
                    name,
                },
                Ok(None) => CacheSummary {
                    name,
                    entries: Ok(0),
                    age: None,
                },
                Err(e) => {
                    warn!(cache = %name, error = %e, "Unreadable cache");
                    CacheSummary {
                        name,
                        entries: Err(e),
                        age: None,
                    }
                }
            };
            summaries.push(summary);
        }
        Ok(summaries)
    }
}

/// Cache names become file names, so only a conservative character set is allowed.
fn validate_name(name: &str) -> Result<(), CacheError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
    if valid {
        Ok(())
    } else {
        Err(CacheError::InvalidName(name.to_string()))
    }
}

/// Handle to one cache file.
#[derive(Debug, Clone)]
pub struct DiskCache {
    name: String,
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl DiskCache {
    async fn load(&self) -> Result<Option<CachedData<Entries>>, CacheError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => Ok(Some(serde_json::from_str(&contents)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, entries: &Entries) -> Result<(), CacheError> {
        let contents = serde_json::to_string(&CachedData::new(entries))?;
        // Write then rename so readers never observe a partial file
        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, contents).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Time since the cache was last written, e.g. "5m ago".
    pub async fn age_display(&self) -> Result<Option<String>, CacheError> {
        Ok(self.load().await?.map(|cached| cached.age_display()))
    }
}

#[async_trait]
impl Cache for DiskCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, id: &str, response: CachedResponse) -> Result<(), CacheError> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?.map(|cached| cached.data).unwrap_or_default();
        entries.insert(id.to_string(), response);
        self.save(&entries).await
    }

    async fn match_request(&self, id: &str) -> Result<Option<CachedResponse>, CacheError> {
        Ok(self.load().await?.and_then(|mut cached| cached.data.remove(id)))
    }

    async fn len(&self) -> Result<usize, CacheError> {
        Ok(self.load().await?.map(|cached| cached.data.len()).unwrap_or(0))
    }
}

#[async_trait]
impl CacheStore for DiskCacheStore {
    type Cache = DiskCache;

    async fn open(&self, name: &str) -> Result<DiskCache, CacheError> {
        let cache = DiskCache {
            name: name.to_string(),
            path: self.cache_path(name)?,
            write_lock: self.write_lock.clone(),
        };
        let _guard = self.write_lock.lock().await;
        if cache.load().await?.is_none() {
            debug!(cache = name, "Creating cache");
            cache.save(&Entries::new()).await?;
        }
        Ok(cache)
    }

    async fn get(&self, name: &str) -> Result<Option<DiskCache>, CacheError> {
        let path = self.cache_path(name)?;
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        Ok(Some(DiskCache {
            name: name.to_string(),
            path,
            write_lock: self.write_lock.clone(),
        }))
    }

    async fn has(&self, name: &str) -> Result<bool, CacheError> {
        Ok(tokio::fs::try_exists(self.cache_path(name)?).await?)
    }

    async fn keys(&self) -> Result<Vec<String>, CacheError> {
        let mut names = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(CACHE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete(&self, name: &str) -> Result<bool, CacheError> {
        let path = self.cache_path(name)?;
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCacheStore::new(dir.path().join("caches")).unwrap();

        let cache = store.open("wr-treino-v1").await.unwrap();
        cache.put("./style.css", CachedResponse::ok("body{}")).await.unwrap();
        cache.put("./script.js", CachedResponse::ok("run()")).await.unwrap();

        let fresh = DiskCacheStore::new(dir.path().join("caches")).unwrap();
        let reopened = fresh.open("wr-treino-v1").await.unwrap();
        assert_eq!(reopened.len().await.unwrap(), 2);
        assert_eq!(
            reopened.match_request("./style.css").await.unwrap(),
            Some(CachedResponse::ok("body{}"))
        );
        assert_eq!(reopened.age_display().await.unwrap().as_deref(), Some("just now"));
    }

    #[tokio::test]
    async fn test_keys_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCacheStore::new(dir.path().to_path_buf()).unwrap();
        store.open("app-v1").await.unwrap();
        store.open("app-v2").await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        assert_eq!(store.keys().await.unwrap(), vec!["app-v1", "app-v2"]);
        assert!(store.delete("app-v1").await.unwrap());
        assert!(!store.delete("app-v1").await.unwrap());
        assert!(!store.has("app-v1").await.unwrap());
        assert_eq!(store.keys().await.unwrap(), vec!["app-v2"]);
    }

    #[tokio::test]
    async fn test_get_never_creates() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCacheStore::new(dir.path().to_path_buf()).unwrap();

        assert!(store.get("app-v1").await.unwrap().is_none());
        assert!(store.keys().await.unwrap().is_empty());

        store.open("app-v1").await.unwrap();
        let cache = store.get("app-v1").await.unwrap().unwrap();
        assert_eq!(cache.name(), "app-v1");
        assert_eq!(cache.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_summaries_report_bad_caches_inline() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCacheStore::new(dir.path().to_path_buf()).unwrap();
        let cache = store.open("app-v1").await.unwrap();
        cache.put("./", CachedResponse::ok("<html>")).await.unwrap();
        std::fs::write(dir.path().join("broken.json"), "{oops").unwrap();
        std::fs::write(dir.path().join("my cache.json"), "{}").unwrap();

        let summaries = store.summaries().await.unwrap();
        let names: Vec<_> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["app-v1", "broken", "my cache"]);

        assert_eq!(summaries[0].entries.as_ref().unwrap(), &1);
        assert_eq!(summaries[0].age.as_deref(), Some("just now"));
        assert!(matches!(summaries[1].entries, Err(CacheError::Corrupt(_))));
        assert!(matches!(summaries[2].entries, Err(CacheError::InvalidName(_))));

        // Listing is read-only
        assert_eq!(store.keys().await.unwrap(), vec!["app-v1", "broken", "my cache"]);
        assert_eq!(std::fs::read_to_string(dir.path().join("broken.json")).unwrap(), "{oops");
    }

    #[tokio::test]
    async fn test_rejects_unsafe_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskCacheStore::new(dir.path().to_path_buf()).unwrap();

        for name in ["", "../escape", ".hidden", "a/b"] {
            assert!(matches!(store.open(name).await, Err(CacheError::InvalidName(_))));
        }
    }
}
