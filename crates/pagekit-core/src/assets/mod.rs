//! Offline asset cache worker.
//!
//! A worker instance walks through `Installing → Activating → Serving`:
//! - install pre-caches the asset manifest into the cache named by the
//!   version tag
//! - activate deletes every cache that does not bear the current tag
//! - serve answers requests cache-first, falling back to the network
//!
//! Caches are only written during install. Network responses served on a
//! cache miss are never stored.

pub mod cached;
pub mod disk;
pub mod fetch;
pub mod manifest;
pub mod memory;
pub mod response;
pub mod store;
pub mod worker;

pub use cached::CachedData;
pub use disk::{CacheSummary, DiskCache, DiskCacheStore};
pub use fetch::{Fetcher, HttpFetcher};
pub use manifest::AssetManifest;
pub use memory::{MemoryCache, MemoryCacheStore};
pub use response::CachedResponse;
pub use store::{Cache, CacheStore};
pub use worker::{evict_stale, run_lifecycle, ActivationReport, AssetWorker, LifecycleEffect, Served, ServedFrom, WorkerState};
