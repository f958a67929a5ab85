use std::fmt;

use tracing::{debug, error, info, warn};

use super::fetch::Fetcher;
use super::manifest::AssetManifest;
use super::response::CachedResponse;
use super::store::{Cache, CacheStore};
use crate::error::{CacheError, WorkerError};

/// Lifecycle phase of one worker instance. Each phase is entered once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Activating,
    Serving,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerState::Installing => "installing",
            WorkerState::Activating => "activating",
            WorkerState::Serving => "serving",
        }
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Side effect the host must apply after a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEffect {
    /// Proceed to activation without waiting for older instances to finish.
    SkipWaiting,
    /// Take control of already-open pages without a reload.
    ClaimClients,
}

/// Result of sweeping stale caches.
#[derive(Debug, Default)]
pub struct ActivationReport {
    pub deleted: Vec<String>,
    pub failed: Vec<(String, CacheError)>,
}

impl ActivationReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    Cache,
    Network,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Served {
    pub response: CachedResponse,
    pub from: ServedFrom,
}

/// Delete every cache whose name is not `current`.
///
/// Each deletion is attempted independently; failures are collected in the
/// report. Only failing to list the caches aborts the sweep.
pub async fn evict_stale<S: CacheStore + ?Sized>(store: &S, current: &str) -> Result<ActivationReport, CacheError> {
    let mut report = ActivationReport::default();
    for name in store.keys().await? {
        if name == current {
            continue;
        }
        info!(cache = %name, "Removing old cache");
        match store.delete(&name).await {
            Ok(_) => report.deleted.push(name),
            Err(e) => {
                error!(cache = %name, error = %e, "Failed to remove old cache");
                report.failed.push((name, e));
            }
        }
    }
    Ok(report)
}

/// One instance of the offline asset worker.
pub struct AssetWorker<S: CacheStore, F: Fetcher> {
    store: S,
    fetcher: F,
    version: String,
    manifest: AssetManifest,
    state: WorkerState,
}

impl<S: CacheStore, F: Fetcher> AssetWorker<S, F> {
    pub fn new(store: S, fetcher: F, version: impl Into<String>, manifest: AssetManifest) -> Self {
        Self {
            store,
            fetcher,
            version: version.into(),
            manifest,
            state: WorkerState::Installing,
        }
    }

    /// Restart a worker whose version was already installed and activated
    /// by an earlier instance. It goes straight to `Serving`.
    pub async fn resume(store: S, fetcher: F, version: impl Into<String>, manifest: AssetManifest) -> Result<Self, WorkerError> {
        let version = version.into();
        if !store.has(&version).await? {
            return Err(WorkerError::NotInstalled(version));
        }
        debug!(version = %version, "Resuming asset worker");
        Ok(Self {
            store,
            fetcher,
            version,
            manifest,
            state: WorkerState::Serving,
        })
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn expect_state(&self, expected: WorkerState, operation: &'static str) -> Result<(), WorkerError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(WorkerError::InvalidState {
                operation,
                state: self.state.as_str(),
            })
        }
    }

    /// Pre-cache the manifest into the cache named by the version tag.
    ///
    /// On failure the worker stays in `Installing` and install may be retried.
    pub async fn install(&mut self) -> Result<LifecycleEffect, WorkerError> {
        self.expect_state(WorkerState::Installing, "install")?;
        info!(version = %self.version, assets = self.manifest.len(), "Installing asset cache");

        let ids = self.manifest.ids();
        let result = match self.store.open(&self.version).await {
            Ok(cache) => cache.add_all(&self.fetcher, &ids).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(stored) => {
                info!(version = %self.version, stored, "Asset cache installed");
                self.state = WorkerState::Activating;
                Ok(LifecycleEffect::SkipWaiting)
            }
            Err(source) => {
                warn!(version = %self.version, error = %source, "Asset cache install failed");
                Err(WorkerError::Install {
                    version: self.version.clone(),
                    source,
                })
            }
        }
    }

    /// Remove every cache from older versions and start serving.
    pub async fn activate(&mut self) -> Result<(LifecycleEffect, ActivationReport), WorkerError> {
        self.expect_state(WorkerState::Activating, "activate")?;
        info!(version = %self.version, "Activating asset worker");

        let report = evict_stale(&self.store, &self.version).await?;
        self.state = WorkerState::Serving;
        Ok((LifecycleEffect::ClaimClients, report))
    }

    /// Answer a request from the current cache, falling back to the network.
    ///
    /// Network responses are returned as-is and never stored. Network
    /// failures for uncached resources propagate unchanged.
    pub async fn serve(&self, id: &str) -> Result<Served, WorkerError> {
        self.expect_state(WorkerState::Serving, "serve")?;

        // Lookup only: a cache swept by a newer version must stay deleted
        let cached = match self.store.get(&self.version).await? {
            Some(cache) => cache.match_request(id).await?,
            None => None,
        };
        if let Some(response) = cached {
            debug!(id = %id, "Served from cache");
            return Ok(Served {
                response,
                from: ServedFrom::Cache,
            });
        }

        debug!(id = %id, "Cache miss, forwarding to network");
        let response = self.fetcher.fetch(id).await?;
        Ok(Served {
            response,
            from: ServedFrom::Network,
        })
    }
}

/// Run install then activate, as the host does when a new worker registers.
pub async fn run_lifecycle<S: CacheStore, F: Fetcher>(
    worker: &mut AssetWorker<S, F>,
) -> Result<(Vec<LifecycleEffect>, ActivationReport), WorkerError> {
    let installed = worker.install().await?;
    let (activated, report) = worker.activate().await?;
    Ok((vec![installed, activated], report))
}
