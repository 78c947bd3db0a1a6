//! Metadata cache implementation.

use chrono::{DateTime, Utc};
use cyclelog_core::{Clock, Machine, MetadataSnapshot, Operator, Supervisor};
use cyclelog_error::CyclelogResult;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Where the cache loads reference tables from.
#[async_trait::async_trait]
pub trait MetadataSource: Send + Sync {
    /// Read all three tables.
    async fn load(&self) -> CyclelogResult<MetadataSnapshot>;
}

/// Configuration for the metadata cache.
#[derive(
    Debug, Clone, PartialEq, Serialize, Deserialize, Getters, derive_setters::Setters, derive_builder::Builder,
)]
#[setters(prefix = "with_")]
pub struct MetadataCacheConfig {
    /// How long a loaded snapshot is served before reloading (seconds)
    #[serde(default = "default_ttl")]
    #[builder(default = "default_ttl()")]
    ttl_secs: u64,

    /// Whether caching is enabled; when disabled every read goes to the source
    #[serde(default = "default_enabled")]
    #[builder(default = "default_enabled()")]
    enabled: bool,
}

fn default_ttl() -> u64 {
    3600 // 1 hour
}

fn default_enabled() -> bool {
    true
}

impl Default for MetadataCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl(),
            enabled: default_enabled(),
        }
    }
}

#[derive(Debug)]
struct Loaded {
    snapshot: Arc<MetadataSnapshot>,
    loaded_at: DateTime<Utc>,
    invalidated: bool,
}

/// Read-through, time-boxed cache of the reference tables.
///
/// A snapshot is served until it is older than the configured TTL or until
/// [`invalidate`](Self::invalidate) is called. A failed reload keeps serving
/// the previous snapshot (or an empty one if nothing was ever loaded) and is
/// retried on the next read; readers are never failed because of it.
///
/// # Example
///
/// ```
/// use cyclelog_cache::{MetadataCache, MetadataCacheConfig, MetadataSource};
/// use cyclelog_core::{Machine, MetadataSnapshot, SystemClock};
/// use cyclelog_error::CyclelogResult;
/// use std::sync::Arc;
///
/// struct Fixed;
///
/// #[async_trait::async_trait]
/// impl MetadataSource for Fixed {
///     async fn load(&self) -> CyclelogResult<MetadataSnapshot> {
///         Ok(MetadataSnapshot {
///             machines: vec![Machine::new(1, "M-01")],
///             ..Default::default()
///         })
///     }
/// }
///
/// # #[tokio::main]
/// # async fn main() {
/// let cache = MetadataCache::new(Arc::new(Fixed), Arc::new(SystemClock), MetadataCacheConfig::default());
/// assert_eq!(cache.get_machines().await.len(), 1);
/// # }
/// ```
pub struct MetadataCache {
    config: MetadataCacheConfig,
    source: Arc<dyn MetadataSource>,
    clock: Arc<dyn Clock>,
    state: RwLock<Option<Loaded>>,
}

impl MetadataCache {
    /// Create an empty cache; the first read loads from `source`.
    pub fn new(
        source: Arc<dyn MetadataSource>,
        clock: Arc<dyn Clock>,
        config: MetadataCacheConfig,
    ) -> Self {
        tracing::debug!(
            ttl_secs = config.ttl_secs,
            enabled = config.enabled,
            "Creating new MetadataCache"
        );
        Self {
            config,
            source,
            clock,
            state: RwLock::new(None),
        }
    }

    /// Current snapshot, reloading first if it is stale.
    #[tracing::instrument(skip(self))]
    pub async fn snapshot(&self) -> Arc<MetadataSnapshot> {
        self.refresh_if_stale().await;
        self.state
            .read()
            .await
            .as_ref()
            .map(|loaded| Arc::clone(&loaded.snapshot))
            .unwrap_or_default()
    }

    /// Machines from the current snapshot.
    pub async fn get_machines(&self) -> Vec<Machine> {
        self.snapshot().await.machines.clone()
    }

    /// Operators from the current snapshot.
    pub async fn get_operators(&self) -> Vec<Operator> {
        self.snapshot().await.operators.clone()
    }

    /// Supervisors from the current snapshot.
    pub async fn get_supervisors(&self) -> Vec<Supervisor> {
        self.snapshot().await.supervisors.clone()
    }

    /// Whether the next read would go to the source.
    pub async fn is_stale(&self) -> bool {
        self.stale(self.state.read().await.as_ref())
    }

    fn stale(&self, loaded: Option<&Loaded>) -> bool {
        if !self.config.enabled {
            return true;
        }
        match loaded {
            None => true,
            Some(loaded) if loaded.invalidated => true,
            Some(loaded) => {
                let age = self.clock.now() - loaded.loaded_at;
                age.num_seconds() < 0 || age.num_seconds() as u64 >= self.config.ttl_secs
            }
        }
    }

    /// Reload if the snapshot is missing or older than the TTL.
    ///
    /// Returns `true` when a reload succeeded.
    pub async fn refresh_if_stale(&self) -> bool {
        if !self.is_stale().await {
            return false;
        }

        let mut state = self.state.write().await;
        // Another reader may have reloaded while we waited for the lock.
        if !self.stale(state.as_ref()) {
            return false;
        }

        match self.source.load().await {
            Ok(snapshot) => {
                tracing::info!(
                    machines = snapshot.machines.len(),
                    operators = snapshot.operators.len(),
                    supervisors = snapshot.supervisors.len(),
                    "Metadata loaded into cache"
                );
                *state = Some(Loaded {
                    snapshot: Arc::new(snapshot),
                    loaded_at: self.clock.now(),
                    invalidated: false,
                });
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load metadata, serving previous snapshot");
                false
            }
        }
    }

    /// Reload unconditionally.
    ///
    /// # Errors
    ///
    /// Returns the source error; the previous snapshot is kept.
    #[tracing::instrument(skip(self))]
    pub async fn refresh(&self) -> CyclelogResult<()> {
        let snapshot = self.source.load().await?;
        *self.state.write().await = Some(Loaded {
            snapshot: Arc::new(snapshot),
            loaded_at: self.clock.now(),
            invalidated: false,
        });
        Ok(())
    }

    /// Mark the snapshot stale so the next read reloads.
    ///
    /// The snapshot itself is kept and still served if that reload fails.
    pub async fn invalidate(&self) {
        if let Some(loaded) = self.state.write().await.as_mut() {
            loaded.invalidated = true;
        }
        tracing::debug!("Invalidated metadata cache");
    }

    /// Cache configuration.
    pub fn config(&self) -> &MetadataCacheConfig {
        &self.config
    }
}

impl std::fmt::Debug for MetadataCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataCache")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
