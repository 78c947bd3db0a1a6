//! Tests for the metadata cache.

use chrono::{Duration, TimeZone, Utc};
use cyclelog_cache::{MetadataCache, MetadataCacheConfig, MetadataSource};
use cyclelog_core::{Machine, ManualClock, MetadataSnapshot};
use cyclelog_error::{CyclelogResult, StorageError, StorageErrorKind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Source that counts loads and returns one machine per load so far.
#[derive(Default)]
struct CountingSource {
    loads: AtomicUsize,
    failing: AtomicBool,
}

#[async_trait::async_trait]
impl MetadataSource for CountingSource {
    async fn load(&self) -> CyclelogResult<MetadataSnapshot> {
        if self.failing.load(Ordering::SeqCst) {
            Err(StorageError::new(StorageErrorKind::FileRead(
                "machines.json: permission denied".to_string(),
            )))?
        }
        let n = self.loads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MetadataSnapshot {
            machines: (1..=n as i64).map(|id| Machine::new(id, format!("M-{id}"))).collect(),
            ..Default::default()
        })
    }
}

fn setup(config: MetadataCacheConfig) -> (Arc<CountingSource>, Arc<ManualClock>, MetadataCache) {
    let source = Arc::new(CountingSource::default());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap(),
    ));
    let cache = MetadataCache::new(source.clone(), clock.clone(), config);
    (source, clock, cache)
}

#[tokio::test]
async fn test_first_read_loads_then_serves_from_cache() {
    let (source, _clock, cache) = setup(MetadataCacheConfig::default());

    assert!(cache.is_stale().await);
    assert_eq!(cache.get_machines().await.len(), 1);
    assert_eq!(cache.get_machines().await.len(), 1);
    assert_eq!(source.loads.load(Ordering::SeqCst), 1);
    assert!(!cache.is_stale().await);
}

#[tokio::test]
async fn test_reload_after_ttl() {
    let (source, clock, cache) = setup(MetadataCacheConfig::default());

    cache.snapshot().await;
    clock.advance(Duration::minutes(59));
    cache.snapshot().await;
    assert_eq!(source.loads.load(Ordering::SeqCst), 1);

    clock.advance(Duration::minutes(1));
    assert!(cache.is_stale().await);
    assert_eq!(cache.get_machines().await.len(), 2);
    assert_eq!(source.loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_invalidate_forces_reload() {
    let (source, _clock, cache) = setup(MetadataCacheConfig::default());

    cache.snapshot().await;
    cache.invalidate().await;
    assert!(cache.is_stale().await);
    cache.snapshot().await;
    assert_eq!(source.loads.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_snapshot() {
    let (source, clock, cache) = setup(MetadataCacheConfig::default());

    assert_eq!(cache.get_machines().await.len(), 1);
    source.failing.store(true, Ordering::SeqCst);
    clock.advance(Duration::hours(2));

    assert!(!cache.refresh_if_stale().await);
    assert_eq!(cache.get_machines().await.len(), 1);
    assert!(cache.refresh().await.is_err());

    source.failing.store(false, Ordering::SeqCst);
    assert!(cache.refresh_if_stale().await);
    assert_eq!(cache.get_machines().await.len(), 2);
}

#[tokio::test]
async fn test_invalidated_snapshot_survives_failed_reload() {
    let (source, _clock, cache) = setup(MetadataCacheConfig::default());

    assert_eq!(cache.get_machines().await.len(), 1);
    cache.invalidate().await;
    source.failing.store(true, Ordering::SeqCst);

    assert_eq!(cache.get_machines().await.len(), 1);
    assert!(cache.is_stale().await);
}

#[tokio::test]
async fn test_failed_first_load_serves_empty_snapshot() {
    let (source, _clock, cache) = setup(MetadataCacheConfig::default());
    source.failing.store(true, Ordering::SeqCst);

    let snapshot = cache.snapshot().await;
    assert!(snapshot.machines.is_empty());
    assert!(cache.get_operators().await.is_empty());
}

#[tokio::test]
async fn test_disabled_cache_always_reads_source() {
    let config = MetadataCacheConfig::default().with_enabled(false);
    let (source, _clock, cache) = setup(config);

    cache.snapshot().await;
    cache.snapshot().await;
    assert_eq!(source.loads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_config_builder_defaults() {
    let config = cyclelog_cache::MetadataCacheConfigBuilder::default()
        .ttl_secs(60u64)
        .build()
        .unwrap();
    assert_eq!(*config.ttl_secs(), 60);
    assert!(*config.enabled());
}
