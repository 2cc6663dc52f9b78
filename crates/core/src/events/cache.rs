//! Fingerprint-keyed event cache store
//!
//! Persists fetched event batches under their query fingerprint so a
//! revisited view can paint instantly while a background revalidation
//! confirms freshness. The cache is a pure optimization: every failure mode
//! (corrupt entry, storage-write failure, quota) degrades to a miss or a
//! dropped write, never an error.
//!
//! Retention: entries expire 5 minutes after their last write/touch and are
//! deleted lazily on read; at most the 5 most-recently-written entries are
//! kept, with the oldest evicted after every write.

use std::sync::Arc;
use std::time::Duration;

use gts_common::{Clock, SystemClock};
use gts_domain::constants::{
    EVENTS_CACHE_FRESHNESS_MS, EVENTS_CACHE_MAX_ENTRIES, EVENTS_CACHE_PREFIX,
};
use gts_domain::CalendarEvent;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::ports::KeyValueStore;
use super::signature::signature;

/// Event cache configuration
#[derive(Debug, Clone)]
pub struct EventCacheConfig {
    /// How long an entry stays servable after its last write/touch.
    pub freshness: Duration,

    /// Maximum number of retained entries under the cache prefix.
    pub max_entries: usize,
}

impl Default for EventCacheConfig {
    fn default() -> Self {
        Self {
            freshness: Duration::from_millis(
                std::env::var("GTS_EVENTS_CACHE_TTL_SECONDS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .map(|secs| secs * 1000)
                    .unwrap_or(EVENTS_CACHE_FRESHNESS_MS),
            ),
            max_entries: std::env::var("GTS_EVENTS_CACHE_MAX_ENTRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(EVENTS_CACHE_MAX_ENTRIES),
        }
    }
}

impl EventCacheConfig {
    /// Config with a custom freshness window (useful for testing).
    pub fn with_freshness(freshness: Duration) -> Self {
        Self { freshness, max_entries: EVENTS_CACHE_MAX_ENTRIES }
    }

    /// Log configuration at startup.
    pub fn log_config(&self) {
        info!(
            freshness_ms = self.freshness.as_millis() as u64,
            max_entries = self.max_entries,
            "event cache configuration loaded"
        );
    }
}

/// A served cache hit: the stored batch plus the signature it was stored
/// under, so revalidation can compare without recomputing.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEvents {
    pub events: Vec<CalendarEvent>,
    pub signature: String,
}

/// Persisted envelope, one per fingerprint key.
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    events: Vec<CalendarEvent>,
    signature: String,
    /// Milliseconds since the UNIX epoch at last write/touch. Zero (or
    /// absent in stored JSON) marks the entry invalid.
    #[serde(default)]
    timestamp: u64,
}

/// Event cache over a [`KeyValueStore`] namespace.
///
/// Generic over [`Clock`] so expiry is testable with `MockClock`.
pub struct EventCacheStore<C: Clock = SystemClock> {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<C>,
    config: EventCacheConfig,
}

impl EventCacheStore<SystemClock> {
    /// Cache with the system clock.
    pub fn new(store: Arc<dyn KeyValueStore>, config: EventCacheConfig) -> Self {
        config.log_config();
        Self::with_clock(store, config, SystemClock)
    }
}

impl<C: Clock> EventCacheStore<C> {
    /// Cache with a custom clock (for testing).
    pub fn with_clock(store: Arc<dyn KeyValueStore>, config: EventCacheConfig, clock: C) -> Self {
        Self { store, clock: Arc::new(clock), config }
    }

    /// Read a non-expired entry. Any parse failure, missing timestamp, or
    /// staleness beyond the freshness window deletes the entry and reads as
    /// a miss. Never errors.
    pub fn get(&self, fingerprint: &str) -> Option<CachedEvents> {
        let raw = self.store.get(fingerprint)?;

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                debug!(fingerprint, error = %err, "dropping unparseable cache entry");
                self.store.remove(fingerprint);
                return None;
            }
        };

        if entry.timestamp == 0 {
            debug!(fingerprint, "dropping cache entry without timestamp");
            self.store.remove(fingerprint);
            return None;
        }

        let age_ms = self.clock.epoch_millis().saturating_sub(entry.timestamp);
        if age_ms > self.config.freshness.as_millis() as u64 {
            debug!(fingerprint, age_ms, "cache entry expired");
            self.store.remove(fingerprint);
            return None;
        }

        debug!(fingerprint, age_ms, count = entry.events.len(), "event cache hit");
        Some(CachedEvents { events: entry.events, signature: entry.signature })
    }

    /// Write a batch under its fingerprint, computing the signature when the
    /// caller has not already done so. Serialization and storage failures
    /// are swallowed. Every write is followed by the eviction scan.
    pub fn put(&self, fingerprint: &str, events: &[CalendarEvent], sig: Option<String>) {
        let entry = CacheEntry {
            events: events.to_vec(),
            signature: sig.unwrap_or_else(|| signature(events)),
            timestamp: self.clock.epoch_millis(),
        };

        match serde_json::to_string(&entry) {
            Ok(raw) => {
                if let Err(err) = self.store.put(fingerprint, &raw) {
                    debug!(fingerprint, error = %err, "event cache write dropped");
                }
            }
            Err(err) => {
                debug!(fingerprint, error = %err, "event cache entry not serializable; dropped");
            }
        }

        self.evict_oldest(fingerprint);
    }

    /// Refresh only the timestamp of an existing entry, used when background
    /// revalidation confirms the stored batch is still current. Keeps the
    /// entry fresh without triggering a re-render.
    pub fn touch(&self, fingerprint: &str) {
        let Some(raw) = self.store.get(fingerprint) else {
            return;
        };
        let Ok(mut entry) = serde_json::from_str::<CacheEntry>(&raw) else {
            debug!(fingerprint, "touch skipped: stored entry unparseable");
            return;
        };

        entry.timestamp = self.clock.epoch_millis();
        match serde_json::to_string(&entry) {
            Ok(raw) => {
                if let Err(err) = self.store.put(fingerprint, &raw) {
                    debug!(fingerprint, error = %err, "event cache touch dropped");
                }
            }
            Err(err) => debug!(fingerprint, error = %err, "event cache touch not serializable"),
        }
    }

    /// Delete every entry under the cache prefix. Called after any job or
    /// reminder mutation so subsequent fetches bypass stale data.
    pub fn invalidate_all(&self) {
        let keys = self.store.keys_with_prefix(EVENTS_CACHE_PREFIX);
        let count = keys.len();
        for key in keys {
            self.store.remove(&key);
        }
        info!(count, "event cache invalidated");
    }

    /// Keep the entry just written plus the `max_entries - 1` most recent
    /// others; delete the rest. Entries whose timestamp cannot be read sort
    /// oldest.
    fn evict_oldest(&self, just_written: &str) {
        let mut aged: Vec<(String, u64)> = self
            .store
            .keys_with_prefix(EVENTS_CACHE_PREFIX)
            .into_iter()
            .filter(|key| key != just_written)
            .map(|key| {
                let timestamp = self
                    .store
                    .get(&key)
                    .and_then(|raw| serde_json::from_str::<CacheEntry>(&raw).ok())
                    .map(|entry| entry.timestamp)
                    .unwrap_or(0);
                (key, timestamp)
            })
            .collect();

        aged.sort_by(|a, b| b.1.cmp(&a.1));

        for (key, _) in aged.into_iter().skip(self.config.max_entries.saturating_sub(1)) {
            debug!(key, "evicting oldest event cache entry");
            self.store.remove(&key);
        }
    }
}
