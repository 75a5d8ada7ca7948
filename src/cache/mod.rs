//! TTL-bounded resource cache over a prefix-scoped key-value medium.
//!
//! [`ResourceCache`] persists preloaded payloads as JSON
//! [`CacheEntry`](crate::types::CacheEntry) envelopes under `prefix + id`
//! keys. Validity is a fixed TTL from creation; expired entries read as
//! misses but stay on disk until an eviction sweep claims them.
//!
//! The cache is an optimisation, never a correctness dependency: `put`,
//! `get` and `is_valid` swallow every storage failure, logging and returning
//! a no-op / `None` / `false` instead. Quota pressure on write triggers one
//! oldest-half eviction sweep and exactly one retry; a write that still
//! fails is dropped.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::storage::{KeyValueStore, StorageError};
use crate::telemetry;
use crate::types::{CacheEntry, CachedContent, now_millis};

/// Default key prefix scoping this cache's entries in the shared medium.
pub const DEFAULT_CACHE_PREFIX: &str = "page_cache_";

/// Default entry time-to-live: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Key used by the availability probe; written and deleted immediately.
const PROBE_KEY: &str = "__muninn_probe__";

/// TTL-bounded cache for preloaded resources.
///
/// Cheap to clone is not a goal here — the orchestrator holds it behind an
/// `Arc`'d service. Multiple instances (or process restarts) may share one
/// medium; writes are last-write-wins and eviction sweeps only remove, never
/// corrupt, unrelated entries.
pub struct ResourceCache {
    store: Arc<dyn KeyValueStore>,
    prefix: String,
    ttl: Duration,
}

impl ResourceCache {
    /// Cache over `store` with the default prefix and 24-hour TTL.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            prefix: DEFAULT_CACHE_PREFIX.to_string(),
            ttl: DEFAULT_TTL,
        }
    }

    /// Set a custom key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Set a custom entry TTL.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    fn key_for(&self, id: &str) -> String {
        format!("{}{}", self.prefix, id)
    }

    /// Write `content` under `id`, stamped with the current time.
    ///
    /// Never fails: quota pressure triggers [`evict_oldest_half()`](Self::evict_oldest_half)
    /// and one retry; any remaining failure is logged and the write dropped.
    pub fn put(&self, id: &str, content: CachedContent) {
        let entry = CacheEntry::new(content);
        let serialised = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                error!(id, error = %e, "failed to serialise cache entry");
                return;
            }
        };

        let key = self.key_for(id);
        match self.store.set(&key, &serialised) {
            Ok(()) => debug!(id, "resource cached"),
            Err(StorageError::QuotaExceeded) => {
                warn!(id, "storage quota exceeded, evicting oldest entries");
                self.evict_oldest_half();
                match self.store.set(&key, &serialised) {
                    Ok(()) => debug!(id, "resource cached after eviction"),
                    Err(e) => {
                        error!(id, error = %e, "cache write dropped after eviction");
                        metrics::counter!(telemetry::CACHE_DROPPED_WRITES_TOTAL).increment(1);
                    }
                }
            }
            Err(e) => {
                error!(id, error = %e, "cache write dropped");
                metrics::counter!(telemetry::CACHE_DROPPED_WRITES_TOTAL).increment(1);
            }
        }
    }

    /// Whether a live entry exists for `id`.
    ///
    /// False when the entry is absent, unparsable, or older than the TTL.
    /// Corrupt entries are reported invalid but left in place; eviction
    /// sweeps delete them. A cached failure record counts as valid — a
    /// known-bad resource is not re-attempted within the TTL window.
    pub fn is_valid(&self, id: &str) -> bool {
        let valid = match self.read_entry(id) {
            Some(entry) => {
                let age = now_millis().saturating_sub(entry.timestamp);
                age < self.ttl.as_millis() as u64
            }
            None => false,
        };
        if valid {
            metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
        } else {
            metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
        }
        valid
    }

    /// The stored content for `id`, regardless of TTL validity.
    ///
    /// Callers that care about freshness check [`is_valid()`](Self::is_valid)
    /// first. `None` when absent or corrupt.
    pub fn get(&self, id: &str) -> Option<CachedContent> {
        self.read_entry(id).map(|entry| entry.content)
    }

    fn read_entry(&self, id: &str) -> Option<CacheEntry> {
        let raw = match self.store.get(&self.key_for(id)) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(id, error = %e, "cache read failed");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(id, error = %e, "corrupt cache entry");
                None
            }
        }
    }

    /// Delete the oldest half of the prefix-scoped population.
    ///
    /// Unparsable entries are deleted outright and not counted; the rest are
    /// sorted ascending by creation time and the oldest `floor(n/2)` removed.
    /// Count-based and age-ordered only — no pinning, no size weighting.
    pub fn evict_oldest_half(&self) {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                error!(error = %e, "eviction sweep could not enumerate keys");
                return;
            }
        };

        let mut population: Vec<(String, u64)> = Vec::new();
        for key in keys {
            if !key.starts_with(&self.prefix) {
                continue;
            }
            let raw = match self.store.get(&key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    warn!(key = %key, error = %e, "eviction sweep read failed");
                    continue;
                }
            };
            match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) => population.push((key, entry.timestamp)),
                Err(_) => {
                    // Unparsable entries are dead weight regardless of age.
                    debug!(key = %key, "deleting corrupt cache entry");
                    let _ = self.store.remove(&key);
                }
            }
        }

        population.sort_by_key(|(_, timestamp)| *timestamp);
        let to_delete = population.len() / 2;
        for (key, _) in population.into_iter().take(to_delete) {
            debug!(key = %key, "evicting old cache entry");
            if let Err(e) = self.store.remove(&key) {
                warn!(key = %key, error = %e, "eviction delete failed");
            }
        }
        if to_delete > 0 {
            metrics::counter!(telemetry::CACHE_EVICTIONS_TOTAL).increment(to_delete as u64);
        }
    }

    /// Delete the entry for `id`, if any.
    pub fn remove(&self, id: &str) {
        if let Err(e) = self.store.remove(&self.key_for(id)) {
            warn!(id, error = %e, "cache delete failed");
        } else {
            debug!(id, "cache entry cleared");
        }
    }

    /// Delete every entry under this cache's prefix.
    pub fn clear(&self) {
        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                error!(error = %e, "cache clear could not enumerate keys");
                return;
            }
        };
        for key in keys {
            if key.starts_with(&self.prefix) {
                if let Err(e) = self.store.remove(&key) {
                    warn!(key = %key, error = %e, "cache delete failed");
                }
            }
        }
        debug!("cache cleared");
    }

    /// Probe the medium with a throwaway write and delete.
    ///
    /// False means the medium cannot currently accept writes at all; the
    /// orchestrator short-circuits the whole preload pass in that case.
    pub fn is_storage_available(&self) -> bool {
        match self.store.set(PROBE_KEY, "probe") {
            Ok(()) => {
                let _ = self.store.remove(PROBE_KEY);
                true
            }
            Err(e) => {
                warn!(error = %e, "storage medium unavailable");
                false
            }
        }
    }
}
