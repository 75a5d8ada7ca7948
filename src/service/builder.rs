//! Builder for configuring preload service instances.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::{DEFAULT_CACHE_PREFIX, DEFAULT_TTL, ResourceCache};
use crate::config::PreloadConfig;
use crate::loader::{DisabledFrameHost, FrameHost, HttpPageFetcher, PageFetcher};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::{MuninnError, Result};

use super::{DETACH_GRACE, FRAME_LOAD_TIMEOUT, PreloadService};

/// Main entry point for creating preload service instances.
pub struct Muninn;

impl Muninn {
    /// Create a new builder for configuring the service.
    pub fn builder() -> MuninnBuilder {
        MuninnBuilder::new()
    }
}

/// Builder for configuring preload service instances.
///
/// Defaults: in-memory storage, reqwest-backed page fetcher, no frame host
/// (iframe preloads settle as failures until one is wired), 24-hour TTL,
/// 20-second frame timeout, 2-second detach grace.
pub struct MuninnBuilder {
    storage: Option<Arc<dyn KeyValueStore>>,
    fetcher: Option<Arc<dyn PageFetcher>>,
    frames: Option<Arc<dyn FrameHost>>,
    config: PreloadConfig,
    cache_prefix: String,
    ttl: Duration,
    frame_timeout: Duration,
    detach_grace: Duration,
}

impl MuninnBuilder {
    pub fn new() -> Self {
        Self {
            storage: None,
            fetcher: None,
            frames: None,
            config: PreloadConfig::default(),
            cache_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            ttl: DEFAULT_TTL,
            frame_timeout: FRAME_LOAD_TIMEOUT,
            detach_grace: DETACH_GRACE,
        }
    }

    /// Set the persistent storage medium backing the cache.
    pub fn storage(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.storage = Some(store);
        self
    }

    /// Set the HTTP fetch capability for HTML resources.
    pub fn fetcher(mut self, fetcher: Arc<dyn PageFetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Set the hidden-frame loader for iframe resources.
    pub fn frames(mut self, frames: Arc<dyn FrameHost>) -> Self {
        self.frames = Some(frames);
        self
    }

    /// Set the resource configuration.
    pub fn config(mut self, config: PreloadConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the cache key prefix.
    pub fn cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    /// Set the cache entry time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the hidden-frame load timeout.
    pub fn frame_timeout(mut self, timeout: Duration) -> Self {
        self.frame_timeout = timeout;
        self
    }

    /// Set how long a loaded frame stays attached before detach.
    pub fn detach_grace(mut self, grace: Duration) -> Self {
        self.detach_grace = grace;
        self
    }

    /// Build the service.
    ///
    /// Fails when the configuration declares two descriptors with the same
    /// id (across the base and generated lists) — duplicates would silently
    /// overwrite each other's cache entries.
    pub fn build(self) -> Result<PreloadService> {
        if let Some(id) = self.config.duplicate_id() {
            return Err(MuninnError::Configuration(format!(
                "duplicate resource id in configuration: {id}"
            )));
        }

        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let fetcher = self
            .fetcher
            .unwrap_or_else(|| Arc::new(HttpPageFetcher::new()));
        let frames = self.frames.unwrap_or_else(|| Arc::new(DisabledFrameHost));

        let cache = ResourceCache::new(storage)
            .with_prefix(self.cache_prefix)
            .with_ttl(self.ttl);

        Ok(PreloadService::from_parts(
            cache,
            fetcher,
            frames,
            self.config,
            self.frame_timeout,
            self.detach_grace,
        ))
    }
}

impl Default for MuninnBuilder {
    fn default() -> Self {
        Self::new()
    }
}
