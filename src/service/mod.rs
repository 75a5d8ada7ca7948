//! Preload orchestration.
//!
//! [`PreloadService`] drives best-effort population of the resource cache
//! for a declared descriptor list: full fan-out, settle-all aggregation,
//! in-flight deduplication per resource id, and a bounded race for frame
//! loads. Nothing here is fatal — the worst case for any one resource is a
//! log line, a failure record, and the batch carrying on.

mod builder;

pub use builder::{Muninn, MuninnBuilder};

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared, join_all};
use tracing::{debug, warn};

use crate::cache::ResourceCache;
use crate::config::PreloadConfig;
use crate::loader::{FrameHost, FrameSignal, PageFetcher, SandboxPolicy, origin_of};
use crate::telemetry;
use crate::types::{
    CachedContent, LoadState, PreloadOutcome, Priority, ResourceDescriptor, ResourceKind,
    SettledResult, StatusRecord, WarmupStatus, now_millis,
};

/// How long a hidden frame may take before the warm-up is abandoned.
pub const FRAME_LOAD_TIMEOUT: Duration = Duration::from_secs(20);

/// How long a successfully loaded frame stays attached, so the host's HTTP
/// cache can absorb the frame's subresources before removal.
pub const DETACH_GRACE: Duration = Duration::from_secs(2);

/// A preload operation shared between concurrent callers of the same id.
type SharedPreload = Shared<BoxFuture<'static, SettledResult>>;

struct ResourceStatus {
    state: LoadState,
    /// Present only while `state` is `Loading`.
    in_flight: Option<SharedPreload>,
}

/// Best-effort preload service over a [`ResourceCache`].
///
/// Cheap to clone (`Arc`-backed); one instance is built at the composition
/// root via [`Muninn::builder()`] and handed to consumers — e.g. a login
/// handler calling [`start_preloading()`](Self::start_preloading) and
/// page code calling [`cached_resource()`](Self::cached_resource).
#[derive(Clone)]
pub struct PreloadService {
    inner: Arc<ServiceInner>,
}

impl std::fmt::Debug for PreloadService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreloadService").finish_non_exhaustive()
    }
}

struct ServiceInner {
    cache: ResourceCache,
    fetcher: Arc<dyn PageFetcher>,
    frames: Arc<dyn FrameHost>,
    config: PreloadConfig,
    frame_timeout: Duration,
    detach_grace: Duration,
    status: Mutex<HashMap<String, ResourceStatus>>,
}

impl PreloadService {
    pub(crate) fn from_parts(
        cache: ResourceCache,
        fetcher: Arc<dyn PageFetcher>,
        frames: Arc<dyn FrameHost>,
        config: PreloadConfig,
        frame_timeout: Duration,
        detach_grace: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                cache,
                fetcher,
                frames,
                config,
                frame_timeout,
                detach_grace,
                status: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// The full descriptor list (base ∪ generated dashboards), optionally
    /// filtered by priority. Pure function of the configuration.
    pub fn resource_list(&self, filter: Option<Priority>) -> Vec<ResourceDescriptor> {
        self.inner.config.resource_list(filter)
    }

    /// Preload every descriptor matching `filter` (all when `None`).
    ///
    /// Dispatches the whole list without waiting for earlier entries
    /// (completion order is unordered; result order matches dispatch
    /// order), reuses operations already in flight for an id, and resolves
    /// once every dispatched operation has settled. Never fails: when the
    /// storage medium is unavailable the result is empty and no fetch or
    /// frame work is attempted.
    pub async fn start_preloading(&self, filter: Option<Priority>) -> Vec<SettledResult> {
        if !self.inner.cache.is_storage_available() {
            warn!("storage medium unavailable, skipping preload pass");
            return Vec::new();
        }

        let descriptors = self.resource_list(filter);
        debug!(
            resources = descriptors.len(),
            priority = filter.map(|p| p.as_str()).unwrap_or("all"),
            "starting preload pass"
        );

        let pending: Vec<SharedPreload> = descriptors
            .into_iter()
            .map(|descriptor| Arc::clone(&self.inner).dispatch(descriptor))
            .collect();

        join_all(pending).await
    }

    /// Whether a live (unexpired, parsable) cache entry exists for `id`.
    pub fn is_resource_cached(&self, id: &str) -> bool {
        self.inner.cache.is_valid(id)
    }

    /// The cached content for `id`, regardless of TTL freshness.
    pub fn cached_resource(&self, id: &str) -> Option<CachedContent> {
        self.inner.cache.get(id)
    }

    /// Clear one cached entry, or every entry when `id` is `None`.
    pub fn clear_cache(&self, id: Option<&str>) {
        match id {
            Some(id) => self.inner.cache.remove(id),
            None => self.inner.cache.clear(),
        }
    }

    /// This session's load state for `id`; `None` means not yet attempted.
    pub fn load_state(&self, id: &str) -> Option<LoadState> {
        let status = self.inner.status.lock().expect("status map poisoned");
        status.get(id).map(|s| s.state.clone())
    }

    /// The underlying cache.
    pub fn cache(&self) -> &ResourceCache {
        &self.inner.cache
    }
}

impl ServiceInner {
    /// Return the in-flight operation for `descriptor.id`, or start one.
    fn dispatch(self: Arc<Self>, descriptor: ResourceDescriptor) -> SharedPreload {
        let mut status = self.status.lock().expect("status map poisoned");

        if let Some(existing) = status.get(&descriptor.id)
            && existing.state == LoadState::Loading
            && let Some(in_flight) = &existing.in_flight
        {
            debug!(id = %descriptor.id, "preload already in flight, reusing");
            return in_flight.clone();
        }

        let id = descriptor.id.clone();
        let inner = Arc::clone(&self);
        let operation = async move {
            let strategy = descriptor.kind.as_str();
            let started = Instant::now();
            let outcome = inner.preload_one(&descriptor).await;

            metrics::counter!(
                telemetry::PRELOADS_TOTAL,
                "strategy" => strategy,
                "status" => outcome.as_str()
            )
            .increment(1);
            metrics::histogram!(telemetry::PRELOAD_DURATION_SECONDS, "strategy" => strategy)
                .record(started.elapsed().as_secs_f64());

            inner.settle(&descriptor.id, &outcome);
            SettledResult {
                id: descriptor.id,
                outcome,
            }
        }
        .boxed()
        .shared();

        status.insert(
            id,
            ResourceStatus {
                state: LoadState::Loading,
                in_flight: Some(operation.clone()),
            },
        );
        operation
    }

    /// Record the terminal state for `id` and drop the in-flight handle.
    fn settle(&self, id: &str, outcome: &PreloadOutcome) {
        let state = match outcome {
            o if o.is_failure() => {
                warn!(id, outcome = o.as_str(), "resource preload failed");
                LoadState::Failed {
                    at: now_millis(),
                    error: failure_text(o),
                }
            }
            o => {
                debug!(id, outcome = o.as_str(), "resource preload settled");
                LoadState::Loaded { at: now_millis() }
            }
        };
        let mut status = self.status.lock().expect("status map poisoned");
        status.insert(
            id.to_string(),
            ResourceStatus {
                state,
                in_flight: None,
            },
        );
    }

    /// Preload a single resource, mapping every internal failure to a
    /// settled outcome.
    async fn preload_one(&self, descriptor: &ResourceDescriptor) -> PreloadOutcome {
        if self.cache.is_valid(&descriptor.id) {
            debug!(id = %descriptor.id, "resource already cached");
            return PreloadOutcome::AlreadyCached;
        }

        match descriptor.kind {
            ResourceKind::Html => self.preload_html(descriptor).await,
            ResourceKind::Iframe => self.preload_frame(descriptor).await,
        }
    }

    /// HTML strategy: fetch and cache the body verbatim.
    ///
    /// A failed fetch degrades gracefully — logged, no cache entry, settled
    /// as `FetchFailed` without aborting siblings.
    async fn preload_html(&self, descriptor: &ResourceDescriptor) -> PreloadOutcome {
        match self.fetcher.fetch(&descriptor.url).await {
            Ok(body) => {
                self.cache.put(&descriptor.id, CachedContent::Html(body));
                PreloadOutcome::Cached
            }
            Err(e) => {
                warn!(id = %descriptor.id, url = %descriptor.url, error = %e, "html preload failed");
                PreloadOutcome::FetchFailed {
                    error: e.to_string(),
                }
            }
        }
    }

    /// Iframe strategy: race the hidden frame's first signal against the
    /// frame-load timeout. First settler wins, exactly once; whichever
    /// branch loses is never observed again because the frame is detached
    /// (handlers removed) before this function returns.
    async fn preload_frame(&self, descriptor: &ResourceDescriptor) -> PreloadOutcome {
        match origin_of(&descriptor.url) {
            Ok(origin) => self.frames.hint_origin(&origin),
            Err(_) => debug!(url = %descriptor.url, "no origin to hint"),
        }

        let mut frame = match self
            .frames
            .open(&descriptor.url, &SandboxPolicy::default())
            .await
        {
            Ok(frame) => frame,
            Err(e) => {
                // The frame never attached; nothing to cache or clean up.
                warn!(id = %descriptor.id, error = %e, "frame host refused to open");
                return PreloadOutcome::FrameFailed {
                    error: e.to_string(),
                };
            }
        };

        match tokio::time::timeout(self.frame_timeout, frame.wait()).await {
            Ok(FrameSignal::Loaded) => {
                self.cache.put(
                    &descriptor.id,
                    CachedContent::Status(StatusRecord::new(
                        WarmupStatus::Preloaded,
                        descriptor.url.as_str(),
                    )),
                );
                let grace = self.detach_grace;
                tokio::spawn(async move {
                    tokio::time::sleep(grace).await;
                    frame.detach();
                });
                PreloadOutcome::Warmed
            }
            Ok(FrameSignal::Failed(error)) => {
                warn!(id = %descriptor.id, error = %error, "frame load failed");
                self.cache.put(
                    &descriptor.id,
                    CachedContent::Status(StatusRecord::new(
                        WarmupStatus::Failed,
                        descriptor.url.as_str(),
                    )),
                );
                frame.detach();
                PreloadOutcome::FrameFailed { error }
            }
            Err(_) => {
                warn!(id = %descriptor.id, timeout = ?self.frame_timeout, "frame load timed out");
                self.cache.put(
                    &descriptor.id,
                    CachedContent::Status(StatusRecord::new(
                        WarmupStatus::TimedOut,
                        descriptor.url.as_str(),
                    )),
                );
                frame.detach();
                PreloadOutcome::TimedOut
            }
        }
    }
}

fn failure_text(outcome: &PreloadOutcome) -> String {
    match outcome {
        PreloadOutcome::FetchFailed { error } | PreloadOutcome::FrameFailed { error } => {
            error.clone()
        }
        PreloadOutcome::TimedOut => "frame load timed out".to_string(),
        _ => String::new(),
    }
}
