//! Telemetry metric name constants.
//!
//! Centralised metric names for muninn operations. Consumers install their
//! own `metrics` recorder (e.g. prometheus, statsd); without a recorder
//! installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `muninn_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `strategy` — preload strategy: "html" or "iframe"
//! - `status` — settled outcome: "cached", "warmed", "already_cached",
//!   "fetch_failed", "frame_failed", "timed_out"

/// Total preload attempts settled, by strategy and outcome.
///
/// Labels: `strategy`, `status`.
pub const PRELOADS_TOTAL: &str = "muninn_preloads_total";

/// Duration of a single preload attempt in seconds.
///
/// Labels: `strategy`.
pub const PRELOAD_DURATION_SECONDS: &str = "muninn_preload_duration_seconds";

/// Total cache validity checks that found a live entry.
pub const CACHE_HITS_TOTAL: &str = "muninn_cache_hits_total";

/// Total cache validity checks that missed (absent, corrupt, or expired).
pub const CACHE_MISSES_TOTAL: &str = "muninn_cache_misses_total";

/// Total entries deleted by quota-pressure eviction sweeps.
pub const CACHE_EVICTIONS_TOTAL: &str = "muninn_cache_evictions_total";

/// Total cache writes dropped after the evict-and-retry path also failed.
pub const CACHE_DROPPED_WRITES_TOTAL: &str = "muninn_cache_dropped_writes_total";
