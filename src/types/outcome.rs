//! Settled preload outcomes and per-resource load state.

/// How a single preload attempt settled.
///
/// Every variant is a *settled* result — the orchestrator maps all internal
/// errors into one of these so a batch can always be aggregated without a
/// rejection path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreloadOutcome {
    /// A valid cache entry already existed; no network or frame work done.
    AlreadyCached,
    /// HTML body fetched and written to the cache.
    Cached,
    /// Hidden frame loaded; a `preloaded` status record was cached.
    Warmed,
    /// HTML fetch failed; logged, no cache entry written.
    FetchFailed { error: String },
    /// Frame error signal (or frame host refusal); a failure record was
    /// cached when the frame was actually opened.
    FrameFailed { error: String },
    /// Frame-load timeout elapsed first; a `timed_out` record was cached.
    TimedOut,
}

impl PreloadOutcome {
    /// Whether this outcome counts as a failure in the load-state map.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            PreloadOutcome::FetchFailed { .. }
                | PreloadOutcome::FrameFailed { .. }
                | PreloadOutcome::TimedOut
        )
    }

    /// Stable name used as the `status` metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            PreloadOutcome::AlreadyCached => "already_cached",
            PreloadOutcome::Cached => "cached",
            PreloadOutcome::Warmed => "warmed",
            PreloadOutcome::FetchFailed { .. } => "fetch_failed",
            PreloadOutcome::FrameFailed { .. } => "frame_failed",
            PreloadOutcome::TimedOut => "timed_out",
        }
    }
}

/// One entry in the batch result of
/// [`PreloadService::start_preloading()`](crate::PreloadService::start_preloading).
///
/// Order in the result vector matches dispatch order, not completion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledResult {
    pub id: String,
    pub outcome: PreloadOutcome,
}

/// In-memory load state for one resource id.
///
/// Owned by the orchestrator; not persisted. Absence means "not attempted
/// this session". A fresh `start_preloading` for a settled id begins a new
/// `Loading` phase, overwriting the prior terminal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Loaded {
        /// Epoch millis at settlement.
        at: u64,
    },
    Failed {
        at: u64,
        error: String,
    },
}
