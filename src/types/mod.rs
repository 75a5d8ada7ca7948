//! Core data types: resource descriptors, cache entries, preload outcomes.

mod descriptor;
mod entry;
mod outcome;

pub use descriptor::{Priority, ResourceDescriptor, ResourceKind};
pub use entry::{CacheEntry, CachedContent, StatusRecord, WarmupStatus, now_millis};
pub use outcome::{LoadState, PreloadOutcome, SettledResult};
