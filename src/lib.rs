//! Muninn - best-effort page preload and cache warming
//!
//! This crate provides a library-style preload service for dashboard-heavy
//! applications: given a declarative list of resources (HTML pages and
//! embeddable third-party dashboards), it warms a TTL-bounded cache ahead
//! of user navigation so first paint comes from cache instead of the
//! network.
//!
//! Everything is best-effort by design: a failed preload costs a log line
//! and a failure record, never an error to the caller, and never aborts
//! sibling work.
//!
//! # Example
//!
//! ```rust,no_run
//! use muninn::{Muninn, PreloadConfig, Priority};
//!
//! #[tokio::main]
//! async fn main() -> muninn::Result<()> {
//!     let config = PreloadConfig::load("preload.toml")?;
//!     let service = Muninn::builder().config(config).build()?;
//!
//!     // e.g. fired from a successful-login handler:
//!     let results = service.start_preloading(Some(Priority::High)).await;
//!     for settled in &results {
//!         println!("{}: {:?}", settled.id, settled.outcome);
//!     }
//!
//!     if let Some(page) = service.cached_resource("server-monitoring") {
//!         // render from cache
//!         let _ = page.as_html();
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Host capabilities
//!
//! Persistence, HTTP fetch, and hidden-frame loading are consumed through
//! the [`storage::KeyValueStore`], [`loader::PageFetcher`] and
//! [`loader::FrameHost`] traits, so the service runs against browser-like
//! storage shims, files, or plain memory — and against mocks in tests.

pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod service;
pub mod storage;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use error::{MuninnError, Result};
pub use service::{Muninn, MuninnBuilder, PreloadService};

pub use cache::ResourceCache;
pub use config::{DashboardRef, GrafanaInstance, PreloadConfig};
pub use loader::{
    DisabledFrameHost, FrameHandle, FrameHost, FrameSignal, HttpPageFetcher, PageFetcher,
    SandboxPolicy,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

// Re-export all types
pub use types::{
    CacheEntry, CachedContent, LoadState, PreloadOutcome, Priority, ResourceDescriptor,
    ResourceKind, SettledResult, StatusRecord, WarmupStatus,
};
