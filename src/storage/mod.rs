//! Persistent key-value storage seam.
//!
//! The cache persists through a synchronous, string-keyed storage medium —
//! the shape of browser `localStorage`. Hosts supply an implementation; two
//! are provided:
//!
//! - [`MemoryStore`] — `HashMap`-backed, with an optional byte budget that
//!   produces quota failures. The default store and the test double.
//! - [`FileStore`] — one file per key under a directory, for long-lived
//!   desktop hosts that want warm-up state to survive restarts.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Errors surfaced by a storage medium.
///
/// These never escape the cache layer's public API — the cache logs and
/// degrades instead — but `QuotaExceeded` must be distinguishable so the
/// evict-and-retry path can trigger.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The medium refused the write for capacity reasons.
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// The medium is not usable at all (e.g. private-browsing restrictions,
    /// unwritable directory).
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Any other read/write failure.
    #[error("storage I/O error: {0}")]
    Io(String),
}

/// Synchronous string-keyed storage, scoped-enumerable by key prefix.
///
/// Mirrors the `localStorage` contract: get/set/remove plus full key
/// enumeration. Implementations must be safe for concurrent use; writes are
/// last-write-wins with no transactional guarantees.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write (or overwrite) a value. Fails with
    /// [`StorageError::QuotaExceeded`] under capacity pressure.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Every key currently present, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}
