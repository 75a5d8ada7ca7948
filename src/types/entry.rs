//! Persisted cache entry envelope and payload union.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Current time as epoch milliseconds.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Terminal outcome recorded for a hidden-frame warm-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupStatus {
    /// The frame's load signal fired; the host HTTP cache is warm.
    Preloaded,
    /// The frame's error signal fired.
    Failed,
    /// Neither signal fired within the frame-load timeout.
    TimedOut,
}

/// Status record cached for iframe resources.
///
/// Only a marker is persisted for frame warm-ups — the actual payload lives
/// in the host environment's own HTTP cache. Failure and timeout records are
/// cached too, so a known-bad dashboard is not re-attempted within the TTL
/// window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub status: WarmupStatus,
    pub timestamp: u64,
    pub url: String,
}

impl StatusRecord {
    /// Build a record for `status` stamped with the current time.
    pub fn new(status: WarmupStatus, url: impl Into<String>) -> Self {
        Self {
            status,
            timestamp: now_millis(),
            url: url.into(),
        }
    }
}

/// Payload stored in a cache entry.
///
/// A tagged union rather than an untyped blob: HTML strategy caches the raw
/// response body, iframe strategy caches a [`StatusRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CachedContent {
    Html(String),
    Status(StatusRecord),
}

impl CachedContent {
    /// The raw HTML body, if this is an HTML payload.
    pub fn as_html(&self) -> Option<&str> {
        match self {
            CachedContent::Html(body) => Some(body),
            CachedContent::Status(_) => None,
        }
    }

    /// The warm-up status record, if this is a status payload.
    pub fn as_status(&self) -> Option<&StatusRecord> {
        match self {
            CachedContent::Status(record) => Some(record),
            CachedContent::Html(_) => None,
        }
    }
}

/// JSON envelope written to the storage medium: payload plus creation time.
///
/// `timestamp` is set once at creation and never updated; re-preloading a
/// resource overwrites the whole entry. An entry is *valid* while
/// `now - timestamp` is below the cache TTL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub content: CachedContent,
    pub timestamp: u64,
}

impl CacheEntry {
    /// Wrap `content` in an envelope stamped with the current time.
    pub fn new(content: CachedContent) -> Self {
        Self {
            content,
            timestamp: now_millis(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_entry_round_trips() {
        let entry = CacheEntry::new(CachedContent::Html("<html></html>".into()));
        let json = serde_json::to_string(&entry).unwrap();
        let back: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
        assert_eq!(back.content.as_html(), Some("<html></html>"));
    }

    #[test]
    fn status_entry_round_trips() {
        let record = StatusRecord::new(WarmupStatus::TimedOut, "http://grafana:3000/d/mysql");
        let entry = CacheEntry::new(CachedContent::Status(record.clone()));
        let json = serde_json::to_string(&entry).unwrap();
        let back: CacheEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.content.as_status(), Some(&record));
    }

    #[test]
    fn payload_kinds_are_tagged() {
        let entry = CacheEntry::new(CachedContent::Html("x".into()));
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""kind":"html""#));

        let entry = CacheEntry::new(CachedContent::Status(StatusRecord::new(
            WarmupStatus::Preloaded,
            "http://x/",
        )));
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains(r#""kind":"status""#));
        assert!(json.contains(r#""status":"preloaded""#));
    }
}
