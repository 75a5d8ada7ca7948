//! File-backed store: one file per key under a directory.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use super::{KeyValueStore, StorageError};

/// Store that persists each key as a file in a single directory.
///
/// Keys are sanitised to a filesystem-safe alphabet (`[A-Za-z0-9._-]`,
/// everything else becomes `-`) before use, and [`keys()`](KeyValueStore::keys)
/// reports the sanitised names. Cache keys (`prefix + resource id`) already
/// fit this alphabet, so the mapping is a no-op in practice.
///
/// Filesystem-full conditions map to [`StorageError::QuotaExceeded`] so the
/// cache's evict-and-retry path works the same as against `localStorage`.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .map_err(|e| StorageError::Unavailable(format!("cannot create {dir:?}: {e}")))?;
        Ok(Self { dir })
    }

    /// Open a store under the platform cache directory (`<cache>/muninn`).
    pub fn default_location() -> Result<Self, StorageError> {
        let base = dirs::cache_dir()
            .ok_or_else(|| StorageError::Unavailable("no platform cache directory".to_string()))?;
        Self::new(base.join("muninn"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(sanitise_key(key))
    }
}

fn sanitise_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn map_io(err: std::io::Error) -> StorageError {
    match err.kind() {
        ErrorKind::StorageFull | ErrorKind::QuotaExceeded => StorageError::QuotaExceeded,
        _ => StorageError::Io(err.to_string()),
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(map_io(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::write(self.path_for(key), value).map_err(map_io)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(map_io(e)),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = fs::read_dir(&self.dir).map_err(map_io)?;
        let mut keys = Vec::new();
        for entry in entries {
            let entry = entry.map_err(map_io)?;
            if entry.path().is_file() {
                keys.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitise_passes_cache_keys_through() {
        assert_eq!(
            sanitise_key("page_cache_grafana-mysql-overview"),
            "page_cache_grafana-mysql-overview"
        );
    }

    #[test]
    fn sanitise_replaces_path_separators() {
        assert_eq!(sanitise_key("a/b\\c:d"), "a-b-c-d");
    }
}
