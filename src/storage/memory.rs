//! In-memory store with an optional byte budget.

use std::collections::HashMap;
use std::sync::Mutex;

use super::{KeyValueStore, StorageError};

/// `HashMap`-backed store, optionally capped at a total byte budget.
///
/// The budget counts key and value lengths of every resident entry, so a
/// capped store fails writes with [`StorageError::QuotaExceeded`] the way a
/// full `localStorage` does. Overwrites are charged the delta, not the sum.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    capacity_bytes: Option<usize>,
}

impl MemoryStore {
    /// Unbounded store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that rejects writes once resident key+value bytes would exceed
    /// `capacity_bytes`.
    pub fn with_capacity_bytes(capacity_bytes: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity_bytes: Some(capacity_bytes),
        }
    }

    fn resident_bytes(entries: &HashMap<String, String>) -> usize {
        entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().expect("memory store poisoned");
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().expect("memory store poisoned");
        if let Some(capacity) = self.capacity_bytes {
            let displaced = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let after = Self::resident_bytes(&entries) - displaced + key.len() + value.len();
            if after > capacity {
                return Err(StorageError::QuotaExceeded);
            }
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().expect("memory store poisoned");
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let entries = self.entries.lock().expect("memory store poisoned");
        Ok(entries.keys().cloned().collect())
    }
}
