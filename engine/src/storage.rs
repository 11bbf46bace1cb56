use crate::error::StorageError;
use crate::types::{HistoryEntry, HistoryMap};
use std::cell::RefCell;
use std::rc::Rc;

/// Persistence adapter for the selection history. Failures come back to the
/// caller, which logs them and keeps the in-memory history.
pub trait HistoryStorage {
    fn load(&self) -> Result<HistoryMap, StorageError>;
    fn save(&self, entries: &HistoryMap) -> Result<(), StorageError>;
}

/// Serialize history as a JSON array ordered by result id
pub fn encode_history(entries: &HistoryMap) -> Result<String, StorageError> {
    let mut list: Vec<&HistoryEntry> = entries.values().collect();
    list.sort_by(|a, b| a.result_id.cmp(&b.result_id));
    Ok(serde_json::to_string(&list)?)
}

pub fn decode_history(json: &str) -> Result<HistoryMap, StorageError> {
    let list: Vec<HistoryEntry> = serde_json::from_str(json)?;
    Ok(list
        .into_iter()
        .map(|entry| (entry.result_id.clone(), entry))
        .collect())
}

/// In-process storage. Clones share the same map, so a test can keep a
/// handle and inspect what the store saved.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    inner: Rc<RefCell<HistoryMap>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }

    pub fn with_entries(entries: HistoryMap) -> Self {
        MemoryStorage {
            inner: Rc::new(RefCell::new(entries)),
        }
    }

    pub fn snapshot(&self) -> HistoryMap {
        self.inner.borrow().clone()
    }
}

impl HistoryStorage for MemoryStorage {
    fn load(&self) -> Result<HistoryMap, StorageError> {
        Ok(self.snapshot())
    }

    fn save(&self, entries: &HistoryMap) -> Result<(), StorageError> {
        *self.inner.borrow_mut() = entries.clone();
        Ok(())
    }
}

/// Browser `localStorage`, one JSON document under a fixed key
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone)]
pub struct LocalStorage {
    key: String,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new(key: impl Into<String>) -> Self {
        LocalStorage { key: key.into() }
    }

    fn storage(&self) -> Result<web_sys::Storage, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable(String::from("no window")))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))?
            .ok_or_else(|| StorageError::Unavailable(String::from("localStorage is disabled")))
    }
}

#[cfg(target_arch = "wasm32")]
impl HistoryStorage for LocalStorage {
    fn load(&self) -> Result<HistoryMap, StorageError> {
        let stored = self
            .storage()?
            .get_item(&self.key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))?;
        match stored {
            Some(json) => decode_history(&json),
            None => Ok(HistoryMap::new()),
        }
    }

    fn save(&self, entries: &HistoryMap) -> Result<(), StorageError> {
        let json = encode_history(entries)?;
        self.storage()?
            .set_item(&self.key, &json)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }
}
