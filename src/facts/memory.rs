// ABOUTME: Process-local fact store backed by a mutex-guarded map.
// ABOUTME: Used by tests and by runs that do not need persistence.

use std::collections::BTreeMap;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{FactRecord, FactStore, FactValue, StoreError};
use crate::namespace::FactKey;

/// In-memory fact store. Cloning is not supported; share it behind an `Arc`.
#[derive(Debug, Default)]
pub struct MemoryFactStore {
    records: Mutex<BTreeMap<FactKey, FactRecord>>,
}

impl MemoryFactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of facts held.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Snapshot of the value under `key`, without going through the async API.
    pub fn value(&self, key: &FactKey) -> Option<FactValue> {
        self.records.lock().get(key).map(|r| r.value.clone())
    }
}

#[async_trait]
impl FactStore for MemoryFactStore {
    async fn put(
        &self,
        key: &FactKey,
        value: FactValue,
    ) -> Result<Option<FactRecord>, StoreError> {
        let record = FactRecord::new(key.clone(), value);
        Ok(self.records.lock().insert(key.clone(), record))
    }

    async fn get(&self, key: &FactKey) -> Result<Option<FactRecord>, StoreError> {
        Ok(self.records.lock().get(key).cloned())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<FactRecord>, StoreError> {
        Ok(self
            .records
            .lock()
            .values()
            .filter(|r| r.key.starts_with(prefix))
            .cloned()
            .collect())
    }
}
