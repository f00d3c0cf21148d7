// ABOUTME: File-backed fact store persisting one JSON document per namespace.
// ABOUTME: Writes go to a temp file and are renamed into place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{FactRecord, FactStore, FactValue, StoreError};
use crate::namespace::{FactKey, Namespace};

/// Fact store persisted as a JSON map of key to record.
#[derive(Debug)]
pub struct FileFactStore {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    guard: Mutex<()>,
}

impl FileFactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            guard: Mutex::new(()),
        }
    }

    /// Store for `namespace` inside `dir`, e.g. `<dir>/n8n-stg.json`.
    pub fn for_namespace(dir: &Path, namespace: &Namespace) -> Self {
        Self::new(dir.join(format!("{}.json", namespace.prefix())))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<FactKey, FactRecord>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                StoreError::Corrupt(format!("{}: {}", self.path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(unavailable(&self.path, e)),
        }
    }

    async fn save(&self, records: &BTreeMap<FactKey, FactRecord>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| unavailable(parent, e))?;
        }

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| unavailable(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| unavailable(&self.path, e))
    }
}

fn unavailable(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Unavailable(format!("{}: {}", path.display(), err))
}

#[async_trait]
impl FactStore for FileFactStore {
    async fn put(
        &self,
        key: &FactKey,
        value: FactValue,
    ) -> Result<Option<FactRecord>, StoreError> {
        let _held = self.guard.lock().await;
        let mut records = self.load().await?;
        let previous = records.insert(key.clone(), FactRecord::new(key.clone(), value));
        self.save(&records).await?;
        Ok(previous)
    }

    async fn get(&self, key: &FactKey) -> Result<Option<FactRecord>, StoreError> {
        let _held = self.guard.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<FactRecord>, StoreError> {
        let _held = self.guard.lock().await;
        Ok(self
            .load()
            .await?
            .into_values()
            .filter(|r| r.key.starts_with(prefix))
            .collect())
    }
}
