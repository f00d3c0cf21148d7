// ABOUTME: Fact store capability trait and stored record type.
// ABOUTME: Backends implement plain get/put/list; shape rules live in the adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::FactValue;
use crate::namespace::FactKey;

/// A fact as held by a store backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactRecord {
    pub key: FactKey,
    pub value: FactValue,
    pub published_at: DateTime<Utc>,
}

impl FactRecord {
    pub fn new(key: FactKey, value: FactValue) -> Self {
        Self {
            key,
            value,
            published_at: Utc::now(),
        }
    }
}

/// Key-value service shared by every unit of a deployment run.
///
/// Backends are injected into the driver; no unit reaches a store through
/// global state.
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Upsert a value, returning the record it replaced.
    async fn put(&self, key: &FactKey, value: FactValue)
    -> Result<Option<FactRecord>, StoreError>;

    /// Fetch the record stored under `key`.
    async fn get(&self, key: &FactKey) -> Result<Option<FactRecord>, StoreError>;

    /// All records whose key starts with `prefix`, ordered by key.
    async fn list(&self, prefix: &str) -> Result<Vec<FactRecord>, StoreError>;
}

/// Errors from a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("fact store unavailable: {0}")]
    Unavailable(String),

    #[error("fact store document is corrupt: {0}")]
    Corrupt(String),
}
