// ABOUTME: Fact store adapter: publish, eager resolution and deferred tokens.
// ABOUTME: Enforces existence and shape rules on top of a raw store backend.

use std::fmt;

use super::{FactShape, FactStore, FactValue, StoreError};
use crate::namespace::FactKey;

/// Errors raised while reading or writing facts.
#[derive(Debug, thiserror::Error)]
pub enum FactError {
    #[error("fact not found: {key}")]
    NotFound { key: FactKey },

    #[error("fact {key} is a {found}, expected a {expected}")]
    TypeMismatch {
        key: FactKey,
        expected: FactShape,
        found: FactShape,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a publish did to the stored value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    Created,
    Unchanged,
    Replaced { previous: FactValue },
}

/// Upsert `value` under `key`.
///
/// Republishing a different value is allowed (last write wins) but the shape
/// of an existing fact may not change.
pub async fn publish(
    store: &dyn FactStore,
    key: &FactKey,
    value: FactValue,
) -> Result<PublishOutcome, FactError> {
    if let Some(existing) = store.get(key).await? {
        if existing.value.shape() != value.shape() {
            return Err(FactError::TypeMismatch {
                key: key.clone(),
                expected: existing.value.shape(),
                found: value.shape(),
            });
        }
        if existing.value == value {
            tracing::debug!("fact {} unchanged", key);
            return Ok(PublishOutcome::Unchanged);
        }
    }

    tracing::debug!("publishing {} = {}", key, value);
    let previous = store.put(key, value).await?;
    Ok(match previous {
        Some(record) => PublishOutcome::Replaced {
            previous: record.value,
        },
        None => PublishOutcome::Created,
    })
}

/// Read a fact that must already exist.
pub async fn resolve_eager(
    store: &dyn FactStore,
    key: &FactKey,
    shape: FactShape,
) -> Result<FactValue, FactError> {
    tracing::debug!("resolving {} eagerly", key);
    let record = store.get(key).await?.ok_or_else(|| FactError::NotFound {
        key: key.clone(),
    })?;
    check_shape(key, &record.value, shape)?;
    Ok(record.value)
}

/// Placeholder for a fact that is only read when the unit is applied.
pub fn resolve_deferred(key: &FactKey, shape: FactShape) -> DeferredFact {
    DeferredFact {
        key: key.clone(),
        shape,
    }
}

/// Token standing in for a fact value until apply time.
///
/// Only valid when the reading unit has a direct dependency edge on the
/// fact's producer; graph construction rejects it otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredFact {
    key: FactKey,
    shape: FactShape,
}

impl DeferredFact {
    pub fn key(&self) -> &FactKey {
        &self.key
    }

    pub fn shape(&self) -> FactShape {
        self.shape
    }

    /// Resolve the token against the store.
    pub async fn resolve(&self, store: &dyn FactStore) -> Result<FactValue, FactError> {
        resolve_eager(store, &self.key, self.shape).await
    }
}

impl fmt::Display for DeferredFact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{{resolve:{}}}}}", self.key)
    }
}

fn check_shape(key: &FactKey, value: &FactValue, expected: FactShape) -> Result<(), FactError> {
    if value.shape() == expected {
        Ok(())
    } else {
        Err(FactError::TypeMismatch {
            key: key.clone(),
            expected,
            found: value.shape(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::MemoryFactStore;
    use crate::namespace::build_key;

    #[tokio::test]
    async fn publish_reports_outcome() {
        let store = MemoryFactStore::new();
        let key = build_key("n8n", "stg", "Redis", "Port");

        assert_eq!(
            publish(&store, &key, FactValue::scalar("6379")).await.unwrap(),
            PublishOutcome::Created
        );
        assert_eq!(
            publish(&store, &key, FactValue::scalar("6379")).await.unwrap(),
            PublishOutcome::Unchanged
        );
        assert_eq!(
            publish(&store, &key, FactValue::scalar("6380")).await.unwrap(),
            PublishOutcome::Replaced {
                previous: FactValue::scalar("6379")
            }
        );
    }

    #[tokio::test]
    async fn publish_refuses_shape_change() {
        let store = MemoryFactStore::new();
        let key = build_key("n8n", "stg", "Vpc", "SubnetsId");
        publish(&store, &key, FactValue::list(["subnet-1"])).await.unwrap();

        let err = publish(&store, &key, FactValue::scalar("subnet-1"))
            .await
            .unwrap_err();
        assert!(matches!(err, FactError::TypeMismatch { .. }));
        assert_eq!(store.value(&key), Some(FactValue::list(["subnet-1"])));
    }

    #[tokio::test]
    async fn eager_read_of_missing_key_fails() {
        let store = MemoryFactStore::new();
        let key = build_key("n8n", "stg", "Ecs", "ClusterName");
        let err = resolve_eager(&store, &key, FactShape::Scalar)
            .await
            .unwrap_err();
        assert!(matches!(err, FactError::NotFound { .. }));
    }

    #[tokio::test]
    async fn reading_scalar_as_list_fails() {
        let store = MemoryFactStore::new();
        let key = build_key("n8n", "stg", "Vpc", "Id");
        publish(&store, &key, FactValue::scalar("vpc-1")).await.unwrap();

        let err = resolve_eager(&store, &key, FactShape::List).await.unwrap_err();
        assert!(matches!(
            err,
            FactError::TypeMismatch {
                expected: FactShape::List,
                found: FactShape::Scalar,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn deferred_token_resolves_later() {
        let store = MemoryFactStore::new();
        let key = build_key("n8n", "stg", "Vpc", "Id");
        let token = resolve_deferred(&key, FactShape::Scalar);
        assert_eq!(token.to_string(), "{{resolve:/n8n/stg/Vpc/Id}}");

        publish(&store, &key, FactValue::scalar("vpc-9")).await.unwrap();
        assert_eq!(
            token.resolve(&store).await.unwrap(),
            FactValue::scalar("vpc-9")
        );
    }
}
