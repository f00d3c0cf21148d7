// ABOUTME: Shared storage operations trait for provisioning backends.
// ABOUTME: Create network file systems and per-consumer access points.

use async_trait::async_trait;

use super::{AccessPointSpec, FileSystemSpec, ProvisionError};
use crate::types::{AccessPointId, FileSystemId};

#[async_trait]
pub trait StorageOps: Send + Sync {
    async fn create_file_system(&self, spec: &FileSystemSpec)
    -> Result<FileSystemId, ProvisionError>;

    /// Create an access point rooted at `spec.path` with fixed ownership.
    async fn create_access_point(
        &self,
        spec: &AccessPointSpec,
    ) -> Result<AccessPointId, ProvisionError>;
}
