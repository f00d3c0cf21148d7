// ABOUTME: Cluster operations trait for provisioning backends.
// ABOUTME: Create the container cluster and its private discovery namespace.

use async_trait::async_trait;

use super::{ClusterSpec, NamespaceHandle, NamespaceSpec, ProvisionError};
use crate::types::ClusterId;

#[async_trait]
pub trait ClusterOps: Send + Sync {
    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<ClusterId, ProvisionError>;

    /// Create a private DNS namespace workloads can register in.
    async fn create_namespace(&self, spec: &NamespaceSpec)
    -> Result<NamespaceHandle, ProvisionError>;
}
