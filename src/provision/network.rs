// ABOUTME: Network operations trait for provisioning backends.
// ABOUTME: Create the private network and its security groups.

use async_trait::async_trait;

use super::{NetworkHandle, NetworkSpec, ProvisionError, SecurityGroupSpec};
use crate::types::SecurityGroupId;

/// Network operations: address space, subnets, security groups.
#[async_trait]
pub trait NetworkOps: Send + Sync {
    /// Create a network with public, private and isolated subnet tiers.
    async fn create_network(&self, spec: &NetworkSpec) -> Result<NetworkHandle, ProvisionError>;

    /// Create a security group with the given ingress rules.
    async fn create_security_group(
        &self,
        spec: &SecurityGroupSpec,
    ) -> Result<SecurityGroupId, ProvisionError>;
}
