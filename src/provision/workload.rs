// ABOUTME: Workload operations trait for provisioning backends.
// ABOUTME: Run container services and expose them through a load balancer.

use async_trait::async_trait;

use super::{ListenerTarget, LoadBalancerHandle, LoadBalancerSpec, ProvisionError, WorkloadSpec};
use crate::types::WorkloadId;

/// Workload operations: services, load balancers, listener wiring.
#[async_trait]
pub trait WorkloadOps: Send + Sync {
    /// Create a long-running service on a cluster.
    async fn create_workload(&self, spec: &WorkloadSpec) -> Result<WorkloadId, ProvisionError>;

    /// Create a load balancer. The DNS name is known as soon as it exists.
    async fn create_load_balancer(
        &self,
        spec: &LoadBalancerSpec,
    ) -> Result<LoadBalancerHandle, ProvisionError>;

    /// Add a listener forwarding to a workload.
    async fn attach_target(&self, target: &ListenerTarget) -> Result<(), ProvisionError>;
}
