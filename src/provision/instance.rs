// ABOUTME: Instance operations trait for provisioning backends.

use async_trait::async_trait;

use super::{InstanceSpec, ProvisionError};
use crate::types::InstanceId;

#[async_trait]
pub trait InstanceOps: Send + Sync {
    async fn create_instance(&self, spec: &InstanceSpec) -> Result<InstanceId, ProvisionError>;
}
