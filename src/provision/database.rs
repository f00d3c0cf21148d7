// ABOUTME: Managed database operations trait for provisioning backends.
// ABOUTME: Create a provider-managed relational database instance.

use async_trait::async_trait;

use super::{ManagedDatabaseHandle, ManagedDatabaseSpec, ProvisionError};

#[async_trait]
pub trait DatabaseOps: Send + Sync {
    /// Create a database instance; credentials come from an existing secret.
    async fn create_managed_database(
        &self,
        spec: &ManagedDatabaseSpec,
    ) -> Result<ManagedDatabaseHandle, ProvisionError>;
}
