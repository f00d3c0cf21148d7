// ABOUTME: Secret operations trait for provisioning backends.
// ABOUTME: Secrets are generated by the provider; callers only see references.

use async_trait::async_trait;

use super::{ProvisionError, SecretRef, SecretSpec};

#[async_trait]
pub trait SecretOps: Send + Sync {
    /// Create a secret filled according to `spec.template`.
    async fn generate_secret(&self, spec: &SecretSpec) -> Result<SecretRef, ProvisionError>;
}
