// ABOUTME: Error type shared by every provisioning capability.
// ABOUTME: Carries the resource kind so failures can be attributed.

use super::ResourceKind;

/// Errors returned by a provisioning backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProvisionError {
    #[error("provider rejected {resource}: {reason}")]
    Rejected {
        resource: ResourceKind,
        reason: String,
    },

    #[error("invalid {resource} request: {reason}")]
    InvalidRequest {
        resource: ResourceKind,
        reason: String,
    },
}

impl ProvisionError {
    pub fn resource(&self) -> ResourceKind {
        match self {
            ProvisionError::Rejected { resource, .. }
            | ProvisionError::InvalidRequest { resource, .. } => *resource,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            ProvisionError::Rejected { reason, .. }
            | ProvisionError::InvalidRequest { reason, .. } => reason,
        }
    }
}
