// ABOUTME: Error types for unit lifecycles and deployment runs.
// ABOUTME: UnitError covers one unit; RunError attributes it to a unit and step with SNAFU.

use std::fmt;

use snafu::Snafu;

use crate::facts::{FactError, FactShape, StoreError};
use crate::namespace::FactKey;
use crate::provision::{ProvisionError, ResourceKind};
use crate::types::UnitId;

/// Errors that can occur while one unit moves through its lifecycle.
#[derive(Debug, thiserror::Error)]
pub enum UnitError {
    /// An eager read found no published value.
    #[error("fact not found: {key}")]
    FactNotFound { key: FactKey },

    #[error("fact {key} is a {found}, expected a {expected}")]
    TypeMismatch {
        key: FactKey,
        expected: FactShape,
        found: FactShape,
    },

    #[error("fact store unavailable: {0}")]
    StoreUnavailable(String),

    /// The provisioning API declined a resource request.
    #[error("provisioning rejected for {resource}: {reason}")]
    ProvisioningRejected {
        resource: ResourceKind,
        reason: String,
    },

    /// The unit read a fact it did not declare as an input.
    #[error("unit {unit} read undeclared fact {key}")]
    UndeclaredRead { unit: UnitId, key: FactKey },

    /// Provisioning returned outputs that differ from the declared set.
    #[error("unit {unit} broke its output contract: {reason}")]
    OutputContract { unit: UnitId, reason: String },
}

impl From<FactError> for UnitError {
    fn from(err: FactError) -> Self {
        match err {
            FactError::NotFound { key } => UnitError::FactNotFound { key },
            FactError::TypeMismatch {
                key,
                expected,
                found,
            } => UnitError::TypeMismatch {
                key,
                expected,
                found,
            },
            FactError::Store(StoreError::Unavailable(msg)) => UnitError::StoreUnavailable(msg),
            FactError::Store(StoreError::Corrupt(msg)) => {
                UnitError::StoreUnavailable(format!("corrupt store: {}", msg))
            }
        }
    }
}

impl From<ProvisionError> for UnitError {
    fn from(err: ProvisionError) -> Self {
        let reason = match &err {
            ProvisionError::Rejected { reason, .. } => reason.clone(),
            ProvisionError::InvalidRequest { reason, .. } => format!("invalid request: {}", reason),
        };
        UnitError::ProvisioningRejected {
            resource: err.resource(),
            reason,
        }
    }
}

/// Lifecycle step a unit was in when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitStep {
    ResolveInputs,
    Provision,
    Publish,
}

impl fmt::Display for UnitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitStep::ResolveInputs => write!(f, "input resolution"),
            UnitStep::Provision => write!(f, "provisioning"),
            UnitStep::Publish => write!(f, "output publishing"),
        }
    }
}

/// Error that halted a deployment run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum RunError {
    #[snafu(display("unit {unit} failed during {step}: {source}"))]
    UnitFailed {
        unit: UnitId,
        step: UnitStep,
        source: UnitError,
        /// Units that reached terminal success before the failure.
        completed: Vec<UnitId>,
    },

    #[snafu(display("unit {unit} is not part of the deployment graph"))]
    UnknownSelection { unit: UnitId },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunErrorKind {
    FactNotFound,
    TypeMismatch,
    StoreUnavailable,
    ProvisioningRejected,
    UndeclaredRead,
    OutputContract,
    UnknownSelection,
}

impl RunError {
    /// Returns the error kind for programmatic handling.
    pub fn kind(&self) -> RunErrorKind {
        match self {
            RunError::UnitFailed { source, .. } => match source {
                UnitError::FactNotFound { .. } => RunErrorKind::FactNotFound,
                UnitError::TypeMismatch { .. } => RunErrorKind::TypeMismatch,
                UnitError::StoreUnavailable(_) => RunErrorKind::StoreUnavailable,
                UnitError::ProvisioningRejected { .. } => RunErrorKind::ProvisioningRejected,
                UnitError::UndeclaredRead { .. } => RunErrorKind::UndeclaredRead,
                UnitError::OutputContract { .. } => RunErrorKind::OutputContract,
            },
            RunError::UnknownSelection { .. } => RunErrorKind::UnknownSelection,
        }
    }

    /// The unit the error is about.
    pub fn unit(&self) -> &UnitId {
        match self {
            RunError::UnitFailed { unit, .. } | RunError::UnknownSelection { unit } => unit,
        }
    }

    /// The failing step, if a unit was running.
    pub fn step(&self) -> Option<UnitStep> {
        match self {
            RunError::UnitFailed { step, .. } => Some(*step),
            RunError::UnknownSelection { .. } => None,
        }
    }

    /// Units that completed before the run halted.
    pub fn completed(&self) -> &[UnitId] {
        match self {
            RunError::UnitFailed { completed, .. } => completed,
            RunError::UnknownSelection { .. } => &[],
        }
    }
}
