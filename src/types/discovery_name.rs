// ABOUTME: Validated service discovery name for workloads inside the private namespace.
// ABOUTME: Names become DNS labels such as postgres.<namespace>.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryNameError {
    #[error("discovery name cannot be empty")]
    Empty,

    #[error("discovery name exceeds maximum length of 63 characters")]
    TooLong,

    #[error("invalid character in discovery name: '{0}'")]
    InvalidChar(char),
}

/// A single DNS label registered for a workload in the discovery namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveryName(String);

impl DiscoveryName {
    pub fn new(value: &str) -> Result<Self, DiscoveryNameError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(DiscoveryNameError::Empty);
        }

        if trimmed.len() > 63 {
            return Err(DiscoveryNameError::TooLong);
        }

        // DNS label: alphanumeric and hyphen only
        for c in trimmed.chars() {
            if !c.is_ascii_alphanumeric() && c != '-' {
                return Err(DiscoveryNameError::InvalidChar(c));
            }
        }

        Ok(Self(trimmed.to_ascii_lowercase()))
    }

    /// Build a name from a built-in lowercase label.
    pub(crate) fn known(value: &'static str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fully qualified host name inside the given namespace.
    pub fn host_in(&self, namespace_name: &str) -> String {
        format!("{}.{}", self.0, namespace_name)
    }
}

impl fmt::Display for DiscoveryName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
