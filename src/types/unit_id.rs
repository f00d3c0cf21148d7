// ABOUTME: Validated identifier for a provisioning unit.
// ABOUTME: Unit IDs are lowercase kebab-case labels used as graph node names.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UnitIdError {
    #[error("unit id cannot be empty")]
    Empty,

    #[error("unit id exceeds maximum length of 63 characters")]
    TooLong,

    #[error("unit id cannot start with a hyphen")]
    StartsWithHyphen,

    #[error("unit id cannot end with a hyphen")]
    EndsWithHyphen,

    #[error("unit id must be lowercase")]
    NotLowercase,

    #[error("invalid character in unit id: '{0}'")]
    InvalidChar(char),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitId(String);

impl UnitId {
    pub const NETWORK: &'static str = "network";
    pub const SHARED_STORAGE: &'static str = "shared-storage";
    pub const CLUSTER: &'static str = "cluster";
    pub const DATABASE: &'static str = "database";
    pub const MANAGED_DATABASE: &'static str = "managed-database";
    pub const CACHE: &'static str = "cache";
    pub const APPLICATION: &'static str = "application";
    pub const BASTION: &'static str = "bastion";

    pub fn new(value: &str) -> Result<Self, UnitIdError> {
        if value.is_empty() {
            return Err(UnitIdError::Empty);
        }

        if value.len() > 63 {
            return Err(UnitIdError::TooLong);
        }

        if value.starts_with('-') {
            return Err(UnitIdError::StartsWithHyphen);
        }

        if value.ends_with('-') {
            return Err(UnitIdError::EndsWithHyphen);
        }

        for c in value.chars() {
            if c.is_ascii_uppercase() {
                return Err(UnitIdError::NotLowercase);
            }
            if !c.is_ascii_lowercase() && !c.is_ascii_digit() && c != '-' {
                return Err(UnitIdError::InvalidChar(c));
            }
        }

        Ok(Self(value.to_string()))
    }

    /// Build an ID from one of the associated constants.
    pub(crate) fn known(value: &'static str) -> Self {
        Self(value.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UnitId {
    type Err = UnitIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl serde::Serialize for UnitId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_constants_are_valid() {
        for id in [
            UnitId::NETWORK,
            UnitId::SHARED_STORAGE,
            UnitId::CLUSTER,
            UnitId::DATABASE,
            UnitId::MANAGED_DATABASE,
            UnitId::CACHE,
            UnitId::APPLICATION,
            UnitId::BASTION,
        ] {
            assert!(UnitId::new(id).is_ok(), "{id} should be a valid unit id");
        }
    }

    #[test]
    fn rejects_uppercase() {
        assert!(matches!(UnitId::new("Network"), Err(UnitIdError::NotLowercase)));
    }

    #[test]
    fn rejects_separators() {
        assert!(matches!(
            UnitId::new("shared_storage"),
            Err(UnitIdError::InvalidChar('_'))
        ));
    }
}
