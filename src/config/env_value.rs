// ABOUTME: Config values that are either literals or references to environment variables.
// ABOUTME: Used for the selected environment and for extra application container variables.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env::{self, VarError};

/// A config string taken verbatim or read from the operator's shell.
///
/// ```yaml
/// environment: { env: DEPLOY_ENV, default: stg }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    pub fn literal(value: impl Into<String>) -> Self {
        EnvValue::Literal(value.into())
    }

    /// Value for this run. A variable set to the empty string counts as set.
    pub fn resolve(&self) -> Result<String> {
        let (var, default) = match self {
            EnvValue::Literal(value) => return Ok(value.clone()),
            EnvValue::FromEnv { var, default } => (var, default),
        };
        match env::var(var) {
            Ok(value) => Ok(value),
            Err(VarError::NotUnicode(_)) => Err(Error::InvalidConfig(format!(
                "environment variable {var} is not valid UTF-8"
            ))),
            Err(VarError::NotPresent) => {
                tracing::debug!("{var} is unset, falling back to the default");
                default.clone().ok_or_else(|| Error::MissingEnvVar(var.clone()))
            }
        }
    }
}

/// Resolve every container variable; the first unset reference fails the lot.
pub fn resolve_env_map(map: &BTreeMap<String, EnvValue>) -> Result<BTreeMap<String, String>> {
    let mut resolved = BTreeMap::new();
    for (name, value) in map {
        resolved.insert(name.clone(), value.resolve()?);
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_ignores_shell() {
        assert_eq!(EnvValue::literal("prod").resolve().unwrap(), "prod");
    }

    #[test]
    fn parses_both_forms() {
        let literal: EnvValue = serde_yaml::from_str("stg").unwrap();
        assert_eq!(literal, EnvValue::literal("stg"));

        let reference: EnvValue = serde_yaml::from_str("{ env: DEPLOY_ENV }").unwrap();
        assert_eq!(
            reference,
            EnvValue::FromEnv {
                var: "DEPLOY_ENV".to_string(),
                default: None
            }
        );
    }
}
