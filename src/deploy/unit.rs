// ABOUTME: The provisioning unit abstraction: declared inputs, outputs and a provision step.
// ABOUTME: Concrete units live in crate::units and implement ProvisioningUnit.

use std::fmt;

use async_trait::async_trait;

use super::context::ProvisionContext;
use super::error::UnitError;
use crate::facts::{Fact, FactValue};
use crate::types::UnitId;

/// When a declared input is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadMode {
    /// Read while resolving inputs; the value must already exist.
    Eager,
    /// Resolved at apply time; needs a direct edge to the producer.
    Deferred,
}

impl fmt::Display for ReadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadMode::Eager => write!(f, "eager"),
            ReadMode::Deferred => write!(f, "deferred"),
        }
    }
}

/// One declared input of a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FactRead {
    pub fact: Fact,
    pub mode: ReadMode,
}

impl FactRead {
    pub fn eager(fact: Fact) -> Self {
        Self {
            fact,
            mode: ReadMode::Eager,
        }
    }

    pub fn deferred(fact: Fact) -> Self {
        Self {
            fact,
            mode: ReadMode::Deferred,
        }
    }
}

/// Fact values produced by a unit's provision step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outputs {
    values: Vec<(Fact, FactValue)>,
}

impl Outputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar output, replacing an earlier value for the same fact.
    pub fn scalar(&mut self, fact: Fact, value: impl Into<String>) -> &mut Self {
        self.set(fact, FactValue::scalar(value))
    }

    pub fn list<I, S>(&mut self, fact: Fact, values: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(fact, FactValue::list(values))
    }

    pub fn set(&mut self, fact: Fact, value: FactValue) -> &mut Self {
        match self.values.iter_mut().find(|(f, _)| *f == fact) {
            Some(slot) => slot.1 = value,
            None => self.values.push((fact, value)),
        }
        self
    }

    pub fn get(&self, fact: Fact) -> Option<&FactValue> {
        self.values
            .iter()
            .find(|(f, _)| *f == fact)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Fact, FactValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A named group of resources deployed as one step.
///
/// A unit only ever talks to other units through the fact store: it declares
/// which facts it reads and which it publishes, and the graph builder checks
/// those declarations against the dependency edges before anything runs.
#[async_trait]
pub trait ProvisioningUnit: Send + Sync {
    fn id(&self) -> &UnitId;

    /// Short label used in deployable names, e.g. `Network`.
    fn label(&self) -> &str;

    fn inputs(&self) -> Vec<FactRead>;

    fn outputs(&self) -> Vec<Fact>;

    /// Create the unit's resources and return the values of its outputs.
    async fn provision(&self, ctx: &ProvisionContext<'_>) -> Result<Outputs, UnitError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outputs_replace_by_fact() {
        let mut out = Outputs::new();
        out.scalar(Fact::RedisPort, "6379")
            .scalar(Fact::RedisPort, "6380");
        assert_eq!(out.len(), 1);
        assert_eq!(out.get(Fact::RedisPort), Some(&FactValue::scalar("6380")));
    }
}
