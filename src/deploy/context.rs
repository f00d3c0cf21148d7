// ABOUTME: Read access to resolved inputs and the provisioning API during a unit's provision step.
// ABOUTME: Refuses undeclared reads and resolves deferred tokens on first use.

use std::collections::HashMap;

use parking_lot::Mutex;

use super::error::UnitError;
use crate::diagnostics::Warning;
use crate::facts::{DeferredFact, Fact, FactShape, FactStore, FactValue};
use crate::namespace::Namespace;
use crate::provision::{FullProvisioner, ResourceKind, ResourceRecord};
use crate::types::UnitId;

/// An input after the resolve step: a value, or a token read at apply time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedInput {
    Value(FactValue),
    Deferred(DeferredFact),
}

/// Everything a unit may touch while provisioning.
pub struct ProvisionContext<'a> {
    unit: &'a UnitId,
    namespace: &'a Namespace,
    inputs: &'a HashMap<Fact, ResolvedInput>,
    store: &'a dyn FactStore,
    api: &'a dyn FullProvisioner,
    resources: Mutex<Vec<ResourceRecord>>,
    warnings: Mutex<Vec<Warning>>,
}

impl<'a> ProvisionContext<'a> {
    pub(crate) fn new(
        unit: &'a UnitId,
        namespace: &'a Namespace,
        inputs: &'a HashMap<Fact, ResolvedInput>,
        store: &'a dyn FactStore,
        api: &'a dyn FullProvisioner,
    ) -> Self {
        Self {
            unit,
            namespace,
            inputs,
            store,
            api,
            resources: Mutex::new(Vec::new()),
            warnings: Mutex::new(Vec::new()),
        }
    }

    pub fn namespace(&self) -> &Namespace {
        self.namespace
    }

    pub fn api(&self) -> &dyn FullProvisioner {
        self.api
    }

    /// Value of a declared input. Deferred inputs are read from the store now.
    pub async fn value(&self, fact: Fact) -> Result<FactValue, UnitError> {
        match self.inputs.get(&fact) {
            Some(ResolvedInput::Value(value)) => Ok(value.clone()),
            Some(ResolvedInput::Deferred(token)) => {
                tracing::debug!("{} resolving {} at apply time", self.unit, token);
                Ok(token.resolve(self.store).await?)
            }
            None => Err(UnitError::UndeclaredRead {
                unit: self.unit.clone(),
                key: fact.key(self.namespace),
            }),
        }
    }

    pub async fn scalar(&self, fact: Fact) -> Result<String, UnitError> {
        match self.value(fact).await? {
            FactValue::Scalar(value) => Ok(value),
            other => Err(self.mismatch(fact, FactShape::Scalar, &other)),
        }
    }

    pub async fn list(&self, fact: Fact) -> Result<Vec<String>, UnitError> {
        match self.value(fact).await? {
            FactValue::List(values) => Ok(values),
            other => Err(self.mismatch(fact, FactShape::List, &other)),
        }
    }

    /// Note a created resource for the run report.
    pub fn record(&self, kind: ResourceKind, name: impl Into<String>, id: impl Into<String>) {
        self.resources
            .lock()
            .push(ResourceRecord::new(kind, name, id));
    }

    /// Raise a non-fatal warning; the driver logs and collects it.
    pub fn warn(&self, warning: Warning) {
        self.warnings.lock().push(warning);
    }

    pub(crate) fn into_parts(self) -> (Vec<ResourceRecord>, Vec<Warning>) {
        (self.resources.into_inner(), self.warnings.into_inner())
    }

    fn mismatch(&self, fact: Fact, expected: FactShape, found: &FactValue) -> UnitError {
        UnitError::TypeMismatch {
            key: fact.key(self.namespace),
            expected,
            found: found.shape(),
        }
    }
}
