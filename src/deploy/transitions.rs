// ABOUTME: State transition methods for a unit's lifecycle.
// ABOUTME: Each method consumes self and returns the next state on success.

use std::collections::{HashMap, HashSet};

use crate::diagnostics::{Diagnostics, Warning};
use crate::facts::{self, FactStore, PublishOutcome, resolve_deferred, resolve_eager};
use crate::provision::FullProvisioner;

use super::context::{ProvisionContext, ResolvedInput};
use super::error::UnitError;
use super::run::UnitRun;
use super::state::{Declared, InputsResolved, OutputsPublished, Provisioned};
use super::unit::{Outputs, ProvisioningUnit, ReadMode};

// =============================================================================
// Declared -> InputsResolved
// =============================================================================

impl<'u> UnitRun<'u, Declared> {
    /// Read every eager input and hand out tokens for deferred ones.
    ///
    /// # Errors
    ///
    /// `FactNotFound` when an eager input has not been published yet,
    /// `TypeMismatch` when it has the wrong shape, `StoreUnavailable` when
    /// the store cannot be read.
    #[must_use = "unit run state must be used"]
    pub async fn resolve_inputs(
        self,
        store: &dyn FactStore,
    ) -> Result<UnitRun<'u, InputsResolved>, UnitError> {
        let mut inputs = HashMap::new();
        for read in self.unit.inputs() {
            let key = read.fact.key(self.namespace);
            let resolved = match read.mode {
                ReadMode::Eager => {
                    ResolvedInput::Value(resolve_eager(store, &key, read.fact.shape()).await?)
                }
                ReadMode::Deferred => {
                    ResolvedInput::Deferred(resolve_deferred(&key, read.fact.shape()))
                }
            };
            inputs.insert(read.fact, resolved);
        }

        tracing::info!("{}: {} inputs resolved", self.unit.id(), inputs.len());
        Ok(UnitRun {
            unit: self.unit,
            namespace: self.namespace,
            state: InputsResolved { inputs },
        })
    }
}

// =============================================================================
// InputsResolved -> Provisioned
// =============================================================================

impl<'u> UnitRun<'u, InputsResolved> {
    /// Create the unit's resources and validate the outputs it reports.
    ///
    /// Nothing is published here; a unit that fails leaves no outputs behind.
    ///
    /// # Errors
    ///
    /// `ProvisioningRejected` when the provider declines a request, fact
    /// errors from deferred reads, `UndeclaredRead` and `OutputContract` for
    /// units that break their declarations.
    #[must_use = "unit run state must be used"]
    pub async fn provision(
        self,
        api: &dyn FullProvisioner,
        store: &dyn FactStore,
        diagnostics: &mut Diagnostics,
    ) -> Result<UnitRun<'u, Provisioned>, UnitError> {
        let ctx = ProvisionContext::new(
            self.unit.id(),
            self.namespace,
            &self.state.inputs,
            store,
            api,
        );
        let outputs = self.unit.provision(&ctx).await?;
        let (resources, warnings) = ctx.into_parts();
        for warning in warnings {
            diagnostics.warn(warning);
        }

        validate_outputs(self.unit, &outputs)?;

        tracing::info!(
            "{}: provisioned {} resources",
            self.unit.id(),
            resources.len()
        );
        Ok(UnitRun {
            unit: self.unit,
            namespace: self.namespace,
            state: Provisioned { outputs, resources },
        })
    }
}

/// Check that `outputs` holds exactly the declared facts with their shapes.
fn validate_outputs(unit: &dyn ProvisioningUnit, outputs: &Outputs) -> Result<(), UnitError> {
    let contract = |reason: String| UnitError::OutputContract {
        unit: unit.id().clone(),
        reason,
    };

    let declared = unit.outputs();
    for fact in &declared {
        match outputs.get(*fact) {
            None => return Err(contract(format!("missing output {}", fact))),
            Some(value) if value.shape() != fact.shape() => {
                return Err(contract(format!(
                    "output {} is a {}, expected a {}",
                    fact,
                    value.shape(),
                    fact.shape()
                )));
            }
            Some(_) => {}
        }
    }

    let declared: HashSet<_> = declared.into_iter().collect();
    if let Some((extra, _)) = outputs.iter().find(|(f, _)| !declared.contains(f)) {
        return Err(contract(format!("undeclared output {}", extra)));
    }
    Ok(())
}

// =============================================================================
// Provisioned -> OutputsPublished
// =============================================================================

impl<'u> UnitRun<'u, Provisioned> {
    /// Publish every output to the store.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` when the store cannot be written, `TypeMismatch`
    /// when an existing key holds a value of the other shape.
    #[must_use = "unit run state must be used"]
    pub async fn publish(
        self,
        store: &dyn FactStore,
        diagnostics: &mut Diagnostics,
    ) -> Result<UnitRun<'u, OutputsPublished>, UnitError> {
        let mut published = Vec::with_capacity(self.state.outputs.len());
        for (fact, value) in self.state.outputs.iter() {
            let key = fact.key(self.namespace);
            let outcome = facts::publish(store, &key, value.clone()).await?;
            if let PublishOutcome::Replaced { previous } = outcome {
                diagnostics.warn(Warning::value_changed(format!(
                    "{} changed from {} to {}",
                    key, previous, value
                )));
            }
            published.push(key);
        }

        tracing::info!("{}: published {} facts", self.unit.id(), published.len());
        Ok(UnitRun {
            unit: self.unit,
            namespace: self.namespace,
            state: OutputsPublished {
                published,
                resources: self.state.resources,
            },
        })
    }
}
