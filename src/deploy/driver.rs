// ABOUTME: Sequential deployment driver walking the graph in topological order.
// ABOUTME: Halts on the first failing unit and reports which unit, which step and why.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use snafu::ResultExt;

use crate::diagnostics::{Diagnostics, Warning};
use crate::facts::FactStore;
use crate::graph::Graph;
use crate::namespace::{FactKey, Namespace};
use crate::provision::{FullProvisioner, ResourceRecord};
use crate::types::UnitId;

use super::error::{RunError, UnitError, UnitFailedSnafu, UnitStep, UnknownSelectionSnafu};
use super::run::UnitRun;
use super::unit::ProvisioningUnit;

/// What one deployed unit did.
#[derive(Debug, Clone, Serialize)]
pub struct UnitReport {
    pub unit: UnitId,
    /// Deployable name, e.g. `N8nStgNetworkStack`.
    pub stack: String,
    pub published: Vec<FactKey>,
    pub resources: Vec<ResourceRecord>,
    #[serde(rename = "elapsed_ms", serialize_with = "as_millis")]
    pub elapsed: Duration,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub units: Vec<UnitReport>,
    pub warnings: Vec<Warning>,
}

impl RunReport {
    pub fn deployed(&self) -> Vec<&UnitId> {
        self.units.iter().map(|u| &u.unit).collect()
    }

    pub fn published_count(&self) -> usize {
        self.units.iter().map(|u| u.published.len()).sum()
    }
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Drives units through their lifecycle, one at a time.
///
/// A unit's inputs are only resolved once every unit before it in the
/// topological order has published, which covers everything it has an edge to.
pub struct Driver {
    namespace: Namespace,
    store: Arc<dyn FactStore>,
    api: Arc<dyn FullProvisioner>,
}

impl Driver {
    pub fn new(
        namespace: Namespace,
        store: Arc<dyn FactStore>,
        api: Arc<dyn FullProvisioner>,
    ) -> Self {
        Self {
            namespace,
            store,
            api,
        }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Deploy every unit of `graph` in topological order.
    ///
    /// # Errors
    ///
    /// `RunError::UnitFailed` for the first unit that fails; units after it
    /// are not started and units before it keep their published facts.
    pub async fn run(&self, graph: &Graph) -> Result<RunReport, RunError> {
        self.run_units(graph.order()).await
    }

    /// Deploy only `selection`, in graph order, without their dependencies.
    ///
    /// Inputs of the selected units must already be in the store from an
    /// earlier run.
    ///
    /// # Errors
    ///
    /// `RunError::UnknownSelection` before anything runs when a name is not
    /// in the graph, otherwise as [`Driver::run`].
    pub async fn run_selected(
        &self,
        graph: &Graph,
        selection: &[UnitId],
    ) -> Result<RunReport, RunError> {
        if let Some(unknown) = selection.iter().find(|id| !graph.contains(id)) {
            return UnknownSelectionSnafu {
                unit: unknown.clone(),
            }
            .fail();
        }

        let units = graph
            .order()
            .into_iter()
            .filter(|u| selection.contains(u.id()))
            .collect();
        self.run_units(units).await
    }

    async fn run_units(&self, units: Vec<&dyn ProvisioningUnit>) -> Result<RunReport, RunError> {
        let mut diagnostics = Diagnostics::default();
        let mut reports: Vec<UnitReport> = Vec::with_capacity(units.len());

        for unit in units {
            let started = Instant::now();
            tracing::info!(
                "deploying {} ({})",
                unit.id(),
                self.namespace.stack_name(unit.label())
            );

            let (published, resources) = match self.run_unit(unit, &mut diagnostics).await {
                Ok(done) => done,
                Err((step, source)) => {
                    tracing::warn!("{} failed during {}: {}", unit.id(), step, source);
                    let completed: Vec<UnitId> = reports.iter().map(|r| r.unit.clone()).collect();
                    return Err(source).context(UnitFailedSnafu {
                        unit: unit.id().clone(),
                        step,
                        completed,
                    });
                }
            };

            reports.push(UnitReport {
                unit: unit.id().clone(),
                stack: self.namespace.stack_name(unit.label()),
                published,
                resources,
                elapsed: started.elapsed(),
            });
        }

        Ok(RunReport {
            units: reports,
            warnings: diagnostics.warnings().to_vec(),
        })
    }

    async fn run_unit(
        &self,
        unit: &dyn ProvisioningUnit,
        diagnostics: &mut Diagnostics,
    ) -> Result<(Vec<FactKey>, Vec<ResourceRecord>), (UnitStep, UnitError)> {
        let store = self.store.as_ref();

        let run = UnitRun::new(unit, &self.namespace)
            .resolve_inputs(store)
            .await
            .map_err(|e| (UnitStep::ResolveInputs, e))?;
        let run = run
            .provision(self.api.as_ref(), store, diagnostics)
            .await
            .map_err(|e| (UnitStep::Provision, e))?;
        let run = run
            .publish(store, diagnostics)
            .await
            .map_err(|e| (UnitStep::Publish, e))?;

        let done = run.into_state();
        Ok((done.published, done.resources))
    }
}
