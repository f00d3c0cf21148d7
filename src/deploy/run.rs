// ABOUTME: Generic unit run parameterized by lifecycle state marker.
// ABOUTME: State types carry their own data so a run cannot skip a step.

use crate::namespace::Namespace;
use crate::types::UnitId;

use super::state::Declared;
use super::unit::ProvisioningUnit;

/// One unit moving through its lifecycle, parameterized by its current state.
///
/// The state type parameter `S` carries what the previous step produced
/// (resolved inputs, validated outputs, published keys), so outputs cannot be
/// published before provisioning succeeded.
pub struct UnitRun<'u, S> {
    pub(crate) unit: &'u dyn ProvisioningUnit,
    pub(crate) namespace: &'u Namespace,
    pub(crate) state: S,
}

impl<'u> UnitRun<'u, Declared> {
    pub fn new(unit: &'u dyn ProvisioningUnit, namespace: &'u Namespace) -> Self {
        UnitRun {
            unit,
            namespace,
            state: Declared,
        }
    }
}

impl<S> UnitRun<'_, S> {
    pub fn unit_id(&self) -> &UnitId {
        self.unit.id()
    }

    pub fn namespace(&self) -> &Namespace {
        self.namespace
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Consume the run, keeping only the state data.
    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for UnitRun<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnitRun")
            .field("unit", self.unit.id())
            .field("state", &self.state)
            .finish()
    }
}
