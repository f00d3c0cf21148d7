// ABOUTME: Static dependency graph of provisioning units.
// ABOUTME: Built once per run from declared units, edges and conditional inclusion switches.

mod builder;
mod edge;
mod error;
mod order;

use std::collections::{BTreeSet, HashMap};

pub use builder::{GraphBuilder, build_graph};
pub use edge::Edge;
pub use error::GraphError;

use crate::deploy::ProvisioningUnit;
use crate::diagnostics::Diagnostics;
use crate::facts::Fact;
use crate::types::UnitId;

/// Validated, acyclic set of units with a fixed deployment order.
pub struct Graph {
    /// Included units in declaration order.
    units: Vec<Box<dyn ProvisioningUnit>>,
    /// `deps[i]`: indices unit `i` has a direct edge to.
    deps: Vec<BTreeSet<usize>>,
    order: Vec<usize>,
    producers: HashMap<Fact, usize>,
    excluded: Vec<UnitId>,
    diagnostics: Diagnostics,
}

impl Graph {
    /// Units in deployment order.
    pub fn order(&self) -> Vec<&dyn ProvisioningUnit> {
        self.order.iter().map(|&i| self.units[i].as_ref()).collect()
    }

    /// Unit ids in deployment order.
    pub fn order_ids(&self) -> Vec<&UnitId> {
        self.order.iter().map(|&i| self.units[i].id()).collect()
    }

    pub fn unit(&self, id: &UnitId) -> Option<&dyn ProvisioningUnit> {
        self.index_of(id).map(|i| self.units[i].as_ref())
    }

    pub fn contains(&self, id: &UnitId) -> bool {
        self.index_of(id).is_some()
    }

    /// Units `id` has a direct edge to, in declaration order.
    pub fn dependencies(&self, id: &UnitId) -> Vec<&UnitId> {
        match self.index_of(id) {
            Some(i) => self.deps[i].iter().map(|&d| self.units[d].id()).collect(),
            None => Vec::new(),
        }
    }

    /// Every edge as `(dependent, dependency)`.
    pub fn edges(&self) -> Vec<(&UnitId, &UnitId)> {
        self.deps
            .iter()
            .enumerate()
            .flat_map(|(i, deps)| {
                deps.iter()
                    .map(move |&d| (self.units[i].id(), self.units[d].id()))
            })
            .collect()
    }

    /// Unit that publishes `fact`.
    pub fn producer(&self, fact: Fact) -> Option<&UnitId> {
        self.producers.get(&fact).map(|&i| self.units[i].id())
    }

    /// Units a switch left out of this graph.
    pub fn excluded(&self) -> &[UnitId] {
        &self.excluded
    }

    /// Warnings raised while validating reads against edges.
    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    fn index_of(&self, id: &UnitId) -> Option<usize> {
        self.units.iter().position(|u| u.id() == id)
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("order", &self.order_ids())
            .field("excluded", &self.excluded)
            .finish()
    }
}

/// Units of `graph` in deployment order.
///
/// Any order consistent with the edges would do; ties are broken by
/// declaration order so repeated runs are identical.
pub fn topological_order(graph: &Graph) -> Vec<&dyn ProvisioningUnit> {
    graph.order()
}
