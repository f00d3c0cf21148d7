// ABOUTME: Graph construction: unit registration, conditional inclusion and validation.
// ABOUTME: Rejects cycles, dangling edges and reads not backed by a dependency edge.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use super::edge::Edge;
use super::error::GraphError;
use super::order::{kahn, reaches};
use super::Graph;
use crate::deploy::{ProvisioningUnit, ReadMode};
use crate::diagnostics::{Diagnostics, Warning};
use crate::facts::Fact;
use crate::types::UnitId;

/// Collects units and edges, then validates them into a [`Graph`].
#[derive(Default)]
#[must_use = "a builder does nothing until build() is called"]
pub struct GraphBuilder {
    units: Vec<Box<dyn ProvisioningUnit>>,
    excluded: Vec<UnitId>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, unit: impl ProvisioningUnit + 'static) -> Self {
        self.units.push(Box::new(unit));
        self
    }

    pub fn add_boxed(mut self, unit: Box<dyn ProvisioningUnit>) -> Self {
        self.units.push(unit);
        self
    }

    /// Include `unit` and `extra_edges` only when `flag` is set.
    ///
    /// When the flag is off the unit is remembered as excluded, so an
    /// unconditional edge pointing at it still fails the build.
    pub fn include_if(
        mut self,
        flag: bool,
        unit: impl ProvisioningUnit + 'static,
        extra_edges: impl IntoIterator<Item = Edge>,
    ) -> Self {
        if flag {
            self.units.push(Box::new(unit));
            self.edges.extend(extra_edges);
        } else {
            tracing::debug!("excluding unit {}", unit.id());
            self.excluded.push(unit.id().clone());
        }
        self
    }

    pub fn edge(mut self, edge: Edge) -> Self {
        self.edges.push(edge);
        self
    }

    pub fn edges(mut self, edges: impl IntoIterator<Item = Edge>) -> Self {
        self.edges.extend(edges);
        self
    }

    /// Validate everything and fix the deployment order.
    ///
    /// # Errors
    ///
    /// See [`GraphError`]; every variant is a declaration mistake.
    pub fn build(self) -> Result<Graph, GraphError> {
        let GraphBuilder {
            units,
            excluded,
            edges,
        } = self;

        let mut index: HashMap<UnitId, usize> = HashMap::new();
        for (i, unit) in units.iter().enumerate() {
            if index.insert(unit.id().clone(), i).is_some() {
                return Err(GraphError::DuplicateUnit {
                    unit: unit.id().clone(),
                });
            }
        }
        let excluded_set: HashSet<&UnitId> = excluded.iter().collect();
        if let Some(dup) = excluded.iter().find(|id| index.contains_key(*id)) {
            return Err(GraphError::DuplicateUnit { unit: dup.clone() });
        }

        let deps = wire_edges(&edges, &index, &excluded_set)?;

        let order = kahn(&deps).map_err(|remaining| GraphError::CycleDetected {
            units: remaining
                .into_iter()
                .map(|i| units[i].id().clone())
                .collect(),
        })?;

        let producers = collect_producers(&units)?;
        let diagnostics = check_reads(&units, &deps, &producers)?;

        tracing::debug!(
            "graph built with {} units, {} excluded",
            units.len(),
            excluded.len()
        );
        Ok(Graph {
            units,
            deps,
            order,
            producers,
            excluded,
            diagnostics,
        })
    }
}

/// Assemble units and edges into a graph; conditional inclusion is done with
/// [`GraphBuilder::include_if`].
pub fn build_graph(
    units: Vec<Box<dyn ProvisioningUnit>>,
    edges: Vec<Edge>,
) -> Result<Graph, GraphError> {
    units
        .into_iter()
        .fold(GraphBuilder::new(), GraphBuilder::add_boxed)
        .edges(edges)
        .build()
}

fn wire_edges(
    edges: &[Edge],
    index: &HashMap<UnitId, usize>,
    excluded: &HashSet<&UnitId>,
) -> Result<Vec<BTreeSet<usize>>, GraphError> {
    let mut deps = vec![BTreeSet::new(); index.len()];

    for edge in edges {
        let (from, to) = (edge.dependent(), edge.dependency());

        if !edge.is_active() {
            tracing::debug!("dropping conditional edge {} -> {}", from, to);
            continue;
        }

        for end in [from, to] {
            if !index.contains_key(end) && !excluded.contains(end) {
                return Err(GraphError::UnknownUnit {
                    from: from.clone(),
                    to: to.clone(),
                    unit: end.clone(),
                });
            }
        }

        match (index.get(from), index.get(to)) {
            (Some(&f), Some(&t)) if f == t => {
                return Err(GraphError::CycleDetected {
                    units: vec![from.clone()],
                });
            }
            (Some(&f), Some(&t)) => {
                deps[f].insert(t);
            }
            // Active edge touching a unit a switch left out.
            _ => {
                return Err(GraphError::ExcludedDependency {
                    from: from.clone(),
                    to: to.clone(),
                });
            }
        }
    }

    Ok(deps)
}

fn collect_producers(
    units: &[Box<dyn ProvisioningUnit>],
) -> Result<HashMap<Fact, usize>, GraphError> {
    let mut producers: HashMap<Fact, usize> = HashMap::new();
    for (i, unit) in units.iter().enumerate() {
        for fact in unit.outputs() {
            if let Some(&first) = producers.get(&fact) {
                return Err(GraphError::DuplicateProducer {
                    fact,
                    first: units[first].id().clone(),
                    second: unit.id().clone(),
                });
            }
            producers.insert(fact, i);
        }
    }
    Ok(producers)
}

/// Check every declared read against the edges.
///
/// Deferred reads need a direct edge to the producer. Eager reads need the
/// producer to be deployed first: a direct edge, or a path through other
/// units. The latter is accepted but reported, once per reader and producer.
fn check_reads(
    units: &[Box<dyn ProvisioningUnit>],
    deps: &[BTreeSet<usize>],
    producers: &HashMap<Fact, usize>,
) -> Result<Diagnostics, GraphError> {
    let mut implicit: BTreeMap<(usize, usize), Vec<Fact>> = BTreeMap::new();

    for (i, unit) in units.iter().enumerate() {
        for read in unit.inputs() {
            let Some(&producer) = producers.get(&read.fact) else {
                return Err(GraphError::MissingProducer {
                    unit: unit.id().clone(),
                    fact: read.fact,
                });
            };
            if producer == i {
                return Err(GraphError::CycleDetected {
                    units: vec![unit.id().clone()],
                });
            }
            if deps[i].contains(&producer) {
                continue;
            }

            let producer_id = units[producer].id().clone();
            match read.mode {
                ReadMode::Deferred => {
                    return Err(GraphError::DeferredWithoutEdge {
                        unit: unit.id().clone(),
                        fact: read.fact,
                        producer: producer_id,
                    });
                }
                ReadMode::Eager if reaches(deps, i, producer) => {
                    implicit.entry((i, producer)).or_default().push(read.fact);
                }
                ReadMode::Eager => {
                    return Err(GraphError::EagerWithoutEdge {
                        unit: unit.id().clone(),
                        fact: read.fact,
                        producer: producer_id,
                    });
                }
            }
        }
    }

    let mut diagnostics = Diagnostics::default();
    for ((reader, producer), facts) in implicit {
        let facts: Vec<String> = facts.iter().map(Fact::to_string).collect();
        diagnostics.warn(Warning::implicit_ordering(format!(
            "{} reads {} from {} without a direct edge; ordering holds only through other units",
            units[reader].id(),
            facts.join(", "),
            units[producer].id()
        )));
    }
    Ok(diagnostics)
}
