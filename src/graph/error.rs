// ABOUTME: Errors raised while assembling the dependency graph.
// ABOUTME: All of them are design errors caught before any unit runs.

use crate::facts::Fact;
use crate::types::UnitId;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("unit {unit} is declared more than once")]
    DuplicateUnit { unit: UnitId },

    #[error("edge {from} -> {to} references unknown unit {unit}")]
    UnknownUnit {
        from: UnitId,
        to: UnitId,
        unit: UnitId,
    },

    /// An edge that is not conditional on the same switch points at a unit
    /// the switch left out.
    #[error("unit {from} depends on excluded unit {to}; make the edge conditional on the same switch")]
    ExcludedDependency { from: UnitId, to: UnitId },

    #[error("dependency cycle among units: {}", join(.units))]
    CycleDetected { units: Vec<UnitId> },

    #[error("{fact} is produced by both {first} and {second}")]
    DuplicateProducer {
        fact: Fact,
        first: UnitId,
        second: UnitId,
    },

    #[error("unit {unit} reads {fact}, which no unit in the graph produces")]
    MissingProducer { unit: UnitId, fact: Fact },

    #[error("unit {unit} reads {fact} deferred but has no direct edge to its producer {producer}")]
    DeferredWithoutEdge {
        unit: UnitId,
        fact: Fact,
        producer: UnitId,
    },

    #[error("unit {unit} reads {fact} eagerly but does not depend on its producer {producer}")]
    EagerWithoutEdge {
        unit: UnitId,
        fact: Fact,
        producer: UnitId,
    },
}

fn join(units: &[UnitId]) -> String {
    units
        .iter()
        .map(UnitId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
