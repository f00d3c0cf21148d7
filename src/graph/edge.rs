// ABOUTME: Dependency edges between units, optionally tied to a deployment switch.
// ABOUTME: A conditional edge is dropped with its switch instead of pointing at an excluded unit.

use crate::types::UnitId;

/// `dependent` may only start once `dependency` has published its outputs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Edge {
    dependent: UnitId,
    dependency: UnitId,
    condition: Option<bool>,
}

impl Edge {
    pub fn new(dependent: UnitId, dependency: UnitId) -> Self {
        Self {
            dependent,
            dependency,
            condition: None,
        }
    }

    /// Edge that only exists when `flag` is set, for dependencies on a
    /// conditionally included unit.
    pub fn when(flag: bool, dependent: UnitId, dependency: UnitId) -> Self {
        Self {
            dependent,
            dependency,
            condition: Some(flag),
        }
    }

    pub fn dependent(&self) -> &UnitId {
        &self.dependent
    }

    pub fn dependency(&self) -> &UnitId {
        &self.dependency
    }

    /// Whether the edge takes part in graph construction.
    pub fn is_active(&self) -> bool {
        self.condition.unwrap_or(true)
    }
}
