// ABOUTME: Unit lifecycle state markers for the type state pattern.
// ABOUTME: Each state carries the data produced by the step that reached it.

use std::collections::HashMap;

use super::context::ResolvedInput;
use crate::facts::Fact;
use crate::namespace::FactKey;
use crate::provision::ResourceRecord;

use super::unit::Outputs;

/// Initial state: unit registered, nothing read yet.
/// Available actions: `resolve_inputs()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Declared;

/// Inputs resolved: eager values read, deferred inputs held as tokens.
/// Available actions: `provision()`
#[derive(Debug, Clone)]
pub struct InputsResolved {
    pub(crate) inputs: HashMap<Fact, ResolvedInput>,
}

impl InputsResolved {
    pub fn input(&self, fact: Fact) -> Option<&ResolvedInput> {
        self.inputs.get(&fact)
    }
}

/// Provisioned: resources exist, outputs validated but not yet visible.
/// Available actions: `publish()`
#[derive(Debug, Clone)]
pub struct Provisioned {
    pub(crate) outputs: Outputs,
    pub(crate) resources: Vec<ResourceRecord>,
}

impl Provisioned {
    pub fn outputs(&self) -> &Outputs {
        &self.outputs
    }

    pub fn resources(&self) -> &[ResourceRecord] {
        &self.resources
    }
}

/// Outputs published: terminal success.
/// Available actions: `finish()`
#[derive(Debug, Clone)]
pub struct OutputsPublished {
    pub(crate) published: Vec<FactKey>,
    pub(crate) resources: Vec<ResourceRecord>,
}

impl OutputsPublished {
    pub fn published(&self) -> &[FactKey] {
        &self.published
    }

    pub fn resources(&self) -> &[ResourceRecord] {
        &self.resources
    }
}
