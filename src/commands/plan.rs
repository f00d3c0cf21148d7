// ABOUTME: Plan command implementation.
// ABOUTME: Builds the graph and shows the order, each unit's reads and writes, and warnings.

use serde::Serialize;
use stackline::config::{Config, DeployTarget};
use stackline::error::Result;
use stackline::namespace::FactKey;
use stackline::output::Output;
use stackline::types::UnitId;
use stackline::units::standard_topology;

#[derive(Serialize)]
struct PlannedUnit<'a> {
    unit: &'a UnitId,
    stack: String,
    depends_on: Vec<&'a UnitId>,
    inputs: Vec<PlannedRead<'a>>,
    outputs: Vec<FactKey>,
}

#[derive(Serialize)]
struct PlannedRead<'a> {
    key: FactKey,
    mode: String,
    producer: Option<&'a UnitId>,
}

/// Print the deployment plan without touching the store or the provider.
pub fn plan(config: &Config, target: &DeployTarget, output: &Output) -> Result<()> {
    let graph = standard_topology(config, target)?.build()?;
    let ns = config.namespace(target);

    output.progress(&format!(
        "Plan for {} in {}/{}",
        ns.prefix(),
        target.account,
        target.region
    ));

    let mut planned = Vec::with_capacity(graph.len());
    for (position, unit) in graph.order().into_iter().enumerate() {
        let stack = ns.stack_name(unit.label());
        output.line(&format!("{}. {} ({})", position + 1, unit.id(), stack));

        let inputs: Vec<PlannedRead<'_>> = unit
            .inputs()
            .into_iter()
            .map(|read| PlannedRead {
                key: read.fact.key(&ns),
                mode: read.mode.to_string(),
                producer: graph.producer(read.fact),
            })
            .collect();
        for read in &inputs {
            let producer = read.producer.map_or("nothing", UnitId::as_str);
            output.progress(&format!(
                "     reads  {} ({}, from {})",
                read.key, read.mode, producer
            ));
        }

        let outputs: Vec<FactKey> = unit.outputs().iter().map(|f| f.key(&ns)).collect();
        for key in &outputs {
            output.progress(&format!("     writes {key}"));
        }

        planned.push(PlannedUnit {
            unit: unit.id(),
            stack,
            depends_on: graph.dependencies(unit.id()),
            inputs,
            outputs,
        });
    }

    for id in graph.excluded() {
        output.progress(&format!("   skipped {id} (switched off)"));
    }
    for warning in graph.diagnostics().warnings() {
        output.warning(warning);
    }

    output.data("plan", &planned);
    Ok(())
}
