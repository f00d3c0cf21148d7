// ABOUTME: Deploy command implementation.
// ABOUTME: Runs the graph against the local provider and the file-backed fact store.

use std::sync::Arc;

use stackline::config::{Config, DeployTarget};
use stackline::deploy::Driver;
use stackline::error::Result;
use stackline::facts::FileFactStore;
use stackline::output::Output;
use stackline::provision::LocalProvisioner;
use stackline::types::UnitId;
use stackline::units::standard_topology;

/// Deploy every unit, or only `only` when it is not empty.
pub async fn deploy(
    config: &Config,
    target: &DeployTarget,
    only: &[UnitId],
    mut output: Output,
) -> Result<()> {
    let graph = standard_topology(config, target)?.build()?;
    for warning in graph.diagnostics().warnings() {
        output.warning(warning);
    }

    let ns = config.namespace(target);
    let store = Arc::new(FileFactStore::for_namespace(&config.store.dir, &ns));
    let api = Arc::new(LocalProvisioner::new(&target.account, &target.region));

    output.start_timer();
    output.progress(&format!(
        "Deploying {} to {}/{} (facts in {})",
        ns.prefix(),
        target.account,
        target.region,
        store.path().display()
    ));

    let driver = Driver::new(ns, store, api);
    let report = if only.is_empty() {
        driver.run(&graph).await?
    } else {
        driver.run_selected(&graph, only).await?
    };

    for unit in &report.units {
        output.progress(&format!(
            "  ✓ {} ({}): {} facts, {} resources",
            unit.unit,
            unit.stack,
            unit.published.len(),
            unit.resources.len()
        ));
    }
    for warning in &report.warnings {
        output.warning(warning);
    }

    output.data("report", &report);
    output.success(&format!(
        "Deployed {} unit(s), published {} facts",
        report.units.len(),
        report.published_count()
    ));
    Ok(())
}
