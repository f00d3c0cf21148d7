// ABOUTME: Facts command implementation.
// ABOUTME: Lists every fact published under the (app, env) namespace.

use stackline::config::{Config, DeployTarget};
use stackline::error::Result;
use stackline::facts::{FactStore, FileFactStore};
use stackline::output::Output;

pub async fn facts(config: &Config, target: &DeployTarget, output: &Output) -> Result<()> {
    let ns = config.namespace(target);
    let store = FileFactStore::for_namespace(&config.store.dir, &ns);
    let records = store.list(&ns.root()).await?;

    if records.is_empty() {
        output.progress(&format!("No facts published under {}", ns.root()));
    }
    for record in &records {
        output.line(&format!("{} = {}", record.key, record.value));
    }

    output.data("facts", &records);
    Ok(())
}
