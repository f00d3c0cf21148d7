// ABOUTME: Entry point for the stackline CLI application.
// ABOUTME: Parses arguments, resolves the deployment target and dispatches to command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, TargetArgs};
use stackline::config::{self, Config, DeployTarget};
use stackline::error::Result;
use stackline::output::{Output, OutputMode};
use std::env;
use std::path::Path;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over the verbose flag
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mode = OutputMode::from_flags(cli.quiet, cli.json);
    if let Err(e) = run(cli, mode).await {
        Output::new(mode).error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> Result<()> {
    let cwd = env::current_dir()?;
    let output = Output::new(mode);
    let Cli { target, command, .. } = cli;

    match command {
        Commands::Init { app, force } => {
            config::init_config(&cwd, app.as_deref(), target.environment.as_deref(), force)?;
            output.success(&format!("Created {}", config::CONFIG_FILENAME));
            Ok(())
        }
        Commands::Plan => {
            let (config, target) = load(&cwd, &target)?;
            commands::plan(&config, &target, &output)
        }
        Commands::Deploy { only } => {
            let (config, target) = load(&cwd, &target)?;
            commands::deploy(&config, &target, &only, output).await
        }
        Commands::Facts => {
            let (config, target) = load(&cwd, &target)?;
            commands::facts(&config, &target, &output).await
        }
    }
}

/// Discover the config and resolve the target; fails before any unit runs.
fn load(cwd: &Path, args: &TargetArgs) -> Result<(Config, DeployTarget)> {
    let file = Config::discover(cwd)?;
    let target = file.target(&args.overrides())?;
    let mut config = file.for_environment(&target.environment);
    config.store.dir = cwd.join(&config.store.dir);
    Ok((config, target))
}
