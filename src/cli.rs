// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the subcommands and the global deployment target options.

use clap::{Args, Parser, Subcommand};
use stackline::config::TargetOverrides;
use stackline::types::UnitId;

#[derive(Parser)]
#[command(name = "stackline")]
#[command(about = "Deploy an n8n stack as a graph of units exchanging facts")]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output for CI
    #[arg(short, long, global = true, conflicts_with = "json")]
    pub quiet: bool,

    /// Emit JSON lines
    #[arg(long, global = true)]
    pub json: bool,

    #[command(flatten)]
    pub target: TargetArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Deployment target options, overriding the config file.
#[derive(Args, Default)]
pub struct TargetArgs {
    /// Environment to deploy (e.g. stg, prod)
    #[arg(short, long, global = true)]
    pub environment: Option<String>,

    /// Account the stack is deployed to
    #[arg(long, global = true)]
    pub account: Option<String>,

    /// Region the stack is deployed to
    #[arg(long, global = true)]
    pub region: Option<String>,

    /// Include the managed database unit
    #[arg(long, global = true)]
    pub managed_database: bool,

    /// Include the bastion host unit
    #[arg(long, global = true)]
    pub bastion: bool,
}

impl TargetArgs {
    /// Switches are only overrides when given; otherwise the config decides.
    pub fn overrides(&self) -> TargetOverrides {
        TargetOverrides {
            environment: self.environment.clone(),
            account: self.account.clone(),
            region: self.region.clone(),
            managed_database: self.managed_database.then_some(true),
            bastion: self.bastion.then_some(true),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new stackline.yml configuration file
    Init {
        /// Application name
        #[arg(long)]
        app: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show the deployment order, each unit's facts and any warnings
    Plan,

    /// Deploy the stack
    Deploy {
        /// Deploy only these units, using facts already in the store
        #[arg(long, num_args = 1.., value_parser = UnitId::new)]
        only: Vec<UnitId>,
    },

    /// List the facts published in the namespace
    Facts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn switches_are_overrides_only_when_set() {
        let cli = Cli::parse_from(["stackline", "-e", "stg", "plan"]);
        let overrides = cli.target.overrides();
        assert_eq!(overrides.environment.as_deref(), Some("stg"));
        assert_eq!(overrides.managed_database, None);
        assert_eq!(overrides.bastion, None);

        let cli = Cli::parse_from(["stackline", "plan", "--managed-database"]);
        assert_eq!(cli.target.overrides().managed_database, Some(true));
    }

    #[test]
    fn only_takes_several_units() {
        let cli = Cli::parse_from(["stackline", "deploy", "--only", "cache", "application"]);
        match cli.command {
            Commands::Deploy { only } => {
                assert_eq!(only.len(), 2);
                assert_eq!(only[0].as_str(), "cache");
            }
            _ => panic!("expected deploy"),
        }
    }

    #[test]
    fn only_rejects_invalid_unit_names() {
        let result = Cli::try_parse_from(["stackline", "deploy", "--only", "Cache"]);
        assert!(result.is_err());
    }
}
