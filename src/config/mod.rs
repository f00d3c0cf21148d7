// ABOUTME: Configuration types and parsing for stackline.yml.
// ABOUTME: Handles YAML parsing, env var interpolation, and per-environment merging.

mod deserialize;
mod env_value;
mod healthcheck;
mod init;
mod settings;

pub use env_value::{EnvValue, resolve_env_map};
pub use healthcheck::HealthcheckConfig;
pub use init::init_config;
pub use settings::{
    ApplicationSettings, BastionSettings, CacheSettings, ClusterSettings, DatabaseSettings,
    ManagedDbSettings, NetworkSettings, StorageSettings,
};

use crate::error::{Error, Result};
use crate::namespace::Namespace;
use deserialize::{deserialize_app, validate_segment};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "stackline.yml";
pub const CONFIG_FILENAME_ALT: &str = "stackline.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".stackline/config.yml";

pub const DEFAULT_APP: &str = "n8n";
pub const DEFAULT_ACCOUNT: &str = "000000000000";
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_app", deserialize_with = "deserialize_app")]
    pub app: String,

    /// Selected environment; the command line takes precedence.
    #[serde(default)]
    pub environment: Option<EnvValue>,

    #[serde(default = "default_account")]
    pub account: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub managed_database: bool,

    #[serde(default)]
    pub bastion: bool,

    #[serde(default)]
    pub network: NetworkSettings,

    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub cluster: ClusterSettings,

    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub managed_db: ManagedDbSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub application: ApplicationSettings,

    #[serde(default)]
    pub bastion_host: BastionSettings,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentOverrides>,
}

/// Overrides applied when a given environment is selected.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct EnvironmentOverrides {
    #[serde(default)]
    pub account: Option<String>,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub managed_database: Option<bool>,

    #[serde(default)]
    pub bastion: Option<bool>,

    /// Merged over `application.env`.
    #[serde(default)]
    pub env: BTreeMap<String, EnvValue>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Directory holding one fact document per namespace.
    #[serde(default = "default_store_dir")]
    pub dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            dir: default_store_dir(),
        }
    }
}

/// Target selection given on the command line.
#[derive(Debug, Clone, Default)]
pub struct TargetOverrides {
    pub environment: Option<String>,
    pub account: Option<String>,
    pub region: Option<String>,
    pub managed_database: Option<bool>,
    pub bastion: Option<bool>,
}

/// Where and what to deploy, after merging file, environment block and CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    pub environment: String,
    pub account: String,
    pub region: String,
    pub managed_database: bool,
    pub bastion: bool,
}

fn default_app() -> String {
    DEFAULT_APP.to_string()
}

fn default_account() -> String {
    DEFAULT_ACCOUNT.to_string()
}

fn default_region() -> String {
    DEFAULT_REGION.to_string()
}

fn default_store_dir() -> PathBuf {
    PathBuf::from(".stackline/facts")
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("loading config from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// This config with the overrides of environment `name` applied.
    ///
    /// Blocks are matched ignoring case, like the fact namespace; an exact
    /// match wins. An environment without a block deploys with the top-level
    /// values.
    pub fn for_environment(&self, name: &str) -> Config {
        let mut merged = self.clone();
        let Some(block) = self.environment_block(name) else {
            return merged;
        };

        if let Some(ref account) = block.account {
            merged.account = account.clone();
        }
        if let Some(ref region) = block.region {
            merged.region = region.clone();
        }
        if let Some(flag) = block.managed_database {
            merged.managed_database = flag;
        }
        if let Some(flag) = block.bastion {
            merged.bastion = flag;
        }
        for (k, v) in &block.env {
            merged.application.env.insert(k.clone(), v.clone());
        }

        merged
    }

    fn environment_block(&self, name: &str) -> Option<&EnvironmentOverrides> {
        self.environments.get(name).or_else(|| {
            let wanted = name.to_lowercase();
            self.environments
                .iter()
                .find(|(key, _)| key.to_lowercase() == wanted)
                .map(|(_, block)| block)
        })
    }

    /// Resolve the deployment target.
    ///
    /// Precedence: command line, then the selected environment's block, then
    /// the top-level values.
    ///
    /// # Errors
    ///
    /// `MissingEnvironment` when neither the command line nor the file names
    /// an environment, `InvalidConfig` when the name cannot be a key segment,
    /// `MissingEnvVar` when an env reference has no value and no default.
    pub fn target(&self, overrides: &TargetOverrides) -> Result<DeployTarget> {
        let environment = match (&overrides.environment, &self.environment) {
            (Some(name), _) => name.clone(),
            (None, Some(value)) => value.resolve()?,
            (None, None) => return Err(Error::MissingEnvironment),
        };
        if environment.trim().is_empty() {
            return Err(Error::MissingEnvironment);
        }
        validate_segment("environment", &environment).map_err(Error::InvalidConfig)?;

        let merged = self.for_environment(&environment);
        let target = DeployTarget {
            account: overrides.account.clone().unwrap_or(merged.account),
            region: overrides.region.clone().unwrap_or(merged.region),
            managed_database: overrides
                .managed_database
                .unwrap_or(merged.managed_database),
            bastion: overrides.bastion.unwrap_or(merged.bastion),
            environment,
        };
        tracing::debug!(
            "target {} in {}/{} (managed database: {}, bastion: {})",
            target.environment,
            target.account,
            target.region,
            target.managed_database,
            target.bastion
        );
        Ok(target)
    }

    /// Fact namespace of `target`.
    pub fn namespace(&self, target: &DeployTarget) -> Namespace {
        Namespace::new(&self.app, &target.environment)
    }

    pub fn template() -> Self {
        Config {
            app: default_app(),
            environment: Some(EnvValue::literal("stg")),
            account: default_account(),
            region: default_region(),
            managed_database: false,
            bastion: false,
            network: NetworkSettings::default(),
            storage: StorageSettings::default(),
            cluster: ClusterSettings::default(),
            database: DatabaseSettings::default(),
            managed_db: ManagedDbSettings::default(),
            cache: CacheSettings::default(),
            application: ApplicationSettings::default(),
            bastion_host: BastionSettings::default(),
            store: StoreConfig::default(),
            environments: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(config.app, "n8n");
        assert_eq!(config.network.cidr, "10.0.0.0/16");
        assert_eq!(config.database.image.to_string(), "postgres:16");
        assert_eq!(config.application.healthcheck.path, "/healthz");
        assert!(!config.managed_database);
    }

    #[test]
    fn cli_environment_wins_over_file() {
        let config = Config::from_yaml("environment: stg").unwrap();
        let target = config
            .target(&TargetOverrides {
                environment: Some("prod".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(target.environment, "prod");
    }

    #[test]
    fn missing_environment_is_an_error() {
        let config = Config::from_yaml("app: n8n").unwrap();
        assert!(matches!(
            config.target(&TargetOverrides::default()),
            Err(Error::MissingEnvironment)
        ));
    }

    #[test]
    fn environment_block_matches_ignoring_case() {
        let config = Config::from_yaml(
            "environments:\n  stg:\n    account: \"222222222222\"\n",
        )
        .unwrap();
        let target = config
            .target(&TargetOverrides {
                environment: Some("Stg".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(target.account, "222222222222");
        assert_eq!(config.namespace(&target).root(), "/n8n/stg/");
    }

    #[test]
    fn exact_environment_block_wins() {
        let config = Config::from_yaml(
            "environments:\n  stg:\n    region: eu-west-1\n  Stg:\n    region: eu-north-1\n",
        )
        .unwrap();
        assert_eq!(config.for_environment("Stg").region, "eu-north-1");
        assert_eq!(config.for_environment("stg").region, "eu-west-1");
    }

    #[test]
    fn environment_with_slash_is_rejected() {
        let config = Config::from_yaml("environment: a/b").unwrap();
        assert!(matches!(
            config.target(&TargetOverrides::default()),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn app_with_slash_is_rejected() {
        assert!(Config::from_yaml("app: n8n/x").is_err());
    }

    #[test]
    fn empty_zone_list_is_rejected() {
        assert!(Config::from_yaml("network:\n  availability_zones: []").is_err());
    }
}
