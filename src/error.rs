// ABOUTME: Application-wide error types for stackline.
// ABOUTME: Uses thiserror for ergonomic error handling.

use std::path::PathBuf;
use thiserror::Error;

use crate::deploy::RunError;
use crate::facts::StoreError;
use crate::graph::GraphError;

#[derive(Debug, Error)]
pub enum Error {
    #[error("file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("configuration file not found in {0}")]
    ConfigNotFound(PathBuf),

    /// No environment was selected on the command line or in the config.
    #[error("no environment selected; pass --environment or set `environment` in the config")]
    MissingEnvironment,

    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid dependency graph: {0}")]
    Graph(#[from] GraphError),

    #[error("deployment halted: {0}")]
    Run(#[from] RunError),

    #[error("fact store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
