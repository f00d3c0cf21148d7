// ABOUTME: Composable capability traits for provisioning backends.
// ABOUTME: Defines NetworkOps, StorageOps, ClusterOps, DatabaseOps, WorkloadOps, InstanceOps, SecretOps.

mod cluster;
mod database;
mod error;
mod instance;
mod local;
mod network;
mod secret;
mod storage;
mod types;
mod workload;

pub use cluster::ClusterOps;
pub use database::DatabaseOps;
pub use error::ProvisionError;
pub use instance::InstanceOps;
pub use local::LocalProvisioner;
pub use network::NetworkOps;
pub use secret::SecretOps;
pub use storage::StorageOps;
pub use types::*;
pub use workload::WorkloadOps;

/// Every capability a full deployment needs.
pub trait FullProvisioner:
    NetworkOps + StorageOps + ClusterOps + DatabaseOps + WorkloadOps + InstanceOps + SecretOps
{
}

impl<T> FullProvisioner for T where
    T: NetworkOps + StorageOps + ClusterOps + DatabaseOps + WorkloadOps + InstanceOps + SecretOps
{
}
