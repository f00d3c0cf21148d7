// ABOUTME: The provisioning units of the n8n deployment and the topology wiring them together.
// ABOUTME: Units only meet through facts; the edges between them are declared here.

mod application;
mod bastion;
mod cache;
mod cluster;
mod database;
mod managed_database;
mod network;
mod storage;

pub use application::ApplicationUnit;
pub use bastion::BastionUnit;
pub use cache::CacheUnit;
pub use cluster::ClusterUnit;
pub use database::DatabaseUnit;
pub use managed_database::ManagedDatabaseUnit;
pub use network::NetworkUnit;
pub use storage::StorageUnit;

use std::time::Duration;

use crate::config::{Config, DeployTarget, resolve_env_map};
use crate::deploy::{ProvisionContext, UnitError};
use crate::diagnostics::Warning;
use crate::facts::Fact;
use crate::graph::{Edge, GraphBuilder};
use crate::provision::{
    IngressRule, Peer, PortRange, ResourceKind, SecretRef, SecretSpec, SecurityGroupSpec,
    WorkloadSpec,
};
use crate::types::{NetworkId, SecurityGroupId, UnitId, WorkloadId};

/// TTL of discovery records for every workload.
const DISCOVERY_TTL: Duration = Duration::from_secs(30);

/// Generated passwords shorter than this are reported.
const MIN_PASSWORD_LENGTH: u8 = 16;

/// The n8n deployment: every unit, its edges and both optional units.
///
/// `target.managed_database` and `target.bastion` decide whether the managed
/// database and the bastion host take part; the database service's edge to
/// the managed database is conditional on the same switch.
///
/// Fails only when an application environment variable names an unset
/// variable of the operator's shell.
pub fn standard_topology(config: &Config, target: &DeployTarget) -> crate::error::Result<GraphBuilder> {
    let app_env = resolve_env_map(&config.application.env)?;

    let network = UnitId::known(UnitId::NETWORK);
    let storage = UnitId::known(UnitId::SHARED_STORAGE);
    let managed = UnitId::known(UnitId::MANAGED_DATABASE);
    let cluster = UnitId::known(UnitId::CLUSTER);
    let bastion = UnitId::known(UnitId::BASTION);
    let database = UnitId::known(UnitId::DATABASE);
    let cache = UnitId::known(UnitId::CACHE);
    let application = UnitId::known(UnitId::APPLICATION);

    let builder = GraphBuilder::new()
        .add(NetworkUnit::new(config.network.clone()))
        .add(StorageUnit::new(config.storage.clone()))
        .edge(Edge::new(storage.clone(), network.clone()))
        .include_if(
            target.managed_database,
            ManagedDatabaseUnit::new(config.managed_db.clone()),
            [Edge::new(managed.clone(), network.clone())],
        )
        .add(ClusterUnit::new(config.cluster.clone()))
        .edges([
            Edge::new(cluster.clone(), network.clone()),
            Edge::new(cluster.clone(), storage.clone()),
        ])
        .include_if(
            target.bastion,
            BastionUnit::new(config.bastion_host.clone()),
            [
                Edge::new(bastion.clone(), network),
                Edge::new(bastion, storage),
            ],
        )
        .add(DatabaseUnit::new(config.database.clone()))
        .edges([
            Edge::new(database.clone(), cluster.clone()),
            Edge::when(target.managed_database, database.clone(), managed),
        ])
        .add(CacheUnit::new(config.cache.clone()))
        .edge(Edge::new(cache.clone(), cluster))
        .add(ApplicationUnit::new(config.application.clone(), app_env))
        .edges([
            Edge::new(application.clone(), database),
            Edge::new(application, cache),
        ]);
    Ok(builder)
}

/// Log group of a workload, e.g. `/ecs/n8n-stg/postgres`.
fn log_group(prefix: &str, name: &str) -> String {
    format!("/ecs/{prefix}/{name}")
}

/// Secrets are named after the fact that publishes their name.
fn secret_name(ctx: &ProvisionContext<'_>, fact: Fact) -> String {
    fact.key(ctx.namespace()).as_str().to_string()
}

async fn generate_secret(
    ctx: &ProvisionContext<'_>,
    spec: &SecretSpec,
) -> Result<SecretRef, UnitError> {
    let secret = ctx.api().generate_secret(spec).await?;
    ctx.record(ResourceKind::Secret, &secret.name, &secret.arn);
    Ok(secret)
}

async fn create_workload(
    ctx: &ProvisionContext<'_>,
    spec: &WorkloadSpec,
) -> Result<WorkloadId, UnitError> {
    let id = ctx.api().create_workload(spec).await?;
    ctx.record(ResourceKind::Workload, &spec.service_name, id.as_str());
    Ok(id)
}

async fn create_security_group(
    ctx: &ProvisionContext<'_>,
    spec: &SecurityGroupSpec,
) -> Result<SecurityGroupId, UnitError> {
    let id = ctx.api().create_security_group(spec).await?;
    ctx.record(ResourceKind::SecurityGroup, &spec.name, id.as_str());
    Ok(id)
}

/// Group admitting all traffic from inside the network, attached to every
/// workload so tasks can reach each other.
async fn cluster_access_group(
    ctx: &ProvisionContext<'_>,
    name: String,
    network: &NetworkId,
    cidr: &str,
) -> Result<SecurityGroupId, UnitError> {
    let spec = SecurityGroupSpec {
        name,
        description: "Cluster access from within the network".to_string(),
        network: network.clone(),
        allow_all_outbound: true,
        ingress: vec![IngressRule::new(
            Peer::Cidr(cidr.to_string()),
            PortRange::AllTraffic,
            "Allow inbound traffic from within the network",
        )],
    };
    create_security_group(ctx, &spec).await
}

fn check_password_length(ctx: &ProvisionContext<'_>, secret: &str, length: u8) {
    if length < MIN_PASSWORD_LENGTH {
        ctx.warn(Warning::credential_defaults(format!(
            "{secret} uses a generated {length}-character password without punctuation or \
             uppercase letters; raise password_length for production"
        )));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::WarningKind;

    fn target(managed_database: bool, bastion: bool) -> DeployTarget {
        DeployTarget {
            environment: "stg".to_string(),
            account: "000000000000".to_string(),
            region: "us-east-1".to_string(),
            managed_database,
            bastion,
        }
    }

    fn order(managed_database: bool, bastion: bool) -> Vec<String> {
        let config = Config::template();
        let graph = standard_topology(&config, &target(managed_database, bastion))
            .unwrap()
            .build()
            .unwrap();
        graph
            .order_ids()
            .into_iter()
            .map(|id| id.to_string())
            .collect()
    }

    #[test]
    fn six_units_without_switches() {
        assert_eq!(
            order(false, false),
            [
                "network",
                "shared-storage",
                "cluster",
                "database",
                "cache",
                "application"
            ]
        );
    }

    #[test]
    fn switches_add_managed_database_and_bastion() {
        assert_eq!(
            order(true, true),
            [
                "network",
                "shared-storage",
                "managed-database",
                "cluster",
                "bastion",
                "database",
                "cache",
                "application"
            ]
        );
    }

    #[test]
    fn excluded_units_are_listed() {
        let graph = standard_topology(&Config::template(), &target(false, false))
            .unwrap()
            .build()
            .unwrap();
        let excluded: Vec<&str> = graph.excluded().iter().map(UnitId::as_str).collect();
        assert_eq!(excluded, ["managed-database", "bastion"]);
    }

    #[test]
    fn transitive_reads_are_reported_once_per_producer() {
        let graph = standard_topology(&Config::template(), &target(false, false))
            .unwrap()
            .build()
            .unwrap();
        // database and cache reach storage and network through the cluster;
        // the application also reaches the cluster through them.
        assert_eq!(
            graph
                .diagnostics()
                .count(WarningKind::ImplicitOrdering),
            7
        );
    }

    #[test]
    fn unresolvable_app_env_fails_topology() {
        let mut config = Config::template();
        config.application.env.insert(
            "N8N_LICENSE".to_string(),
            crate::config::EnvValue::FromEnv {
                var: "STACKLINE_TEST_UNSET_LICENSE".to_string(),
                default: None,
            },
        );
        temp_env::with_var_unset("STACKLINE_TEST_UNSET_LICENSE", || {
            assert!(standard_topology(&config, &target(false, false)).is_err());
        });
    }

    #[test]
    fn log_groups_nest_under_prefix() {
        assert_eq!(log_group("n8n-stg", "redis"), "/ecs/n8n-stg/redis");
    }
}
