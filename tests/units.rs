// ABOUTME: Integration tests for the concrete n8n units and the standard topology.
// ABOUTME: Checks declared fact contracts and the resources each unit asks the provider for.

mod support;

use std::collections::HashSet;
use std::sync::Arc;

use stackline::config::{Config, DeployTarget};
use stackline::deploy::{Driver, ProvisioningUnit, ReadMode, RunErrorKind};
use stackline::facts::{Fact, FactValue, MemoryFactStore, publish};
use stackline::namespace::Namespace;
use stackline::provision::{LocalProvisioner, ResourceKind};
use stackline::units::{
    ApplicationUnit, BastionUnit, CacheUnit, ClusterUnit, DatabaseUnit, ManagedDatabaseUnit,
    NetworkUnit, StorageUnit, standard_topology,
};
use support::unit_id;

fn ns() -> Namespace {
    Namespace::new("n8n", "stg")
}

fn all_units() -> Vec<Box<dyn ProvisioningUnit>> {
    let config = Config::template();
    vec![
        Box::new(NetworkUnit::new(config.network.clone())),
        Box::new(StorageUnit::new(config.storage.clone())),
        Box::new(ManagedDatabaseUnit::new(config.managed_db.clone())),
        Box::new(ClusterUnit::new(config.cluster.clone())),
        Box::new(BastionUnit::new(config.bastion_host.clone())),
        Box::new(DatabaseUnit::new(config.database.clone())),
        Box::new(CacheUnit::new(config.cache.clone())),
        Box::new(ApplicationUnit::new(
            config.application.clone(),
            Default::default(),
        )),
    ]
}

mod contracts {
    use super::*;

    #[test]
    fn every_catalog_fact_has_exactly_one_producer() {
        let mut seen = HashSet::new();
        for unit in all_units() {
            for fact in unit.outputs() {
                assert!(seen.insert(fact), "{fact} produced twice");
            }
        }
        assert_eq!(seen.len(), Fact::all().len());
    }

    #[test]
    fn network_reads_nothing() {
        let config = Config::template();
        assert!(NetworkUnit::new(config.network).inputs().is_empty());
    }

    #[test]
    fn application_is_terminal() {
        let config = Config::template();
        let app = ApplicationUnit::new(config.application, Default::default());
        assert!(app.outputs().is_empty());
        let reads: HashSet<Fact> = app.inputs().into_iter().map(|r| r.fact).collect();
        for fact in [
            Fact::PostgresHost,
            Fact::PostgresAppSecretArn,
            Fact::RedisHost,
            Fact::RedisPasswordSecretName,
            Fact::ClusterName,
            Fact::NamespaceId,
        ] {
            assert!(reads.contains(&fact), "application should read {fact}");
        }
    }

    #[test]
    fn workload_units_read_eagerly() {
        let config = Config::template();
        let units: Vec<Box<dyn ProvisioningUnit>> = vec![
            Box::new(DatabaseUnit::new(config.database)),
            Box::new(CacheUnit::new(config.cache)),
            Box::new(ApplicationUnit::new(config.application, Default::default())),
        ];
        for unit in units {
            assert!(
                unit.inputs().iter().all(|r| r.mode == ReadMode::Eager),
                "{} has a deferred read",
                unit.id()
            );
        }
    }

    #[test]
    fn storage_reads_the_network_deferred() {
        let storage = StorageUnit::new(Config::template().storage);
        let modes: Vec<(Fact, ReadMode)> =
            storage.inputs().into_iter().map(|r| (r.fact, r.mode)).collect();
        assert_eq!(
            modes,
            [
                (Fact::VpcId, ReadMode::Deferred),
                (Fact::VpcCidrBlock, ReadMode::Deferred)
            ]
        );
    }

    #[test]
    fn labels_name_the_stacks() {
        let labels: Vec<String> = all_units()
            .iter()
            .map(|u| ns().stack_name(u.label()))
            .collect();
        assert_eq!(labels[0], "N8nStgNetworkStack");
        assert_eq!(labels[1], "N8nStgEfsStack");
        assert_eq!(labels[7], "N8nStgN8NServiceStack");
    }
}

mod resources {
    use super::*;

    async fn deploy(target: DeployTarget) -> Arc<LocalProvisioner> {
        let api = Arc::new(LocalProvisioner::new("000000000000", "us-east-1"));
        let graph = standard_topology(&Config::template(), &target)
            .unwrap()
            .build()
            .unwrap();
        Driver::new(ns(), Arc::new(MemoryFactStore::new()), api.clone())
            .run(&graph)
            .await
            .unwrap();
        api
    }

    fn target(managed_database: bool, bastion: bool) -> DeployTarget {
        DeployTarget {
            environment: "stg".to_string(),
            account: "000000000000".to_string(),
            region: "us-east-1".to_string(),
            managed_database,
            bastion,
        }
    }

    fn names(api: &LocalProvisioner, kind: ResourceKind) -> Vec<String> {
        api.created()
            .into_iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.name)
            .collect()
    }

    #[tokio::test]
    async fn resource_names_carry_the_namespace_prefix() {
        support::init_tracing();
        let api = deploy(target(false, false)).await;

        assert_eq!(names(&api, ResourceKind::Network), ["n8n-stg-vpc"]);
        assert_eq!(names(&api, ResourceKind::FileSystem), ["n8n-stg-efs"]);
        assert_eq!(
            names(&api, ResourceKind::Cluster),
            ["n8n-stg-workflow-cluster"]
        );
        assert_eq!(
            names(&api, ResourceKind::DiscoveryNamespace),
            ["n8n-stg.internal"]
        );
    }

    #[tokio::test]
    async fn storage_has_one_access_point_per_workload() {
        let api = deploy(target(false, false)).await;
        assert_eq!(
            names(&api, ResourceKind::AccessPoint),
            ["/postgresql", "/redis", "/n8n"]
        );
    }

    #[tokio::test]
    async fn workloads_in_deployment_order() {
        let api = deploy(target(false, false)).await;
        assert_eq!(
            names(&api, ResourceKind::Workload),
            [
                "postgres-service",
                "redis-service",
                "n8n-service",
                "n8n-worker-service"
            ]
        );
    }

    #[tokio::test]
    async fn secrets_are_named_after_their_facts() {
        let api = deploy(target(false, false)).await;
        assert_eq!(
            names(&api, ResourceKind::Secret),
            [
                "/n8n/stg/PostgreSQL/AdminSecretName",
                "/n8n/stg/PostgreSQL/AppSecretName",
                "/n8n/stg/Redis/PasswordSecretName",
                "/n8n-stg/encryption-key"
            ]
        );
    }

    #[tokio::test]
    async fn optional_units_add_their_resources() {
        let api = deploy(target(true, true)).await;
        assert_eq!(names(&api, ResourceKind::ManagedDatabase), ["n8n"]);
        assert_eq!(names(&api, ResourceKind::Instance), ["n8n-stg-bastion-host"]);
        assert!(
            names(&api, ResourceKind::Secret).contains(&"n8nDatabaseSecret".to_string())
        );
    }

    #[tokio::test]
    async fn optional_units_stay_out_when_switched_off() {
        let api = deploy(target(false, false)).await;
        assert_eq!(api.count(ResourceKind::ManagedDatabase), 0);
        assert_eq!(api.count(ResourceKind::Instance), 0);
    }
}

mod bastion {
    use super::*;

    #[tokio::test]
    async fn network_without_public_subnets_is_rejected() {
        let store = Arc::new(MemoryFactStore::new());
        let seed = [
            (Fact::PublicSubnetIds, FactValue::list(Vec::<String>::new())),
            (Fact::StorageClientSecurityGroupId, FactValue::scalar("sg-efs")),
            (Fact::DbClientSecurityGroupId, FactValue::scalar("sg-db")),
        ];
        for (fact, value) in seed {
            publish(store.as_ref(), &fact.key(&ns()), value)
                .await
                .unwrap();
        }

        let target = DeployTarget {
            environment: "stg".to_string(),
            account: "000000000000".to_string(),
            region: "us-east-1".to_string(),
            managed_database: false,
            bastion: true,
        };
        let graph = standard_topology(&Config::template(), &target)
            .unwrap()
            .build()
            .unwrap();
        let api = Arc::new(LocalProvisioner::new("000000000000", "us-east-1"));
        let err = Driver::new(ns(), store, api.clone())
            .run_selected(&graph, &[unit_id("bastion")])
            .await
            .unwrap_err();

        assert_eq!(err.kind(), RunErrorKind::ProvisioningRejected);
        assert!(err.to_string().contains("no public subnet"));
        assert_eq!(api.count(ResourceKind::Secret), 0);
    }
}
