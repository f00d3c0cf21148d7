// ABOUTME: Database service unit: self-hosted PostgreSQL workload on the cluster.
// ABOUTME: Generates admin and application credentials and publishes connection facts.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::DatabaseSettings;
use crate::deploy::{FactRead, Outputs, ProvisionContext, ProvisioningUnit, UnitError};
use crate::facts::Fact;
use crate::provision::{
    Discovery, HealthCheck, SecretField, SecretSpec, SecretTemplate, VolumeSpec, WorkloadSpec,
};
use crate::types::{
    AccessPointId, ClusterId, DiscoveryName, FileSystemId, NamespaceId, NetworkId,
    SecurityGroupId, UnitId,
};

use super::{
    DISCOVERY_TTL, check_password_length, cluster_access_group, create_workload,
    generate_secret, log_group, secret_name,
};

pub struct DatabaseUnit {
    id: UnitId,
    settings: DatabaseSettings,
}

impl DatabaseUnit {
    pub fn new(settings: DatabaseSettings) -> Self {
        Self {
            id: UnitId::known(UnitId::DATABASE),
            settings,
        }
    }
}

#[async_trait]
impl ProvisioningUnit for DatabaseUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn label(&self) -> &str {
        "ServiceDatabase"
    }

    fn inputs(&self) -> Vec<FactRead> {
        [
            Fact::ClusterName,
            Fact::NamespaceId,
            Fact::NamespaceName,
            Fact::FileSystemId,
            Fact::PostgresAccessPointId,
            Fact::StorageClientSecurityGroupId,
            Fact::DbListenerSecurityGroupId,
            Fact::VpcId,
            Fact::VpcCidrBlock,
        ]
        .into_iter()
        .map(FactRead::eager)
        .collect()
    }

    fn outputs(&self) -> Vec<Fact> {
        vec![
            Fact::PostgresHost,
            Fact::PostgresPort,
            Fact::PostgresRootUsername,
            Fact::PostgresDatabase,
            Fact::PostgresAppUsername,
            Fact::PostgresAdminSecretArn,
            Fact::PostgresAppSecretArn,
            Fact::PostgresAdminSecretName,
            Fact::PostgresAppSecretName,
        ]
    }

    async fn provision(&self, ctx: &ProvisionContext<'_>) -> Result<Outputs, UnitError> {
        let s = &self.settings;
        let ns = ctx.namespace();
        let prefix = ns.prefix();

        let cluster = ClusterId::new(ctx.scalar(Fact::ClusterName).await?);
        let namespace_id = NamespaceId::new(ctx.scalar(Fact::NamespaceId).await?);
        let namespace_name = ctx.scalar(Fact::NamespaceName).await?;
        let file_system = FileSystemId::new(ctx.scalar(Fact::FileSystemId).await?);
        let access_point = AccessPointId::new(ctx.scalar(Fact::PostgresAccessPointId).await?);
        let storage_client =
            SecurityGroupId::new(ctx.scalar(Fact::StorageClientSecurityGroupId).await?);
        let db_listener = SecurityGroupId::new(ctx.scalar(Fact::DbListenerSecurityGroupId).await?);
        let network = NetworkId::new(ctx.scalar(Fact::VpcId).await?);
        let cidr = ctx.scalar(Fact::VpcCidrBlock).await?;

        let admin_name = secret_name(ctx, Fact::PostgresAdminSecretName);
        let admin = generate_secret(
            ctx,
            &SecretSpec {
                name: admin_name.clone(),
                description: format!("PostgreSQL root credentials for {prefix}"),
                template: SecretTemplate::password(
                    Some(s.root_username.as_str()),
                    u32::from(s.password_length),
                ),
            },
        )
        .await?;
        check_password_length(ctx, &admin_name, s.password_length);

        let app_name = secret_name(ctx, Fact::PostgresAppSecretName);
        let app = generate_secret(
            ctx,
            &SecretSpec {
                name: app_name.clone(),
                description: format!("PostgreSQL application credentials for {prefix}"),
                template: SecretTemplate::password(
                    Some(s.app_username.as_str()),
                    u32::from(s.password_length),
                ),
            },
        )
        .await?;
        check_password_length(ctx, &app_name, s.password_length);

        let access = cluster_access_group(
            ctx,
            format!("{prefix}-ecs-cluster-access"),
            &network,
            &cidr,
        )
        .await?;

        let env = BTreeMap::from([
            (
                "PGDATA".to_string(),
                "/var/lib/postgresql/data/pgdata".to_string(),
            ),
            (
                "POSTGRES_INITDB_ARGS".to_string(),
                "--data-checksums".to_string(),
            ),
            ("TARGET_DB_NAME".to_string(), s.database_name.clone()),
            ("DROP_DB".to_string(), "false".to_string()),
            ("ADMIN_SECRET_NAME".to_string(), admin.name.clone()),
            ("APP_SECRET_NAME".to_string(), app.name.clone()),
        ]);
        let secrets = BTreeMap::from([
            ("POSTGRES_USER".to_string(), SecretField::new(&admin, "username")),
            (
                "POSTGRES_PASSWORD".to_string(),
                SecretField::new(&admin, "password"),
            ),
            (
                "POSTGRES_NON_ROOT_USER".to_string(),
                SecretField::new(&app, "username"),
            ),
            (
                "POSTGRES_NON_ROOT_PASSWORD".to_string(),
                SecretField::new(&app, "password"),
            ),
        ]);

        let discovery = DiscoveryName::known("postgres");
        let workload = WorkloadSpec {
            service_name: "postgres-service".to_string(),
            family: format!("{}-postgres-task", ns.app()),
            cluster,
            image: s.image.clone(),
            cpu: s.cpu,
            memory_mib: s.memory_mib,
            env,
            secrets,
            entry_point: None,
            command: None,
            volume: Some(VolumeSpec {
                name: "db_storage".to_string(),
                file_system,
                access_point,
                container_path: "/var/lib/postgresql/data".to_string(),
            }),
            container_port: Some(s.port),
            healthcheck: Some(HealthCheck {
                command: vec![
                    "CMD-SHELL".to_string(),
                    format!("pg_isready -h localhost -U {} -d postgres", s.root_username),
                ],
                interval: Duration::from_secs(5),
                timeout: Duration::from_secs(5),
                retries: 10,
                start_period: Duration::from_secs(10),
            }),
            discovery: Some(Discovery {
                name: discovery.clone(),
                namespace: namespace_id,
                port: Some(s.port),
                ttl: DISCOVERY_TTL,
            }),
            security_groups: vec![storage_client, db_listener, access],
            desired_count: 1,
            log_group: log_group(&prefix, "postgres"),
        };
        create_workload(ctx, &workload).await?;

        let mut out = Outputs::new();
        out.scalar(Fact::PostgresHost, discovery.host_in(&namespace_name))
            .scalar(Fact::PostgresPort, s.port.to_string())
            .scalar(Fact::PostgresRootUsername, s.root_username.clone())
            .scalar(Fact::PostgresDatabase, s.database_name.clone())
            .scalar(Fact::PostgresAppUsername, s.app_username.clone())
            .scalar(Fact::PostgresAdminSecretArn, admin.arn)
            .scalar(Fact::PostgresAppSecretArn, app.arn)
            .scalar(Fact::PostgresAdminSecretName, admin.name)
            .scalar(Fact::PostgresAppSecretName, app.name);
        Ok(out)
    }
}
