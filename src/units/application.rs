// ABOUTME: Application service unit: n8n main and worker workloads behind a public load balancer.
// ABOUTME: Terminal node; consumes database, cache, storage and cluster facts and publishes nothing.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::config::ApplicationSettings;
use crate::deploy::{FactRead, Outputs, ProvisionContext, ProvisioningUnit, UnitError};
use crate::facts::Fact;
use crate::provision::{
    Discovery, HealthCheck, IngressRule, ListenerTarget, LoadBalancerSpec, Peer, PortRange,
    ResourceKind, SecretField, SecretRef, SecretSpec, SecretTemplate, SecurityGroupSpec,
    VolumeSpec, WorkloadSpec,
};
use crate::types::{
    AccessPointId, ClusterId, DiscoveryName, FileSystemId, NamespaceId, NetworkId,
    SecurityGroupId, SubnetId, UnitId,
};

use super::{
    DISCOVERY_TTL, cluster_access_group, create_security_group, create_workload,
    generate_secret, log_group,
};

const START_COMMAND: &str = "node /usr/local/lib/node_modules/n8n/bin/n8n start";

pub struct ApplicationUnit {
    id: UnitId,
    settings: ApplicationSettings,
    /// Operator-supplied container variables, already resolved.
    extra_env: BTreeMap<String, String>,
}

impl ApplicationUnit {
    pub fn new(settings: ApplicationSettings, extra_env: BTreeMap<String, String>) -> Self {
        Self {
            id: UnitId::known(UnitId::APPLICATION),
            settings,
            extra_env,
        }
    }

    /// Variables shared by the main and worker containers.
    fn shared_env(&self, facts: &ConnectionFacts) -> BTreeMap<String, String> {
        let mut env: BTreeMap<String, String> = [
            ("DB_TYPE", "postgresdb"),
            ("DB_POSTGRESDB_HOST", facts.db_host.as_str()),
            ("DB_POSTGRESDB_PORT", facts.db_port.as_str()),
            ("DB_POSTGRESDB_DATABASE", facts.db_name.as_str()),
            ("DB_POSTGRESDB_CONNECTION_TIMEOUT", "60000"),
            ("DB_POSTGRESDB_CONNECTION_RETRIES", "3"),
            ("N8N_ENFORCE_SETTINGS_FILE_PERMISSIONS", "false"),
            ("N8N_SECURE_COOKIE", "false"),
            ("N8N_METRICS", "true"),
            ("N8N_RUNNERS_ENABLED", "true"),
            ("GENERIC_TIMEZONE", self.settings.timezone.as_str()),
            ("EXECUTIONS_MODE", "queue"),
            ("QUEUE_BULL_REDIS_HOST", facts.redis_host.as_str()),
            ("QUEUE_BULL_REDIS_PORT", facts.redis_port.as_str()),
            ("QUEUE_BULL_REDIS_USERNAME", "default"),
            ("QUEUE_HEALTH_CHECK_ACTIVE", "true"),
            ("OFFLOAD_MANUAL_EXECUTIONS_TO_WORKERS", "true"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        env.extend(self.extra_env.clone());
        env
    }
}

/// Connection details read from the database and cache services.
struct ConnectionFacts {
    db_host: String,
    db_port: String,
    db_name: String,
    db_secret: SecretRef,
    redis_host: String,
    redis_port: String,
    redis_secret: SecretRef,
}

impl ConnectionFacts {
    async fn read(ctx: &ProvisionContext<'_>) -> Result<Self, UnitError> {
        Ok(Self {
            db_host: ctx.scalar(Fact::PostgresHost).await?,
            db_port: ctx.scalar(Fact::PostgresPort).await?,
            db_name: ctx.scalar(Fact::PostgresDatabase).await?,
            db_secret: SecretRef {
                name: ctx.scalar(Fact::PostgresAppSecretName).await?,
                arn: ctx.scalar(Fact::PostgresAppSecretArn).await?,
            },
            redis_host: ctx.scalar(Fact::RedisHost).await?,
            redis_port: ctx.scalar(Fact::RedisPort).await?,
            redis_secret: SecretRef {
                name: ctx.scalar(Fact::RedisPasswordSecretName).await?,
                arn: ctx.scalar(Fact::RedisPasswordSecretArn).await?,
            },
        })
    }

    fn secrets(&self, encryption_key: &SecretRef) -> BTreeMap<String, SecretField> {
        BTreeMap::from([
            (
                "N8N_ENCRYPTION_KEY".to_string(),
                SecretField::new(encryption_key, "ENCRYPTION_KEY"),
            ),
            (
                "QUEUE_BULL_REDIS_PASSWORD".to_string(),
                SecretField::new(&self.redis_secret, "password"),
            ),
            (
                "DB_POSTGRESDB_USER".to_string(),
                SecretField::new(&self.db_secret, "username"),
            ),
            (
                "DB_POSTGRESDB_PASSWORD".to_string(),
                SecretField::new(&self.db_secret, "password"),
            ),
        ])
    }
}

#[async_trait]
impl ProvisioningUnit for ApplicationUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn label(&self) -> &str {
        "N8NService"
    }

    // Every database and cache output is declared, so a service that
    // published only part of its facts stops the run before anything here
    // is created.
    fn inputs(&self) -> Vec<FactRead> {
        [
            Fact::ClusterName,
            Fact::NamespaceId,
            Fact::NamespaceName,
            Fact::FileSystemId,
            Fact::AppAccessPointId,
            Fact::StorageClientSecurityGroupId,
            Fact::DbClientSecurityGroupId,
            Fact::VpcId,
            Fact::VpcCidrBlock,
            Fact::PublicSubnetIds,
            Fact::PostgresHost,
            Fact::PostgresPort,
            Fact::PostgresRootUsername,
            Fact::PostgresDatabase,
            Fact::PostgresAppUsername,
            Fact::PostgresAdminSecretArn,
            Fact::PostgresAppSecretArn,
            Fact::PostgresAdminSecretName,
            Fact::PostgresAppSecretName,
            Fact::RedisHost,
            Fact::RedisPort,
            Fact::RedisPasswordSecretArn,
            Fact::RedisPasswordSecretName,
        ]
        .into_iter()
        .map(FactRead::eager)
        .collect()
    }

    fn outputs(&self) -> Vec<Fact> {
        Vec::new()
    }

    async fn provision(&self, ctx: &ProvisionContext<'_>) -> Result<Outputs, UnitError> {
        let s = &self.settings;
        let ns = ctx.namespace();
        let prefix = ns.prefix();

        let cluster = ClusterId::new(ctx.scalar(Fact::ClusterName).await?);
        let namespace_id = NamespaceId::new(ctx.scalar(Fact::NamespaceId).await?);
        let file_system = FileSystemId::new(ctx.scalar(Fact::FileSystemId).await?);
        let access_point = AccessPointId::new(ctx.scalar(Fact::AppAccessPointId).await?);
        let storage_client =
            SecurityGroupId::new(ctx.scalar(Fact::StorageClientSecurityGroupId).await?);
        let db_client = SecurityGroupId::new(ctx.scalar(Fact::DbClientSecurityGroupId).await?);
        let network = NetworkId::new(ctx.scalar(Fact::VpcId).await?);
        let cidr = ctx.scalar(Fact::VpcCidrBlock).await?;
        let public_subnets = SubnetId::many(&ctx.list(Fact::PublicSubnetIds).await?);
        let facts = ConnectionFacts::read(ctx).await?;

        let encryption_key = generate_secret(
            ctx,
            &SecretSpec {
                name: format!("/{prefix}/encryption-key"),
                description: format!("Encryption key for {}", ns.app()),
                template: SecretTemplate::Generated {
                    username: None,
                    key: "ENCRYPTION_KEY".to_string(),
                    length: 32,
                    exclude_punctuation: false,
                    exclude_uppercase: false,
                },
            },
        )
        .await?;

        let service_group = create_security_group(
            ctx,
            &SecurityGroupSpec {
                name: format!("{prefix}-main-service-sg"),
                description: format!("Security group for {} services", ns.app()),
                network: network.clone(),
                allow_all_outbound: true,
                ingress: vec![
                    IngressRule::new(
                        Peer::Cidr("0.0.0.0/0".to_string()),
                        PortRange::Tcp(s.listener_port),
                        "Allow public traffic to the listener",
                    ),
                    IngressRule::new(
                        Peer::Itself,
                        PortRange::Tcp(s.port),
                        "Allow the load balancer to reach the workloads",
                    ),
                ],
            },
        )
        .await?;
        let access = cluster_access_group(
            ctx,
            format!("{prefix}-ecs-main-cluster-access"),
            &network,
            &cidr,
        )
        .await?;

        let lb_spec = LoadBalancerSpec {
            name: format!("{prefix}-n8n-alb"),
            network,
            subnets: public_subnets,
            security_group: service_group.clone(),
            internet_facing: true,
        };
        let lb = ctx.api().create_load_balancer(&lb_spec).await?;
        ctx.record(ResourceKind::LoadBalancer, &lb_spec.name, lb.id.as_str());

        let shared_env = self.shared_env(&facts);
        let secrets = facts.secrets(&encryption_key);
        let volume = VolumeSpec {
            name: "n8n_storage".to_string(),
            file_system,
            access_point,
            container_path: "/home/node/.n8n".to_string(),
        };
        let security_groups = vec![service_group, db_client, storage_client, access];
        let webhook = format!("http://{}", lb.dns_name);

        let mut main_env = shared_env.clone();
        main_env.insert("WEBHOOK_URL".to_string(), webhook.clone());
        main_env.insert("N8N_WEBHOOK_URL".to_string(), webhook);

        let hc = &s.healthcheck;
        let main = WorkloadSpec {
            service_name: "n8n-service".to_string(),
            family: format!("{}-main-task", ns.app()),
            cluster: cluster.clone(),
            image: s.image.clone(),
            cpu: s.cpu,
            memory_mib: s.memory_mib,
            env: main_env,
            secrets: secrets.clone(),
            entry_point: Some(vec!["/bin/sh".to_string(), "-c".to_string()]),
            command: Some(vec![START_COMMAND.to_string()]),
            volume: Some(volume.clone()),
            container_port: Some(s.port),
            healthcheck: Some(HealthCheck {
                command: vec![
                    "CMD-SHELL".to_string(),
                    format!(
                        "wget --spider --quiet --tries=1 --timeout=5 http://localhost:{}{} || exit 1",
                        s.port, hc.path
                    ),
                ],
                interval: hc.interval,
                timeout: hc.timeout,
                retries: hc.retries,
                start_period: hc.start_period,
            }),
            discovery: Some(Discovery {
                name: DiscoveryName::known("n8n"),
                namespace: namespace_id.clone(),
                port: Some(s.port),
                ttl: DISCOVERY_TTL,
            }),
            security_groups: security_groups.clone(),
            desired_count: s.desired_count,
            log_group: log_group(&prefix, "n8n"),
        };
        let main_id = create_workload(ctx, &main).await?;

        let worker = WorkloadSpec {
            service_name: "n8n-worker-service".to_string(),
            family: format!("{}-worker-task", ns.app()),
            cluster,
            image: s.image.clone(),
            cpu: s.cpu,
            memory_mib: s.memory_mib,
            env: shared_env,
            secrets,
            entry_point: None,
            command: Some(vec!["worker".to_string()]),
            volume: Some(volume),
            container_port: None,
            healthcheck: None,
            discovery: Some(Discovery {
                name: DiscoveryName::known("n8n-worker"),
                namespace: namespace_id,
                port: None,
                ttl: DISCOVERY_TTL,
            }),
            security_groups,
            desired_count: s.desired_count,
            log_group: log_group(&prefix, "n8n-worker"),
        };
        create_workload(ctx, &worker).await?;

        ctx.api()
            .attach_target(&ListenerTarget {
                load_balancer: lb.id,
                listener_port: s.listener_port,
                workload: main_id,
                target_port: s.port,
                health_path: hc.path.clone(),
                interval: hc.interval,
                timeout: hc.timeout,
                healthy_threshold: hc.healthy_threshold,
                unhealthy_threshold: hc.unhealthy_threshold,
            })
            .await?;
        tracing::debug!("{} listening on port {}", lb.dns_name, s.listener_port);

        Ok(Outputs::new())
    }
}
