// ABOUTME: Cache service unit: password-protected Redis workload used as the n8n job queue.
// ABOUTME: Publishes host, port and the password secret reference.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::CacheSettings;
use crate::deploy::{FactRead, Outputs, ProvisionContext, ProvisioningUnit, UnitError};
use crate::facts::Fact;
use crate::provision::{
    Discovery, HealthCheck, IngressRule, Peer, PortRange, SecretField, SecretSpec,
    SecretTemplate, SecurityGroupSpec, VolumeSpec, WorkloadSpec,
};
use crate::types::{
    AccessPointId, ClusterId, DiscoveryName, FileSystemId, NamespaceId, NetworkId,
    SecurityGroupId, UnitId,
};

use super::{
    DISCOVERY_TTL, check_password_length, cluster_access_group, create_security_group,
    create_workload, generate_secret, log_group, secret_name,
};

pub struct CacheUnit {
    id: UnitId,
    settings: CacheSettings,
}

impl CacheUnit {
    pub fn new(settings: CacheSettings) -> Self {
        Self {
            id: UnitId::known(UnitId::CACHE),
            settings,
        }
    }
}

#[async_trait]
impl ProvisioningUnit for CacheUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn label(&self) -> &str {
        "ServiceRedis"
    }

    fn inputs(&self) -> Vec<FactRead> {
        [
            Fact::ClusterName,
            Fact::NamespaceId,
            Fact::NamespaceName,
            Fact::FileSystemId,
            Fact::RedisAccessPointId,
            Fact::StorageClientSecurityGroupId,
            Fact::VpcId,
            Fact::VpcCidrBlock,
        ]
        .into_iter()
        .map(FactRead::eager)
        .collect()
    }

    fn outputs(&self) -> Vec<Fact> {
        vec![
            Fact::RedisHost,
            Fact::RedisPort,
            Fact::RedisPasswordSecretArn,
            Fact::RedisPasswordSecretName,
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
        let access_point = AccessPointId::new(ctx.scalar(Fact::RedisAccessPointId).await?);
        let storage_client =
            SecurityGroupId::new(ctx.scalar(Fact::StorageClientSecurityGroupId).await?);
        let network = NetworkId::new(ctx.scalar(Fact::VpcId).await?);
        let cidr = ctx.scalar(Fact::VpcCidrBlock).await?;

        let cache_group = create_security_group(
            ctx,
            &SecurityGroupSpec {
                name: format!("{prefix}-redis-security-group"),
                description: "Security group for Redis".to_string(),
                network: network.clone(),
                allow_all_outbound: true,
                ingress: vec![IngressRule::new(
                    Peer::Cidr(cidr.clone()),
                    PortRange::Tcp(s.port),
                    "Allow Redis traffic within the network",
                )],
            },
        )
        .await?;
        let access = cluster_access_group(
            ctx,
            format!("{prefix}-ecs-redis-cluster-access"),
            &network,
            &cidr,
        )
        .await?;

        let password_name = secret_name(ctx, Fact::RedisPasswordSecretName);
        let password = generate_secret(
            ctx,
            &SecretSpec {
                name: password_name.clone(),
                description: format!("Redis password for {}", ns.app()),
                template: SecretTemplate::password(None, u32::from(s.password_length)),
            },
        )
        .await?;
        check_password_length(ctx, &password_name, s.password_length);

        let discovery = DiscoveryName::known("redis");
        let workload = WorkloadSpec {
            service_name: "redis-service".to_string(),
            family: format!("{}-redis-task", ns.app()),
            cluster,
            image: s.image.clone(),
            cpu: s.cpu,
            memory_mib: s.memory_mib,
            env: BTreeMap::new(),
            secrets: BTreeMap::from([(
                "REDIS_PASSWORD".to_string(),
                SecretField::new(&password, "password"),
            )]),
            entry_point: None,
            command: Some(vec![
                "sh".to_string(),
                "-c".to_string(),
                "exec redis-server --requirepass $REDIS_PASSWORD".to_string(),
            ]),
            volume: Some(VolumeSpec {
                name: "redis_data".to_string(),
                file_system,
                access_point,
                container_path: "/data".to_string(),
            }),
            container_port: Some(s.port),
            healthcheck: Some(HealthCheck {
                command: vec!["CMD-SHELL".to_string(), "redis-cli ping || exit 1".to_string()],
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
            security_groups: vec![storage_client, cache_group, access],
            desired_count: 1,
            log_group: log_group(&prefix, "redis"),
        };
        create_workload(ctx, &workload).await?;

        let mut out = Outputs::new();
        out.scalar(Fact::RedisHost, discovery.host_in(&namespace_name))
            .scalar(Fact::RedisPort, s.port.to_string())
            .scalar(Fact::RedisPasswordSecretArn, password.arn)
            .scalar(Fact::RedisPasswordSecretName, password.name);
        Ok(out)
    }
}
