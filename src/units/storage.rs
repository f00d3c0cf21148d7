// ABOUTME: Shared storage unit: network file system, its security groups and per-workload access points.
// ABOUTME: Reads the network through deferred lookups backed by a direct edge.

use async_trait::async_trait;

use crate::config::StorageSettings;
use crate::deploy::{FactRead, Outputs, ProvisionContext, ProvisioningUnit, UnitError};
use crate::facts::Fact;
use crate::provision::{
    AccessPointSpec, FileSystemSpec, IngressRule, Peer, PortRange, ResourceKind,
    SecurityGroupSpec,
};
use crate::types::{FileSystemId, NetworkId, UnitId};

use super::create_security_group;

/// A directory on the file system owned by one workload's user.
struct AccessPoint {
    fact: Fact,
    path: &'static str,
    owner: u32,
    permissions: &'static str,
}

const ACCESS_POINTS: [AccessPoint; 3] = [
    AccessPoint {
        fact: Fact::PostgresAccessPointId,
        path: "/postgresql",
        owner: 999,
        permissions: "750",
    },
    AccessPoint {
        fact: Fact::RedisAccessPointId,
        path: "/redis",
        owner: 999,
        permissions: "750",
    },
    AccessPoint {
        fact: Fact::AppAccessPointId,
        path: "/n8n",
        owner: 1000,
        permissions: "777",
    },
];

pub struct StorageUnit {
    id: UnitId,
    settings: StorageSettings,
}

impl StorageUnit {
    pub fn new(settings: StorageSettings) -> Self {
        Self {
            id: UnitId::known(UnitId::SHARED_STORAGE),
            settings,
        }
    }
}

#[async_trait]
impl ProvisioningUnit for StorageUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn label(&self) -> &str {
        "Efs"
    }

    fn inputs(&self) -> Vec<FactRead> {
        vec![
            FactRead::deferred(Fact::VpcId),
            FactRead::deferred(Fact::VpcCidrBlock),
        ]
    }

    fn outputs(&self) -> Vec<Fact> {
        vec![
            Fact::FileSystemId,
            Fact::PostgresAccessPointId,
            Fact::RedisAccessPointId,
            Fact::AppAccessPointId,
            Fact::StorageListenerSecurityGroupId,
            Fact::StorageClientSecurityGroupId,
        ]
    }

    async fn provision(&self, ctx: &ProvisionContext<'_>) -> Result<Outputs, UnitError> {
        let prefix = ctx.namespace().prefix();
        let api = ctx.api();
        let network = NetworkId::new(ctx.scalar(Fact::VpcId).await?);
        let cidr = ctx.scalar(Fact::VpcCidrBlock).await?;

        let client = SecurityGroupSpec {
            name: format!("{prefix}-efs-client-sg"),
            description: "Allow clients access to the file system".to_string(),
            network: network.clone(),
            allow_all_outbound: true,
            ingress: Vec::new(),
        };
        let client_id = create_security_group(ctx, &client).await?;

        let listener = SecurityGroupSpec {
            name: format!("{prefix}-efs-listener-sg"),
            description: "Security group for the file system".to_string(),
            network: network.clone(),
            allow_all_outbound: true,
            ingress: vec![
                IngressRule::new(
                    Peer::Cidr(cidr),
                    PortRange::AllTraffic,
                    "Allow all traffic from the network CIDR",
                ),
                IngressRule::new(
                    Peer::Group(client_id.clone()),
                    PortRange::AllTraffic,
                    "Allow connections from file system clients",
                ),
                IngressRule::new(Peer::Itself, PortRange::AllTraffic, "Allow all traffic from self"),
            ],
        };
        let listener_id = create_security_group(ctx, &listener).await?;

        let fs = FileSystemSpec {
            name: format!("{prefix}-efs"),
            network,
            security_group: listener_id.clone(),
            encrypted: self.settings.encrypted,
        };
        let fs_id: FileSystemId = api.create_file_system(&fs).await?;
        ctx.record(ResourceKind::FileSystem, &fs.name, fs_id.as_str());

        let mut out = Outputs::new();
        out.scalar(Fact::FileSystemId, fs_id.as_str());

        for point in &ACCESS_POINTS {
            let spec = AccessPointSpec {
                file_system: fs_id.clone(),
                path: point.path.to_string(),
                uid: point.owner,
                gid: point.owner,
                permissions: point.permissions.to_string(),
            };
            let ap = api.create_access_point(&spec).await?;
            ctx.record(ResourceKind::AccessPoint, point.path, ap.as_str());
            out.scalar(point.fact, ap.as_str());
        }

        out.scalar(Fact::StorageListenerSecurityGroupId, listener_id.as_str())
            .scalar(Fact::StorageClientSecurityGroupId, client_id.as_str());
        Ok(out)
    }
}
