// ABOUTME: Network unit: virtual network, subnet tiers and the database security groups.
// ABOUTME: Root of the graph; reads nothing and publishes the network facts.

use async_trait::async_trait;

use crate::config::NetworkSettings;
use crate::deploy::{FactRead, Outputs, ProvisionContext, ProvisioningUnit, UnitError};
use crate::facts::Fact;
use crate::provision::{IngressRule, NetworkSpec, Peer, PortRange, ResourceKind, SecurityGroupSpec};
use crate::types::UnitId;

use super::create_security_group;

/// Port the database listener group admits.
const POSTGRES_PORT: u16 = 5432;

pub struct NetworkUnit {
    id: UnitId,
    settings: NetworkSettings,
}

impl NetworkUnit {
    pub fn new(settings: NetworkSettings) -> Self {
        Self {
            id: UnitId::known(UnitId::NETWORK),
            settings,
        }
    }
}

#[async_trait]
impl ProvisioningUnit for NetworkUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn label(&self) -> &str {
        "Network"
    }

    fn inputs(&self) -> Vec<FactRead> {
        Vec::new()
    }

    fn outputs(&self) -> Vec<Fact> {
        vec![
            Fact::VpcId,
            Fact::PublicSubnetIds,
            Fact::PrivateSubnetIds,
            Fact::IsolatedSubnetIds,
            Fact::AvailabilityZones,
            Fact::VpcCidrBlock,
            Fact::DbListenerSecurityGroupId,
            Fact::DbClientSecurityGroupId,
        ]
    }

    async fn provision(&self, ctx: &ProvisionContext<'_>) -> Result<Outputs, UnitError> {
        let prefix = ctx.namespace().prefix();
        let api = ctx.api();

        let spec = NetworkSpec {
            name: format!("{prefix}-vpc"),
            cidr: self.settings.cidr.clone(),
            availability_zones: self
                .settings
                .availability_zones
                .as_ref()
                .map(|zones| zones.iter().cloned().collect())
                .unwrap_or_default(),
            max_azs: usize::from(self.settings.max_azs),
            nat_gateways: self.settings.nat_gateways,
            subnet_mask: self.settings.subnet_mask,
        };
        let network = api.create_network(&spec).await?;
        ctx.record(ResourceKind::Network, &spec.name, network.id.as_str());

        let client = SecurityGroupSpec {
            name: format!("{prefix}-database-client-sg"),
            description: "Allow clients access to database instances".to_string(),
            network: network.id.clone(),
            allow_all_outbound: true,
            ingress: Vec::new(),
        };
        let client_id = create_security_group(ctx, &client).await?;

        let listener = SecurityGroupSpec {
            name: format!("{prefix}-database-listener-sg"),
            description: format!("Database access for {prefix}"),
            network: network.id.clone(),
            allow_all_outbound: true,
            ingress: vec![
                IngressRule::new(
                    Peer::Group(client_id.clone()),
                    PortRange::Tcp(POSTGRES_PORT),
                    "Allow connections from database clients",
                ),
                IngressRule::new(
                    Peer::Cidr(network.cidr.clone()),
                    PortRange::Tcp(POSTGRES_PORT),
                    "Allow connections from the network CIDR",
                ),
            ],
        };
        let listener_id = create_security_group(ctx, &listener).await?;

        let mut out = Outputs::new();
        out.scalar(Fact::VpcId, network.id.as_str())
            .list(
                Fact::PublicSubnetIds,
                network.public_subnets.iter().map(|s| s.as_str()),
            )
            .list(
                Fact::PrivateSubnetIds,
                network.private_subnets.iter().map(|s| s.as_str()),
            )
            .list(
                Fact::IsolatedSubnetIds,
                network.isolated_subnets.iter().map(|s| s.as_str()),
            )
            .list(Fact::AvailabilityZones, network.availability_zones.clone())
            .scalar(Fact::VpcCidrBlock, network.cidr.clone())
            .scalar(Fact::DbListenerSecurityGroupId, listener_id.as_str())
            .scalar(Fact::DbClientSecurityGroupId, client_id.as_str());
        Ok(out)
    }
}
