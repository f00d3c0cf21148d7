// ABOUTME: Managed database unit: a provider-run PostgreSQL instance, included on demand.
// ABOUTME: Independent of the cluster; sits in the private subnets behind the database listener group.

use async_trait::async_trait;

use crate::config::ManagedDbSettings;
use crate::deploy::{FactRead, Outputs, ProvisionContext, ProvisioningUnit, UnitError};
use crate::facts::Fact;
use crate::provision::{ManagedDatabaseSpec, ResourceKind, SecretSpec, SecretTemplate};
use crate::types::{NetworkId, SecurityGroupId, SubnetId, UnitId};

use super::generate_secret;

pub struct ManagedDatabaseUnit {
    id: UnitId,
    settings: ManagedDbSettings,
}

impl ManagedDatabaseUnit {
    pub fn new(settings: ManagedDbSettings) -> Self {
        Self {
            id: UnitId::known(UnitId::MANAGED_DATABASE),
            settings,
        }
    }
}

#[async_trait]
impl ProvisioningUnit for ManagedDatabaseUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn label(&self) -> &str {
        "Rds"
    }

    fn inputs(&self) -> Vec<FactRead> {
        vec![
            FactRead::deferred(Fact::VpcId),
            FactRead::deferred(Fact::PrivateSubnetIds),
            FactRead::eager(Fact::DbListenerSecurityGroupId),
        ]
    }

    fn outputs(&self) -> Vec<Fact> {
        vec![
            Fact::ManagedDbEndpointAddress,
            Fact::ManagedDbEndpointPort,
            Fact::ManagedDbSecretArn,
            Fact::ManagedDbName,
            Fact::ManagedDbUsername,
        ]
    }

    async fn provision(&self, ctx: &ProvisionContext<'_>) -> Result<Outputs, UnitError> {
        let s = &self.settings;
        let network = NetworkId::new(ctx.scalar(Fact::VpcId).await?);
        let subnets = SubnetId::many(&ctx.list(Fact::PrivateSubnetIds).await?);
        let listener = SecurityGroupId::new(ctx.scalar(Fact::DbListenerSecurityGroupId).await?);

        let credentials = generate_secret(
            ctx,
            &SecretSpec {
                name: format!("{}DatabaseSecret", s.database_name),
                description: format!("Credentials of the {} managed database", s.database_name),
                template: SecretTemplate::password(Some(s.username.as_str()), 30),
            },
        )
        .await?;

        let spec = ManagedDatabaseSpec {
            identifier: s.database_name.clone(),
            database_name: s.database_name.clone(),
            engine_version: s.engine_version.clone(),
            instance_class: s.instance_class.clone(),
            network,
            subnets,
            security_groups: vec![listener],
            credentials: credentials.clone(),
            port: s.port,
        };
        let db = ctx.api().create_managed_database(&spec).await?;
        ctx.record(ResourceKind::ManagedDatabase, &spec.identifier, db.id.as_str());

        let mut out = Outputs::new();
        out.scalar(Fact::ManagedDbEndpointAddress, db.endpoint_address)
            .scalar(Fact::ManagedDbEndpointPort, db.endpoint_port.to_string())
            .scalar(Fact::ManagedDbSecretArn, credentials.arn)
            .scalar(Fact::ManagedDbName, s.database_name.clone())
            .scalar(Fact::ManagedDbUsername, s.username.clone());
        Ok(out)
    }
}
