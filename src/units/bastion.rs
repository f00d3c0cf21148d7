// ABOUTME: Bastion host unit: an SSH-reachable instance with access to storage and the database.
// ABOUTME: Included only when the bastion switch is on.

use async_trait::async_trait;

use crate::config::BastionSettings;
use crate::deploy::{FactRead, Outputs, ProvisionContext, ProvisioningUnit, UnitError};
use crate::facts::Fact;
use crate::provision::{InstanceSpec, ResourceKind, SecretSpec, SecretTemplate};
use crate::types::{SecurityGroupId, SubnetId, UnitId};

use super::{generate_secret, secret_name};

pub struct BastionUnit {
    id: UnitId,
    settings: BastionSettings,
}

impl BastionUnit {
    pub fn new(settings: BastionSettings) -> Self {
        Self {
            id: UnitId::known(UnitId::BASTION),
            settings,
        }
    }
}

#[async_trait]
impl ProvisioningUnit for BastionUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn label(&self) -> &str {
        "BastionHost"
    }

    fn inputs(&self) -> Vec<FactRead> {
        vec![
            FactRead::deferred(Fact::PublicSubnetIds),
            FactRead::eager(Fact::StorageClientSecurityGroupId),
            FactRead::eager(Fact::DbClientSecurityGroupId),
        ]
    }

    fn outputs(&self) -> Vec<Fact> {
        vec![Fact::BastionInstanceId, Fact::BastionSshKeySecretName]
    }

    async fn provision(&self, ctx: &ProvisionContext<'_>) -> Result<Outputs, UnitError> {
        let prefix = ctx.namespace().prefix();
        let subnet = ctx
            .list(Fact::PublicSubnetIds)
            .await?
            .into_iter()
            .next()
            .map(SubnetId::new)
            .ok_or_else(|| UnitError::ProvisioningRejected {
                resource: ResourceKind::Instance,
                reason: "the network has no public subnet".to_string(),
            })?;
        let storage_client =
            SecurityGroupId::new(ctx.scalar(Fact::StorageClientSecurityGroupId).await?);
        let db_client = SecurityGroupId::new(ctx.scalar(Fact::DbClientSecurityGroupId).await?);

        let key_pair = generate_secret(
            ctx,
            &SecretSpec {
                name: secret_name(ctx, Fact::BastionSshKeySecretName),
                description: format!("{prefix} key pair for the bastion host"),
                template: SecretTemplate::KeyPair,
            },
        )
        .await?;

        let spec = InstanceSpec {
            name: format!("{prefix}-bastion-host"),
            instance_type: self.settings.instance_type.clone(),
            subnet,
            security_groups: vec![storage_client, db_client],
            key_pair: key_pair.clone(),
            data_volume_gib: self.settings.data_volume_gib,
        };
        let instance = ctx.api().create_instance(&spec).await?;
        ctx.record(ResourceKind::Instance, &spec.name, instance.as_str());

        let mut out = Outputs::new();
        out.scalar(Fact::BastionInstanceId, instance.as_str())
            .scalar(Fact::BastionSshKeySecretName, key_pair.name);
        Ok(out)
    }
}
