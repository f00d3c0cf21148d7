// ABOUTME: Cluster unit: container cluster and the private service discovery namespace.
// ABOUTME: Publishes the cluster name and namespace ids that every workload unit reads.

use async_trait::async_trait;

use crate::config::ClusterSettings;
use crate::deploy::{FactRead, Outputs, ProvisionContext, ProvisioningUnit, UnitError};
use crate::facts::Fact;
use crate::provision::{ClusterSpec, NamespaceSpec, ResourceKind};
use crate::types::{FileSystemId, NetworkId, UnitId};

pub struct ClusterUnit {
    id: UnitId,
    settings: ClusterSettings,
}

impl ClusterUnit {
    pub fn new(settings: ClusterSettings) -> Self {
        Self {
            id: UnitId::known(UnitId::CLUSTER),
            settings,
        }
    }
}

#[async_trait]
impl ProvisioningUnit for ClusterUnit {
    fn id(&self) -> &UnitId {
        &self.id
    }

    fn label(&self) -> &str {
        "EcsCluster"
    }

    fn inputs(&self) -> Vec<FactRead> {
        vec![
            FactRead::eager(Fact::VpcId),
            // Task roles are scoped to the shared file system.
            FactRead::eager(Fact::FileSystemId),
        ]
    }

    fn outputs(&self) -> Vec<Fact> {
        vec![
            Fact::ClusterName,
            Fact::NamespaceId,
            Fact::NamespaceName,
            Fact::NamespaceArn,
        ]
    }

    async fn provision(&self, ctx: &ProvisionContext<'_>) -> Result<Outputs, UnitError> {
        let ns = ctx.namespace();
        let prefix = ns.prefix();
        let api = ctx.api();
        let network = NetworkId::new(ctx.scalar(Fact::VpcId).await?);
        let file_system = FileSystemId::new(ctx.scalar(Fact::FileSystemId).await?);

        let cluster = ClusterSpec {
            name: format!("{prefix}-workflow-cluster"),
            network: network.clone(),
            exec_log_retention_days: u32::from(self.settings.exec_log_retention_days),
            storage_scope: Some(file_system),
        };
        let cluster_id = api.create_cluster(&cluster).await?;
        ctx.record(ResourceKind::Cluster, &cluster.name, cluster_id.as_str());

        let discovery = NamespaceSpec {
            name: format!("{prefix}.internal"),
            network,
            description: format!("Private namespace for {} services", ns.app()),
        };
        let handle = api.create_namespace(&discovery).await?;
        ctx.record(
            ResourceKind::DiscoveryNamespace,
            &handle.name,
            handle.id.as_str(),
        );

        let mut out = Outputs::new();
        out.scalar(Fact::ClusterName, cluster.name)
            .scalar(Fact::NamespaceId, handle.id.as_str())
            .scalar(Fact::NamespaceName, handle.name.clone())
            .scalar(Fact::NamespaceArn, handle.arn);
        Ok(out)
    }
}
