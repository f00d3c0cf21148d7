// ABOUTME: Closed catalog of every fact units exchange.
// ABOUTME: Maps each logical fact to its category, name and shape.

use std::fmt;

use super::FactShape;
use crate::namespace::{FactKey, Namespace};

/// Every logical fact a unit may publish or read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fact {
    // Network
    VpcId,
    PublicSubnetIds,
    PrivateSubnetIds,
    IsolatedSubnetIds,
    AvailabilityZones,
    VpcCidrBlock,
    DbListenerSecurityGroupId,
    DbClientSecurityGroupId,

    // Shared storage
    FileSystemId,
    PostgresAccessPointId,
    RedisAccessPointId,
    AppAccessPointId,
    StorageListenerSecurityGroupId,
    StorageClientSecurityGroupId,

    // Cluster
    ClusterName,
    NamespaceId,
    NamespaceName,
    NamespaceArn,

    // Database service
    PostgresHost,
    PostgresPort,
    PostgresRootUsername,
    PostgresDatabase,
    PostgresAppUsername,
    PostgresAdminSecretArn,
    PostgresAppSecretArn,
    PostgresAdminSecretName,
    PostgresAppSecretName,

    // Cache service
    RedisHost,
    RedisPort,
    RedisPasswordSecretArn,
    RedisPasswordSecretName,

    // Managed database
    ManagedDbEndpointAddress,
    ManagedDbEndpointPort,
    ManagedDbSecretArn,
    ManagedDbName,
    ManagedDbUsername,

    // Bastion host
    BastionInstanceId,
    BastionSshKeySecretName,
}

impl Fact {
    pub fn category(&self) -> &'static str {
        use Fact::*;
        match self {
            VpcId | PublicSubnetIds | PrivateSubnetIds | IsolatedSubnetIds | AvailabilityZones
            | VpcCidrBlock => "Vpc",
            DbListenerSecurityGroupId | DbClientSecurityGroupId => "Database",
            FileSystemId
            | PostgresAccessPointId
            | RedisAccessPointId
            | AppAccessPointId
            | StorageListenerSecurityGroupId
            | StorageClientSecurityGroupId => "Efs",
            ClusterName => "Ecs",
            NamespaceId | NamespaceName | NamespaceArn => "ServiceDiscovery",
            PostgresHost
            | PostgresPort
            | PostgresRootUsername
            | PostgresDatabase
            | PostgresAppUsername
            | PostgresAdminSecretArn
            | PostgresAppSecretArn
            | PostgresAdminSecretName
            | PostgresAppSecretName => "PostgreSQL",
            RedisHost | RedisPort | RedisPasswordSecretArn | RedisPasswordSecretName => "Redis",
            ManagedDbEndpointAddress
            | ManagedDbEndpointPort
            | ManagedDbSecretArn
            | ManagedDbName
            | ManagedDbUsername => "Database",
            BastionInstanceId | BastionSshKeySecretName => "BastionHost",
        }
    }

    pub fn name(&self) -> &'static str {
        use Fact::*;
        match self {
            VpcId => "Id",
            PublicSubnetIds => "SubnetsId",
            PrivateSubnetIds => "PrivateSubnetsId",
            IsolatedSubnetIds => "IsolatedSubnetsId",
            AvailabilityZones => "AvailabilityZones",
            VpcCidrBlock => "CidrBlock",
            DbListenerSecurityGroupId => "ListenerSecurityGroupId",
            DbClientSecurityGroupId => "ClientSecurityGroupId",
            FileSystemId => "Id",
            PostgresAccessPointId => "PostgresAccessPointId",
            RedisAccessPointId => "RedisAccessPointId",
            AppAccessPointId => "N8nAccessPointId",
            StorageListenerSecurityGroupId => "ListenerSecurityGroupId",
            StorageClientSecurityGroupId => "ClientSecurityGroupId",
            ClusterName => "ClusterName",
            NamespaceId => "NamespaceId",
            NamespaceName => "NamespaceName",
            NamespaceArn => "NamespaceArn",
            PostgresHost => "Host",
            PostgresPort => "Port",
            PostgresRootUsername => "Username",
            PostgresDatabase => "N8nDatabase",
            PostgresAppUsername => "NonRootUser",
            PostgresAdminSecretArn => "AdminSecretArn",
            PostgresAppSecretArn => "AppSecretArn",
            PostgresAdminSecretName => "AdminSecretName",
            PostgresAppSecretName => "AppSecretName",
            RedisHost => "Host",
            RedisPort => "Port",
            RedisPasswordSecretArn => "PasswordSecretArn",
            RedisPasswordSecretName => "PasswordSecretName",
            ManagedDbEndpointAddress => "EndpointAddress",
            ManagedDbEndpointPort => "EndpointPort",
            ManagedDbSecretArn => "SecretArn",
            ManagedDbName => "Name",
            ManagedDbUsername => "Username",
            BastionInstanceId => "instance/id",
            BastionSshKeySecretName => "ssh/key",
        }
    }

    pub fn shape(&self) -> FactShape {
        use Fact::*;
        match self {
            PublicSubnetIds | PrivateSubnetIds | IsolatedSubnetIds | AvailabilityZones => {
                FactShape::List
            }
            _ => FactShape::Scalar,
        }
    }

    /// Key of this fact within `namespace`.
    pub fn key(&self, namespace: &Namespace) -> FactKey {
        namespace.key(self.category(), self.name())
    }

    /// Every fact in the catalog, in declaration order.
    pub fn all() -> &'static [Fact] {
        use Fact::*;
        &[
            VpcId,
            PublicSubnetIds,
            PrivateSubnetIds,
            IsolatedSubnetIds,
            AvailabilityZones,
            VpcCidrBlock,
            DbListenerSecurityGroupId,
            DbClientSecurityGroupId,
            FileSystemId,
            PostgresAccessPointId,
            RedisAccessPointId,
            AppAccessPointId,
            StorageListenerSecurityGroupId,
            StorageClientSecurityGroupId,
            ClusterName,
            NamespaceId,
            NamespaceName,
            NamespaceArn,
            PostgresHost,
            PostgresPort,
            PostgresRootUsername,
            PostgresDatabase,
            PostgresAppUsername,
            PostgresAdminSecretArn,
            PostgresAppSecretArn,
            PostgresAdminSecretName,
            PostgresAppSecretName,
            RedisHost,
            RedisPort,
            RedisPasswordSecretArn,
            RedisPasswordSecretName,
            ManagedDbEndpointAddress,
            ManagedDbEndpointPort,
            ManagedDbSecretArn,
            ManagedDbName,
            ManagedDbUsername,
            BastionInstanceId,
            BastionSshKeySecretName,
        ]
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category(), self.name())
    }
}
