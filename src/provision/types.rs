// ABOUTME: Request and handle types shared by the provisioning capability traits.
// ABOUTME: Specs describe what to create; handles carry the identifiers the provider returns.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;

use crate::types::{
    AccessPointId, ClusterId, DatabaseId, DiscoveryName, FileSystemId, ImageRef, LoadBalancerId,
    NamespaceId, NetworkId, SecurityGroupId, SubnetId, WorkloadId,
};

/// Kind of resource a provisioning call creates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    Network,
    SecurityGroup,
    FileSystem,
    AccessPoint,
    Cluster,
    DiscoveryNamespace,
    ManagedDatabase,
    Workload,
    LoadBalancer,
    Instance,
    Secret,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Network => "network",
            ResourceKind::SecurityGroup => "security-group",
            ResourceKind::FileSystem => "file-system",
            ResourceKind::AccessPoint => "access-point",
            ResourceKind::Cluster => "cluster",
            ResourceKind::DiscoveryNamespace => "discovery-namespace",
            ResourceKind::ManagedDatabase => "managed-database",
            ResourceKind::Workload => "workload",
            ResourceKind::LoadBalancer => "load-balancer",
            ResourceKind::Instance => "instance",
            ResourceKind::Secret => "secret",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resource a unit created, as listed in the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRecord {
    pub kind: ResourceKind,
    pub name: String,
    pub id: String,
}

impl ResourceRecord {
    pub fn new(kind: ResourceKind, name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Network
// =============================================================================

#[derive(Debug, Clone)]
pub struct NetworkSpec {
    pub name: String,
    pub cidr: String,
    /// Explicit zones; when empty the provider picks `max_azs` zones.
    pub availability_zones: Vec<String>,
    pub max_azs: usize,
    pub nat_gateways: u8,
    /// Prefix length of every subnet.
    pub subnet_mask: u8,
}

#[derive(Debug, Clone)]
pub struct NetworkHandle {
    pub id: NetworkId,
    pub cidr: String,
    pub availability_zones: Vec<String>,
    pub public_subnets: Vec<SubnetId>,
    pub private_subnets: Vec<SubnetId>,
    pub isolated_subnets: Vec<SubnetId>,
}

#[derive(Debug, Clone)]
pub struct SecurityGroupSpec {
    pub name: String,
    pub description: String,
    pub network: NetworkId,
    pub allow_all_outbound: bool,
    pub ingress: Vec<IngressRule>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngressRule {
    pub peer: Peer,
    pub ports: PortRange,
    pub description: String,
}

impl IngressRule {
    pub fn new(peer: Peer, ports: PortRange, description: impl Into<String>) -> Self {
        Self {
            peer,
            ports,
            description: description.into(),
        }
    }
}

/// Traffic source admitted by an ingress rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Peer {
    Cidr(String),
    Group(SecurityGroupId),
    /// The group the rule is attached to.
    Itself,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortRange {
    Tcp(u16),
    AllTraffic,
}

// =============================================================================
// Shared storage
// =============================================================================

#[derive(Debug, Clone)]
pub struct FileSystemSpec {
    pub name: String,
    pub network: NetworkId,
    pub security_group: SecurityGroupId,
    pub encrypted: bool,
}

#[derive(Debug, Clone)]
pub struct AccessPointSpec {
    pub file_system: FileSystemId,
    pub path: String,
    pub uid: u32,
    pub gid: u32,
    /// Octal permission string applied when the path is created.
    pub permissions: String,
}

// =============================================================================
// Cluster
// =============================================================================

#[derive(Debug, Clone)]
pub struct ClusterSpec {
    pub name: String,
    pub network: NetworkId,
    pub exec_log_retention_days: u32,
    /// File system whose access the cluster's task roles are scoped to.
    pub storage_scope: Option<FileSystemId>,
}

#[derive(Debug, Clone)]
pub struct NamespaceSpec {
    pub name: String,
    pub network: NetworkId,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NamespaceHandle {
    pub id: NamespaceId,
    pub name: String,
    pub arn: String,
}

// =============================================================================
// Managed database
// =============================================================================

#[derive(Debug, Clone)]
pub struct ManagedDatabaseSpec {
    pub identifier: String,
    pub database_name: String,
    pub engine_version: String,
    pub instance_class: String,
    pub network: NetworkId,
    pub subnets: Vec<SubnetId>,
    pub security_groups: Vec<SecurityGroupId>,
    pub credentials: SecretRef,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct ManagedDatabaseHandle {
    pub id: DatabaseId,
    pub endpoint_address: String,
    pub endpoint_port: u16,
}

// =============================================================================
// Workloads and load balancing
// =============================================================================

/// A long-running container service on the cluster.
#[derive(Debug, Clone)]
pub struct WorkloadSpec {
    pub service_name: String,
    pub family: String,
    pub cluster: ClusterId,
    pub image: ImageRef,
    pub cpu: u32,
    pub memory_mib: u32,
    pub env: BTreeMap<String, String>,
    /// Container variables filled from secret fields by the platform.
    pub secrets: BTreeMap<String, SecretField>,
    pub entry_point: Option<Vec<String>>,
    pub command: Option<Vec<String>>,
    pub volume: Option<VolumeSpec>,
    pub container_port: Option<u16>,
    pub healthcheck: Option<HealthCheck>,
    pub discovery: Option<Discovery>,
    pub security_groups: Vec<SecurityGroupId>,
    pub desired_count: u32,
    pub log_group: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretField {
    pub secret: SecretRef,
    pub field: String,
}

impl SecretField {
    pub fn new(secret: &SecretRef, field: impl Into<String>) -> Self {
        Self {
            secret: secret.clone(),
            field: field.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct VolumeSpec {
    pub name: String,
    pub file_system: FileSystemId,
    pub access_point: AccessPointId,
    pub container_path: String,
}

#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub command: Vec<String>,
    pub interval: Duration,
    pub timeout: Duration,
    pub retries: u32,
    pub start_period: Duration,
}

/// Registration of a workload in the private discovery namespace.
#[derive(Debug, Clone)]
pub struct Discovery {
    pub name: DiscoveryName,
    pub namespace: NamespaceId,
    pub port: Option<u16>,
    pub ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct LoadBalancerSpec {
    pub name: String,
    pub network: NetworkId,
    pub subnets: Vec<SubnetId>,
    pub security_group: SecurityGroupId,
    pub internet_facing: bool,
}

#[derive(Debug, Clone)]
pub struct LoadBalancerHandle {
    pub id: LoadBalancerId,
    pub dns_name: String,
}

/// Listener on a load balancer forwarding to a workload.
#[derive(Debug, Clone)]
pub struct ListenerTarget {
    pub load_balancer: LoadBalancerId,
    pub listener_port: u16,
    pub workload: WorkloadId,
    pub target_port: u16,
    pub health_path: String,
    pub interval: Duration,
    pub timeout: Duration,
    pub healthy_threshold: u32,
    pub unhealthy_threshold: u32,
}

// =============================================================================
// Instances
// =============================================================================

#[derive(Debug, Clone)]
pub struct InstanceSpec {
    pub name: String,
    pub instance_type: String,
    pub subnet: SubnetId,
    pub security_groups: Vec<SecurityGroupId>,
    pub key_pair: SecretRef,
    pub data_volume_gib: u32,
}

// =============================================================================
// Secrets
// =============================================================================

#[derive(Debug, Clone)]
pub struct SecretSpec {
    pub name: String,
    pub description: String,
    pub template: SecretTemplate,
}

/// How the secret manager fills a new secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretTemplate {
    /// Random string under `key`, optionally next to a fixed `username`.
    Generated {
        username: Option<String>,
        key: String,
        length: u32,
        exclude_punctuation: bool,
        exclude_uppercase: bool,
    },
    /// Key material for SSH access to an instance.
    KeyPair,
}

impl SecretTemplate {
    pub fn password(username: Option<&str>, length: u32) -> Self {
        SecretTemplate::Generated {
            username: username.map(str::to_string),
            key: "password".to_string(),
            length,
            exclude_punctuation: true,
            exclude_uppercase: true,
        }
    }
}

/// Opaque handle to a stored secret. Credential values never leave the
/// secret manager; only this reference is passed around and published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SecretRef {
    pub name: String,
    pub arn: String,
}
