// ABOUTME: In-process provisioning backend that fabricates deterministic identifiers.
// ABOUTME: Used by the CLI for dry deployments and by tests; can be told to reject resource kinds.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{
    AccessPointSpec, ClusterOps, ClusterSpec, DatabaseOps, FileSystemSpec, InstanceOps,
    InstanceSpec, ListenerTarget, LoadBalancerHandle, LoadBalancerSpec, ManagedDatabaseHandle,
    ManagedDatabaseSpec, NamespaceHandle, NamespaceSpec, NetworkHandle, NetworkOps, NetworkSpec,
    ProvisionError, ResourceKind, ResourceRecord, SecretOps, SecretRef, SecretSpec,
    SecurityGroupSpec, StorageOps, WorkloadOps, WorkloadSpec,
};
use crate::types::{
    AccessPointId, ClusterId, DatabaseId, FileSystemId, InstanceId, LoadBalancerId,
    NamespaceId, NetworkId, SecurityGroupId, SubnetId, WorkloadId,
};

/// Provisioner that keeps everything in memory.
///
/// Identifiers look like `vpc-0000000a`: a kind prefix plus a counter shared
/// by all resources, so two runs with the same inputs yield the same ids.
#[derive(Debug)]
pub struct LocalProvisioner {
    account: String,
    region: String,
    state: Mutex<LocalState>,
}

#[derive(Debug, Default)]
struct LocalState {
    next: u64,
    rejected: HashMap<ResourceKind, String>,
    created: Vec<ResourceRecord>,
}

impl LocalProvisioner {
    pub fn new(account: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            region: region.into(),
            state: Mutex::new(LocalState::default()),
        }
    }

    /// Fail every future request for `kind` with `reason`.
    pub fn reject(&self, kind: ResourceKind, reason: impl Into<String>) {
        self.state.lock().rejected.insert(kind, reason.into());
    }

    #[must_use]
    pub fn with_rejection(self, kind: ResourceKind, reason: impl Into<String>) -> Self {
        self.reject(kind, reason);
        self
    }

    /// Resources created so far, in creation order.
    pub fn created(&self) -> Vec<ResourceRecord> {
        self.state.lock().created.clone()
    }

    pub fn count(&self, kind: ResourceKind) -> usize {
        self.state
            .lock()
            .created
            .iter()
            .filter(|r| r.kind == kind)
            .count()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    fn check(&self, kind: ResourceKind) -> Result<(), ProvisionError> {
        match self.state.lock().rejected.get(&kind) {
            Some(reason) => Err(ProvisionError::Rejected {
                resource: kind,
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state.lock();
        state.next += 1;
        format!("{}-{:08x}", prefix, state.next)
    }

    /// Check rejection, allocate an id and record the resource.
    fn allocate(
        &self,
        kind: ResourceKind,
        name: &str,
        prefix: &str,
    ) -> Result<String, ProvisionError> {
        self.check(kind)?;
        let id = self.next_id(prefix);
        tracing::debug!("created {} {} as {}", kind, name, id);
        self.state
            .lock()
            .created
            .push(ResourceRecord::new(kind, name, id.clone()));
        Ok(id)
    }

    fn exists(&self, kind: ResourceKind, id: &str) -> bool {
        self.state
            .lock()
            .created
            .iter()
            .any(|r| r.kind == kind && r.id == id)
    }

    fn arn(&self, service: &str, resource: &str) -> String {
        format!(
            "arn:local:{}:{}:{}:{}",
            service, self.region, self.account, resource
        )
    }
}

fn invalid(resource: ResourceKind, reason: impl Into<String>) -> ProvisionError {
    ProvisionError::InvalidRequest {
        resource,
        reason: reason.into(),
    }
}

fn validate_cidr(cidr: &str) -> Result<(), ProvisionError> {
    let bad = || invalid(ResourceKind::Network, format!("invalid CIDR block '{}'", cidr));
    let (addr, mask) = cidr.split_once('/').ok_or_else(bad)?;
    addr.parse::<Ipv4Addr>().map_err(|_| bad())?;
    match mask.parse::<u8>() {
        Ok(m) if m <= 32 => Ok(()),
        _ => Err(bad()),
    }
}

#[async_trait]
impl NetworkOps for LocalProvisioner {
    async fn create_network(&self, spec: &NetworkSpec) -> Result<NetworkHandle, ProvisionError> {
        validate_cidr(&spec.cidr)?;

        let zones: Vec<String> = if spec.availability_zones.is_empty() {
            (0..spec.max_azs)
                .map(|i| format!("{}{}", self.region, char::from(b'a' + (i % 26) as u8)))
                .collect()
        } else {
            spec.availability_zones.clone()
        };
        if zones.is_empty() {
            return Err(invalid(
                ResourceKind::Network,
                "at least one availability zone is required",
            ));
        }

        let id = self.allocate(ResourceKind::Network, &spec.name, "vpc")?;
        let tier = || -> Vec<SubnetId> {
            zones
                .iter()
                .map(|_| SubnetId::new(self.next_id("subnet")))
                .collect()
        };
        let public_subnets = tier();
        let private_subnets = tier();
        let isolated_subnets = tier();

        Ok(NetworkHandle {
            id: NetworkId::new(id),
            cidr: spec.cidr.clone(),
            availability_zones: zones,
            public_subnets,
            private_subnets,
            isolated_subnets,
        })
    }

    async fn create_security_group(
        &self,
        spec: &SecurityGroupSpec,
    ) -> Result<SecurityGroupId, ProvisionError> {
        let id = self.allocate(ResourceKind::SecurityGroup, &spec.name, "sg")?;
        Ok(SecurityGroupId::new(id))
    }
}

#[async_trait]
impl StorageOps for LocalProvisioner {
    async fn create_file_system(
        &self,
        spec: &FileSystemSpec,
    ) -> Result<FileSystemId, ProvisionError> {
        let id = self.allocate(ResourceKind::FileSystem, &spec.name, "fs")?;
        Ok(FileSystemId::new(id))
    }

    async fn create_access_point(
        &self,
        spec: &AccessPointSpec,
    ) -> Result<AccessPointId, ProvisionError> {
        if !spec.path.starts_with('/') {
            return Err(invalid(
                ResourceKind::AccessPoint,
                format!("path '{}' must be absolute", spec.path),
            ));
        }
        if !self.exists(ResourceKind::FileSystem, spec.file_system.as_str()) {
            return Err(invalid(
                ResourceKind::AccessPoint,
                format!("unknown file system {}", spec.file_system),
            ));
        }
        let id = self.allocate(ResourceKind::AccessPoint, &spec.path, "fsap")?;
        Ok(AccessPointId::new(id))
    }
}

#[async_trait]
impl ClusterOps for LocalProvisioner {
    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<ClusterId, ProvisionError> {
        let id = self.allocate(ResourceKind::Cluster, &spec.name, "cluster")?;
        Ok(ClusterId::new(id))
    }

    async fn create_namespace(
        &self,
        spec: &NamespaceSpec,
    ) -> Result<NamespaceHandle, ProvisionError> {
        let id = self.allocate(ResourceKind::DiscoveryNamespace, &spec.name, "ns")?;
        Ok(NamespaceHandle {
            arn: self.arn("servicediscovery", &format!("namespace/{}", id)),
            id: NamespaceId::new(id),
            name: spec.name.clone(),
        })
    }
}

#[async_trait]
impl DatabaseOps for LocalProvisioner {
    async fn create_managed_database(
        &self,
        spec: &ManagedDatabaseSpec,
    ) -> Result<ManagedDatabaseHandle, ProvisionError> {
        if spec.subnets.is_empty() {
            return Err(invalid(
                ResourceKind::ManagedDatabase,
                "a subnet group needs at least one subnet",
            ));
        }
        let id = self.allocate(ResourceKind::ManagedDatabase, &spec.identifier, "db")?;
        Ok(ManagedDatabaseHandle {
            endpoint_address: format!("{}.{}.{}.rds.local", spec.identifier, id, self.region),
            endpoint_port: spec.port,
            id: DatabaseId::new(id),
        })
    }
}

#[async_trait]
impl WorkloadOps for LocalProvisioner {
    async fn create_workload(&self, spec: &WorkloadSpec) -> Result<WorkloadId, ProvisionError> {
        if spec.cpu == 0 || spec.memory_mib == 0 {
            return Err(invalid(
                ResourceKind::Workload,
                format!("{} needs non-zero cpu and memory", spec.service_name),
            ));
        }
        let id = self.allocate(ResourceKind::Workload, &spec.service_name, "svc")?;
        Ok(WorkloadId::new(id))
    }

    async fn create_load_balancer(
        &self,
        spec: &LoadBalancerSpec,
    ) -> Result<LoadBalancerHandle, ProvisionError> {
        let id = self.allocate(ResourceKind::LoadBalancer, &spec.name, "lb")?;
        let scheme = if spec.internet_facing { "" } else { "internal-" };
        Ok(LoadBalancerHandle {
            dns_name: format!("{}{}-{}.{}.elb.local", scheme, spec.name, id, self.region),
            id: LoadBalancerId::new(id),
        })
    }

    async fn attach_target(&self, target: &ListenerTarget) -> Result<(), ProvisionError> {
        self.check(ResourceKind::LoadBalancer)?;
        if !self.exists(ResourceKind::LoadBalancer, target.load_balancer.as_str()) {
            return Err(invalid(
                ResourceKind::LoadBalancer,
                format!("unknown load balancer {}", target.load_balancer),
            ));
        }
        if !self.exists(ResourceKind::Workload, target.workload.as_str()) {
            return Err(invalid(
                ResourceKind::LoadBalancer,
                format!("unknown workload {}", target.workload),
            ));
        }
        tracing::debug!(
            "listener {}:{} -> {}:{}",
            target.load_balancer,
            target.listener_port,
            target.workload,
            target.target_port
        );
        Ok(())
    }
}

#[async_trait]
impl InstanceOps for LocalProvisioner {
    async fn create_instance(&self, spec: &InstanceSpec) -> Result<InstanceId, ProvisionError> {
        let id = self.allocate(ResourceKind::Instance, &spec.name, "i")?;
        Ok(InstanceId::new(id))
    }
}

#[async_trait]
impl SecretOps for LocalProvisioner {
    async fn generate_secret(&self, spec: &SecretSpec) -> Result<SecretRef, ProvisionError> {
        if spec.name.is_empty() {
            return Err(invalid(ResourceKind::Secret, "secret name is empty"));
        }
        let id = self.allocate(ResourceKind::Secret, &spec.name, "secret")?;
        let suffix = id.trim_start_matches("secret-");
        Ok(SecretRef {
            arn: self.arn("secretsmanager", &format!("secret:{}-{}", spec.name, suffix)),
            name: spec.name.clone(),
        })
    }
}
