// ABOUTME: Phantom-typed identifiers for provisioned cloud resources.
// ABOUTME: Prevents accidental swapping of network, subnet, security group and other IDs.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// Marker types for phantom type parameters.
/// Using empty enums prevents instantiation and requires no trait bounds.
pub enum NetworkMarker {}
pub enum SubnetMarker {}
pub enum SecurityGroupMarker {}
pub enum FileSystemMarker {}
pub enum AccessPointMarker {}
pub enum ClusterMarker {}
pub enum NamespaceMarker {}
pub enum WorkloadMarker {}
pub enum LoadBalancerMarker {}
pub enum InstanceMarker {}
pub enum DatabaseMarker {}

/// Identifier returned by the provisioning API for one resource.
///
/// The phantom parameter keeps a `SecurityGroupId` from being passed where a
/// `SubnetId` is expected. Facts cross unit boundaries as plain strings; units
/// wrap them back into typed IDs when they hand them to the provisioning API.
#[must_use = "IDs reference resources and should not be ignored"]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn into_inner(self) -> String {
        self.value
    }

    /// Wrap a list of raw identifiers, typically a list-valued fact.
    pub fn many(values: &[String]) -> Vec<Self> {
        values.iter().map(|v| Self::new(v.clone())).collect()
    }
}

// Manual trait implementations that don't require T to implement the trait.
// T is only a phantom marker.

impl<T> std::fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Id").field("value", &self.value).finish()
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> std::fmt::Display for Id<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> From<Id<T>> for String {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.value.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Id<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(Self::new(value))
    }
}

pub type NetworkId = Id<NetworkMarker>;
pub type SubnetId = Id<SubnetMarker>;
pub type SecurityGroupId = Id<SecurityGroupMarker>;
pub type FileSystemId = Id<FileSystemMarker>;
pub type AccessPointId = Id<AccessPointMarker>;
pub type ClusterId = Id<ClusterMarker>;
pub type NamespaceId = Id<NamespaceMarker>;
pub type WorkloadId = Id<WorkloadMarker>;
pub type LoadBalancerId = Id<LoadBalancerMarker>;
pub type InstanceId = Id<InstanceMarker>;
pub type DatabaseId = Id<DatabaseMarker>;
