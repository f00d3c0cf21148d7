// ABOUTME: Type-safe identifiers and validated domain types.
// ABOUTME: Uses phantom types to prevent resource ID confusion at compile time.

mod discovery_name;
mod id;
mod image_ref;
mod unit_id;

pub use discovery_name::{DiscoveryName, DiscoveryNameError};
pub use id::{
    AccessPointId, ClusterId, DatabaseId, FileSystemId, Id, InstanceId, LoadBalancerId,
    NamespaceId, NetworkId, SecurityGroupId, SubnetId, WorkloadId,
};
pub use image_ref::{ImageRef, ParseImageRefError};
pub use unit_id::{UnitId, UnitIdError};
