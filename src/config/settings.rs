// ABOUTME: Per-unit settings blocks of stackline.yml.
// ABOUTME: Every field has a default matching the reference n8n deployment.

use std::collections::BTreeMap;

use nonempty::NonEmpty;
use serde::Deserialize;

use super::deserialize::deserialize_zones;
use super::{EnvValue, HealthcheckConfig};
use crate::types::ImageRef;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub cidr: String,
    pub max_azs: u8,
    pub nat_gateways: u8,
    pub subnet_mask: u8,
    /// Explicit zones; the provider picks `max_azs` zones when unset.
    #[serde(deserialize_with = "deserialize_zones")]
    pub availability_zones: Option<NonEmpty<String>>,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            cidr: "10.0.0.0/16".to_string(),
            max_azs: 2,
            nat_gateways: 1,
            subnet_mask: 24,
            availability_zones: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    pub encrypted: bool,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self { encrypted: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClusterSettings {
    pub exec_log_retention_days: u16,
}

impl Default for ClusterSettings {
    fn default() -> Self {
        Self {
            exec_log_retention_days: 7,
        }
    }
}

/// The self-hosted PostgreSQL workload.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub image: ImageRef,
    pub cpu: u32,
    pub memory_mib: u32,
    pub port: u16,
    pub database_name: String,
    pub root_username: String,
    pub app_username: String,
    pub password_length: u8,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            image: ImageRef::from_parts(None, "postgres", Some("16")),
            cpu: 1024,
            memory_mib: 2048,
            port: 5432,
            database_name: "n8n".to_string(),
            root_username: "postgres".to_string(),
            app_username: "n8nuser".to_string(),
            password_length: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ManagedDbSettings {
    pub database_name: String,
    pub username: String,
    pub engine_version: String,
    pub instance_class: String,
    pub port: u16,
}

impl Default for ManagedDbSettings {
    fn default() -> Self {
        Self {
            database_name: "n8n".to_string(),
            username: "n8n".to_string(),
            engine_version: "15.9".to_string(),
            instance_class: "db.t3.small".to_string(),
            port: 5432,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub image: ImageRef,
    pub cpu: u32,
    pub memory_mib: u32,
    pub port: u16,
    pub password_length: u8,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            image: ImageRef::from_parts(None, "redis", Some("7")),
            cpu: 512,
            memory_mib: 1024,
            port: 6379,
            password_length: 8,
        }
    }
}

/// The n8n main and worker workloads.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub image: ImageRef,
    pub cpu: u32,
    pub memory_mib: u32,
    pub port: u16,
    pub listener_port: u16,
    pub desired_count: u32,
    pub timezone: String,
    pub healthcheck: HealthcheckConfig,
    /// Extra container environment, merged over the built-in values.
    pub env: BTreeMap<String, EnvValue>,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            image: ImageRef::from_parts(Some("docker.n8n.io"), "n8nio/n8n", None),
            cpu: 1024,
            memory_mib: 2048,
            port: 5678,
            listener_port: 80,
            desired_count: 1,
            timezone: "America/New_York".to_string(),
            healthcheck: HealthcheckConfig::default(),
            env: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BastionSettings {
    pub instance_type: String,
    pub data_volume_gib: u32,
}

impl Default for BastionSettings {
    fn default() -> Self {
        Self {
            instance_type: "t3.micro".to_string(),
            data_volume_gib: 50,
        }
    }
}
