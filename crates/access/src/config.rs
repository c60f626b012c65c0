//! Configuration module
//!
//! Supports YAML configuration files with module-based organization

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Management access configuration
    #[serde(default)]
    pub access: AccessConfig,
    /// Compaction history storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from YAML file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_yaml(&content)
    }

    /// Load configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_file(&self, path: impl AsRef<std::path::Path>) -> Result<(), ConfigError> {
        let yaml =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;
        std::fs::write(path, yaml).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Ok(())
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.access.validate()
    }
}

/// Datacenter availability mode
///
/// Governs which nodes may be contacted directly for management operations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatacenterAvailability {
    /// Every node is reachable
    #[default]
    All,
    /// Attempt any node, failures are handled by the caller
    Local,
    /// Only nodes of accessible datacenters
    Each,
    /// Only the co-located node
    Sidecar,
}

impl fmt::Display for DatacenterAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatacenterAvailability::All => write!(f, "all"),
            DatacenterAvailability::Local => write!(f, "local"),
            DatacenterAvailability::Each => write!(f, "each"),
            DatacenterAvailability::Sidecar => write!(f, "sidecar"),
        }
    }
}

impl FromStr for DatacenterAvailability {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(DatacenterAvailability::All),
            "local" => Ok(DatacenterAvailability::Local),
            "each" => Ok(DatacenterAvailability::Each),
            "sidecar" => Ok(DatacenterAvailability::Sidecar),
            other => Err(ConfigError::Invalid(format!(
                "unknown datacenter availability: {}",
                other
            ))),
        }
    }
}

/// Management access configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessConfig {
    /// Availability mode
    #[serde(default)]
    pub datacenter_availability: DatacenterAvailability,
    /// Address to use instead of loopback in sidecar mode
    #[serde(default)]
    pub enforced_local_node: Option<String>,
    /// Address of the node this process runs next to
    #[serde(default)]
    pub local_node_address: Option<String>,
    /// Datacenter of the local node
    #[serde(default)]
    pub local_datacenter: Option<String>,
    /// Datacenters reachable at startup
    #[serde(default)]
    pub accessible_datacenters: Vec<String>,
    /// Connection attempt timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            datacenter_availability: DatacenterAvailability::default(),
            enforced_local_node: None,
            local_node_address: None,
            local_datacenter: None,
            accessible_datacenters: Vec::new(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl AccessConfig {
    /// Sidecar deployment, managing the co-located node only
    pub fn is_in_sidecar_mode(&self) -> bool {
        self.datacenter_availability == DatacenterAvailability::Sidecar
    }

    /// Get connect timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// Datacenters accessible at startup, the local one included
    pub fn initial_accessible_datacenters(&self) -> Vec<String> {
        let mut datacenters = self.accessible_datacenters.clone();
        if let Some(local) = &self.local_datacenter {
            if !datacenters.contains(local) {
                datacenters.push(local.clone());
            }
        }
        datacenters
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.connect_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "connect_timeout_secs must be greater than 0".to_string(),
            ));
        }
        if self.is_in_sidecar_mode()
            && self
                .local_node_address
                .as_deref()
                .map_or(true, |addr| addr.trim().is_empty())
        {
            return Err(ConfigError::Invalid(
                "sidecar mode requires local_node_address".to_string(),
            ));
        }
        Ok(())
    }
}

/// Compaction history backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// No history, fallback reads fail
    Disabled,
    /// In-process only
    Memory,
    /// JSON file under `data_dir`
    #[default]
    File,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Data storage directory
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions

fn default_connect_timeout_secs() -> u64 {
    20
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Serialize error: {0}")]
    SerializeError(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_yaml("{}").unwrap();
        assert_eq!(
            config.access.datacenter_availability,
            DatacenterAvailability::All
        );
        assert!(!config.access.is_in_sidecar_mode());
        assert_eq!(config.access.connect_timeout(), Duration::from_secs(20));
        assert_eq!(config.storage.backend, StorageBackend::File);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn test_parse_access_section() {
        let yaml = r#"
access:
  datacenter_availability: each
  local_node_address: 10.0.0.1
  local_datacenter: dc1
  accessible_datacenters: [dc1, dc3]
  connect_timeout_secs: 5
storage:
  backend: memory
log:
  level: debug
"#;
        let config = Config::from_yaml(yaml).unwrap();
        assert_eq!(
            config.access.datacenter_availability,
            DatacenterAvailability::Each
        );
        assert_eq!(config.access.accessible_datacenters, vec!["dc1", "dc3"]);
        assert_eq!(config.access.local_datacenter.as_deref(), Some("dc1"));
        assert_eq!(config.access.connect_timeout_secs, 5);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_initial_accessible_datacenters_include_local() {
        let mut access = AccessConfig {
            accessible_datacenters: vec!["dc1".to_string()],
            local_datacenter: Some("dc2".to_string()),
            ..Default::default()
        };
        assert_eq!(access.initial_accessible_datacenters(), vec!["dc1", "dc2"]);

        access.local_datacenter = Some("dc1".to_string());
        assert_eq!(access.initial_accessible_datacenters(), vec!["dc1"]);

        access.local_datacenter = None;
        access.accessible_datacenters.clear();
        assert!(access.initial_accessible_datacenters().is_empty());
    }

    #[test]
    fn test_sidecar_requires_local_node_address() {
        let err = Config::from_yaml("access:\n  datacenter_availability: sidecar\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let config = Config::from_yaml(
            "access:\n  datacenter_availability: sidecar\n  local_node_address: 127.0.0.1\n",
        )
        .unwrap();
        assert!(config.access.is_in_sidecar_mode());
    }

    #[test]
    fn test_availability_from_str() {
        assert_eq!(
            "SIDECAR".parse::<DatacenterAvailability>().unwrap(),
            DatacenterAvailability::Sidecar
        );
        assert_eq!(DatacenterAvailability::Each.to_string(), "each");
        assert!("nowhere".parse::<DatacenterAvailability>().is_err());
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("access.yaml");

        let mut config = Config::default();
        config.access.datacenter_availability = DatacenterAvailability::Local;
        config.access.enforced_local_node = Some("10.1.1.1".to_string());
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(
            loaded.access.datacenter_availability,
            DatacenterAvailability::Local
        );
        assert_eq!(loaded.access.enforced_local_node.as_deref(), Some("10.1.1.1"));
    }
}
