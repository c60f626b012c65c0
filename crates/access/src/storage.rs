//! Compaction history storage
//!
//! Keeps the last known active compactions per `(cluster, host)` so nodes
//! that cannot be reached directly still have a compaction view.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::{StorageBackend, StorageConfig};
use crate::metadata::Compaction;

/// Storage error
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("No compaction history backend configured")]
    Unavailable,
}

/// Last known compactions of nodes
#[async_trait]
pub trait CompactionStore: Send + Sync {
    /// Last stored compactions of a host, empty if none were recorded
    async fn list_compactions(
        &self,
        cluster_name: &str,
        hostname: &str,
    ) -> Result<Vec<Compaction>, StorageError>;

    /// Replace the stored compactions of a host
    async fn store_compactions(
        &self,
        cluster_name: &str,
        hostname: &str,
        compactions: Vec<Compaction>,
    ) -> Result<(), StorageError>;
}

/// Open the history store selected by configuration
pub fn open_store(config: &StorageConfig) -> Option<Arc<dyn CompactionStore>> {
    match config.backend {
        StorageBackend::Disabled => None,
        StorageBackend::Memory => Some(Arc::new(MemoryCompactionStore::new())),
        StorageBackend::File => Some(Arc::new(FileCompactionStore::new(&config.data_dir))),
    }
}

/// Compactions recorded for one host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompactionSnapshot {
    pub recorded_at: DateTime<Utc>,
    pub compactions: Vec<Compaction>,
}

impl CompactionSnapshot {
    fn new(compactions: Vec<Compaction>) -> Self {
        Self {
            recorded_at: Utc::now(),
            compactions,
        }
    }
}

/// cluster -> host -> snapshot
type SnapshotTable = HashMap<String, HashMap<String, CompactionSnapshot>>;

/// In-memory store
#[derive(Default)]
pub struct MemoryCompactionStore {
    snapshots: RwLock<SnapshotTable>,
}

impl MemoryCompactionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompactionStore for MemoryCompactionStore {
    async fn list_compactions(
        &self,
        cluster_name: &str,
        hostname: &str,
    ) -> Result<Vec<Compaction>, StorageError> {
        Ok(self
            .snapshots
            .read()
            .get(cluster_name)
            .and_then(|hosts| hosts.get(hostname))
            .map(|snapshot| snapshot.compactions.clone())
            .unwrap_or_default())
    }

    async fn store_compactions(
        &self,
        cluster_name: &str,
        hostname: &str,
        compactions: Vec<Compaction>,
    ) -> Result<(), StorageError> {
        self.snapshots
            .write()
            .entry(cluster_name.to_string())
            .or_default()
            .insert(hostname.to_string(), CompactionSnapshot::new(compactions));
        Ok(())
    }
}

/// File store
///
/// All snapshots live in one JSON document under the data directory.
pub struct FileCompactionStore {
    /// Data directory
    data_dir: PathBuf,
    /// Snapshot file path
    snapshot_path: PathBuf,
    /// Serializes read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileCompactionStore {
    /// Create file storage
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        let snapshot_path = data_dir.join("compactions.json");
        Self {
            data_dir,
            snapshot_path,
            write_lock: Mutex::new(()),
        }
    }

    /// Snapshot file path
    pub fn path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Ensure data directory exists
    async fn ensure_dir(&self) -> Result<(), StorageError> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir).await?;
            info!("Created data directory: {:?}", self.data_dir);
        }
        Ok(())
    }

    async fn load(&self) -> Result<SnapshotTable, StorageError> {
        if !self.snapshot_path.exists() {
            debug!("Compaction history file not found: {:?}", self.snapshot_path);
            return Ok(SnapshotTable::new());
        }

        let content = fs::read_to_string(&self.snapshot_path).await?;
        serde_json::from_str(&content).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn save(&self, table: &SnapshotTable) -> Result<(), StorageError> {
        self.ensure_dir().await?;

        // Write to temp file first, then atomically rename
        let temp_path = self.snapshot_path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(table)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        fs::write(&temp_path, &content).await?;
        fs::rename(&temp_path, &self.snapshot_path).await?;
        Ok(())
    }

    /// Full snapshot of a host, including when it was recorded
    pub async fn snapshot(
        &self,
        cluster_name: &str,
        hostname: &str,
    ) -> Result<Option<CompactionSnapshot>, StorageError> {
        let mut table = self.load().await?;
        Ok(table
            .get_mut(cluster_name)
            .and_then(|hosts| hosts.remove(hostname)))
    }
}

#[async_trait]
impl CompactionStore for FileCompactionStore {
    async fn list_compactions(
        &self,
        cluster_name: &str,
        hostname: &str,
    ) -> Result<Vec<Compaction>, StorageError> {
        Ok(self
            .snapshot(cluster_name, hostname)
            .await?
            .map(|snapshot| snapshot.compactions)
            .unwrap_or_default())
    }

    async fn store_compactions(
        &self,
        cluster_name: &str,
        hostname: &str,
        compactions: Vec<Compaction>,
    ) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut table = self.load().await?;
        let count = compactions.len();
        table
            .entry(cluster_name.to_string())
            .or_default()
            .insert(hostname.to_string(), CompactionSnapshot::new(compactions));
        self.save(&table).await?;

        debug!(
            "Stored {} compactions for {} in cluster {}",
            count, hostname, cluster_name
        );
        Ok(())
    }
}
