//! Error types of the access layer

use thiserror::Error;

use crate::management::ManagementError;
use crate::storage::StorageError;

/// Access layer errors
#[derive(Debug, Error)]
pub enum AccessError {
    /// Operation forbidden in the current deployment mode
    #[error("Policy violation: {0}")]
    PolicyViolation(String),
    /// No candidate endpoint could be reached
    #[error("Unable to connect to any of {endpoints:?}: {reason}")]
    Connection {
        endpoints: Vec<String>,
        reason: String,
    },
    /// Connection or call interrupted before completion
    #[error("Interrupted: {0}")]
    Interrupted(String),
    /// Management endpoint reachable but returned unusable data
    #[error("Introspection error: {0}")]
    Introspection(String),
    /// Compaction history lookup failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<ManagementError> for AccessError {
    fn from(e: ManagementError) -> Self {
        match e {
            ManagementError::Unreachable { endpoints, reason } => {
                AccessError::Connection { endpoints, reason }
            }
            ManagementError::Interrupted(msg) => AccessError::Interrupted(msg),
            ManagementError::Introspection(msg) => AccessError::Introspection(msg),
        }
    }
}

pub type AccessResult<T> = Result<T, AccessError>;
