use serde_json::Value;

use crate::models::{Destination, DestinationId};

use thiserror::Error;

/// Failures surfaced by storage backends.
///
/// There is no not-found variant: a missing record is reported as `Ok(None)`
/// from `get_one` and `Ok(false)` from `delete`.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid data format: {0}")]
    Format(String),
    #[error("{0} storage not yet implemented")]
    UnsupportedBackend(&'static str),
    #[error("{0}")]
    Other(String),
}

/// The backend-agnostic destination store. Callers hold a
/// `Box<dyn StoragePort>` and never reach for a concrete backend.
pub trait StoragePort: Send + Sync {
    fn backend_name(&self) -> &'static str;

    /// All records in stored order; empty when nothing has been saved.
    fn get_all(&self) -> Result<Vec<Destination>, StorageError>;
    fn get_one(&self, id: DestinationId) -> Result<Option<Destination>, StorageError>;

    /// Upserts by id and returns the record as persisted.
    fn save(&self, destination: &Destination) -> Result<Destination, StorageError>;
    fn delete(&self, id: DestinationId) -> Result<bool, StorageError>;

    /// Replaces the whole collection from an already-parsed payload, which
    /// must be an array. Nothing is written when validation fails.
    fn import_values(&self, payload: &Value) -> Result<Vec<Destination>, StorageError>;

    /// Replaces the whole collection from JSON text.
    fn import_all(&self, payload: &str) -> Result<Vec<Destination>, StorageError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| StorageError::Format(format!("payload is not valid JSON: {}", e)))?;
        self.import_values(&value)
    }

    /// The full collection as the JSON array text `import_all` accepts.
    fn export_all(&self) -> Result<String, StorageError>;

    /// Converts legacy-shaped records in place; returns how many were converted.
    fn migrate_from_legacy(&self) -> Result<usize, StorageError>;
}
