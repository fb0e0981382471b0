use serde_json::Value;
use wanderlist_core::{Destination, DestinationId, StorageError, StoragePort};

const BACKEND: &str = "remote";

/// Placeholder for a hosted backend. Every operation fails with
/// [`StorageError::UnsupportedBackend`]; nothing is emulated locally.
pub struct RemoteStorage {
    endpoint: Option<String>,
}

impl RemoteStorage {
    pub fn new(endpoint: Option<String>) -> Self {
        tracing::debug!(endpoint = ?endpoint, "Remote storage configured");
        Self { endpoint }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }
}

impl StoragePort for RemoteStorage {
    fn backend_name(&self) -> &'static str {
        BACKEND
    }

    fn get_all(&self) -> Result<Vec<Destination>, StorageError> {
        Err(StorageError::UnsupportedBackend(BACKEND))
    }

    fn get_one(&self, _id: DestinationId) -> Result<Option<Destination>, StorageError> {
        Err(StorageError::UnsupportedBackend(BACKEND))
    }

    fn save(&self, _destination: &Destination) -> Result<Destination, StorageError> {
        Err(StorageError::UnsupportedBackend(BACKEND))
    }

    fn delete(&self, _id: DestinationId) -> Result<bool, StorageError> {
        Err(StorageError::UnsupportedBackend(BACKEND))
    }

    fn import_values(&self, _payload: &Value) -> Result<Vec<Destination>, StorageError> {
        Err(StorageError::UnsupportedBackend(BACKEND))
    }

    fn import_all(&self, _payload: &str) -> Result<Vec<Destination>, StorageError> {
        Err(StorageError::UnsupportedBackend(BACKEND))
    }

    fn export_all(&self) -> Result<String, StorageError> {
        Err(StorageError::UnsupportedBackend(BACKEND))
    }

    fn migrate_from_legacy(&self) -> Result<usize, StorageError> {
        Err(StorageError::UnsupportedBackend(BACKEND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unsupported<T: std::fmt::Debug>(result: Result<T, StorageError>) -> bool {
        matches!(result, Err(StorageError::UnsupportedBackend("remote")))
    }

    #[test]
    fn test_every_operation_is_unsupported() {
        let storage = RemoteStorage::new(Some("https://example.invalid".to_string()));
        let d = Destination::new("Nowhere", 0.0, 0.0);

        assert!(unsupported(storage.get_all()));
        assert!(unsupported(storage.get_one(d.id)));
        assert!(unsupported(storage.save(&d)));
        assert!(unsupported(storage.delete(d.id)));
        // even a malformed payload reports the backend, not the format
        assert!(unsupported(storage.import_all("not json")));
        assert!(unsupported(storage.import_values(&Value::Array(vec![]))));
        assert!(unsupported(storage.export_all()));
        assert!(unsupported(storage.migrate_from_legacy()));
        assert_eq!(storage.endpoint(), Some("https://example.invalid"));
    }

    #[test]
    fn test_error_message() {
        let err = RemoteStorage::new(None).get_all().unwrap_err();
        assert_eq!(err.to_string(), "remote storage not yet implemented");
    }
}
