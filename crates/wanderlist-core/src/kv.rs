use crate::storage::StorageError;

/// A synchronous string key-value medium, the durable layer under the local
/// backend. Handles are opened once by the caller and shared.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    /// Returns whether a value was present.
    fn remove(&self, key: &str) -> Result<bool, StorageError>;
}
