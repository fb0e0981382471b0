use std::sync::Arc;

use wanderlist_local::{FileStore, LocalStorage, MemoryStore};
use wanderlist_sqlite::SqliteStore;

// Re-export core storage types so callers only need this module
pub use wanderlist_core::storage::{StorageError, StoragePort};

use crate::{config::StorageConfig, remote_storage::RemoteStorage};

pub const DEFAULT_LOCAL_DIR: &str = "wanderlist-data";
pub const DEFAULT_SQLITE_PATH: &str = "wanderlist.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Memory,
    Sqlite,
    Remote,
}

impl BackendKind {
    /// Unknown tags resolve to `Local` with a warning, never an error.
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "local" | "localstorage" => BackendKind::Local,
            "memory" => BackendKind::Memory,
            "sqlite" => BackendKind::Sqlite,
            "remote" | "firebase" => BackendKind::Remote,
            other => {
                tracing::warn!(tag = other, "Unknown storage backend, falling back to local");
                BackendKind::Local
            }
        }
    }
}

/// Builds the storage port selected by `config.backend`.
pub fn open_backend(config: &StorageConfig) -> Result<Box<dyn StoragePort>, StorageError> {
    let kind = BackendKind::from_tag(&config.backend);
    let storage: Box<dyn StoragePort> = match kind {
        BackendKind::Local => {
            let dir = config.path.as_deref().unwrap_or(DEFAULT_LOCAL_DIR);
            let store = Arc::new(FileStore::open(dir)?);
            Box::new(LocalStorage::with_key(store, config.key.clone()))
        }
        BackendKind::Memory => {
            Box::new(LocalStorage::with_key(Arc::new(MemoryStore::new()), config.key.clone()))
        }
        BackendKind::Sqlite => {
            let path = config.path.as_deref().unwrap_or(DEFAULT_SQLITE_PATH);
            let store = Arc::new(SqliteStore::new(path)?);
            Box::new(LocalStorage::with_key(store, config.key.clone()))
        }
        BackendKind::Remote => Box::new(RemoteStorage::new(config.endpoint.clone())),
    };
    tracing::info!(backend = ?kind, "Storage backend ready");
    Ok(storage)
}
