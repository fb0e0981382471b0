//! Local storage backend for Wanderlist.
//!
//! [`LocalStorage`] keeps the whole collection as one JSON document under a
//! single key of an injected [`KeyValueStore`]. This crate also ships the
//! in-memory and file-directory stores it is usually paired with.

pub mod file_store;
pub mod local_storage;
pub mod memory_store;

pub use file_store::FileStore;
pub use local_storage::{LocalStorage, DEFAULT_STORAGE_KEY};
pub use memory_store::MemoryStore;
