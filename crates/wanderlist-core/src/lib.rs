//! Core types and traits for Wanderlist storage backends.
//!
//! This crate provides the destination record model, its normalization and
//! legacy migration rules, and the `StoragePort` trait, enabling pluggable
//! storage implementations in separate crates.

pub mod filter;
pub mod kv;
pub mod migrate;
pub mod models;
pub mod normalize;
pub mod storage;

// Re-export key types at crate root for convenience
pub use filter::DestinationFilter;
pub use kv::KeyValueStore;
pub use migrate::{is_legacy, migrate_legacy};
pub use models::budget::{Budget, BudgetCategory, BudgetLine};
pub use models::{Destination, DestinationId, Photo, Priority, TripType, VisitStatus};
pub use normalize::{normalize, parse_id};
pub use storage::{StorageError, StoragePort};
