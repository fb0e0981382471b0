//! Wanderlist: a catalog of travel destinations over pluggable storage.
//!
//! The record model and the `StoragePort` contract live in
//! `wanderlist-core`; this crate selects a backend from configuration and
//! exposes the collection through a CLI and a JSON HTTP API.

pub mod api;
pub mod auth;
pub mod commands;
pub mod config;
pub mod error;
pub mod remote_storage;
pub mod storage;
pub mod telemetry;
