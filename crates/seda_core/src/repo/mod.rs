//! Persistence of package snapshots.
//!
//! # Responsibility
//! - Define the snapshot storage contract.
//! - Keep SQL details out of the package graph and services.

pub mod snapshot_repo;

pub use snapshot_repo::{SnapshotRepository, SnapshotSummary, SqliteSnapshotRepository};
