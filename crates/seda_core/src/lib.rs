//! Core of the SEDA archival transfer toolkit.
//!
//! Builds, reads, writes, normalizes and compacts SEDA 2.1/2.2
//! `ArchiveTransfer` packages. The package graph in [`model`] is the single
//! owner of units and data object groups; every other module works on it
//! through ids.

pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;
pub mod version;
pub mod xml;

pub use config::SedaConfig;
pub use error::{ErrorKind, SedaError, SedaResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use metadata::{ComplexKind, ComplexListType, Metadata, SedaMetadata};
pub use model::{
    ArchiveTransfer, ArchiveUnit, BinaryDataObject, DataObjectGroup, GlobalMetadata, Package,
    PackageId, PhysicalDataObject,
};
pub use repo::{SnapshotRepository, SqliteSnapshotRepository};
pub use service::{compact, export_plan, normalize, Compaction, CompactorConfig};
pub use validation::{validate_transfer, Grammar, ManifestValidator, Violation};
pub use version::SedaVersion;
pub use xml::{ManifestLayout, ReadOptions};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
