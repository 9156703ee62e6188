//! Package graph domain model.
//!
//! # Responsibility
//! - Define the archive unit / data object group graph of one transfer.
//! - Keep every node owned by its package and linked by id.
//!
//! # Invariants
//! - No node holds an owning pointer to another node or to its package.
//! - Ids are assigned at creation and stable for the package lifetime.

pub mod data_object;
pub mod package;
pub mod transfer;
pub mod unit;

use uuid::Uuid;

/// Handle identifying one package instance.
///
/// Stored on every node as its non-owning package association.
pub type PackageId = Uuid;

pub use data_object::{BinaryDataObject, DataObjectGroup, PhysicalDataObject, VersionLabel};
pub use package::{BackReference, NodeRef, Package};
pub use transfer::{ArchiveTransfer, GlobalMetadata};
pub use unit::{ArchiveUnit, RECORD_GROUP_LEVEL, ROOT_UNIT_ID};
