//! Package-level services.
//!
//! # Responsibility
//! - Normalize the unit graph into a walkable tree.
//! - Run bulk verify/collect walks over units.
//! - Compact a unit subtree and plan file copies.
//!
//! # See also
//! - `xml::codec` which normalizes packages after reading them.

pub mod compactor;
pub mod export;
pub mod normalizer;
pub mod processor;

pub use compactor::{
    compact, CompactedDocument, Compaction, CompactionCounters, CompactionFilter,
    CompactorConfig, FileObject, SubDocument, TreeNode,
};
pub use export::{export_plan, CopyInstruction};
pub use normalizer::{normalize, NormalizeReport};
pub use processor::{collect, compliant_ids, try_collect, verify, BulkOutcome};
