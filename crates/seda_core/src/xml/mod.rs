//! Streaming XML codec for SEDA manifests.
//!
//! # Responsibility
//! - Wrap `quick-xml` into a name-oriented reader and writer.
//! - Map the package graph to and from `ArchiveTransfer` documents.
//!
//! # See also
//! - `metadata` for element-level serialization.

pub mod codec;
pub mod reader;
pub mod writer;

pub use codec::{
    archive_transfer_from_str, archive_transfer_to_string, group_from_xml_str,
    group_to_xml_string, metadata_from_xml_str, metadata_to_xml_string, read_archive_transfer,
    read_data_object_package, read_group, write_archive_transfer, write_archive_unit,
    write_data_object_package, write_group, ManifestLayout, PackageOutcome, ReadOptions,
    ReadOutcome,
};
pub use reader::{Peeked, SedaXmlReader, StartTag};
pub use writer::SedaXmlWriter;
