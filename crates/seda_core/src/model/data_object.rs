//! Data object groups and their binary/physical entries.
//!
//! # Invariants
//! - Entry ids share the package id space with units and groups.
//! - `on_disk_path` is local import/export state, never serialized.

use super::PackageId;
use crate::error::SedaResult;
use crate::metadata::{ComplexKind, ComplexListType, DigestType, Metadata, StringType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::PathBuf;
use uuid::Uuid;

static VERSION_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<usage>[A-Za-z]+)(?:_(?P<number>\d+))?$").expect("valid version label regex")
});

/// Parsed `DataObjectVersion`, e.g. `BinaryMaster_1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLabel {
    pub usage: String,
    pub number: Option<u32>,
}

impl VersionLabel {
    /// Parses `usage[_number]`; labels outside that shape keep the part
    /// before the first `_` as usage.
    pub fn parse(label: &str) -> Self {
        if let Some(captures) = VERSION_LABEL_RE.captures(label.trim()) {
            return Self {
                usage: captures["usage"].to_string(),
                number: captures
                    .name("number")
                    .and_then(|number| number.as_str().parse().ok()),
            };
        }
        Self {
            usage: label.split('_').next().unwrap_or_default().to_string(),
            number: None,
        }
    }
}

/// Digital version of a logical item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryDataObject {
    id: String,
    pub metadata: ComplexListType,
    pub on_disk_path: Option<PathBuf>,
}

impl BinaryDataObject {
    pub fn new(id: impl Into<String>, version: &str) -> SedaResult<Self> {
        let mut metadata = ComplexListType::new(ComplexKind::BinaryDataObject);
        metadata.add_new_metadata("DataObjectVersion", version)?;
        Ok(Self::from_metadata(id, metadata))
    }

    pub fn from_metadata(id: impl Into<String>, metadata: ComplexListType) -> Self {
        Self {
            id: id.into(),
            metadata,
            on_disk_path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.on_disk_path = Some(path.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> Option<String> {
        self.metadata.simple_metadata("DataObjectVersion")
    }

    pub fn version_label(&self) -> Option<VersionLabel> {
        self.version().map(|label| VersionLabel::parse(&label))
    }

    pub fn uri(&self) -> Option<String> {
        self.metadata.simple_metadata("Uri")
    }

    pub fn set_uri(&mut self, uri: &str) -> SedaResult<()> {
        self.metadata.set_metadata(StringType::new("Uri", uri))
    }

    pub fn digest(&self) -> Option<&DigestType> {
        self.metadata.get("MessageDigest").and_then(Metadata::as_digest)
    }

    pub fn set_digest(&mut self, algorithm: &str, value: &str) -> SedaResult<()> {
        self.metadata
            .set_metadata(DigestType::new("MessageDigest", algorithm, value))
    }

    pub fn size(&self) -> Option<i64> {
        self.metadata.get("Size").and_then(Metadata::as_integer)
    }

    pub fn format_identification(&self) -> Option<&ComplexListType> {
        self.metadata.get_complex("FormatIdentification")
    }

    pub fn file_info(&self) -> Option<&ComplexListType> {
        self.metadata.get_complex("FileInfo")
    }

    pub fn file_name(&self) -> Option<String> {
        self.file_info()
            .and_then(|info| info.simple_metadata("Filename"))
    }
}

/// Physical (non-digital) version of a logical item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalDataObject {
    id: String,
    pub metadata: ComplexListType,
}

impl PhysicalDataObject {
    pub fn new(id: impl Into<String>, version: &str) -> SedaResult<Self> {
        let mut metadata = ComplexListType::new(ComplexKind::PhysicalDataObject);
        metadata.add_new_metadata("DataObjectVersion", version)?;
        Ok(Self::from_metadata(id, metadata))
    }

    pub fn from_metadata(id: impl Into<String>, metadata: ComplexListType) -> Self {
        Self {
            id: id.into(),
            metadata,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> Option<String> {
        self.metadata.simple_metadata("DataObjectVersion")
    }

    pub fn physical_id(&self) -> Option<String> {
        self.metadata.simple_metadata("PhysicalId")
    }
}

/// Versions of one logical item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataObjectGroup {
    id: String,
    pub(crate) package: PackageId,
    pub binary_objects: Vec<BinaryDataObject>,
    pub physical_objects: Vec<PhysicalDataObject>,
}

impl DataObjectGroup {
    pub fn new(id: impl Into<String>) -> Self {
        Self::in_package(Uuid::nil(), id)
    }

    pub fn in_package(package: PackageId, id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            package,
            binary_objects: Vec::new(),
            physical_objects: Vec::new(),
        }
    }

    pub fn with_binary(mut self, object: BinaryDataObject) -> Self {
        self.binary_objects.push(object);
        self
    }

    pub fn with_physical(mut self, object: PhysicalDataObject) -> Self {
        self.physical_objects.push(object);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn package(&self) -> PackageId {
        self.package
    }

    /// Ids of every entry of the group.
    pub fn object_ids(&self) -> impl Iterator<Item = &str> {
        self.binary_objects
            .iter()
            .map(BinaryDataObject::id)
            .chain(self.physical_objects.iter().map(PhysicalDataObject::id))
    }
}
