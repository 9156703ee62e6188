//! Archive unit node.

use super::PackageId;
use crate::error::SedaResult;
use crate::metadata::{ComplexKind, ComplexListType};
use uuid::Uuid;

/// Id of the synthetic root unit. Never exported.
pub const ROOT_UNIT_ID: &str = "__root__";

/// Folder marker value of `DescriptionLevel`.
pub const RECORD_GROUP_LEVEL: &str = "RecordGroup";

/// One node of the archival hierarchy.
///
/// Child and object-group links are ids resolved through the owning
/// [`super::Package`]; `package` is a handle, never an owning pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveUnit {
    id: String,
    pub(crate) package: PackageId,
    pub content: ComplexListType,
    pub management: Option<ComplexListType>,
    pub archive_unit_profile: Option<String>,
    pub(crate) children: Vec<String>,
    pub(crate) object_refs: Vec<String>,
}

impl ArchiveUnit {
    /// Creates a detached unit; registration stamps the package handle.
    pub fn new(id: impl Into<String>, content: ComplexListType) -> Self {
        Self::in_package(Uuid::nil(), id, content)
    }

    pub fn in_package(package: PackageId, id: impl Into<String>, content: ComplexListType) -> Self {
        Self {
            id: id.into(),
            package,
            content,
            management: None,
            archive_unit_profile: None,
            children: Vec::new(),
            object_refs: Vec::new(),
        }
    }

    /// Convenience constructor for a unit with a level and a title.
    pub fn titled(id: impl Into<String>, level: &str, title: &str) -> SedaResult<Self> {
        let mut content = ComplexListType::new(ComplexKind::Content);
        content.add_new_metadata("DescriptionLevel", level)?;
        content.add_new_metadata("Title", title)?;
        Ok(Self::new(id, content))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn package(&self) -> PackageId {
        self.package
    }

    pub fn children(&self) -> &[String] {
        &self.children
    }

    pub fn object_refs(&self) -> &[String] {
        &self.object_refs
    }

    pub fn description_level(&self) -> Option<String> {
        self.content.simple_metadata("DescriptionLevel")
    }

    pub fn title(&self) -> Option<String> {
        self.content.simple_metadata("Title")
    }

    /// Folder-like unit: its description level is the record-group marker.
    pub fn is_record_group(&self) -> bool {
        self.description_level().as_deref() == Some(RECORD_GROUP_LEVEL)
    }
}
