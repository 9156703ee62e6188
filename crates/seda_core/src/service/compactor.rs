//! Compaction of a unit subtree into documents, sub-documents and a folder
//! tree.
//!
//! # Responsibility
//! - Filter content metadata and data objects through allow-lists.
//! - Produce the copy plan of the kept files; never copy bytes.
//! - Count everything that is dropped, including management blocks and
//!   profile references, which never reach the compacted output.
//!
//! # Invariants
//! - Each unit is visited once per compaction (package visited set).
//! - Only free-text fields may be truncated.
//! - A file is either kept with one copy instruction or counted as dropped.

use super::export::{extension_suffix, CopyInstruction};
use crate::error::{SedaError, SedaResult};
use crate::metadata::{
    ComplexKind, ComplexListType, DigestType, IntegerType, Metadata, SedaMetadata, StringType,
};
use crate::model::{ArchiveUnit, Package, VersionLabel, ROOT_UNIT_ID};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::{Duration, Instant};

/// Allow-lists applied at one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactionFilter {
    /// Kept data object usages, e.g. `BinaryMaster` for `BinaryMaster_1`.
    pub object_versions: Vec<String>,
    /// Kept content fields: 0 keeps the value, n truncates free text to n
    /// characters.
    pub metadata: BTreeMap<String, usize>,
}

impl Default for CompactionFilter {
    fn default() -> Self {
        Self {
            object_versions: vec!["BinaryMaster".to_string()],
            metadata: BTreeMap::from([
                ("DescriptionLevel".to_string(), 0),
                ("Title".to_string(), 0),
            ]),
        }
    }
}

impl CompactionFilter {
    pub fn keeps_version(&self, version: Option<&str>) -> bool {
        let Some(version) = version else {
            return false;
        };
        let usage = VersionLabel::parse(version).usage;
        self.object_versions.iter().any(|kept| *kept == usage)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompactorConfig {
    pub document: CompactionFilter,
    pub sub_document: CompactionFilter,
}

/// A kept file of a document or sub-document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileObject {
    pub source_object_id: String,
    pub version: Option<String>,
    /// Destination name inside the compacted export.
    pub uri: String,
    pub digest: Option<DigestType>,
    pub size: Option<i64>,
    pub format_identification: Option<ComplexListType>,
    pub file_info: Option<ComplexListType>,
}

impl FileObject {
    pub fn to_metadata(&self) -> SedaResult<ComplexListType> {
        let mut list = ComplexListType::new(ComplexKind::FileObject);
        if let Some(version) = &self.version {
            list.add_metadata(StringType::new("DataObjectVersion", version.as_str()))?;
        }
        list.add_metadata(StringType::new("Uri", self.uri.as_str()))?;
        if let Some(digest) = &self.digest {
            list.add_metadata(digest.clone())?;
        }
        if let Some(size) = self.size {
            list.add_metadata(IntegerType::new("Size", size))?;
        }
        if let Some(format) = &self.format_identification {
            list.add_metadata(format.clone())?;
        }
        if let Some(info) = &self.file_info {
            list.add_metadata(info.clone())?;
        }
        Ok(list)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubDocument {
    pub uri: String,
    pub unit_id: String,
    pub content: ComplexListType,
    pub file_objects: Vec<FileObject>,
    pub sub_documents: Vec<SubDocument>,
}

impl SubDocument {
    pub fn to_metadata(&self) -> SedaResult<ComplexListType> {
        let mut list = ComplexListType::new(ComplexKind::SubDocument);
        list.add_metadata(self.content.clone())?;
        for file in &self.file_objects {
            list.add_metadata(file.to_metadata()?)?;
        }
        for sub in &self.sub_documents {
            list.add_metadata(sub.to_metadata()?)?;
        }
        Ok(list)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompactedDocument {
    pub uri: String,
    pub unit_id: String,
    /// Tree node holding the document, if any.
    pub record_group_id: Option<String>,
    pub content: ComplexListType,
    pub file_objects: Vec<FileObject>,
    pub sub_documents: Vec<SubDocument>,
}

impl CompactedDocument {
    pub fn to_metadata(&self) -> SedaResult<ComplexListType> {
        let mut list = ComplexListType::new(ComplexKind::Document);
        if let Some(record_group_id) = &self.record_group_id {
            list.add_metadata(StringType::new("RecordGrpID", record_group_id.as_str()))?;
        }
        list.add_metadata(self.content.clone())?;
        for file in &self.file_objects {
            list.add_metadata(file.to_metadata()?)?;
        }
        for sub in &self.sub_documents {
            list.add_metadata(sub.to_metadata()?)?;
        }
        Ok(list)
    }
}

/// Folder node of the compacted tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub id: String,
    pub unit_id: String,
    pub content: ComplexListType,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn to_metadata(&self) -> SedaResult<ComplexListType> {
        let mut list = ComplexListType::new(ComplexKind::RecordGrp);
        list.add_metadata(StringType::new("RecordGrpID", self.id.as_str()))?;
        list.add_metadata(self.content.clone())?;
        for child in &self.children {
            list.add_metadata(child.to_metadata()?)?;
        }
        Ok(list)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompactionCounters {
    pub documents: usize,
    pub sub_documents: usize,
    pub tree_nodes: usize,
    pub dropped_metadata: usize,
    pub truncated_metadata: usize,
    /// Management blocks and archive unit profiles left behind.
    pub dropped_management: usize,
    pub dropped_files: usize,
    pub dropped_physical: usize,
}

#[derive(Debug, Clone)]
pub struct Compaction {
    pub unit_id: String,
    pub documents: Vec<CompactedDocument>,
    pub tree: Option<TreeNode>,
    pub copy_plan: Vec<CopyInstruction>,
    pub counters: CompactionCounters,
    pub duration: Duration,
}

impl Compaction {
    /// Human readable report of the run.
    pub fn summary(&self) -> String {
        let counters = &self.counters;
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Compaction of unit {} in {} ms",
            self.unit_id,
            self.duration.as_millis()
        );
        let _ = writeln!(out, "  documents: {}", counters.documents);
        let _ = writeln!(out, "  sub-documents: {}", counters.sub_documents);
        let _ = writeln!(out, "  tree nodes: {}", counters.tree_nodes);
        let _ = writeln!(
            out,
            "  dropped metadata: {} (truncated: {})",
            counters.dropped_metadata, counters.truncated_metadata
        );
        let _ = writeln!(
            out,
            "  dropped management/profile: {}",
            counters.dropped_management
        );
        let _ = writeln!(out, "  dropped files: {}", counters.dropped_files);
        let _ = writeln!(out, "  dropped physical objects: {}", counters.dropped_physical);
        let _ = writeln!(out, "  files to copy: {}", self.copy_plan.len());
        out
    }

    /// Builds the `DocumentPack` element describing this compaction.
    pub fn to_document_pack(&self) -> SedaResult<ComplexListType> {
        let mut pack = ComplexListType::new(ComplexKind::DocumentPack);
        pack.add_metadata(IntegerType::new(
            "DocumentsCount",
            self.documents.len() as i64,
        ))?;
        pack.add_metadata(IntegerType::new(
            "FileObjectsCount",
            self.copy_plan.len() as i64,
        ))?;
        if let Some(tree) = &self.tree {
            pack.add_metadata(tree.to_metadata()?)?;
        }
        for document in &self.documents {
            pack.add_metadata(document.to_metadata()?)?;
        }
        Ok(pack)
    }
}

/// Compacts the subtree of `unit_id`.
///
/// # Errors
/// - [`SedaError::UnknownId`] for an unknown unit.
/// - [`SedaError::Configuration`] when asked to compact the synthetic root
///   or to truncate a field that is not free text.
pub fn compact(
    package: &mut Package,
    unit_id: &str,
    config: &CompactorConfig,
) -> SedaResult<Compaction> {
    let started_at = Instant::now();
    if unit_id == ROOT_UNIT_ID {
        return Err(SedaError::Configuration(
            "the synthetic root cannot be compacted, pick a top-level unit".to_string(),
        ));
    }
    package.unit(unit_id)?;

    let mut compactor = Compactor {
        config,
        counters: CompactionCounters::default(),
        documents: Vec::new(),
        copy_plan: Vec::new(),
        tree_counter: 0,
        document_counter: 0,
    };
    package.reset_visited();
    let tree = match compactor.visit(package, unit_id, None) {
        Ok(tree) => tree,
        Err(err) => {
            warn!(
                "event=compact module=service status=error unit_id={} error={}",
                unit_id, err
            );
            return Err(err);
        }
    };

    let duration = started_at.elapsed();
    let counters = compactor.counters;
    info!(
        "event=compact module=service status=ok unit_id={} duration_ms={} documents={} sub_documents={} dropped_metadata={} dropped_management={} dropped_files={}",
        unit_id,
        duration.as_millis(),
        counters.documents,
        counters.sub_documents,
        counters.dropped_metadata,
        counters.dropped_management,
        counters.dropped_files
    );
    Ok(Compaction {
        unit_id: unit_id.to_string(),
        documents: compactor.documents,
        tree,
        copy_plan: compactor.copy_plan,
        counters,
        duration,
    })
}

struct Compactor<'c> {
    config: &'c CompactorConfig,
    counters: CompactionCounters,
    documents: Vec<CompactedDocument>,
    copy_plan: Vec<CopyInstruction>,
    tree_counter: usize,
    document_counter: usize,
}

impl Compactor<'_> {
    /// Tree-level visit: folders become tree nodes, anything else a document.
    fn visit(
        &mut self,
        package: &mut Package,
        unit_id: &str,
        parent_tree: Option<&str>,
    ) -> SedaResult<Option<TreeNode>> {
        if !package.mark_visited(unit_id) {
            return Ok(None);
        }
        let config = self.config;
        let unit = package.unit(unit_id)?;
        let children = unit.children().to_vec();
        self.count_unit_metadata(unit);

        if unit.is_record_group() {
            self.tree_counter += 1;
            let id = format!("Tree{}", self.tree_counter);
            let content = self.filter_content(&unit.content, &config.document)?;
            let stray = self.stray_files(package, unit.object_refs())?;
            if stray > 0 {
                warn!(
                    "event=compact module=service status=dropped_files unit_id={} count={} reason=folder_content",
                    unit_id, stray
                );
                self.counters.dropped_files += stray;
            }
            self.counters.tree_nodes += 1;

            let mut node = TreeNode {
                id,
                unit_id: unit_id.to_string(),
                content,
                children: Vec::new(),
            };
            for child in &children {
                if let Some(child_node) = self.visit(package, child, Some(&node.id))? {
                    node.children.push(child_node);
                }
            }
            return Ok(Some(node));
        }

        self.document_counter += 1;
        let uri = match parent_tree {
            Some(tree) => format!("{tree}-Document{}", self.document_counter),
            None => format!("Document{}", self.document_counter),
        };
        let content = self.filter_content(&unit.content, &config.document)?;
        let file_objects = self.file_objects(package, unit.object_refs(), &uri, &config.document)?;

        let mut sub_documents = Vec::new();
        let mut sub_counter = 0;
        for child in &children {
            if let Some(sub) = self.visit_sub_document(package, child, &uri, &mut sub_counter)? {
                sub_documents.push(sub);
            }
        }
        self.counters.documents += 1;
        self.documents.push(CompactedDocument {
            uri,
            unit_id: unit_id.to_string(),
            record_group_id: parent_tree.map(str::to_string),
            content,
            file_objects,
            sub_documents,
        });
        Ok(None)
    }

    fn visit_sub_document(
        &mut self,
        package: &mut Package,
        unit_id: &str,
        parent_uri: &str,
        counter: &mut usize,
    ) -> SedaResult<Option<SubDocument>> {
        if !package.mark_visited(unit_id) {
            return Ok(None);
        }
        let config = self.config;
        *counter += 1;
        let uri = format!("{parent_uri}/SubDocument{counter}");
        let unit = package.unit(unit_id)?;
        let children = unit.children().to_vec();
        self.count_unit_metadata(unit);
        let content = self.filter_content(&unit.content, &config.sub_document)?;
        let file_objects =
            self.file_objects(package, unit.object_refs(), &uri, &config.sub_document)?;

        let mut sub_documents = Vec::new();
        let mut sub_counter = 0;
        for child in &children {
            if let Some(sub) = self.visit_sub_document(package, child, &uri, &mut sub_counter)? {
                sub_documents.push(sub);
            }
        }
        self.counters.sub_documents += 1;
        Ok(Some(SubDocument {
            uri,
            unit_id: unit_id.to_string(),
            content,
            file_objects,
            sub_documents,
        }))
    }

    fn count_unit_metadata(&mut self, unit: &ArchiveUnit) {
        let dropped = usize::from(unit.management.is_some())
            + usize::from(unit.archive_unit_profile.is_some());
        if dropped > 0 {
            debug!(
                "event=compact module=service status=dropped_management unit_id={} count={}",
                unit.id(),
                dropped
            );
            self.counters.dropped_management += dropped;
        }
    }

    fn filter_content(
        &mut self,
        content: &ComplexListType,
        filter: &CompactionFilter,
    ) -> SedaResult<ComplexListType> {
        let mut kept = ComplexListType::named(ComplexKind::Content, content.name());
        for child in content.children() {
            let name = child.element_name();
            match filter.metadata.get(name) {
                None => self.counters.dropped_metadata += 1,
                Some(0) => kept.push_unchecked(child.clone()),
                Some(&limit) => {
                    let Metadata::Text(text) = child else {
                        return Err(SedaError::Configuration(format!(
                            "cannot truncate `{name}` to {limit} characters, it is not free text"
                        )));
                    };
                    match text.truncated(limit) {
                        Some(short) => {
                            self.counters.truncated_metadata += 1;
                            kept.push_unchecked(Metadata::Text(short));
                        }
                        None => kept.push_unchecked(child.clone()),
                    }
                }
            }
        }
        Ok(kept)
    }

    fn file_objects(
        &mut self,
        package: &Package,
        group_ids: &[String],
        uri: &str,
        filter: &CompactionFilter,
    ) -> SedaResult<Vec<FileObject>> {
        let mut files = Vec::new();
        for group_id in group_ids {
            let group = package.group(group_id)?;
            for object in &group.binary_objects {
                let version = object.version();
                let source = match &object.on_disk_path {
                    Some(path) if filter.keeps_version(version.as_deref()) => path.clone(),
                    _ => {
                        debug!(
                            "event=compact module=service status=dropped_file object_id={} version={}",
                            object.id(),
                            version.as_deref().unwrap_or("-")
                        );
                        self.counters.dropped_files += 1;
                        continue;
                    }
                };
                let destination = format!(
                    "{uri}-{}{}",
                    version.as_deref().unwrap_or(object.id()),
                    extension_suffix(&source)
                );
                self.copy_plan.push(CopyInstruction {
                    destination: destination.clone(),
                    source,
                });
                files.push(FileObject {
                    source_object_id: object.id().to_string(),
                    version,
                    uri: destination,
                    digest: object.digest().cloned(),
                    size: object.size(),
                    format_identification: object.format_identification().cloned(),
                    file_info: object.file_info().cloned(),
                });
            }
            self.counters.dropped_physical += group.physical_objects.len();
        }
        Ok(files)
    }

    /// Binary entries referenced by a folder, all dropped.
    fn stray_files(&self, package: &Package, group_ids: &[String]) -> SedaResult<usize> {
        let mut count = 0;
        for group_id in group_ids {
            count += package.group(group_id)?.binary_objects.len();
        }
        Ok(count)
    }
}
