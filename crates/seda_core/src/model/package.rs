//! Package graph and id registry.
//!
//! # Responsibility
//! - Own every unit and data object group of one transfer, keyed by id.
//! - Validate id uniqueness and link targets on every mutation.
//! - Hold the per-walk visited set and the back-references of the last
//!   normalization.
//!
//! # Invariants
//! - Unit, group and object ids share one id space; the root id is reserved.
//! - Every child or object-group reference resolves in this package.
//! - Every owned node carries this package's handle.
//! - Any structural mutation clears the normalized flag.

use super::data_object::DataObjectGroup;
use super::unit::{ArchiveUnit, ROOT_UNIT_ID};
use super::PackageId;
use crate::error::{SedaError, SedaResult};
use crate::metadata::ComplexListType;
use log::info;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Root entries split by the top-level rule: a unit is top level when no
/// unit lists it as a child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct RootPartition {
    /// Canonical root: surviving root entries, then adopted units.
    pub kept: Vec<String>,
    /// Root entries with a unit parent, or repeating an earlier entry.
    pub detached: Vec<String>,
    /// Parentless units missing from the root, in registration order.
    pub adopted: Vec<String>,
}

/// Resolved node of the package.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Unit(&'a ArchiveUnit),
    Group(&'a DataObjectGroup),
}

/// A later path to an already expanded unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackReference {
    pub parent_id: String,
    pub child_id: String,
    /// Index of the child in the parent's child list.
    pub position: usize,
}

#[derive(Debug, Clone)]
pub struct Package {
    handle: PackageId,
    root: ArchiveUnit,
    units: HashMap<String, ArchiveUnit>,
    unit_order: Vec<String>,
    groups: HashMap<String, DataObjectGroup>,
    group_order: Vec<String>,
    object_ids: HashSet<String>,
    visited: HashSet<String>,
    back_references: Vec<BackReference>,
    normalized: bool,
    next_id: u64,
    /// Package-level `ManagementMetadata` block, kept verbatim.
    pub management_metadata_xml: Option<String>,
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

impl Package {
    pub fn new() -> Self {
        Self::with_handle(Uuid::new_v4())
    }

    /// Creates an empty package under a known handle, e.g. on restore.
    pub fn with_handle(handle: PackageId) -> Self {
        Self {
            handle,
            root: ArchiveUnit::in_package(
                handle,
                ROOT_UNIT_ID,
                ComplexListType::new(crate::metadata::ComplexKind::Content),
            ),
            units: HashMap::new(),
            unit_order: Vec::new(),
            groups: HashMap::new(),
            group_order: Vec::new(),
            object_ids: HashSet::new(),
            visited: HashSet::new(),
            back_references: Vec::new(),
            normalized: true,
            next_id: 0,
            management_metadata_xml: None,
        }
    }

    pub fn handle(&self) -> PackageId {
        self.handle
    }

    /// Allocates an unused `ID<n>` id.
    pub fn next_id(&mut self) -> String {
        loop {
            self.next_id += 1;
            let candidate = format!("ID{}", self.next_id);
            if !self.contains_id(&candidate) {
                return candidate;
            }
        }
    }

    pub fn contains_id(&self, id: &str) -> bool {
        id == ROOT_UNIT_ID
            || self.units.contains_key(id)
            || self.groups.contains_key(id)
            || self.object_ids.contains(id)
    }

    /// Registers `unit`, stamping it with this package's handle.
    ///
    /// Links already present on the unit are kept unchecked; the reader
    /// relies on this for forward references and validates them afterwards.
    pub fn register_unit(&mut self, mut unit: ArchiveUnit) -> SedaResult<()> {
        if self.contains_id(unit.id()) {
            return Err(SedaError::DuplicateId(unit.id().to_string()));
        }
        unit.package = self.handle;
        self.unit_order.push(unit.id().to_string());
        self.units.insert(unit.id().to_string(), unit);
        self.normalized = false;
        Ok(())
    }

    /// Registers `group` and every entry id it holds.
    pub fn register_group(&mut self, mut group: DataObjectGroup) -> SedaResult<()> {
        if self.contains_id(group.id()) {
            return Err(SedaError::DuplicateId(group.id().to_string()));
        }
        let mut seen = HashSet::new();
        for object_id in group.object_ids() {
            if object_id == group.id() || self.contains_id(object_id) || !seen.insert(object_id) {
                return Err(SedaError::DuplicateId(object_id.to_string()));
            }
        }
        let object_ids: Vec<String> = group.object_ids().map(str::to_string).collect();
        group.package = self.handle;
        self.object_ids.extend(object_ids);
        self.group_order.push(group.id().to_string());
        self.groups.insert(group.id().to_string(), group);
        Ok(())
    }

    /// Allocates an id, registers a unit with `content` and returns the id.
    pub fn create_unit(&mut self, content: ComplexListType) -> SedaResult<String> {
        let id = self.next_id();
        self.register_unit(ArchiveUnit::in_package(self.handle, id.clone(), content))?;
        Ok(id)
    }

    pub fn resolve(&self, id: &str) -> SedaResult<NodeRef<'_>> {
        if let Ok(unit) = self.unit(id) {
            return Ok(NodeRef::Unit(unit));
        }
        self.group(id).map(NodeRef::Group)
    }

    /// Looks up a unit; the root id resolves to the synthetic root.
    pub fn unit(&self, id: &str) -> SedaResult<&ArchiveUnit> {
        if id == ROOT_UNIT_ID {
            return Ok(&self.root);
        }
        self.units
            .get(id)
            .ok_or_else(|| SedaError::UnknownId(id.to_string()))
    }

    /// Mutable access to a registered unit's metadata.
    pub fn unit_mut(&mut self, id: &str) -> SedaResult<&mut ArchiveUnit> {
        self.units
            .get_mut(id)
            .ok_or_else(|| SedaError::UnknownId(id.to_string()))
    }

    pub fn group(&self, id: &str) -> SedaResult<&DataObjectGroup> {
        self.groups
            .get(id)
            .ok_or_else(|| SedaError::UnknownId(id.to_string()))
    }

    pub fn group_mut(&mut self, id: &str) -> SedaResult<&mut DataObjectGroup> {
        self.groups
            .get_mut(id)
            .ok_or_else(|| SedaError::UnknownId(id.to_string()))
    }

    pub fn root(&self) -> &ArchiveUnit {
        &self.root
    }

    pub fn root_children(&self) -> &[String] {
        &self.root.children
    }

    /// Units in registration order.
    pub fn units(&self) -> impl Iterator<Item = &ArchiveUnit> {
        self.unit_order.iter().filter_map(|id| self.units.get(id))
    }

    /// Groups in registration order.
    pub fn groups(&self) -> impl Iterator<Item = &DataObjectGroup> {
        self.group_order.iter().filter_map(|id| self.groups.get(id))
    }

    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Appends `child_id` to the children of `parent_id` (root allowed).
    pub fn add_child(&mut self, parent_id: &str, child_id: &str) -> SedaResult<()> {
        if parent_id == child_id {
            return Err(SedaError::SelfReference(child_id.to_string()));
        }
        if !self.units.contains_key(child_id) {
            return Err(SedaError::UnknownId(child_id.to_string()));
        }
        self.unit_entry_mut(parent_id)?
            .children
            .push(child_id.to_string());
        self.normalized = false;
        Ok(())
    }

    /// Appends a data object group reference to a unit.
    pub fn add_object_ref(&mut self, unit_id: &str, group_id: &str) -> SedaResult<()> {
        if !self.groups.contains_key(group_id) {
            return Err(SedaError::UnknownId(group_id.to_string()));
        }
        self.unit_mut(unit_id)?
            .object_refs
            .push(group_id.to_string());
        self.normalized = false;
        Ok(())
    }

    /// Moves every node of `source` into this package and appends the
    /// source's top-level units to `target_unit_id`. Top level follows
    /// [`Package::top_level_units`], whether or not the source root lists
    /// them.
    ///
    /// Collisions are checked before anything moves.
    pub fn graft(&mut self, mut source: Package, target_unit_id: &str) -> SedaResult<()> {
        if target_unit_id != ROOT_UNIT_ID && !self.units.contains_key(target_unit_id) {
            return Err(SedaError::UnknownId(target_unit_id.to_string()));
        }
        let incoming = source
            .unit_order
            .iter()
            .chain(source.group_order.iter())
            .chain(source.object_ids.iter());
        for id in incoming {
            if self.contains_id(id) {
                return Err(SedaError::DuplicateId(id.clone()));
            }
        }

        let top_level = source.top_level_units();
        let moved_units = source.unit_order.len();
        let moved_groups = source.group_order.len();
        for id in source.unit_order.drain(..) {
            if let Some(mut unit) = source.units.remove(&id) {
                unit.package = self.handle;
                self.units.insert(id.clone(), unit);
                self.unit_order.push(id);
            }
        }
        for id in source.group_order.drain(..) {
            if let Some(mut group) = source.groups.remove(&id) {
                group.package = self.handle;
                self.groups.insert(id.clone(), group);
                self.group_order.push(id);
            }
        }
        self.object_ids.extend(source.object_ids.drain());
        self.unit_entry_mut(target_unit_id)?.children.extend(top_level);
        self.normalized = false;
        info!(
            "event=package_graft module=model status=ok target={} units={} groups={}",
            target_unit_id, moved_units, moved_groups
        );
        Ok(())
    }

    /// Units without a unit parent, root entries first.
    pub fn top_level_units(&self) -> Vec<String> {
        self.partition_root().kept
    }

    pub(crate) fn partition_root(&self) -> RootPartition {
        let has_parent: HashSet<&str> = self
            .units()
            .flat_map(|unit| unit.children().iter().map(String::as_str))
            .collect();

        let mut partition = RootPartition::default();
        let mut seen = HashSet::new();
        for id in self.root_children() {
            if has_parent.contains(id.as_str()) || !seen.insert(id.as_str()) {
                partition.detached.push(id.clone());
            } else {
                partition.kept.push(id.clone());
            }
        }
        for unit in self.units() {
            if !has_parent.contains(unit.id()) && !seen.contains(unit.id()) {
                partition.kept.push(unit.id().to_string());
                partition.adopted.push(unit.id().to_string());
            }
        }
        partition
    }

    /// Removes the units registered after the first `mark` ones and returns
    /// their ids in registration order. Links pointing at them are left for
    /// the caller to resolve.
    pub(crate) fn unregister_units_from(&mut self, mark: usize) -> Vec<String> {
        if mark >= self.unit_order.len() {
            return Vec::new();
        }
        let removed = self.unit_order.split_off(mark);
        for id in &removed {
            self.units.remove(id);
        }
        self.normalized = false;
        removed
    }

    /// References that do not resolve: `(unit id, target id)`.
    pub fn dangling_references(&self) -> Vec<(String, String)> {
        let mut dangling = Vec::new();
        for unit in std::iter::once(&self.root).chain(self.units()) {
            for child in &unit.children {
                if !self.units.contains_key(child) {
                    dangling.push((unit.id().to_string(), child.clone()));
                }
            }
            for group in &unit.object_refs {
                if !self.groups.contains_key(group) {
                    dangling.push((unit.id().to_string(), group.clone()));
                }
            }
        }
        dangling
    }

    /// Removes every link from `unit_id` to `target`.
    pub(crate) fn drop_reference(&mut self, unit_id: &str, target: &str) {
        if let Ok(unit) = self.unit_entry_mut(unit_id) {
            unit.children.retain(|child| child != target);
            unit.object_refs.retain(|group| group != target);
        }
        self.normalized = false;
    }

    pub(crate) fn set_root_children(&mut self, children: Vec<String>) {
        self.root.children = children;
        self.normalized = false;
    }

    pub(crate) fn set_normalized(&mut self, back_references: Vec<BackReference>) {
        self.back_references = back_references;
        self.normalized = true;
    }

    pub fn is_normalized(&self) -> bool {
        self.normalized
    }

    /// Back-references recorded by the last normalization.
    pub fn back_references(&self) -> &[BackReference] {
        &self.back_references
    }

    /// Clears the visited set. Called once at the start of every walk.
    pub fn reset_visited(&mut self) {
        self.visited.clear();
    }

    /// Marks `id` visited; returns `false` if it already was.
    pub fn mark_visited(&mut self, id: &str) -> bool {
        self.visited.insert(id.to_string())
    }

    pub fn is_visited(&self, id: &str) -> bool {
        self.visited.contains(id)
    }

    fn unit_entry_mut(&mut self, id: &str) -> SedaResult<&mut ArchiveUnit> {
        if id == ROOT_UNIT_ID {
            return Ok(&mut self.root);
        }
        self.unit_mut(id)
    }
}

#[cfg(test)]
mod tests {
    use super::Package;
    use crate::error::SedaError;
    use crate::model::{ArchiveUnit, BinaryDataObject, DataObjectGroup, ROOT_UNIT_ID};

    #[test]
    fn next_id_skips_ids_in_use() {
        let mut package = Package::new();
        package
            .register_unit(ArchiveUnit::titled("ID1", "Item", "taken").unwrap())
            .unwrap();
        assert_eq!(package.next_id(), "ID2");
        assert_eq!(package.next_id(), "ID3");
    }

    #[test]
    fn object_ids_share_the_id_space() {
        let mut package = Package::new();
        let group = DataObjectGroup::new("ID10")
            .with_binary(BinaryDataObject::new("ID11", "BinaryMaster_1").unwrap());
        package.register_group(group).unwrap();
        let err = package
            .register_unit(ArchiveUnit::titled("ID11", "Item", "clash").unwrap())
            .unwrap_err();
        assert!(matches!(err, SedaError::DuplicateId(id) if id == "ID11"));
    }

    #[test]
    fn root_id_is_reserved_but_accepts_children() {
        let mut package = Package::new();
        let err = package
            .register_unit(ArchiveUnit::titled(ROOT_UNIT_ID, "Item", "x").unwrap())
            .unwrap_err();
        assert!(matches!(err, SedaError::DuplicateId(_)));
        package
            .register_unit(ArchiveUnit::titled("A", "Item", "a").unwrap())
            .unwrap();
        package.add_child(ROOT_UNIT_ID, "A").unwrap();
        assert_eq!(package.root_children(), ["A".to_string()]);
    }

    #[test]
    fn mark_visited_reports_first_visit_only() {
        let mut package = Package::new();
        assert!(package.mark_visited("A"));
        assert!(!package.mark_visited("A"));
        package.reset_visited();
        assert!(!package.is_visited("A"));
    }
}
