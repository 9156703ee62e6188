//! SEDA manifest codec.
//!
//! # Responsibility
//! - Serialize a normalized package as an `ArchiveTransfer`, nesting units
//!   (hierarchical layout) or listing them as siblings (flat layout).
//! - Rebuild an identical graph from either layout in one streaming pass.
//!
//! # Invariants
//! - Malformed XML aborts the whole read.
//! - A shared unit is expanded at its first encounter only; later
//!   encounters are `ArchiveUnitRefId` references.
//! - Every node read is stamped with its package handle at creation.
//! - A package whose graph changed since its last normalization is never
//!   written.

use super::reader::{Peeked, SedaXmlReader};
use super::writer::SedaXmlWriter;
use crate::error::{SedaError, SedaResult};
use crate::metadata::{ComplexKind, ComplexListType, DateValue, ElementKind, Metadata, SedaMetadata};
use crate::model::{
    ArchiveTransfer, ArchiveUnit, BinaryDataObject, DataObjectGroup, GlobalMetadata, Package,
    PackageId, PhysicalDataObject,
};
use crate::service::normalize;
use crate::version::SedaVersion;
use chrono::{DateTime, FixedOffset, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::{BufRead, Write};
use std::time::Instant;

const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// How units are laid out under `DescriptiveMetadata`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestLayout {
    /// Every unit is a sibling; child links are references.
    Flat,
    /// Units nest following child order.
    #[default]
    Hierarchical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Abort on the first per-unit failure instead of skipping the unit.
    pub stop_on_first_failure: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            stop_on_first_failure: true,
        }
    }
}

#[derive(Debug)]
pub struct ReadOutcome {
    pub transfer: ArchiveTransfer,
    pub layout: ManifestLayout,
    /// Skipped units and dropped references, in document order.
    pub failures: Vec<SedaError>,
}

#[derive(Debug)]
pub struct PackageOutcome {
    pub package: Package,
    pub layout: ManifestLayout,
    pub failures: Vec<SedaError>,
}

/// Writes a complete `ArchiveTransfer` document.
///
/// # Errors
/// - [`SedaError::NotNormalized`] when the graph changed since its last
///   normalization.
pub fn write_archive_transfer<W: Write>(
    transfer: &ArchiveTransfer,
    writer: &mut SedaXmlWriter<W>,
    layout: ManifestLayout,
) -> SedaResult<()> {
    ensure_normalized(&transfer.package)?;
    let started_at = Instant::now();
    let global = &transfer.global;
    let namespace = writer.version().namespace();

    writer.write_declaration()?;
    writer.start_with(
        "ArchiveTransfer",
        &[("xmlns", namespace), ("xmlns:xlink", XLINK_NAMESPACE)],
    )?;
    if let Some(comment) = &global.comment {
        writer.text_element("Comment", &[], comment)?;
    }
    let date = global.date.unwrap_or_else(|| {
        let now: DateTime<FixedOffset> = Utc::now().into();
        now
    });
    writer.text_element("Date", &[], &DateValue::DateTime(date).format())?;
    writer.text_element("MessageIdentifier", &[], &global.message_identifier)?;
    if let Some(agreement) = &global.archival_agreement {
        writer.text_element("ArchivalAgreement", &[], agreement)?;
    }
    match &global.code_list_versions_xml {
        Some(raw) => writer.raw_block(raw)?,
        None => writer.empty("CodeListVersions")?,
    }
    write_data_object_package(&transfer.package, writer, layout)?;
    write_agency(writer, "ArchivalAgency", &global.archival_agency_identifier)?;
    write_agency(
        writer,
        "TransferringAgency",
        &global.transferring_agency_identifier,
    )?;
    writer.end("ArchiveTransfer")?;

    info!(
        "event=manifest_write module=xml status=ok layout={:?} units={} groups={} duration_ms={}",
        layout,
        transfer.package.unit_count(),
        transfer.package.group_count(),
        started_at.elapsed().as_millis()
    );
    Ok(())
}

/// Writes the `DataObjectPackage` element: groups, units, then the
/// package-level management block.
pub fn write_data_object_package<W: Write>(
    package: &Package,
    writer: &mut SedaXmlWriter<W>,
    layout: ManifestLayout,
) -> SedaResult<()> {
    ensure_normalized(package)?;
    writer.start("DataObjectPackage")?;
    for group in package.groups() {
        write_group(group, writer)?;
    }
    writer.start("DescriptiveMetadata")?;
    let mut references = 0;
    match layout {
        ManifestLayout::Hierarchical => {
            let mut expanded = HashSet::new();
            for id in package.root_children() {
                write_unit_tree(package, id, writer, &mut expanded, &mut references)?;
            }
        }
        ManifestLayout::Flat => {
            for id in preorder(package, package.root_children())? {
                write_unit_flat(package, &id, writer, &mut references)?;
            }
        }
    }
    writer.end("DescriptiveMetadata")?;
    match &package.management_metadata_xml {
        Some(raw) => writer.raw_block(raw)?,
        None => writer.empty("ManagementMetadata")?,
    }
    writer.end("DataObjectPackage")
}

/// Writes one unit and its descendants in the requested layout.
pub fn write_archive_unit<W: Write>(
    package: &Package,
    unit_id: &str,
    writer: &mut SedaXmlWriter<W>,
    layout: ManifestLayout,
) -> SedaResult<()> {
    ensure_normalized(package)?;
    let mut references = 0;
    match layout {
        ManifestLayout::Hierarchical => {
            let mut expanded = HashSet::new();
            write_unit_tree(package, unit_id, writer, &mut expanded, &mut references)
        }
        ManifestLayout::Flat => {
            for id in preorder(package, &[unit_id.to_string()])? {
                write_unit_flat(package, &id, writer, &mut references)?;
            }
            Ok(())
        }
    }
}

pub fn write_group<W: Write>(group: &DataObjectGroup, writer: &mut SedaXmlWriter<W>) -> SedaResult<()> {
    writer.start_with("DataObjectGroup", &[("id", group.id())])?;
    for object in &group.binary_objects {
        write_object(writer, "BinaryDataObject", object.id(), &object.metadata)?;
    }
    for object in &group.physical_objects {
        write_object(writer, "PhysicalDataObject", object.id(), &object.metadata)?;
    }
    writer.end("DataObjectGroup")
}

fn write_object<W: Write>(
    writer: &mut SedaXmlWriter<W>,
    element: &str,
    id: &str,
    metadata: &ComplexListType,
) -> SedaResult<()> {
    writer.start_with(element, &[("id", id)])?;
    for child in metadata.children() {
        child.write_xml(writer)?;
    }
    writer.end(element)
}

fn write_agency<W: Write>(writer: &mut SedaXmlWriter<W>, element: &str, identifier: &str) -> SedaResult<()> {
    writer.start(element)?;
    writer.text_element("Identifier", &[], identifier)?;
    writer.end(element)
}

fn write_unit_tree<W: Write>(
    package: &Package,
    unit_id: &str,
    writer: &mut SedaXmlWriter<W>,
    expanded: &mut HashSet<String>,
    references: &mut usize,
) -> SedaResult<()> {
    if !expanded.insert(unit_id.to_string()) {
        return write_unit_reference(package, unit_id, writer, references);
    }
    let unit = package.unit(unit_id)?;
    write_unit_head(unit, writer)?;
    for child in unit.children() {
        write_unit_tree(package, child, writer, expanded, references)?;
    }
    write_object_refs(unit, writer)?;
    writer.end("ArchiveUnit")
}

fn write_unit_flat<W: Write>(
    package: &Package,
    unit_id: &str,
    writer: &mut SedaXmlWriter<W>,
    references: &mut usize,
) -> SedaResult<()> {
    let unit = package.unit(unit_id)?;
    write_unit_head(unit, writer)?;
    for child in unit.children() {
        write_unit_reference(package, child, writer, references)?;
    }
    write_object_refs(unit, writer)?;
    writer.end("ArchiveUnit")
}

fn write_unit_head<W: Write>(unit: &ArchiveUnit, writer: &mut SedaXmlWriter<W>) -> SedaResult<()> {
    writer.start_with("ArchiveUnit", &[("id", unit.id())])?;
    if let Some(profile) = &unit.archive_unit_profile {
        writer.text_element("ArchiveUnitProfile", &[], profile)?;
    }
    if let Some(management) = &unit.management {
        management.write_xml(writer)?;
    }
    unit.content.write_xml(writer)
}

/// Writes an `ArchiveUnitRefId` element under a fresh `AUREF<n>` id that no
/// node of `package` uses.
fn write_unit_reference<W: Write>(
    package: &Package,
    target: &str,
    writer: &mut SedaXmlWriter<W>,
    references: &mut usize,
) -> SedaResult<()> {
    let id = loop {
        *references += 1;
        let candidate = format!("AUREF{references}");
        if !package.contains_id(&candidate) {
            break candidate;
        }
    };
    writer.start_with("ArchiveUnit", &[("id", &id)])?;
    writer.text_element("ArchiveUnitRefId", &[], target)?;
    writer.end("ArchiveUnit")
}

fn write_object_refs<W: Write>(unit: &ArchiveUnit, writer: &mut SedaXmlWriter<W>) -> SedaResult<()> {
    for group in unit.object_refs() {
        writer.start("DataObjectReference")?;
        writer.text_element("DataObjectGroupReferenceId", &[], group)?;
        writer.end("DataObjectReference")?;
    }
    Ok(())
}

/// Pre-order, each unit once, starting from `starts`.
fn preorder(package: &Package, starts: &[String]) -> SedaResult<Vec<String>> {
    let mut order = Vec::new();
    let mut seen = HashSet::new();
    let mut stack: Vec<&str> = starts.iter().rev().map(String::as_str).collect();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        let unit = package.unit(id)?;
        order.push(id.to_string());
        stack.extend(unit.children().iter().rev().map(String::as_str));
    }
    Ok(order)
}

fn ensure_normalized(package: &Package) -> SedaResult<()> {
    if package.is_normalized() {
        Ok(())
    } else {
        Err(SedaError::NotNormalized)
    }
}

/// Reads a complete `ArchiveTransfer` document. The schema version is taken
/// from the root namespace when it is a known one.
pub fn read_archive_transfer<R: BufRead>(
    reader: &mut SedaXmlReader<R>,
    options: ReadOptions,
) -> SedaResult<ReadOutcome> {
    let started_at = Instant::now();
    let start = reader.expect_start(Some("ArchiveTransfer"))?;
    if let Some(version) = start.attribute("xmlns").and_then(SedaVersion::from_namespace) {
        reader.set_version(version);
    }

    let mut global = GlobalMetadata::default();
    let mut body = None;
    loop {
        match reader.peek()? {
            Peeked::Start(name) => match name.as_str() {
                "Comment" => global.comment = Some(read_simple(reader)?),
                "Date" => {
                    let raw = read_simple(reader)?;
                    match DateValue::parse(&raw) {
                        Some(DateValue::DateTime(date)) => global.date = Some(date),
                        _ => return Err(SedaError::scalar("Date", raw, "a date-time")),
                    }
                }
                "MessageIdentifier" => global.message_identifier = read_simple(reader)?,
                "ArchivalAgreement" => global.archival_agreement = Some(read_simple(reader)?),
                "CodeListVersions" => global.code_list_versions_xml = Some(reader.read_raw()?.1),
                "DataObjectPackage" => body = Some(read_data_object_package(reader, options)?),
                "ArchivalAgency" => global.archival_agency_identifier = read_agency(reader)?,
                "TransferringAgency" => {
                    global.transferring_agency_identifier = read_agency(reader)?
                }
                _ => return Err(SedaError::unexpected(name, "ArchiveTransfer")),
            },
            Peeked::Text => return Err(SedaError::unexpected("#text", "ArchiveTransfer")),
            Peeked::End(_) | Peeked::Eof => {
                reader.expect_end("ArchiveTransfer")?;
                break;
            }
        }
    }

    let body = body.ok_or_else(|| SedaError::missing("DataObjectPackage", "ArchiveTransfer"))?;
    info!(
        "event=manifest_read module=xml status=ok version={} layout={:?} units={} failures={} duration_ms={}",
        reader.version(),
        body.layout,
        body.package.unit_count(),
        body.failures.len(),
        started_at.elapsed().as_millis()
    );
    Ok(ReadOutcome {
        transfer: ArchiveTransfer::new(global, body.package),
        layout: body.layout,
        failures: body.failures,
    })
}

/// Reads a `DataObjectPackage` element into a fresh, normalized package.
pub fn read_data_object_package<R: BufRead>(
    reader: &mut SedaXmlReader<R>,
    options: ReadOptions,
) -> SedaResult<PackageOutcome> {
    reader.expect_start(Some("DataObjectPackage"))?;
    let mut state = PackageReader {
        reader,
        package: Package::new(),
        options,
        failures: Vec::new(),
        failed_units: HashSet::new(),
        nested: false,
    };
    loop {
        match state.reader.peek()? {
            Peeked::Start(name) => match name.as_str() {
                "DataObjectGroup" => {
                    let group = read_group(state.reader, state.package.handle())?;
                    state.package.register_group(group)?;
                }
                "DescriptiveMetadata" => state.read_descriptive_metadata()?,
                "ManagementMetadata" => {
                    state.package.management_metadata_xml = Some(state.reader.read_raw()?.1)
                }
                _ => return Err(SedaError::unexpected(name, "DataObjectPackage")),
            },
            Peeked::Text => return Err(SedaError::unexpected("#text", "DataObjectPackage")),
            Peeked::End(_) | Peeked::Eof => {
                state.reader.expect_end("DataObjectPackage")?;
                break;
            }
        }
    }
    state.finish()
}

/// Reads one `DataObjectGroup`, stamping it with `package`.
pub fn read_group<R: BufRead>(
    reader: &mut SedaXmlReader<R>,
    package: PackageId,
) -> SedaResult<DataObjectGroup> {
    let start = reader.expect_start(Some("DataObjectGroup"))?;
    let id = start
        .attribute("id")
        .ok_or_else(|| SedaError::missing("id", "DataObjectGroup"))?;
    let mut group = DataObjectGroup::in_package(package, id);
    loop {
        match reader.peek()? {
            Peeked::Start(name) if name == "BinaryDataObject" => {
                let (id, metadata) = read_object(reader, ComplexKind::BinaryDataObject)?;
                group
                    .binary_objects
                    .push(BinaryDataObject::from_metadata(id, metadata));
            }
            Peeked::Start(name) if name == "PhysicalDataObject" => {
                let (id, metadata) = read_object(reader, ComplexKind::PhysicalDataObject)?;
                group
                    .physical_objects
                    .push(PhysicalDataObject::from_metadata(id, metadata));
            }
            Peeked::Start(name) => return Err(SedaError::unexpected(name, "DataObjectGroup")),
            Peeked::Text => return Err(SedaError::unexpected("#text", "DataObjectGroup")),
            Peeked::End(_) | Peeked::Eof => {
                reader.expect_end("DataObjectGroup")?;
                return Ok(group);
            }
        }
    }
}

fn read_object<R: BufRead>(
    reader: &mut SedaXmlReader<R>,
    kind: ComplexKind,
) -> SedaResult<(String, ComplexListType)> {
    let start = reader.expect_start(None)?;
    let id = start
        .attribute("id")
        .map(str::to_string)
        .ok_or_else(|| SedaError::missing("id", start.name.clone()))?;
    let metadata = ComplexListType::read_body(reader, kind, start.name)?;
    Ok((id, metadata))
}

fn read_simple<R: BufRead>(reader: &mut SedaXmlReader<R>) -> SedaResult<String> {
    let start = reader.expect_start(None)?;
    reader.read_text(&start.name)
}

fn read_agency<R: BufRead>(reader: &mut SedaXmlReader<R>) -> SedaResult<String> {
    let start = reader.expect_start(None)?;
    let mut identifier = None;
    loop {
        match reader.peek()? {
            Peeked::Start(name) if name == "Identifier" => identifier = Some(read_simple(reader)?),
            Peeked::Start(_) => reader.skip_element()?,
            Peeked::Text => return Err(SedaError::unexpected("#text", start.name)),
            Peeked::End(_) | Peeked::Eof => {
                reader.expect_end(&start.name)?;
                break;
            }
        }
    }
    identifier.ok_or_else(|| SedaError::missing("Identifier", start.name))
}

/// A child link found while reading a unit.
enum UnitLink {
    /// A full unit element.
    Expanded(String),
    /// An `ArchiveUnitRefId` reference.
    Reference(String),
}

impl UnitLink {
    fn into_target(self) -> String {
        match self {
            Self::Expanded(id) | Self::Reference(id) => id,
        }
    }
}

struct PackageReader<'a, R: BufRead> {
    reader: &'a mut SedaXmlReader<R>,
    package: Package,
    options: ReadOptions,
    failures: Vec<SedaError>,
    failed_units: HashSet<String>,
    /// A full unit was found nested in another one.
    nested: bool,
}

impl<R: BufRead> PackageReader<'_, R> {
    fn read_descriptive_metadata(&mut self) -> SedaResult<()> {
        self.reader.expect_start(Some("DescriptiveMetadata"))?;
        let mut top_level = self.package.root_children().to_vec();
        loop {
            match self.reader.peek()? {
                Peeked::Start(name) if name == "ArchiveUnit" => {
                    if let Some(link) = self.read_unit()? {
                        top_level.push(link.into_target());
                    }
                }
                Peeked::Start(name) => {
                    return Err(SedaError::unexpected(name, "DescriptiveMetadata"))
                }
                Peeked::Text => return Err(SedaError::unexpected("#text", "DescriptiveMetadata")),
                Peeked::End(_) | Peeked::Eof => {
                    self.reader.expect_end("DescriptiveMetadata")?;
                    break;
                }
            }
        }
        self.package.set_root_children(top_level);
        Ok(())
    }

    /// Reads one `ArchiveUnit` element. Returns `None` when the unit failed
    /// and was skipped.
    fn read_unit(&mut self) -> SedaResult<Option<UnitLink>> {
        let depth = self.reader.depth();
        let registered_before = self.package.unit_count();
        let start = self.reader.expect_start(Some("ArchiveUnit"))?;
        let label = start.attribute("id").unwrap_or("?").to_string();
        let result = match start.attribute("id") {
            Some(id) => self.read_unit_body(id.to_string()),
            None => Err(SedaError::missing("id", "ArchiveUnit")),
        };
        match result {
            Ok(link) => Ok(Some(link)),
            Err(err) if err.is_unit_scoped() && !self.options.stop_on_first_failure => {
                let err = err.in_unit(&label);
                warn!(
                    "event=manifest_read module=xml status=unit_skipped unit_id={} error={}",
                    label, err
                );
                self.reader.skip_to_depth(depth)?;
                self.failures.push(err);
                for unit_id in self.package.unregister_units_from(registered_before) {
                    warn!(
                        "event=manifest_read module=xml status=unit_discarded unit_id={} parent_id={}",
                        unit_id, label
                    );
                    self.failed_units.insert(unit_id.clone());
                    self.failures.push(SedaError::DiscardedWithParent {
                        unit_id,
                        parent_id: label.clone(),
                    });
                }
                self.failed_units.insert(label);
                Ok(None)
            }
            Err(err) => Err(err.in_unit(&label)),
        }
    }

    fn read_unit_body(&mut self, id: String) -> SedaResult<UnitLink> {
        if self.reader.peek()? == Peeked::Start("ArchiveUnitRefId".to_string()) {
            let target = read_simple(self.reader)?.trim().to_string();
            self.reader.expect_end("ArchiveUnit")?;
            return Ok(UnitLink::Reference(target));
        }

        let mut profile = None;
        let mut management = None;
        let mut content = None;
        let mut children = Vec::new();
        let mut object_refs = Vec::new();
        loop {
            match self.reader.peek()? {
                Peeked::Start(name) => match name.as_str() {
                    "ArchiveUnitProfile"
                        if profile.is_none() && management.is_none() && content.is_none() =>
                    {
                        profile = Some(read_simple(self.reader)?);
                    }
                    "Management" if management.is_none() && content.is_none() => {
                        management = Some(ComplexListType::read_xml(
                            self.reader,
                            ComplexKind::Management,
                        )?);
                    }
                    "Content" if content.is_none() => {
                        content = Some(ComplexListType::read_xml(
                            self.reader,
                            ComplexKind::Content,
                        )?);
                    }
                    "ArchiveUnit" | "DataObjectReference" if content.is_none() => {
                        return Err(SedaError::missing("Content", "ArchiveUnit"));
                    }
                    "ArchiveUnit" => {
                        if let Some(link) = self.read_unit()? {
                            if matches!(link, UnitLink::Expanded(_)) {
                                self.nested = true;
                            }
                            children.push(link.into_target());
                        }
                    }
                    "DataObjectReference" => object_refs.push(self.read_object_reference()?),
                    _ => return Err(SedaError::unexpected(name, "ArchiveUnit")),
                },
                Peeked::Text => return Err(SedaError::unexpected("#text", "ArchiveUnit")),
                Peeked::End(_) | Peeked::Eof => {
                    self.reader.expect_end("ArchiveUnit")?;
                    break;
                }
            }
        }

        let content = content.ok_or_else(|| SedaError::missing("Content", "ArchiveUnit"))?;
        let mut unit = ArchiveUnit::in_package(self.package.handle(), id.clone(), content);
        unit.management = management;
        unit.archive_unit_profile = profile;
        unit.children = children;
        unit.object_refs = object_refs;
        self.package.register_unit(unit)?;
        Ok(UnitLink::Expanded(id))
    }

    fn read_object_reference(&mut self) -> SedaResult<String> {
        self.reader.expect_start(Some("DataObjectReference"))?;
        let mut group = None;
        loop {
            match self.reader.peek()? {
                Peeked::Start(name) if name == "DataObjectGroupReferenceId" => {
                    group = Some(read_simple(self.reader)?.trim().to_string());
                }
                Peeked::Start(name) => {
                    return Err(SedaError::unexpected(name, "DataObjectReference"))
                }
                Peeked::Text => return Err(SedaError::unexpected("#text", "DataObjectReference")),
                Peeked::End(_) | Peeked::Eof => {
                    self.reader.expect_end("DataObjectReference")?;
                    break;
                }
            }
        }
        group.ok_or_else(|| {
            SedaError::missing("DataObjectGroupReferenceId", "DataObjectReference")
        })
    }

    /// Resolves forward references, drops the unresolvable ones in bulk
    /// mode, then normalizes.
    fn finish(mut self) -> SedaResult<PackageOutcome> {
        for (unit_id, target) in self.package.dangling_references() {
            if self.options.stop_on_first_failure {
                return Err(SedaError::UnknownId(target));
            }
            warn!(
                "event=manifest_read module=xml status=reference_dropped unit_id={} target={} target_failed={}",
                unit_id,
                target,
                self.failed_units.contains(&target)
            );
            self.package.drop_reference(&unit_id, &target);
            self.failures.push(SedaError::UnknownId(target));
        }
        normalize(&mut self.package)?;
        let layout = if self.nested {
            ManifestLayout::Hierarchical
        } else {
            ManifestLayout::Flat
        };
        Ok(PackageOutcome {
            package: self.package,
            layout,
            failures: self.failures,
        })
    }
}

/// Serializes a whole transfer to a string.
pub fn archive_transfer_to_string(
    transfer: &ArchiveTransfer,
    layout: ManifestLayout,
    version: SedaVersion,
    indent: usize,
) -> SedaResult<String> {
    let mut writer = SedaXmlWriter::new(Vec::new(), indent, version);
    write_archive_transfer(transfer, &mut writer, layout)?;
    String::from_utf8(writer.into_inner()).map_err(SedaError::xml_write)
}

pub fn archive_transfer_from_str(xml: &str, options: ReadOptions) -> SedaResult<ReadOutcome> {
    let mut reader = SedaXmlReader::new(xml.as_bytes(), SedaVersion::default());
    read_archive_transfer(&mut reader, options)
}

/// Serializes a single element without indentation.
pub fn metadata_to_xml_string<M: SedaMetadata>(metadata: &M) -> SedaResult<String> {
    let mut writer = SedaXmlWriter::new(Vec::new(), 0, SedaVersion::LATEST);
    metadata.write_xml(&mut writer)?;
    String::from_utf8(writer.into_inner()).map_err(SedaError::xml_write)
}

pub fn metadata_from_xml_str(
    xml: &str,
    kind: ElementKind,
    version: SedaVersion,
) -> SedaResult<Metadata> {
    let mut reader = SedaXmlReader::new(xml.as_bytes(), version);
    Metadata::read_xml(&mut reader, kind)
}

pub fn group_to_xml_string(group: &DataObjectGroup) -> SedaResult<String> {
    let mut writer = SedaXmlWriter::new(Vec::new(), 0, SedaVersion::LATEST);
    write_group(group, &mut writer)?;
    String::from_utf8(writer.into_inner()).map_err(SedaError::xml_write)
}

pub fn group_from_xml_str(xml: &str, package: PackageId) -> SedaResult<DataObjectGroup> {
    let mut reader = SedaXmlReader::new(xml.as_bytes(), SedaVersion::LATEST);
    read_group(&mut reader, package)
}
