//! Package snapshot repository and its SQLite implementation.
//!
//! # Responsibility
//! - Save and restore a whole package graph under its handle.
//! - Store metadata as the XML fragments the codec writes.
//!
//! # Invariants
//! - A save replaces the previous snapshot of the handle atomically.
//! - A restored package is identical to the saved one: same ids, order,
//!   links, paths and normalized flag; every node carries the handle.
//! - Rows that do not rebuild a consistent graph are rejected, not masked.

use crate::db::verify_snapshot_schema;
use crate::error::{SedaError, SedaResult};
use crate::metadata::{ComplexKind, ComplexListType};
use crate::model::{ArchiveUnit, Package, PackageId};
use crate::service::normalize;
use crate::xml::{group_from_xml_str, group_to_xml_string, metadata_to_xml_string};
use chrono::Utc;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;
use uuid::Uuid;

/// Row of [`SnapshotRepository::list_packages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub handle: PackageId,
    pub units: usize,
    pub groups: usize,
    /// Epoch milliseconds of the last save.
    pub saved_at: i64,
}

pub trait SnapshotRepository {
    fn save_package(&mut self, package: &Package) -> SedaResult<()>;
    fn load_package(&self, handle: PackageId) -> SedaResult<Option<Package>>;
    fn list_packages(&self) -> SedaResult<Vec<SnapshotSummary>>;
    /// Returns `false` when no snapshot exists for `handle`.
    fn delete_package(&mut self, handle: PackageId) -> SedaResult<bool>;
}

pub struct SqliteSnapshotRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteSnapshotRepository<'conn> {
    /// Constructs a repository over a migrated connection.
    pub fn try_new(conn: &'conn mut Connection) -> SedaResult<Self> {
        verify_snapshot_schema(conn)?;
        Ok(Self { conn })
    }
}

impl SnapshotRepository for SqliteSnapshotRepository<'_> {
    fn save_package(&mut self, package: &Package) -> SedaResult<()> {
        let started_at = Instant::now();
        let handle = package.handle().to_string();
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute("DELETE FROM packages WHERE handle = ?1;", [handle.as_str()])?;
        tx.execute(
            "INSERT INTO packages (handle, normalized, root_children, management_xml, saved_at)
             VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                handle,
                package.is_normalized(),
                encode_ids(package.root_children())?,
                package.management_metadata_xml,
                Utc::now().timestamp_millis()
            ],
        )?;

        for (position, unit) in package.units().enumerate() {
            let management = unit
                .management
                .as_ref()
                .map(metadata_to_xml_string)
                .transpose()?;
            tx.execute(
                "INSERT INTO units (
                    package_handle, unit_id, position, content_xml, management_xml,
                    profile, children, object_refs
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
                params![
                    handle,
                    unit.id(),
                    position as i64,
                    metadata_to_xml_string(&unit.content)?,
                    management,
                    unit.archive_unit_profile,
                    encode_ids(unit.children())?,
                    encode_ids(unit.object_refs())?
                ],
            )?;
        }

        for (position, group) in package.groups().enumerate() {
            tx.execute(
                "INSERT INTO object_groups (package_handle, group_id, position, group_xml)
                 VALUES (?1, ?2, ?3, ?4);",
                params![handle, group.id(), position as i64, group_to_xml_string(group)?],
            )?;
            for object in &group.binary_objects {
                let Some(path) = &object.on_disk_path else {
                    continue;
                };
                let path = path.to_str().ok_or_else(|| {
                    SedaError::InvalidSnapshot(format!(
                        "path of `{}` is not valid UTF-8",
                        object.id()
                    ))
                })?;
                tx.execute(
                    "INSERT INTO object_paths (package_handle, object_id, path)
                     VALUES (?1, ?2, ?3);",
                    params![handle, object.id(), path],
                )?;
            }
        }
        tx.commit()?;

        info!(
            "event=snapshot_save module=repo status=ok handle={} units={} groups={} duration_ms={}",
            handle,
            package.unit_count(),
            package.group_count(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn load_package(&self, handle: PackageId) -> SedaResult<Option<Package>> {
        let started_at = Instant::now();
        let handle_text = handle.to_string();
        let header = self
            .conn
            .query_row(
                "SELECT normalized, root_children, management_xml
                 FROM packages
                 WHERE handle = ?1;",
                [handle_text.as_str()],
                |row| {
                    Ok((
                        row.get::<_, bool>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                    ))
                },
            )
            .optional()?;
        let Some((normalized, root_children, management_xml)) = header else {
            return Ok(None);
        };

        let mut package = Package::with_handle(handle);
        package.management_metadata_xml = management_xml;

        let mut paths = load_paths(self.conn, &handle_text)?;
        let mut stmt = self.conn.prepare(
            "SELECT group_id, group_xml
             FROM object_groups
             WHERE package_handle = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([handle_text.as_str()])?;
        while let Some(row) = rows.next()? {
            let group_id: String = row.get(0)?;
            let xml: String = row.get(1)?;
            let mut group = group_from_xml_str(&xml, handle)
                .map_err(|err| invalid_row("group", &group_id, err))?;
            for object in &mut group.binary_objects {
                object.on_disk_path = paths.remove(object.id());
            }
            package.register_group(group)?;
        }
        if let Some(object_id) = paths.keys().next() {
            return Err(SedaError::InvalidSnapshot(format!(
                "path recorded for unknown object `{object_id}`"
            )));
        }

        let mut stmt = self.conn.prepare(
            "SELECT unit_id, content_xml, management_xml, profile, children, object_refs
             FROM units
             WHERE package_handle = ?1
             ORDER BY position ASC;",
        )?;
        let mut rows = stmt.query([handle_text.as_str()])?;
        while let Some(row) = rows.next()? {
            let unit_id: String = row.get(0)?;
            let content_xml: String = row.get(1)?;
            let management_xml: Option<String> = row.get(2)?;
            let content = ComplexListType::from_fragment(&content_xml, ComplexKind::Content)
                .map_err(|err| invalid_row("unit", &unit_id, err))?;
            let mut unit = ArchiveUnit::in_package(handle, unit_id.as_str(), content);
            unit.management = management_xml
                .map(|xml| ComplexListType::from_fragment(&xml, ComplexKind::Management))
                .transpose()
                .map_err(|err| invalid_row("unit", &unit_id, err))?;
            unit.archive_unit_profile = row.get(3)?;
            unit.children = decode_ids(&row.get::<_, String>(4)?)?;
            unit.object_refs = decode_ids(&row.get::<_, String>(5)?)?;
            package.register_unit(unit)?;
        }
        package.set_root_children(decode_ids(&root_children)?);

        if let Some((unit_id, target)) = package.dangling_references().into_iter().next() {
            return Err(SedaError::InvalidSnapshot(format!(
                "unit `{unit_id}` references unknown id `{target}`"
            )));
        }
        if normalized {
            normalize(&mut package)?;
        }

        info!(
            "event=snapshot_load module=repo status=ok handle={} units={} groups={} duration_ms={}",
            handle,
            package.unit_count(),
            package.group_count(),
            started_at.elapsed().as_millis()
        );
        Ok(Some(package))
    }

    fn list_packages(&self) -> SedaResult<Vec<SnapshotSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                p.handle,
                (SELECT COUNT(*) FROM units u WHERE u.package_handle = p.handle),
                (SELECT COUNT(*) FROM object_groups g WHERE g.package_handle = p.handle),
                p.saved_at
             FROM packages p
             ORDER BY p.saved_at DESC, p.handle ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            let handle_text: String = row.get(0)?;
            let handle = Uuid::parse_str(&handle_text).map_err(|_| {
                SedaError::InvalidSnapshot(format!("invalid package handle `{handle_text}`"))
            })?;
            summaries.push(SnapshotSummary {
                handle,
                units: row.get::<_, i64>(1)? as usize,
                groups: row.get::<_, i64>(2)? as usize,
                saved_at: row.get(3)?,
            });
        }
        Ok(summaries)
    }

    fn delete_package(&mut self, handle: PackageId) -> SedaResult<bool> {
        let deleted = self.conn.execute(
            "DELETE FROM packages WHERE handle = ?1;",
            [handle.to_string()],
        )?;
        info!(
            "event=snapshot_delete module=repo status=ok handle={} deleted={}",
            handle,
            deleted > 0
        );
        Ok(deleted > 0)
    }
}

fn load_paths(conn: &Connection, handle: &str) -> SedaResult<HashMap<String, PathBuf>> {
    let mut stmt = conn.prepare(
        "SELECT object_id, path
         FROM object_paths
         WHERE package_handle = ?1;",
    )?;
    let mut rows = stmt.query([handle])?;
    let mut paths = HashMap::new();
    while let Some(row) = rows.next()? {
        let object_id: String = row.get(0)?;
        let path: String = row.get(1)?;
        paths.insert(object_id, PathBuf::from(path));
    }
    Ok(paths)
}

fn encode_ids(ids: &[String]) -> SedaResult<String> {
    serde_json::to_string(ids)
        .map_err(|err| SedaError::InvalidSnapshot(format!("cannot encode id list: {err}")))
}

fn decode_ids(raw: &str) -> SedaResult<Vec<String>> {
    serde_json::from_str(raw)
        .map_err(|err| SedaError::InvalidSnapshot(format!("invalid id list `{raw}`: {err}")))
}

fn invalid_row(what: &str, id: &str, err: SedaError) -> SedaError {
    SedaError::InvalidSnapshot(format!("{what} `{id}` cannot be decoded: {err}"))
}
