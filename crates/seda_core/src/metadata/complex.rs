//! Composite element: ordered typed children checked against a schema table.
//!
//! # Invariants
//! - Children read from XML keep document order.
//! - Programmatic insertion places a child at its schema position; children
//!   of the same name keep insertion order, extras stay last.

use super::leaf::{DateTimeType, IntegerType, StringType, TextType};
use super::schema::{ComplexKind, ComplexSchema, ElementKind};
use super::{AnyXmlType, FlatRow, Metadata, SedaMetadata};
use crate::error::{SedaError, SedaResult};
use crate::version::SedaVersion;
use crate::xml::{Peeked, SedaXmlReader, SedaXmlWriter};
use std::collections::HashMap;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplexListType {
    kind: ComplexKind,
    name: String,
    children: Vec<Metadata>,
}

impl ComplexListType {
    pub fn new(kind: ComplexKind) -> Self {
        Self::named(kind, kind.default_name())
    }

    /// Composite whose element name differs from the kind default, e.g. an
    /// `AppraisalRule` of kind [`ComplexKind::Rule`].
    pub fn named(kind: ComplexKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn kind(&self) -> ComplexKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[Metadata] {
        &self.children
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn schema(&self) -> &'static ComplexSchema {
        self.kind.schema()
    }

    /// Inserts `metadata` at its schema position.
    pub fn add_metadata(&mut self, metadata: impl Into<Metadata>) -> SedaResult<()> {
        let metadata = metadata.into();
        let name = metadata.element_name().to_string();
        let schema = self.schema();
        let Some((position, entry)) = schema.entry(&name, SedaVersion::LATEST) else {
            if schema.expandable {
                self.children.push(metadata);
                return Ok(());
            }
            return Err(SedaError::unexpected(name, self.name.clone()));
        };
        if metadata.kind() != entry.kind && !matches!(metadata, Metadata::AnyXml(_)) {
            return Err(SedaError::unexpected(name, self.name.clone()));
        }
        if !entry.cardinality.is_repeatable() && self.get(&name).is_some() {
            return Err(SedaError::unexpected(name, self.name.clone()));
        }
        let index = self
            .children
            .iter()
            .position(|child| self.position_of(child.element_name()) > position)
            .unwrap_or(self.children.len());
        self.children.insert(index, metadata);
        Ok(())
    }

    /// Builds the typed leaf declared for `name` from its textual value.
    pub fn add_new_metadata(&mut self, name: &str, value: &str) -> SedaResult<()> {
        let entry = self
            .schema()
            .entry(name, SedaVersion::LATEST)
            .map(|(_, entry)| entry)
            .ok_or_else(|| SedaError::unexpected(name, self.name.clone()))?;
        let metadata = match entry.kind {
            ElementKind::String => Metadata::String(StringType::new(name, value)),
            ElementKind::Text => Metadata::Text(TextType::new(name, value)),
            ElementKind::Integer => Metadata::Integer(IntegerType::parse(name, value)?),
            ElementKind::DateTime => Metadata::DateTime(DateTimeType::parse(name, value)?),
            ElementKind::AnyXml => Metadata::AnyXml(AnyXmlType::new(name, value)),
            ElementKind::Digest => {
                return Err(SedaError::scalar(name, value, "an algorithm and a digest"))
            }
            ElementKind::Complex(_) => {
                return Err(SedaError::scalar(name, value, "a composite element"))
            }
        };
        self.add_metadata(metadata)
    }

    /// Replaces every child named like `metadata` with it.
    pub fn set_metadata(&mut self, metadata: impl Into<Metadata>) -> SedaResult<()> {
        let metadata = metadata.into();
        let name = metadata.element_name().to_string();
        self.remove_all(&name);
        self.add_metadata(metadata)
    }

    pub fn remove_all(&mut self, name: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|child| child.element_name() != name);
        before - self.children.len()
    }

    pub fn get(&self, name: &str) -> Option<&Metadata> {
        self.children
            .iter()
            .find(|child| child.element_name() == name)
    }

    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Metadata> + 'a {
        self.children
            .iter()
            .filter(move |child| child.element_name() == name)
    }

    pub fn get_complex(&self, name: &str) -> Option<&ComplexListType> {
        self.get(name).and_then(Metadata::as_complex)
    }

    /// String form of the first scalar child named `name`.
    pub fn simple_metadata(&self, name: &str) -> Option<String> {
        self.get_all(name).find_map(Metadata::simple_value)
    }

    pub(crate) fn push_unchecked(&mut self, metadata: Metadata) {
        self.children.push(metadata);
    }

    /// Reads the children of an element whose start tag was already
    /// consumed, then its end tag.
    pub fn read_body<R: BufRead>(
        reader: &mut SedaXmlReader<R>,
        kind: ComplexKind,
        name: String,
    ) -> SedaResult<Self> {
        let list = Self::read_children(reader, kind, name)?;
        list.check_cardinality(reader.version())?;
        Ok(list)
    }

    /// Reads a stored fragment without cardinality checks, so that
    /// work-in-progress units survive a snapshot.
    pub(crate) fn from_fragment(xml: &str, kind: ComplexKind) -> SedaResult<Self> {
        let mut reader = SedaXmlReader::new(xml.as_bytes(), SedaVersion::LATEST);
        let start = reader.expect_start(None)?;
        Self::read_children(&mut reader, kind, start.name)
    }

    fn read_children<R: BufRead>(
        reader: &mut SedaXmlReader<R>,
        kind: ComplexKind,
        name: String,
    ) -> SedaResult<Self> {
        let mut list = Self::named(kind, name);
        let schema = kind.schema();
        let version = reader.version();
        loop {
            match reader.peek()? {
                Peeked::Start(child) => match schema.entry(&child, version) {
                    Some((_, entry)) => {
                        let metadata = Metadata::read_xml(reader, entry.kind)?;
                        list.children.push(metadata);
                    }
                    None if schema.expandable => {
                        list.children.push(Metadata::AnyXml(AnyXmlType::read_xml(reader, ())?));
                    }
                    None => return Err(SedaError::unexpected(child, list.name)),
                },
                Peeked::Text => return Err(SedaError::unexpected("#text", list.name)),
                Peeked::End(_) | Peeked::Eof => {
                    reader.expect_end(&list.name)?;
                    break;
                }
            }
        }
        Ok(list)
    }

    /// Checks mandatory and non-repeatable entries visible in `version`.
    pub fn check_cardinality(&self, version: SedaVersion) -> SedaResult<()> {
        for entry in self.schema().entries_for(version) {
            let count = self.get_all(entry.name).count();
            if count == 0 && entry.cardinality.is_mandatory() {
                return Err(SedaError::missing(entry.name, self.name.clone()));
            }
            if count > 1 && !entry.cardinality.is_repeatable() {
                return Err(SedaError::unexpected(entry.name, self.name.clone()));
            }
        }
        Ok(())
    }

    fn position_of(&self, name: &str) -> usize {
        self.schema()
            .entry(name, SedaVersion::LATEST)
            .map(|(position, _)| position)
            .unwrap_or(usize::MAX)
    }
}

impl SedaMetadata for ComplexListType {
    type ReadContext = ComplexKind;

    fn element_name(&self) -> &str {
        &self.name
    }

    fn read_xml<R: BufRead>(reader: &mut SedaXmlReader<R>, kind: ComplexKind) -> SedaResult<Self> {
        let start = reader.expect_start(None)?;
        Self::read_body(reader, kind, start.name)
    }

    fn write_xml<W: Write>(&self, writer: &mut SedaXmlWriter<W>) -> SedaResult<()> {
        if self.children.is_empty() {
            return writer.empty(&self.name);
        }
        writer.start(&self.name)?;
        for child in &self.children {
            child.write_xml(writer)?;
        }
        writer.end(&self.name)
    }

    /// Keys are relative to this element; repeatable children get an
    /// occurrence index, nested composites a dotted prefix.
    fn to_flat_row(&self) -> FlatRow {
        let mut row = Vec::new();
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for child in &self.children {
            let name = child.element_name();
            let counter = occurrences.entry(name).or_insert(0);
            let index = *counter;
            *counter += 1;
            let repeatable = self
                .schema()
                .entry(name, SedaVersion::LATEST)
                .map(|(_, entry)| entry.cardinality.is_repeatable())
                .unwrap_or(true);
            let label = if repeatable {
                format!("{name}.{index}")
            } else {
                name.to_string()
            };
            for (key, value) in child.to_flat_row() {
                let key = match child {
                    Metadata::Complex(_) => format!("{label}.{key}"),
                    _ => format!("{label}{}", key.strip_prefix(name).unwrap_or(&key)),
                };
                row.push((key, value));
            }
        }
        row
    }
}
