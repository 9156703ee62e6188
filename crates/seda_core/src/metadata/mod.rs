//! Metadata type system.
//!
//! # Responsibility
//! - Model every schema element as one closed variant of [`Metadata`].
//! - Give each element the same capability set through [`SedaMetadata`].
//!
//! # Invariants
//! - Child order is preserved verbatim on write and on read.
//! - [`AnyXmlType`] never validates; it is an opaque pass-through.
//!
//! # See also
//! - `schema` for the per-composite element tables.

pub mod any_xml;
pub mod complex;
pub mod leaf;
pub mod schema;

pub use any_xml::AnyXmlType;
pub use complex::ComplexListType;
pub use leaf::{DateTimeType, DateValue, DigestType, IntegerType, StringType, TextType};
pub use schema::{Cardinality, ComplexKind, ElementKind, SchemaEntry};

use crate::error::SedaResult;
use crate::xml::{SedaXmlReader, SedaXmlWriter};
use std::io::{BufRead, Write};

/// Ordered name/value pairs for CSV-style listings.
pub type FlatRow = Vec<(String, String)>;

/// Capability shared by every element type.
pub trait SedaMetadata {
    /// What a read needs besides the stream: `()` for scalars, the expected
    /// kind for lists and for the [`Metadata`] dispatcher.
    type ReadContext: Copy;

    /// XML element name.
    fn element_name(&self) -> &str;

    /// Reads the next element from `reader`, start tag included.
    fn read_xml<R: BufRead>(
        reader: &mut SedaXmlReader<R>,
        context: Self::ReadContext,
    ) -> SedaResult<Self>
    where
        Self: Sized;

    fn write_xml<W: Write>(&self, writer: &mut SedaXmlWriter<W>) -> SedaResult<()>;

    fn to_flat_row(&self) -> FlatRow;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    String(StringType),
    Text(TextType),
    Integer(IntegerType),
    DateTime(DateTimeType),
    Digest(DigestType),
    Complex(ComplexListType),
    AnyXml(AnyXmlType),
}

impl Metadata {
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::String(_) => ElementKind::String,
            Self::Text(_) => ElementKind::Text,
            Self::Integer(_) => ElementKind::Integer,
            Self::DateTime(_) => ElementKind::DateTime,
            Self::Digest(_) => ElementKind::Digest,
            Self::Complex(list) => ElementKind::Complex(list.kind()),
            Self::AnyXml(_) => ElementKind::AnyXml,
        }
    }

    /// Textual value of a scalar element; `None` for composites and raw XML.
    pub fn simple_value(&self) -> Option<String> {
        match self {
            Self::String(value) => Some(value.value.clone()),
            Self::Text(value) => Some(value.value.clone()),
            Self::Integer(value) => Some(value.value.to_string()),
            Self::DateTime(value) => Some(value.value.format()),
            Self::Digest(value) => Some(value.value.clone()),
            Self::Complex(_) | Self::AnyXml(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextType> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ComplexListType> {
        match self {
            Self::Complex(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_digest(&self) -> Option<&DigestType> {
        match self {
            Self::Digest(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(value.value),
            _ => None,
        }
    }
}

impl SedaMetadata for Metadata {
    type ReadContext = ElementKind;

    fn element_name(&self) -> &str {
        match self {
            Self::String(value) => value.element_name(),
            Self::Text(value) => value.element_name(),
            Self::Integer(value) => value.element_name(),
            Self::DateTime(value) => value.element_name(),
            Self::Digest(value) => value.element_name(),
            Self::Complex(value) => value.element_name(),
            Self::AnyXml(value) => value.element_name(),
        }
    }

    /// Dispatches on `kind` to the matching element type.
    fn read_xml<R: BufRead>(reader: &mut SedaXmlReader<R>, kind: ElementKind) -> SedaResult<Self> {
        Ok(match kind {
            ElementKind::String => Self::String(StringType::read_xml(reader, ())?),
            ElementKind::Text => Self::Text(TextType::read_xml(reader, ())?),
            ElementKind::Integer => Self::Integer(IntegerType::read_xml(reader, ())?),
            ElementKind::DateTime => Self::DateTime(DateTimeType::read_xml(reader, ())?),
            ElementKind::Digest => Self::Digest(DigestType::read_xml(reader, ())?),
            ElementKind::AnyXml => Self::AnyXml(AnyXmlType::read_xml(reader, ())?),
            ElementKind::Complex(complex) => {
                Self::Complex(ComplexListType::read_xml(reader, complex)?)
            }
        })
    }

    fn write_xml<W: Write>(&self, writer: &mut SedaXmlWriter<W>) -> SedaResult<()> {
        match self {
            Self::String(value) => value.write_xml(writer),
            Self::Text(value) => value.write_xml(writer),
            Self::Integer(value) => value.write_xml(writer),
            Self::DateTime(value) => value.write_xml(writer),
            Self::Digest(value) => value.write_xml(writer),
            Self::Complex(value) => value.write_xml(writer),
            Self::AnyXml(value) => value.write_xml(writer),
        }
    }

    fn to_flat_row(&self) -> FlatRow {
        match self {
            Self::String(value) => value.to_flat_row(),
            Self::Text(value) => value.to_flat_row(),
            Self::Integer(value) => value.to_flat_row(),
            Self::DateTime(value) => value.to_flat_row(),
            Self::Digest(value) => value.to_flat_row(),
            Self::Complex(value) => value.to_flat_row(),
            Self::AnyXml(value) => value.to_flat_row(),
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Metadata {
                fn from(value: $ty) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_variant!(
    String => StringType,
    Text => TextType,
    Integer => IntegerType,
    DateTime => DateTimeType,
    Digest => DigestType,
    Complex => ComplexListType,
    AnyXml => AnyXmlType,
);
