//! Crate-wide error taxonomy.
//!
//! # Responsibility
//! - Give every failure of the package graph, codec and tree services one
//!   stable variant, grouped by [`ErrorKind`].
//! - Carry the offending unit id for failures raised inside one unit.
//!
//! # Invariants
//! - Malformed XML is always [`SedaError::XmlSyntax`] and aborts the whole read.
//! - Validator violations are carried verbatim, in validator order.

use crate::db::DbError;
use crate::validation::Violation;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result alias used by every fallible core API.
pub type SedaResult<T> = Result<T, SedaError>;

/// Coarse error family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Duplicate/unknown id, self reference, unresolved cycle.
    Structural,
    /// Malformed XML or a scalar that does not fit its element type.
    Format,
    /// Opaque pass-through from the external validator.
    SchemaViolation,
    /// Illegal caller configuration.
    Configuration,
    /// Snapshot storage failure.
    Storage,
}

#[derive(Debug)]
pub enum SedaError {
    /// An id is already registered in the package.
    DuplicateId(String),
    /// An id does not resolve in the package.
    UnknownId(String),
    /// A unit was linked as its own child.
    SelfReference(String),
    /// A unit is its own ancestor.
    Cycle { unit_id: String, path: Vec<String> },
    /// Emission was requested on a graph changed since its last normalization.
    NotNormalized,
    /// The document is not well-formed XML.
    XmlSyntax { message: String, position: u64 },
    /// A mandatory element is absent.
    MissingElement {
        unit_id: Option<String>,
        element: String,
        context: String,
    },
    /// An element is not allowed here, or repeats a non-repeatable element.
    UnexpectedElement {
        unit_id: Option<String>,
        element: String,
        context: String,
    },
    /// A scalar value cannot fill its typed element.
    ScalarType {
        unit_id: Option<String>,
        element: String,
        value: String,
        expected: &'static str,
    },
    /// A unit read inside a parent that failed in bulk mode, discarded with it.
    DiscardedWithParent { unit_id: String, parent_id: String },
    /// The XML sink refused a write.
    XmlWrite(String),
    /// Violations reported by the external validator.
    SchemaViolation(Vec<Violation>),
    /// Illegal configuration, e.g. truncating a non-text field.
    Configuration(String),
    /// SQLite snapshot storage failure.
    Db(DbError),
    /// Persisted snapshot rows cannot rebuild a graph.
    InvalidSnapshot(String),
    Io(std::io::Error),
}

impl SedaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateId(_)
            | Self::UnknownId(_)
            | Self::SelfReference(_)
            | Self::Cycle { .. }
            | Self::NotNormalized => ErrorKind::Structural,
            Self::XmlSyntax { .. }
            | Self::MissingElement { .. }
            | Self::UnexpectedElement { .. }
            | Self::ScalarType { .. }
            | Self::DiscardedWithParent { .. }
            | Self::XmlWrite(_) => ErrorKind::Format,
            Self::SchemaViolation(_) => ErrorKind::SchemaViolation,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Db(_) | Self::InvalidSnapshot(_) | Self::Io(_) => ErrorKind::Storage,
        }
    }

    /// Returns the unit id this failure is attached to, if any.
    pub fn unit_id(&self) -> Option<&str> {
        match self {
            Self::DuplicateId(id) | Self::UnknownId(id) | Self::SelfReference(id) => Some(id),
            Self::Cycle { unit_id, .. } | Self::DiscardedWithParent { unit_id, .. } => {
                Some(unit_id)
            }
            Self::MissingElement { unit_id, .. }
            | Self::UnexpectedElement { unit_id, .. }
            | Self::ScalarType { unit_id, .. } => unit_id.as_deref(),
            _ => None,
        }
    }

    /// Attaches `id` as the offending unit when no unit is recorded yet.
    pub fn in_unit(self, id: &str) -> Self {
        match self {
            Self::MissingElement {
                unit_id: None,
                element,
                context,
            } => Self::MissingElement {
                unit_id: Some(id.to_string()),
                element,
                context,
            },
            Self::UnexpectedElement {
                unit_id: None,
                element,
                context,
            } => Self::UnexpectedElement {
                unit_id: Some(id.to_string()),
                element,
                context,
            },
            Self::ScalarType {
                unit_id: None,
                element,
                value,
                expected,
            } => Self::ScalarType {
                unit_id: Some(id.to_string()),
                element,
                value,
                expected,
            },
            other => other,
        }
    }

    /// Whether a bulk read may skip the current unit and continue.
    pub fn is_unit_scoped(&self) -> bool {
        matches!(
            self,
            Self::MissingElement { .. } | Self::UnexpectedElement { .. } | Self::ScalarType { .. }
        )
    }

    pub(crate) fn missing(element: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingElement {
            unit_id: None,
            element: element.into(),
            context: context.into(),
        }
    }

    pub(crate) fn unexpected(element: impl Into<String>, context: impl Into<String>) -> Self {
        Self::UnexpectedElement {
            unit_id: None,
            element: element.into(),
            context: context.into(),
        }
    }

    pub(crate) fn scalar(
        element: impl Into<String>,
        value: impl Into<String>,
        expected: &'static str,
    ) -> Self {
        Self::ScalarType {
            unit_id: None,
            element: element.into(),
            value: value.into(),
            expected,
        }
    }

    pub(crate) fn xml_write(err: impl Display) -> Self {
        Self::XmlWrite(err.to_string())
    }
}

impl Display for SedaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "id already registered in package: {id}"),
            Self::UnknownId(id) => write!(f, "id does not resolve in package: {id}"),
            Self::SelfReference(id) => write!(f, "unit cannot be its own child: {id}"),
            Self::Cycle { unit_id, path } => write!(
                f,
                "unit {unit_id} is its own ancestor: {}",
                path.join(" -> ")
            ),
            Self::NotNormalized => {
                write!(f, "package graph changed since last normalization")
            }
            Self::XmlSyntax { message, position } => {
                write!(f, "malformed XML at byte {position}: {message}")
            }
            Self::MissingElement {
                unit_id,
                element,
                context,
            } => {
                write!(f, "missing mandatory element `{element}` in `{context}`")?;
                write_unit_suffix(f, unit_id)
            }
            Self::UnexpectedElement {
                unit_id,
                element,
                context,
            } => {
                write!(f, "unexpected element `{element}` in `{context}`")?;
                write_unit_suffix(f, unit_id)
            }
            Self::ScalarType {
                unit_id,
                element,
                value,
                expected,
            } => {
                write!(f, "element `{element}` expects {expected}, got `{value}`")?;
                write_unit_suffix(f, unit_id)
            }
            Self::DiscardedWithParent { unit_id, parent_id } => {
                write!(f, "unit {unit_id} discarded with failed parent {parent_id}")
            }
            Self::XmlWrite(message) => write!(f, "XML write failed: {message}"),
            Self::SchemaViolation(violations) => {
                write!(f, "{} schema violation(s)", violations.len())?;
                for violation in violations {
                    write!(f, "; {violation}")?;
                }
                Ok(())
            }
            Self::Configuration(message) => write!(f, "invalid configuration: {message}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidSnapshot(message) => write!(f, "invalid snapshot data: {message}"),
            Self::Io(err) => write!(f, "{err}"),
        }
    }
}

fn write_unit_suffix(f: &mut Formatter<'_>, unit_id: &Option<String>) -> std::fmt::Result {
    match unit_id {
        Some(id) => write!(f, " (unit {id})"),
        None => Ok(()),
    }
}

impl Error for SedaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for SedaError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SedaError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<std::io::Error> for SedaError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(test)]
mod tests {
    use super::{ErrorKind, SedaError};

    #[test]
    fn in_unit_fills_missing_context_only_once() {
        let err = SedaError::missing("Title", "Content").in_unit("ID7");
        assert_eq!(err.unit_id(), Some("ID7"));
        let err = err.in_unit("ID8");
        assert_eq!(err.unit_id(), Some("ID7"));
        assert!(err.to_string().contains("(unit ID7)"));
    }

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(SedaError::DuplicateId("a".into()).kind(), ErrorKind::Structural);
        assert_eq!(
            SedaError::scalar("Size", "abc", "an integer").kind(),
            ErrorKind::Format
        );
        assert_eq!(
            SedaError::Configuration("x".into()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            SedaError::SchemaViolation(Vec::new()).kind(),
            ErrorKind::SchemaViolation
        );
    }
}
