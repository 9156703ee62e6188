//! Contract with the external manifest validator.
//!
//! The schema engine itself lives outside the core: callers plug one in
//! through [`ManifestValidator`] and the core surfaces its findings as
//! [`SedaError::SchemaViolation`], verbatim and in order.

use crate::error::{SedaError, SedaResult};
use crate::model::ArchiveTransfer;
use crate::version::SedaVersion;
use crate::xml::{archive_transfer_to_string, ManifestLayout};
use log::{info, warn};
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// One finding reported by a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Location in the manifest as reported by the validator (XPath, line).
    pub path: String,
    pub message: String,
}

impl Violation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl Display for Violation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Grammar a manifest is checked against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grammar {
    /// Standard SEDA schema of the given version.
    Seda(SedaVersion),
    /// Profile file (XSD or RNG) supplied by the caller.
    Profile(PathBuf),
}

pub trait ManifestValidator {
    /// Checks `manifest`; an empty result means the manifest is valid.
    fn validate(&self, manifest: &[u8], grammar: &Grammar) -> Vec<Violation>;
}

/// Serializes `transfer` and runs `validator` on the result.
///
/// # Errors
/// - Serialization errors of the codec.
/// - [`SedaError::SchemaViolation`] carrying every reported violation.
pub fn validate_transfer<V: ManifestValidator + ?Sized>(
    validator: &V,
    transfer: &ArchiveTransfer,
    grammar: &Grammar,
    version: SedaVersion,
) -> SedaResult<()> {
    let manifest = archive_transfer_to_string(transfer, ManifestLayout::Hierarchical, version, 0)?;
    let violations = validator.validate(manifest.as_bytes(), grammar);
    if violations.is_empty() {
        info!("event=manifest_validate module=validation status=ok");
        return Ok(());
    }
    warn!(
        "event=manifest_validate module=validation status=invalid violations={}",
        violations.len()
    );
    Err(SedaError::SchemaViolation(violations))
}
