use super::package::Package;
use chrono::{DateTime, FixedOffset};

/// Message-level metadata of an `ArchiveTransfer`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalMetadata {
    pub comment: Option<String>,
    /// Message date; the writer uses the current time when unset.
    pub date: Option<DateTime<FixedOffset>>,
    pub message_identifier: String,
    pub archival_agreement: Option<String>,
    /// `CodeListVersions` block, kept verbatim.
    pub code_list_versions_xml: Option<String>,
    pub archival_agency_identifier: String,
    pub transferring_agency_identifier: String,
}

/// A package together with its transfer message envelope.
#[derive(Debug, Clone, Default)]
pub struct ArchiveTransfer {
    pub global: GlobalMetadata,
    pub package: Package,
}

impl ArchiveTransfer {
    pub fn new(global: GlobalMetadata, package: Package) -> Self {
        Self { global, package }
    }
}
