//! Supported SEDA schema versions.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Major schema version of the wire format.
///
/// Later versions only add elements, so a newer version reads everything an
/// older one wrote.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum SedaVersion {
    #[default]
    #[serde(rename = "2.1")]
    V2_1,
    #[serde(rename = "2.2")]
    V2_2,
}

impl SedaVersion {
    /// Most recent supported version.
    pub const LATEST: SedaVersion = SedaVersion::V2_2;

    /// Default XML namespace of `ArchiveTransfer` documents.
    pub fn namespace(self) -> &'static str {
        match self {
            Self::V2_1 => "fr:gouv:culture:archivesdefrance:seda:v2.1",
            Self::V2_2 => "fr:gouv:culture:archivesdefrance:seda:v2.2",
        }
    }

    pub fn from_namespace(namespace: &str) -> Option<Self> {
        match namespace.trim() {
            "fr:gouv:culture:archivesdefrance:seda:v2.1" => Some(Self::V2_1),
            "fr:gouv:culture:archivesdefrance:seda:v2.2" => Some(Self::V2_2),
            _ => None,
        }
    }

    /// Whether an element introduced in `since` exists in this version.
    pub fn includes(self, since: SedaVersion) -> bool {
        self >= since
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::V2_1 => "2.1",
            Self::V2_2 => "2.2",
        }
    }
}

impl Display for SedaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
