//! Static schema tables of the modeled composite elements.
//!
//! # Responsibility
//! - Map every child element name of a composite to its element kind,
//!   cardinality and the first SEDA version carrying it.
//! - Fix the intra-composite element order required on the wire.
//!
//! # Invariants
//! - Table order is wire order.
//! - A version only ever adds entries; nothing is removed by a later version.

use crate::version::SedaVersion;

/// Modeled composite element kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComplexKind {
    Content,
    Management,
    /// Any of the `*Rule` categories inside `Management`.
    Rule,
    Keyword,
    Agency,
    Agent,
    Event,
    BinaryDataObject,
    PhysicalDataObject,
    FormatIdentification,
    FileInfo,
    DocumentPack,
    RecordGrp,
    Document,
    SubDocument,
    FileObject,
}

/// Element type a schema entry is filled with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    String,
    Text,
    Integer,
    DateTime,
    Digest,
    /// Unmodeled surface kept verbatim.
    AnyXml,
    Complex(ComplexKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    One,
    ZeroOrOne,
    OneOrMore,
    ZeroOrMore,
}

impl Cardinality {
    pub fn is_mandatory(self) -> bool {
        matches!(self, Self::One | Self::OneOrMore)
    }

    pub fn is_repeatable(self) -> bool {
        matches!(self, Self::OneOrMore | Self::ZeroOrMore)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaEntry {
    pub name: &'static str,
    pub kind: ElementKind,
    pub cardinality: Cardinality,
    pub since: SedaVersion,
}

/// Schema table of one composite kind.
#[derive(Debug)]
pub struct ComplexSchema {
    pub default_name: &'static str,
    pub entries: &'static [SchemaEntry],
    /// Unknown children are kept as raw XML instead of being refused.
    pub expandable: bool,
}

impl ComplexSchema {
    /// Looks up `name` among the entries visible in `version`, returning
    /// its wire position.
    pub fn entry(&self, name: &str, version: SedaVersion) -> Option<(usize, &'static SchemaEntry)> {
        self.entries
            .iter()
            .enumerate()
            .find(|(_, entry)| entry.name == name && version.includes(entry.since))
    }

    pub fn entries_for(&self, version: SedaVersion) -> impl Iterator<Item = &'static SchemaEntry> {
        self.entries
            .iter()
            .filter(move |entry| version.includes(entry.since))
    }
}

impl ComplexKind {
    pub fn schema(self) -> &'static ComplexSchema {
        match self {
            Self::Content => &CONTENT,
            Self::Management => &MANAGEMENT,
            Self::Rule => &RULE,
            Self::Keyword => &KEYWORD,
            Self::Agency => &AGENCY,
            Self::Agent => &AGENT,
            Self::Event => &EVENT,
            Self::BinaryDataObject => &BINARY_DATA_OBJECT,
            Self::PhysicalDataObject => &PHYSICAL_DATA_OBJECT,
            Self::FormatIdentification => &FORMAT_IDENTIFICATION,
            Self::FileInfo => &FILE_INFO,
            Self::DocumentPack => &DOCUMENT_PACK,
            Self::RecordGrp => &RECORD_GRP,
            Self::Document => &DOCUMENT,
            Self::SubDocument => &SUB_DOCUMENT,
            Self::FileObject => &FILE_OBJECT,
        }
    }

    pub fn default_name(self) -> &'static str {
        self.schema().default_name
    }
}

const STRING: ElementKind = ElementKind::String;
const TEXT: ElementKind = ElementKind::Text;
const INTEGER: ElementKind = ElementKind::Integer;
const DATE: ElementKind = ElementKind::DateTime;
const DIGEST: ElementKind = ElementKind::Digest;
const RAW: ElementKind = ElementKind::AnyXml;

const ONE: Cardinality = Cardinality::One;
const OPT: Cardinality = Cardinality::ZeroOrOne;
const SOME: Cardinality = Cardinality::OneOrMore;
const MANY: Cardinality = Cardinality::ZeroOrMore;

const fn e(name: &'static str, kind: ElementKind, cardinality: Cardinality) -> SchemaEntry {
    SchemaEntry {
        name,
        kind,
        cardinality,
        since: SedaVersion::V2_1,
    }
}

const fn e22(name: &'static str, kind: ElementKind, cardinality: Cardinality) -> SchemaEntry {
    SchemaEntry {
        name,
        kind,
        cardinality,
        since: SedaVersion::V2_2,
    }
}

const fn c(kind: ComplexKind) -> ElementKind {
    ElementKind::Complex(kind)
}

static CONTENT: ComplexSchema = ComplexSchema {
    default_name: "Content",
    expandable: true,
    entries: &[
        e("DescriptionLevel", STRING, OPT),
        e("Title", TEXT, SOME),
        e("FilePlanPosition", STRING, MANY),
        e("SystemId", STRING, MANY),
        e("OriginatingSystemId", STRING, MANY),
        e("ArchivalAgencyArchiveUnitIdentifier", STRING, MANY),
        e("OriginatingAgencyArchiveUnitIdentifier", STRING, MANY),
        e("TransferringAgencyArchiveUnitIdentifier", STRING, MANY),
        e("Description", TEXT, MANY),
        e("CustodialHistory", RAW, OPT),
        e("Type", TEXT, OPT),
        e("DocumentType", TEXT, OPT),
        e("Language", STRING, MANY),
        e("DescriptionLanguage", STRING, OPT),
        e("Status", STRING, OPT),
        e("Version", STRING, OPT),
        e("Tag", STRING, MANY),
        e("Keyword", c(ComplexKind::Keyword), MANY),
        e("Coverage", RAW, OPT),
        e("OriginatingAgency", c(ComplexKind::Agency), OPT),
        e("SubmissionAgency", c(ComplexKind::Agency), OPT),
        e22("Agent", c(ComplexKind::Agent), MANY),
        e("AuthorizedAgent", c(ComplexKind::Agent), MANY),
        e("Writer", c(ComplexKind::Agent), MANY),
        e("Addressee", c(ComplexKind::Agent), MANY),
        e("Recipient", c(ComplexKind::Agent), MANY),
        e("Transmitter", c(ComplexKind::Agent), MANY),
        e("Sender", c(ComplexKind::Agent), MANY),
        e("Source", TEXT, OPT),
        e("RelatedObjectReference", RAW, OPT),
        e22("DateLitteral", STRING, OPT),
        e("CreatedDate", DATE, OPT),
        e("TransactedDate", DATE, OPT),
        e("AcquiredDate", DATE, OPT),
        e("SentDate", DATE, OPT),
        e("ReceivedDate", DATE, OPT),
        e("RegisteredDate", DATE, OPT),
        e("StartDate", DATE, OPT),
        e("EndDate", DATE, OPT),
        e("Event", c(ComplexKind::Event), MANY),
        e("Signature", RAW, MANY),
        e("Gps", RAW, OPT),
        e22("OriginatingSystemIdReplyTo", STRING, OPT),
        e22("TextContent", TEXT, MANY),
    ],
};

static MANAGEMENT: ComplexSchema = ComplexSchema {
    default_name: "Management",
    expandable: true,
    entries: &[
        e("StorageRule", c(ComplexKind::Rule), OPT),
        e("AppraisalRule", c(ComplexKind::Rule), OPT),
        e("AccessRule", c(ComplexKind::Rule), OPT),
        e("DisseminationRule", c(ComplexKind::Rule), OPT),
        e("ReuseRule", c(ComplexKind::Rule), OPT),
        e("ClassificationRule", c(ComplexKind::Rule), OPT),
        e22("HoldRule", c(ComplexKind::Rule), OPT),
        e22("LogBook", RAW, OPT),
        e("NeedAuthorization", STRING, OPT),
    ],
};

static RULE: ComplexSchema = ComplexSchema {
    default_name: "AccessRule",
    expandable: true,
    entries: &[
        e("Rule", STRING, MANY),
        e("StartDate", DATE, MANY),
        e("PreventInheritance", STRING, OPT),
        e("RefNonRuleId", STRING, MANY),
        e("FinalAction", STRING, OPT),
    ],
};

static KEYWORD: ComplexSchema = ComplexSchema {
    default_name: "Keyword",
    expandable: false,
    entries: &[
        e("KeywordContent", TEXT, ONE),
        e("KeywordReference", STRING, OPT),
        e("KeywordType", STRING, OPT),
    ],
};

static AGENCY: ComplexSchema = ComplexSchema {
    default_name: "OriginatingAgency",
    expandable: true,
    entries: &[e("Identifier", STRING, ONE)],
};

static AGENT: ComplexSchema = ComplexSchema {
    default_name: "Writer",
    expandable: true,
    entries: &[
        e("FirstName", STRING, OPT),
        e("BirthName", STRING, OPT),
        e("FullName", STRING, OPT),
        e("GivenName", STRING, OPT),
        e("Gender", STRING, OPT),
        e("BirthDate", DATE, OPT),
        e("Corpname", STRING, OPT),
        e("Identifier", STRING, MANY),
        e("Function", TEXT, MANY),
        e("Activity", TEXT, MANY),
        e("Position", TEXT, MANY),
        e("Role", TEXT, MANY),
        e("Mandate", TEXT, MANY),
    ],
};

static EVENT: ComplexSchema = ComplexSchema {
    default_name: "Event",
    expandable: false,
    entries: &[
        e("EventIdentifier", STRING, OPT),
        e("EventTypeCode", STRING, OPT),
        e("EventType", STRING, OPT),
        e("EventDateTime", DATE, ONE),
        e("EventDetail", TEXT, OPT),
        e("Outcome", STRING, OPT),
        e("OutcomeDetail", STRING, OPT),
        e("OutcomeDetailMessage", STRING, OPT),
        e("EventDetailData", STRING, OPT),
        e22("LinkingAgentIdentifier", RAW, MANY),
    ],
};

static BINARY_DATA_OBJECT: ComplexSchema = ComplexSchema {
    default_name: "BinaryDataObject",
    expandable: false,
    entries: &[
        e22("DataObjectProfile", STRING, OPT),
        e("DataObjectSystemId", STRING, OPT),
        e("DataObjectGroupSystemId", STRING, OPT),
        e("Relationship", RAW, MANY),
        e("DataObjectVersion", STRING, OPT),
        e22("PersistentIdentifier", RAW, MANY),
        e22("DataObjectUse", STRING, OPT),
        e22("DataObjectNumber", INTEGER, OPT),
        e("Uri", STRING, OPT),
        e("MessageDigest", DIGEST, OPT),
        e("Size", INTEGER, OPT),
        e("Compressed", RAW, OPT),
        e(
            "FormatIdentification",
            c(ComplexKind::FormatIdentification),
            OPT,
        ),
        e("FileInfo", c(ComplexKind::FileInfo), OPT),
        e("Metadata", RAW, OPT),
        e("OtherMetadata", RAW, OPT),
    ],
};

static PHYSICAL_DATA_OBJECT: ComplexSchema = ComplexSchema {
    default_name: "PhysicalDataObject",
    expandable: true,
    entries: &[
        e22("DataObjectProfile", STRING, OPT),
        e("DataObjectSystemId", STRING, OPT),
        e("DataObjectGroupSystemId", STRING, OPT),
        e("Relationship", RAW, MANY),
        e("DataObjectVersion", STRING, OPT),
        e22("PersistentIdentifier", RAW, MANY),
        e22("DataObjectUse", STRING, OPT),
        e22("DataObjectNumber", INTEGER, OPT),
        e("PhysicalId", STRING, OPT),
        e("PhysicalDimensions", RAW, OPT),
        e("OtherMetadata", RAW, OPT),
    ],
};

static FORMAT_IDENTIFICATION: ComplexSchema = ComplexSchema {
    default_name: "FormatIdentification",
    expandable: false,
    entries: &[
        e("FormatLitteral", STRING, OPT),
        e("MimeType", STRING, OPT),
        e("FormatId", STRING, OPT),
        e("Encoding", STRING, OPT),
    ],
};

static FILE_INFO: ComplexSchema = ComplexSchema {
    default_name: "FileInfo",
    expandable: false,
    entries: &[
        e("Filename", STRING, OPT),
        e("CreatingApplicationName", STRING, OPT),
        e("CreatingApplicationVersion", STRING, OPT),
        e("DateCreatedByApplication", DATE, OPT),
        e("CreatingOs", STRING, OPT),
        e("CreatingOsVersion", STRING, OPT),
        e("LastModified", DATE, OPT),
    ],
};

static DOCUMENT_PACK: ComplexSchema = ComplexSchema {
    default_name: "DocumentPack",
    expandable: false,
    entries: &[
        e("DocumentsCount", INTEGER, ONE),
        e("FileObjectsCount", INTEGER, ONE),
        e("RecordGrp", c(ComplexKind::RecordGrp), OPT),
        e("Document", c(ComplexKind::Document), MANY),
    ],
};

static RECORD_GRP: ComplexSchema = ComplexSchema {
    default_name: "RecordGrp",
    expandable: false,
    entries: &[
        e("RecordGrpID", STRING, ONE),
        e("Content", c(ComplexKind::Content), ONE),
        e("RecordGrp", c(ComplexKind::RecordGrp), MANY),
    ],
};

static DOCUMENT: ComplexSchema = ComplexSchema {
    default_name: "Document",
    expandable: false,
    entries: &[
        e("RecordGrpID", STRING, OPT),
        e("Content", c(ComplexKind::Content), ONE),
        e("FileObject", c(ComplexKind::FileObject), MANY),
        e("SubDocument", c(ComplexKind::SubDocument), MANY),
    ],
};

static SUB_DOCUMENT: ComplexSchema = ComplexSchema {
    default_name: "SubDocument",
    expandable: false,
    entries: &[
        e("Content", c(ComplexKind::Content), ONE),
        e("FileObject", c(ComplexKind::FileObject), MANY),
        e("SubDocument", c(ComplexKind::SubDocument), MANY),
    ],
};

static FILE_OBJECT: ComplexSchema = ComplexSchema {
    default_name: "FileObject",
    expandable: false,
    entries: &[
        e("DataObjectVersion", STRING, OPT),
        e("Uri", STRING, OPT),
        e("MessageDigest", DIGEST, OPT),
        e("Size", INTEGER, OPT),
        e(
            "FormatIdentification",
            c(ComplexKind::FormatIdentification),
            OPT,
        ),
        e("FileInfo", c(ComplexKind::FileInfo), OPT),
    ],
};

#[cfg(test)]
mod tests {
    use super::{ComplexKind, ElementKind};
    use crate::version::SedaVersion;

    #[test]
    fn v22_entries_are_hidden_under_v21() {
        let content = ComplexKind::Content.schema();
        assert!(content.entry("TextContent", SedaVersion::V2_1).is_none());
        assert!(content.entry("TextContent", SedaVersion::V2_2).is_some());
        assert!(content
            .entries_for(SedaVersion::V2_1)
            .all(|entry| entry.since == SedaVersion::V2_1));
    }

    #[test]
    fn entry_reports_wire_position() {
        let content = ComplexKind::Content.schema();
        let (level_pos, _) = content
            .entry("DescriptionLevel", SedaVersion::V2_1)
            .expect("description level entry");
        let (title_pos, title) = content
            .entry("Title", SedaVersion::V2_1)
            .expect("title entry");
        assert!(level_pos < title_pos);
        assert_eq!(title.kind, ElementKind::Text);
        assert!(title.cardinality.is_mandatory());
        assert!(title.cardinality.is_repeatable());
    }
}
