use chrono::DateTime;
use seda_core::metadata::{ComplexKind, ComplexListType, ElementKind, Metadata, TextType};
use seda_core::model::{
    ArchiveTransfer, ArchiveUnit, BinaryDataObject, DataObjectGroup, GlobalMetadata, Package,
    ROOT_UNIT_ID,
};
use seda_core::service::normalize;
use seda_core::xml::{
    archive_transfer_from_str, archive_transfer_to_string, group_to_xml_string,
    metadata_from_xml_str, metadata_to_xml_string, ManifestLayout, ReadOptions,
};
use seda_core::{ErrorKind, SedaError, SedaVersion};

const BULK: ReadOptions = ReadOptions {
    stop_on_first_failure: false,
};

type UnitShape = (String, Vec<String>, Vec<String>, String);

fn shape(package: &Package) -> Vec<UnitShape> {
    let mut rows: Vec<UnitShape> = package
        .units()
        .map(|unit| {
            (
                unit.id().to_string(),
                unit.children().to_vec(),
                unit.object_refs().to_vec(),
                metadata_to_xml_string(&unit.content).unwrap(),
            )
        })
        .collect();
    rows.sort();
    rows
}

/// A (RecordGroup) -> {B, C}, B -> D, C -> D, D references ID10.
fn sample_transfer() -> ArchiveTransfer {
    let mut package = Package::new();

    let mut master = BinaryDataObject::new("ID11", "BinaryMaster_1")
        .unwrap()
        .with_path("/in/report.pdf");
    master.set_uri("content/ID11.pdf").unwrap();
    master.set_digest("SHA-512", "abc123").unwrap();
    master.metadata.add_new_metadata("Size", "1024").unwrap();
    let mut info = ComplexListType::new(ComplexKind::FileInfo);
    info.add_new_metadata("Filename", "report.pdf").unwrap();
    master.metadata.add_metadata(info).unwrap();
    package
        .register_group(DataObjectGroup::new("ID10").with_binary(master))
        .unwrap();

    for (id, level, title) in [
        ("A", "RecordGroup", "Dossier"),
        ("B", "File", "Chemise <1>"),
        ("C", "File", "Chemise & 2"),
        ("D", "Item", "Rapport"),
    ] {
        let mut unit = ArchiveUnit::titled(id, level, title).unwrap();
        unit.content
            .add_metadata(TextType::new("Description", "desc").with_lang("fr"))
            .unwrap();
        package.register_unit(unit).unwrap();
    }
    package.add_child(ROOT_UNIT_ID, "A").unwrap();
    package.add_child("A", "B").unwrap();
    package.add_child("A", "C").unwrap();
    package.add_child("B", "D").unwrap();
    package.add_child("C", "D").unwrap();
    package.add_object_ref("D", "ID10").unwrap();
    package.management_metadata_xml = Some(
        "<ManagementMetadata><OriginatingAgencyIdentifier>AG</OriginatingAgencyIdentifier></ManagementMetadata>"
            .to_string(),
    );
    normalize(&mut package).unwrap();

    let global = GlobalMetadata {
        comment: Some("Transfert de test".to_string()),
        date: Some(DateTime::parse_from_rfc3339("2024-03-01T10:00:00+01:00").unwrap()),
        message_identifier: "MSG-1".to_string(),
        archival_agreement: Some("AGR-1".to_string()),
        code_list_versions_xml: Some(
            "<CodeListVersions><ReplyCodeListVersion>R1</ReplyCodeListVersion></CodeListVersions>"
                .to_string(),
        ),
        archival_agency_identifier: "ARCH".to_string(),
        transferring_agency_identifier: "TRANS".to_string(),
    };
    ArchiveTransfer::new(global, package)
}

fn manifest(units: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ArchiveTransfer xmlns="fr:gouv:culture:archivesdefrance:seda:v2.1">
  <Date>2024-03-01T10:00:00</Date>
  <MessageIdentifier>MSG</MessageIdentifier>
  <DataObjectPackage>
    <DescriptiveMetadata>{units}</DescriptiveMetadata>
  </DataObjectPackage>
  <ArchivalAgency><Identifier>ARCH</Identifier></ArchivalAgency>
  <TransferringAgency><Identifier>TRANS</Identifier></TransferringAgency>
</ArchiveTransfer>"#
    )
}

#[test]
fn hierarchical_round_trip_rebuilds_the_same_graph() {
    let transfer = sample_transfer();
    let xml =
        archive_transfer_to_string(&transfer, ManifestLayout::Hierarchical, SedaVersion::V2_1, 2)
            .unwrap();

    assert!(xml.contains("xmlns=\"fr:gouv:culture:archivesdefrance:seda:v2.1\""));
    assert_eq!(xml.matches("<ArchiveUnit id=\"D\">").count(), 1);
    assert!(xml.contains("<ArchiveUnitRefId>D</ArchiveUnitRefId>"));
    assert!(xml.contains("Chemise &lt;1&gt;"));

    let outcome = archive_transfer_from_str(&xml, ReadOptions::default()).unwrap();
    assert_eq!(outcome.layout, ManifestLayout::Hierarchical);
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.transfer.global, transfer.global);

    let read = &outcome.transfer.package;
    assert!(read.is_normalized());
    assert_eq!(shape(read), shape(&transfer.package));
    assert_eq!(read.root_children(), ["A"]);
    assert_eq!(read.back_references(), transfer.package.back_references());
    assert_eq!(
        read.management_metadata_xml,
        transfer.package.management_metadata_xml
    );
    assert_eq!(
        group_to_xml_string(read.group("ID10").unwrap()).unwrap(),
        group_to_xml_string(transfer.package.group("ID10").unwrap()).unwrap()
    );
    assert!(read.group("ID10").unwrap().binary_objects[0]
        .on_disk_path
        .is_none());
    assert_eq!(read.unit("D").unwrap().package(), read.handle());
}

#[test]
fn flat_and_hierarchical_layouts_describe_the_same_graph() {
    let transfer = sample_transfer();
    let flat = archive_transfer_to_string(&transfer, ManifestLayout::Flat, SedaVersion::V2_1, 0)
        .unwrap();
    let nested =
        archive_transfer_to_string(&transfer, ManifestLayout::Hierarchical, SedaVersion::V2_1, 0)
            .unwrap();
    assert_ne!(flat, nested);

    let from_flat = archive_transfer_from_str(&flat, ReadOptions::default()).unwrap();
    let from_nested = archive_transfer_from_str(&nested, ReadOptions::default()).unwrap();
    assert_eq!(from_flat.layout, ManifestLayout::Flat);
    assert_eq!(from_nested.layout, ManifestLayout::Hierarchical);
    assert_eq!(
        shape(&from_flat.transfer.package),
        shape(&from_nested.transfer.package)
    );
    assert_eq!(from_flat.transfer.package.root_children(), ["A"]);
}

#[test]
fn rewriting_a_read_manifest_is_stable() {
    let transfer = sample_transfer();
    let first =
        archive_transfer_to_string(&transfer, ManifestLayout::Hierarchical, SedaVersion::V2_2, 2)
            .unwrap();
    let reread = archive_transfer_from_str(&first, ReadOptions::default()).unwrap();
    let second = archive_transfer_to_string(
        &reread.transfer,
        ManifestLayout::Hierarchical,
        SedaVersion::V2_2,
        2,
    )
    .unwrap();
    assert_eq!(first, second);
}

#[test]
fn reference_ids_skip_ids_taken_by_units() {
    let mut transfer = sample_transfer();
    transfer
        .package
        .register_unit(ArchiveUnit::titled("AUREF1", "Item", "Homonyme").unwrap())
        .unwrap();
    transfer.package.add_child("A", "AUREF1").unwrap();
    normalize(&mut transfer.package).unwrap();

    for layout in [ManifestLayout::Hierarchical, ManifestLayout::Flat] {
        let xml = archive_transfer_to_string(&transfer, layout, SedaVersion::V2_1, 2).unwrap();
        assert_eq!(xml.matches(r#"id="AUREF1""#).count(), 1, "{layout:?}");
        assert!(xml.contains(r#"id="AUREF2""#), "{layout:?}");

        let outcome = archive_transfer_from_str(&xml, ReadOptions::default()).unwrap();
        assert_eq!(shape(&outcome.transfer.package), shape(&transfer.package));
    }
}

#[test]
fn unnormalized_packages_are_not_written() {
    let mut transfer = sample_transfer();
    transfer
        .package
        .register_unit(ArchiveUnit::titled("E", "Item", "late").unwrap())
        .unwrap();
    let err =
        archive_transfer_to_string(&transfer, ManifestLayout::Flat, SedaVersion::V2_1, 0)
            .unwrap_err();
    assert!(matches!(err, SedaError::NotNormalized));
}

#[test]
fn unknown_content_extensions_pass_through_verbatim() {
    let xml = manifest(
        r#"<ArchiveUnit id="U1"><Content><Title>one</Title><Custom a="1"><X>y</X><Y/></Custom></Content></ArchiveUnit>"#,
    );
    let outcome = archive_transfer_from_str(&xml, ReadOptions::default()).unwrap();
    let unit = outcome.transfer.package.unit("U1").unwrap();
    match unit.content.get("Custom") {
        Some(Metadata::AnyXml(raw)) => {
            assert_eq!(raw.raw, r#"<Custom a="1"><X>y</X><Y/></Custom>"#)
        }
        other => panic!("unexpected metadata: {other:?}"),
    }

    let written = archive_transfer_to_string(
        &outcome.transfer,
        ManifestLayout::Hierarchical,
        SedaVersion::V2_1,
        2,
    )
    .unwrap();
    assert!(written.contains(r#"<Custom a="1"><X>y</X><Y/></Custom>"#));
}

#[test]
fn element_names_resolve_against_the_document_version() {
    let content = r#"<Content><Title>t</Title><TextContent>body</TextContent></Content>"#;
    let v22 = metadata_from_xml_str(
        content,
        ElementKind::Complex(ComplexKind::Content),
        SedaVersion::V2_2,
    )
    .unwrap();
    let v21 = metadata_from_xml_str(
        content,
        ElementKind::Complex(ComplexKind::Content),
        SedaVersion::V2_1,
    )
    .unwrap();

    let v22 = v22.as_complex().unwrap();
    let v21 = v21.as_complex().unwrap();
    assert!(matches!(v22.get("TextContent"), Some(Metadata::Text(_))));
    assert!(matches!(v21.get("TextContent"), Some(Metadata::AnyXml(_))));

    let xml = manifest("").replace("seda:v2.1", "seda:v2.2");
    let outcome = archive_transfer_from_str(&xml, ReadOptions::default()).unwrap();
    assert_eq!(outcome.transfer.package.unit_count(), 0);
}

#[test]
fn bulk_read_skips_failing_units_and_drops_their_references() {
    let xml = manifest(
        r#"
        <ArchiveUnit id="U1">
          <Content><Title>one</Title></Content>
          <ArchiveUnit id="AUREF1"><ArchiveUnitRefId>U2</ArchiveUnitRefId></ArchiveUnit>
        </ArchiveUnit>
        <ArchiveUnit id="U2">
          <Content><DescriptionLevel>Item</DescriptionLevel></Content>
        </ArchiveUnit>
        <ArchiveUnit id="U3">
          <Content><Title>three</Title></Content>
        </ArchiveUnit>"#,
    );

    let outcome = archive_transfer_from_str(&xml, BULK).unwrap();
    let package = &outcome.transfer.package;
    assert_eq!(outcome.failures.len(), 2);
    assert!(matches!(
        &outcome.failures[0],
        SedaError::MissingElement { unit_id: Some(id), element, .. } if id == "U2" && element == "Title"
    ));
    assert!(matches!(&outcome.failures[1], SedaError::UnknownId(id) if id == "U2"));
    assert_eq!(package.unit_count(), 2);
    assert!(package.unit("U1").unwrap().children().is_empty());
    assert_eq!(package.root_children(), ["U1", "U3"]);

    let err = archive_transfer_from_str(&xml, ReadOptions::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!(err.unit_id(), Some("U2"));
}

#[test]
fn bulk_read_discards_units_nested_in_a_failed_unit() {
    let xml = manifest(
        r#"
        <ArchiveUnit id="P">
          <Content><Title>parent</Title></Content>
          <ArchiveUnit id="C">
            <Content><Title>child</Title></Content>
            <ArchiveUnit id="G"><Content><Title>grandchild</Title></Content></ArchiveUnit>
          </ArchiveUnit>
          <Bogus/>
        </ArchiveUnit>
        <ArchiveUnit id="U3">
          <Content><Title>three</Title></Content>
          <ArchiveUnit id="AUREF1"><ArchiveUnitRefId>C</ArchiveUnitRefId></ArchiveUnit>
        </ArchiveUnit>"#,
    );

    let outcome = archive_transfer_from_str(&xml, BULK).unwrap();
    let package = &outcome.transfer.package;

    assert!(matches!(
        &outcome.failures[0],
        SedaError::UnexpectedElement { unit_id: Some(id), element, .. } if id == "P" && element == "Bogus"
    ));
    let mut discarded: Vec<&str> = outcome
        .failures
        .iter()
        .filter_map(|failure| match failure {
            SedaError::DiscardedWithParent { unit_id, parent_id } if parent_id == "P" => {
                Some(unit_id.as_str())
            }
            _ => None,
        })
        .collect();
    discarded.sort_unstable();
    assert_eq!(discarded, ["C", "G"]);
    assert!(outcome
        .failures
        .iter()
        .any(|failure| matches!(failure, SedaError::UnknownId(id) if id == "C")));
    assert_eq!(outcome.failures.len(), 4);

    assert_eq!(package.unit_count(), 1);
    assert!(!package.contains_id("C"));
    assert_eq!(package.root_children(), ["U3"]);
    assert!(package.unit("U3").unwrap().children().is_empty());
}

#[test]
fn unresolved_references_fail_in_stop_mode() {
    let xml = manifest(
        r#"<ArchiveUnit id="U1"><Content><Title>one</Title></Content>
             <DataObjectReference><DataObjectGroupReferenceId>G9</DataObjectGroupReferenceId></DataObjectReference>
           </ArchiveUnit>"#,
    );
    let err = archive_transfer_from_str(&xml, ReadOptions::default()).unwrap_err();
    assert!(matches!(err, SedaError::UnknownId(ref id) if id == "G9"));

    let outcome = archive_transfer_from_str(&xml, BULK).unwrap();
    assert!(outcome.transfer.package.unit("U1").unwrap().object_refs().is_empty());
}

#[test]
fn malformed_documents_abort_the_read() {
    let xml = manifest(r#"<ArchiveUnit id="U1"><Content><Title>one</Content></ArchiveUnit>"#);
    let err = archive_transfer_from_str(&xml, BULK).unwrap_err();
    assert!(matches!(err, SedaError::XmlSyntax { .. }));
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn message_date_must_be_a_date_time() {
    let xml = manifest("").replace("2024-03-01T10:00:00", "2024-03-01");
    let err = archive_transfer_from_str(&xml, ReadOptions::default()).unwrap_err();
    assert!(matches!(err, SedaError::ScalarType { ref element, .. } if element == "Date"));
}

#[test]
fn scalar_values_are_type_checked() {
    let group = r#"<BinaryDataObject><Size>big</Size></BinaryDataObject>"#;
    let err = metadata_from_xml_str(
        group,
        ElementKind::Complex(ComplexKind::BinaryDataObject),
        SedaVersion::V2_1,
    )
    .unwrap_err();
    assert!(matches!(err, SedaError::ScalarType { expected, .. } if expected.contains("integer")));
}
