use seda_core::metadata::{ComplexKind, ComplexListType};
use seda_core::model::{
    ArchiveUnit, BinaryDataObject, DataObjectGroup, NodeRef, Package, PhysicalDataObject,
    ROOT_UNIT_ID,
};
use seda_core::service::normalize;
use seda_core::{ErrorKind, SedaError};

fn unit(id: &str, title: &str) -> ArchiveUnit {
    ArchiveUnit::titled(id, "Item", title).unwrap()
}

#[test]
fn registration_rejects_duplicate_ids_across_node_kinds() {
    let mut package = Package::new();
    package.register_unit(unit("ID1", "first")).unwrap();

    let err = package.register_unit(unit("ID1", "again")).unwrap_err();
    assert!(matches!(err, SedaError::DuplicateId(ref id) if id == "ID1"));
    assert_eq!(err.kind(), ErrorKind::Structural);

    let err = package
        .register_group(DataObjectGroup::new("ID1"))
        .unwrap_err();
    assert!(matches!(err, SedaError::DuplicateId(_)));

    let group = DataObjectGroup::new("ID2")
        .with_binary(BinaryDataObject::new("ID1", "BinaryMaster_1").unwrap());
    let err = package.register_group(group).unwrap_err();
    assert!(matches!(err, SedaError::DuplicateId(ref id) if id == "ID1"));
    assert!(!package.contains_id("ID2"));

    let err = package.register_unit(unit(ROOT_UNIT_ID, "root")).unwrap_err();
    assert!(matches!(err, SedaError::DuplicateId(_)));
}

#[test]
fn registered_nodes_carry_the_package_handle() {
    let mut package = Package::new();
    let detached = unit("ID1", "first");
    assert!(detached.package().is_nil());

    package.register_unit(detached).unwrap();
    package
        .register_group(
            DataObjectGroup::new("ID2")
                .with_physical(PhysicalDataObject::new("ID3", "PhysicalMaster_1").unwrap()),
        )
        .unwrap();

    assert_eq!(package.unit("ID1").unwrap().package(), package.handle());
    assert_eq!(package.group("ID2").unwrap().package(), package.handle());
    assert_eq!(package.root().package(), package.handle());
    assert!(matches!(package.resolve("ID2").unwrap(), NodeRef::Group(_)));
    assert!(matches!(package.resolve("ID1").unwrap(), NodeRef::Unit(_)));
    assert!(matches!(
        package.resolve("ID3"),
        Err(SedaError::UnknownId(_))
    ));
}

#[test]
fn links_are_checked_when_added() {
    let mut package = Package::new();
    package.register_unit(unit("ID1", "parent")).unwrap();
    package.register_unit(unit("ID2", "child")).unwrap();
    package.register_group(DataObjectGroup::new("ID3")).unwrap();

    assert!(matches!(
        package.add_child("ID1", "ID1"),
        Err(SedaError::SelfReference(_))
    ));
    assert!(matches!(
        package.add_child("ID1", "ID9"),
        Err(SedaError::UnknownId(ref id)) if id == "ID9"
    ));
    assert!(matches!(
        package.add_child("ID9", "ID2"),
        Err(SedaError::UnknownId(_))
    ));
    assert!(matches!(
        package.add_object_ref("ID1", "ID2"),
        Err(SedaError::UnknownId(_))
    ));

    package.add_child(ROOT_UNIT_ID, "ID1").unwrap();
    package.add_child("ID1", "ID2").unwrap();
    package.add_object_ref("ID2", "ID3").unwrap();
    assert_eq!(package.root_children(), ["ID1"]);
    assert_eq!(package.unit("ID1").unwrap().children(), ["ID2"]);
    assert_eq!(package.unit("ID2").unwrap().object_refs(), ["ID3"]);
    assert!(!package.is_normalized());
    assert!(package.dangling_references().is_empty());
}

#[test]
fn create_unit_skips_ids_already_taken() {
    let mut package = Package::new();
    package.register_unit(unit("ID1", "taken")).unwrap();
    package.register_group(DataObjectGroup::new("ID2")).unwrap();

    let mut content = ComplexListType::new(ComplexKind::Content);
    content.add_new_metadata("Title", "created").unwrap();
    let id = package.create_unit(content).unwrap();
    assert_eq!(id, "ID3");
    assert_eq!(package.unit(&id).unwrap().title().as_deref(), Some("created"));
    assert_eq!(package.next_id(), "ID4");
}

#[test]
fn units_and_groups_iterate_in_registration_order() {
    let mut package = Package::new();
    for id in ["ID5", "ID1", "ID3"] {
        package.register_unit(unit(id, id)).unwrap();
    }
    let ids: Vec<&str> = package.units().map(ArchiveUnit::id).collect();
    assert_eq!(ids, ["ID5", "ID1", "ID3"]);
    assert_eq!(package.unit_count(), 3);
}

#[test]
fn graft_moves_nodes_under_target_and_restamps_them() {
    let mut target = Package::new();
    target.register_unit(unit("ID1", "host")).unwrap();
    target.add_child(ROOT_UNIT_ID, "ID1").unwrap();

    let mut source = Package::new();
    source.register_unit(unit("S1", "imported")).unwrap();
    source.register_unit(unit("S2", "nested")).unwrap();
    source
        .register_group(
            DataObjectGroup::new("G1")
                .with_binary(BinaryDataObject::new("B1", "BinaryMaster_1").unwrap()),
        )
        .unwrap();
    source.add_child(ROOT_UNIT_ID, "S1").unwrap();
    source.add_child("S1", "S2").unwrap();
    source.add_object_ref("S2", "G1").unwrap();

    target.graft(source, "ID1").unwrap();

    assert_eq!(target.unit("ID1").unwrap().children(), ["S1"]);
    assert_eq!(target.unit("S2").unwrap().package(), target.handle());
    assert_eq!(target.group("G1").unwrap().package(), target.handle());
    assert!(target.contains_id("B1"));
    assert!(target.dangling_references().is_empty());
}

#[test]
fn graft_moves_parentless_units_even_when_source_root_is_empty() {
    let mut target = Package::new();
    target.register_unit(unit("T", "host")).unwrap();
    target.add_child(ROOT_UNIT_ID, "T").unwrap();

    let mut source = Package::new();
    source.register_unit(unit("X", "folder")).unwrap();
    source.register_unit(unit("Y", "item")).unwrap();
    source.add_child("X", "Y").unwrap();

    target.graft(source, "T").unwrap();
    normalize(&mut target).unwrap();

    assert_eq!(target.unit("T").unwrap().children(), ["X"]);
    assert_eq!(target.root_children(), ["T"]);
}

#[test]
fn graft_skips_source_root_entries_that_have_a_parent() {
    let mut target = Package::new();
    target.register_unit(unit("T", "host")).unwrap();
    target.add_child(ROOT_UNIT_ID, "T").unwrap();

    let mut source = Package::new();
    source.register_unit(unit("X", "folder")).unwrap();
    source.register_unit(unit("Y", "item")).unwrap();
    source.add_child(ROOT_UNIT_ID, "X").unwrap();
    source.add_child(ROOT_UNIT_ID, "Y").unwrap();
    source.add_child("X", "Y").unwrap();
    assert_eq!(source.top_level_units(), ["X"]);

    target.graft(source, "T").unwrap();
    let report = normalize(&mut target).unwrap();

    assert_eq!(target.unit("T").unwrap().children(), ["X"]);
    assert!(report.back_references.is_empty());
}

#[test]
fn graft_collision_leaves_target_untouched() {
    let mut target = Package::new();
    target.register_unit(unit("ID1", "host")).unwrap();
    target.register_unit(unit("S2", "clash")).unwrap();

    let mut source = Package::new();
    source.register_unit(unit("S1", "imported")).unwrap();
    source.register_unit(unit("S2", "clash")).unwrap();
    source.add_child(ROOT_UNIT_ID, "S1").unwrap();

    let err = target.graft(source, "ID1").unwrap_err();
    assert!(matches!(err, SedaError::DuplicateId(ref id) if id == "S2"));
    assert!(!target.contains_id("S1"));
    assert!(target.unit("ID1").unwrap().children().is_empty());
}

#[test]
fn visited_set_marks_each_id_once() {
    let mut package = Package::new();
    package.register_unit(unit("ID1", "one")).unwrap();
    assert!(package.mark_visited("ID1"));
    assert!(!package.mark_visited("ID1"));
    assert!(package.is_visited("ID1"));
    package.reset_visited();
    assert!(!package.is_visited("ID1"));
}
