use seda_core::model::{ArchiveUnit, BackReference, Package, ROOT_UNIT_ID};
use seda_core::service::normalize;
use seda_core::{ErrorKind, SedaError};

fn package_with(ids: &[&str]) -> Package {
    let mut package = Package::new();
    for id in ids {
        package
            .register_unit(ArchiveUnit::titled(*id, "Item", id).unwrap())
            .unwrap();
    }
    package
}

/// A -> {B, C}, B -> D, C -> D.
fn diamond() -> Package {
    let mut package = package_with(&["A", "B", "C", "D"]);
    package.add_child(ROOT_UNIT_ID, "A").unwrap();
    package.add_child("A", "B").unwrap();
    package.add_child("A", "C").unwrap();
    package.add_child("B", "D").unwrap();
    package.add_child("C", "D").unwrap();
    package
}

#[test]
fn shared_unit_is_expanded_once_and_back_referenced_after() {
    let mut package = diamond();
    let report = normalize(&mut package).unwrap();

    assert!(package.is_normalized());
    assert_eq!(report.expanded, 4);
    assert_eq!(
        report.back_references,
        vec![BackReference {
            parent_id: "C".to_string(),
            child_id: "D".to_string(),
            position: 0,
        }]
    );
    assert_eq!(package.back_references(), report.back_references.as_slice());
    assert!(!report.changed_root());
}

#[test]
fn normalization_is_idempotent() {
    let mut package = diamond();
    let first = normalize(&mut package).unwrap();
    let root_before = package.root_children().to_vec();
    let second = normalize(&mut package).unwrap();

    assert_eq!(first, second);
    assert_eq!(package.root_children(), root_before.as_slice());
    assert_eq!(package.unit("C").unwrap().children(), ["D"]);
}

#[test]
fn cycles_are_rejected_with_their_path() {
    let mut package = package_with(&["A", "B", "C"]);
    package.add_child(ROOT_UNIT_ID, "A").unwrap();
    package.add_child("A", "B").unwrap();
    package.add_child("B", "C").unwrap();
    package.add_child("C", "A").unwrap();

    let err = normalize(&mut package).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Structural);
    match err {
        SedaError::Cycle { unit_id, path } => {
            assert_eq!(unit_id, "A");
            assert_eq!(path, ["A", "B", "C", "A"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!package.is_normalized());
}

#[test]
fn root_keeps_exactly_the_parentless_units() {
    let mut package = package_with(&["A", "B", "E"]);
    package.add_child(ROOT_UNIT_ID, "A").unwrap();
    package.add_child(ROOT_UNIT_ID, "B").unwrap();
    package.add_child(ROOT_UNIT_ID, "A").unwrap();
    package.add_child("A", "B").unwrap();

    let report = normalize(&mut package).unwrap();

    assert_eq!(package.root_children(), ["A", "E"]);
    assert_eq!(report.detached_roots, ["B", "A"]);
    assert_eq!(report.adopted_roots, ["E"]);
    assert!(report.changed_root());
    assert!(report.back_references.is_empty());
}

#[test]
fn mutation_after_normalization_clears_the_flag() {
    let mut package = diamond();
    normalize(&mut package).unwrap();
    package
        .register_unit(ArchiveUnit::titled("E", "Item", "late").unwrap())
        .unwrap();
    assert!(!package.is_normalized());
    normalize(&mut package).unwrap();
    assert_eq!(package.root_children(), ["A", "E"]);
}

#[test]
fn deep_chains_do_not_grow_the_call_stack() {
    const DEPTH: usize = 50_000;
    let mut package = Package::new();
    let mut previous = ROOT_UNIT_ID.to_string();
    for index in 0..DEPTH {
        let id = format!("U{index}");
        package
            .register_unit(ArchiveUnit::titled(id.as_str(), "Item", "deep").unwrap())
            .unwrap();
        package.add_child(&previous, &id).unwrap();
        previous = id;
    }

    let report = normalize(&mut package).unwrap();
    assert_eq!(report.expanded, DEPTH);
    assert_eq!(package.root_children(), ["U0"]);
}
