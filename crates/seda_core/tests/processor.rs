use seda_core::metadata::TextType;
use seda_core::model::{ArchiveUnit, Package, ROOT_UNIT_ID};
use seda_core::service::{collect, compliant_ids, normalize, try_collect, verify};
use seda_core::{SedaError, SedaResult};

/// R1 -> {A, B}, A -> S, B -> S, R2 standalone.
fn shared_package() -> Package {
    let mut package = Package::new();
    for (id, level) in [
        ("R1", "RecordGroup"),
        ("A", "File"),
        ("B", "File"),
        ("S", "Item"),
        ("R2", "Item"),
    ] {
        package
            .register_unit(ArchiveUnit::titled(id, level, &format!("title {id}")).unwrap())
            .unwrap();
    }
    package.add_child(ROOT_UNIT_ID, "R1").unwrap();
    package.add_child(ROOT_UNIT_ID, "R2").unwrap();
    package.add_child("R1", "A").unwrap();
    package.add_child("R1", "B").unwrap();
    package.add_child("A", "S").unwrap();
    package.add_child("B", "S").unwrap();
    normalize(&mut package).unwrap();
    package
}

#[test]
fn walks_visit_each_unit_once_in_pre_order() {
    let mut package = shared_package();
    let ids = compliant_ids(&mut package, |_| true);
    assert_eq!(ids, ["R1", "A", "S", "B", "R2"]);

    let again = compliant_ids(&mut package, |_| true);
    assert_eq!(again, ids);
}

#[test]
fn verify_counts_or_stops_at_first_failure() {
    let mut package = shared_package();
    let is_item = |unit: &ArchiveUnit| unit.description_level().as_deref() == Some("Item");

    assert_eq!(verify(&mut package, is_item, false), 3);
    assert_eq!(verify(&mut package, is_item, true), 1);
    assert_eq!(verify(&mut package, |_| true, true), 0);
}

#[test]
fn collect_may_mutate_matching_units() {
    let mut package = shared_package();
    let renamed = collect(
        &mut package,
        |unit| unit.description_level().as_deref() == Some("File"),
        |unit| {
            let title = format!("{} (checked)", unit.title().unwrap_or_default());
            unit.content.set_metadata(TextType::new("Title", title.as_str())).unwrap();
            title
        },
    );
    assert_eq!(renamed, ["title A (checked)", "title B (checked)"]);
    assert_eq!(
        package.unit("B").unwrap().title().as_deref(),
        Some("title B (checked)")
    );
    assert_eq!(package.unit("S").unwrap().title().as_deref(), Some("title S"));
}

#[test]
fn try_collect_records_failures_with_unit_ids() {
    let mut package = shared_package();
    let transform = |unit: &mut ArchiveUnit| -> SedaResult<String> {
        if unit.id() == "A" || unit.id() == "R2" {
            unit.content.add_new_metadata("Size", "x")?;
        }
        Ok(unit.id().to_string())
    };

    let outcome = try_collect(&mut package, |_| true, transform, false);
    assert_eq!(outcome.results, ["R1", "S", "B"]);
    assert_eq!(outcome.failures.len(), 2);
    assert_eq!(outcome.failures[0].unit_id(), Some("A"));
    assert_eq!(outcome.failures[1].unit_id(), Some("R2"));
    assert!(!outcome.is_clean());

    let outcome = try_collect(&mut package, |_| true, transform, true);
    assert_eq!(outcome.results, ["R1"]);
    assert_eq!(outcome.failures.len(), 1);
    assert!(matches!(
        outcome.failures[0],
        SedaError::UnexpectedElement { .. }
    ));
}
