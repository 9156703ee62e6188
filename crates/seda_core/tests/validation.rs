use seda_core::model::{ArchiveTransfer, ArchiveUnit, GlobalMetadata, Package, ROOT_UNIT_ID};
use seda_core::service::normalize;
use seda_core::{validate_transfer, ErrorKind, Grammar, ManifestValidator, SedaError, SedaVersion, Violation};
use std::cell::RefCell;

/// Records the manifests it receives and answers with canned findings.
struct ScriptedValidator {
    findings: Vec<Violation>,
    seen: RefCell<Vec<(String, Grammar)>>,
}

impl ScriptedValidator {
    fn new(findings: Vec<Violation>) -> Self {
        Self {
            findings,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl ManifestValidator for ScriptedValidator {
    fn validate(&self, manifest: &[u8], grammar: &Grammar) -> Vec<Violation> {
        self.seen.borrow_mut().push((
            String::from_utf8_lossy(manifest).into_owned(),
            grammar.clone(),
        ));
        self.findings.clone()
    }
}

fn transfer() -> ArchiveTransfer {
    let mut package = Package::new();
    package
        .register_unit(ArchiveUnit::titled("U1", "Item", "Rapport").unwrap())
        .unwrap();
    package.add_child(ROOT_UNIT_ID, "U1").unwrap();
    normalize(&mut package).unwrap();
    let global = GlobalMetadata {
        message_identifier: "MSG-1".to_string(),
        archival_agency_identifier: "AG".to_string(),
        transferring_agency_identifier: "TR".to_string(),
        ..GlobalMetadata::default()
    };
    ArchiveTransfer::new(global, package)
}

#[test]
fn clean_manifest_passes_and_reaches_the_validator() {
    let validator = ScriptedValidator::new(Vec::new());
    let grammar = Grammar::Seda(SedaVersion::V2_1);

    validate_transfer(&validator, &transfer(), &grammar, SedaVersion::V2_1).unwrap();

    let seen = validator.seen.borrow();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].0.contains("<MessageIdentifier>MSG-1</MessageIdentifier>"));
    assert!(seen[0].0.contains("<ArchiveUnit id=\"U1\">"));
    assert_eq!(seen[0].1, grammar);
}

#[test]
fn violations_are_returned_verbatim_and_in_order() {
    let findings = vec![
        Violation::new("/ArchiveTransfer/Date", "element is missing"),
        Violation::new("", "profile rejects DescriptionLevel Item"),
    ];
    let validator = ScriptedValidator::new(findings.clone());
    let grammar = Grammar::Profile("profiles/pr-1.rng".into());

    let err = validate_transfer(&validator, &transfer(), &grammar, SedaVersion::V2_2).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::SchemaViolation);
    match err {
        SedaError::SchemaViolation(reported) => assert_eq!(reported, findings),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unnormalized_transfer_never_reaches_the_validator() {
    let validator = ScriptedValidator::new(Vec::new());
    let mut transfer = transfer();
    transfer
        .package
        .register_unit(ArchiveUnit::titled("U2", "Item", "Annexe").unwrap())
        .unwrap();

    let err = validate_transfer(
        &validator,
        &transfer,
        &Grammar::Seda(SedaVersion::V2_1),
        SedaVersion::V2_1,
    )
    .unwrap_err();

    assert!(matches!(err, SedaError::NotNormalized));
    assert!(validator.seen.borrow().is_empty());
}
