use super::common::conformance_dir;
use spscheck::error::ConfigErrorKind;
use spscheck::parse::parse_library;

/// A rule library snippet and the outcome of loading it into a registry.
#[derive(Debug, serde::Deserialize)]
struct TestCase {
    id: String,
    input: String,
    expected: Expected,
}

#[derive(Debug, serde::Deserialize)]
struct Expected {
    /// `None` means the library must load.
    #[serde(default)]
    error: Option<ConfigErrorKind>,
    #[serde(default)]
    rule_id: Option<String>,
    #[serde(default)]
    phase: Option<String>,
}

#[test]
fn library_conformance_suite() {
    let suite_path = conformance_dir().join("library_suite.yaml");
    let content = std::fs::read_to_string(&suite_path).unwrap();
    let cases: Vec<TestCase> = serde_saphyr::from_str(&content).unwrap();

    let mut failed = 0;
    for case in &cases {
        let outcome = parse_library(&case.input).and_then(|lib| lib.into_registry());
        match (&outcome, &case.expected.error) {
            (Ok(_), None) => {}
            (Ok(_), Some(kind)) => {
                eprintln!("  FAIL [{}]: expected {:?}, library loaded", case.id, kind);
                failed += 1;
            }
            (Err(e), None) => {
                eprintln!("  FAIL [{}]: unexpected error: {}", case.id, e);
                failed += 1;
            }
            (Err(e), Some(kind)) => {
                let rule_ok = case.expected.rule_id.is_none() || e.rule_id == case.expected.rule_id;
                let phase_ok = case.expected.phase.is_none() || e.phase == case.expected.phase;
                if e.kind != *kind || !rule_ok || !phase_ok {
                    eprintln!(
                        "  FAIL [{}]: expected {:?} (rule {:?}, phase {:?}), got {:?}: {}",
                        case.id, kind, case.expected.rule_id, case.expected.phase, e.kind, e
                    );
                    failed += 1;
                }
            }
        }
    }

    assert!(!cases.is_empty(), "No library conformance cases were tested");
    assert_eq!(failed, 0, "{} library conformance cases failed", failed);
}
