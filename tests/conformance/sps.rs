use super::common::{conformance_dir, parse_xml};
use spscheck::registry::builtin;
use spscheck::validate::Session;
use std::collections::BTreeSet;

/// A single document scenario from the suite.
#[derive(Debug, serde::Deserialize)]
struct TestCase {
    id: String,
    phase: String,
    #[serde(default)]
    each: Option<Vec<String>>,
    input: String,
    expected: Expected,
}

#[derive(Debug, serde::Deserialize)]
struct Expected {
    valid: bool,
    /// Exact set of failing rule ids, when given.
    #[serde(default)]
    failed: Option<Vec<String>>,
}

fn expand(case: &TestCase) -> Vec<(String, String)> {
    match &case.each {
        Some(values) => values
            .iter()
            .map(|v| (format!("{}[{}]", case.id, v), case.input.replace("{value}", v)))
            .collect(),
        None => vec![(case.id.clone(), case.input.clone())],
    }
}

#[test]
fn sps_conformance_suite() {
    let suite_path = conformance_dir().join("sps_suite.yaml");
    assert!(suite_path.exists(), "Conformance fixture not found: {:?}", suite_path);

    let content = std::fs::read_to_string(&suite_path).unwrap();
    let cases: Vec<TestCase> = serde_saphyr::from_str(&content).unwrap();

    let registry = builtin().expect("packaged rule library compiles");
    let session = Session::new(registry);

    let mut passed = 0;
    let mut failed = 0;

    for case in &cases {
        for (id, input) in expand(case) {
            let doc = parse_xml(&input);
            let report = match session.validate(&doc, &case.phase) {
                Ok(report) => report,
                Err(e) => {
                    eprintln!("  FAIL [{}]: {}", id, e);
                    failed += 1;
                    continue;
                }
            };

            let mut case_ok = true;
            if report.is_valid() != case.expected.valid {
                eprintln!(
                    "  FAIL [{}]: expected valid = {}, got {}",
                    id,
                    case.expected.valid,
                    report.is_valid()
                );
                for f in report.failures() {
                    eprintln!("    - {}: {}", f.rule_id, f.message.as_deref().unwrap_or(""));
                }
                case_ok = false;
            }

            if let Some(expected) = &case.expected.failed {
                let expected: BTreeSet<&str> = expected.iter().map(String::as_str).collect();
                let actual: BTreeSet<&str> =
                    report.failures().map(|f| f.rule_id.as_str()).collect();
                if expected != actual {
                    eprintln!(
                        "  FAIL [{}]: expected failing rules {:?}, got {:?}",
                        id, expected, actual
                    );
                    case_ok = false;
                }
            }

            // Every failure carries a rendered message and a location.
            for f in report.failures() {
                if f.message.is_none() || f.location.is_none() {
                    eprintln!("  FAIL [{}]: failure of {} lacks diagnostics", id, f.rule_id);
                    case_ok = false;
                }
            }

            if case_ok {
                passed += 1;
            } else {
                failed += 1;
            }
        }
    }

    eprintln!(
        "\nSPS conformance: {} passed, {} failed out of {} cases",
        passed,
        failed,
        cases.len()
    );
    assert_eq!(failed, 0, "{} SPS conformance cases failed", failed);
    assert!(passed > 0, "No SPS conformance cases were tested");
}

#[test]
fn every_packaged_phase_is_exercised() {
    let content = std::fs::read_to_string(conformance_dir().join("sps_suite.yaml")).unwrap();
    let cases: Vec<TestCase> = serde_saphyr::from_str(&content).unwrap();
    let covered: BTreeSet<&str> = cases.iter().map(|c| c.phase.as_str()).collect();

    for phase in builtin().unwrap().phase_names() {
        assert!(covered.contains(phase), "phase {} has no conformance case", phase);
    }
}
