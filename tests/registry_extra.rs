use spscheck::error::ConfigErrorKind;
use spscheck::registry::{ALL_PHASE, RuleRegistry, builtin};
use spscheck::types::{Phase, Predicate, Rule};

fn rule(id: &str, phase: &str) -> Rule {
    Rule::new(id, phase, "article", Predicate::present("front").unwrap()).unwrap()
}

fn phase(name: &str, ids: &[&str]) -> Phase {
    Phase {
        name: name.to_string(),
        rule_ids: ids.iter().map(|s| s.to_string()).collect(),
    }
}

#[test]
fn duplicate_rule_ids_are_rejected() {
    let err = RuleRegistry::new(vec![rule("a.1", "a"), rule("a.1", "b")]).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::DuplicateRule);
    assert_eq!(err.rule_id.as_deref(), Some("a.1"));
}

#[test]
fn duplicate_phase_names_are_rejected() {
    let err = RuleRegistry::with_phases(
        vec![rule("a.1", "a"), rule("a.2", "a")],
        vec![phase("a", &["a.1"]), phase("a", &["a.2"])],
    )
    .unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::DuplicatePhase);
    assert_eq!(err.to_string(), "phase a: duplicate phase 'a'");
}

#[test]
fn phase_must_reference_known_rules() {
    let err = RuleRegistry::with_phases(vec![rule("a.1", "a")], vec![phase("a", &["a.1", "a.9"])])
        .unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::MalformedRule);
    assert!(err.message.contains("a.9"), "message names the missing rule: {}", err);
}

#[test]
fn explicit_phases_may_share_rules() {
    let registry = RuleRegistry::with_phases(
        vec![rule("a.1", "a"), rule("b.1", "b")],
        vec![phase("a", &["a.1"]), phase("both", &["b.1", "a.1"])],
    )
    .unwrap();
    let ids: Vec<&str> = registry
        .resolve_phase("both")
        .unwrap()
        .iter()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(ids, vec!["b.1", "a.1"]);
    assert!(registry.resolve_phase("b").is_err(), "only declared phases exist");
}

#[test]
fn invalid_identifiers_are_rejected() {
    let err = RuleRegistry::new(vec![rule("has space", "a")]).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::MalformedRule);

    let err = RuleRegistry::new(vec![rule("a.1", "phase/a")]).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::MalformedRule);
    assert_eq!(err.phase.as_deref(), Some("phase/a"));
}

#[test]
fn all_phase_is_reserved_but_resolvable() {
    let err = RuleRegistry::new(vec![rule("a.1", ALL_PHASE)]).unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::MalformedRule);

    let registry = RuleRegistry::new(vec![rule("a.1", "a"), rule("b.1", "b")]).unwrap();
    assert_eq!(registry.resolve_phase(ALL_PHASE).unwrap().len(), 2);
    assert!(!registry.phase_names().any(|p| p == ALL_PHASE));
}

#[test]
fn unknown_phase_names_the_phase() {
    let registry = RuleRegistry::new(vec![rule("a.1", "a")]).unwrap();
    let err = registry.resolve_phase("phase.a").unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::UnknownPhase);
    assert_eq!(err.phase.as_deref(), Some("phase.a"));
}

#[test]
fn rule_lookup() {
    let registry = RuleRegistry::new(vec![rule("a.1", "a")]).unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.rule("a.1").map(|r| r.phase.as_str()), Some("a"));
    assert!(registry.rule("a.2").is_none());
}

#[test]
fn unsupported_context_carries_rule_and_offset() {
    let err = Rule::new("bad", "p", "article/following::p", Predicate::present("x").unwrap())
        .unwrap_err();
    assert_eq!(err.kind, ConfigErrorKind::UnsupportedExpression);
    assert_eq!(err.rule_id.as_deref(), Some("bad"));
    assert!(err.message.contains("offset 8"), "{}", err.message);
}

#[test]
fn builtin_is_shared() {
    let a = builtin().unwrap();
    let b = builtin().unwrap();
    assert!(std::ptr::eq(a, b));
    assert!(a.rule("counts.page-count").is_some());
}
