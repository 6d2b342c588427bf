//! Phase registry.
//!
//! Holds compiled rules and the named phases that select them. Built once,
//! read-only afterwards.

use crate::error::{ConfigError, ConfigErrorKind};
use crate::parse::parse_library;
use crate::types::{Phase, Rule};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Reserved phase name selecting every rule, in registry order.
pub const ALL_PHASE: &str = "#ALL";

// ─── Cached regexes ─────────────────────────────────────────────────────────

static RULE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*$").unwrap());

static PHASE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_.-]*$").unwrap());

static TEMPLATE_REF_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{([^}]*)\}\}").unwrap());

static ATTR_REF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@[A-Za-z_][A-Za-z0-9_.:-]*$").unwrap());

// ─── Registry ───────────────────────────────────────────────────────────────

/// Compiled rules grouped into phases.
#[derive(Clone, Debug)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
    by_id: HashMap<String, usize>,
    phases: Vec<Phase>,
}

impl RuleRegistry {
    /// Groups `rules` into phases by their `phase` field, in order of first
    /// appearance.
    pub fn new(rules: Vec<Rule>) -> Result<RuleRegistry, ConfigError> {
        let mut phases: Vec<Phase> = Vec::new();
        for rule in &rules {
            match phases.iter_mut().find(|p| p.name == rule.phase) {
                Some(phase) => phase.rule_ids.push(rule.id.clone()),
                None => phases.push(Phase {
                    name: rule.phase.clone(),
                    rule_ids: vec![rule.id.clone()],
                }),
            }
        }
        RuleRegistry::with_phases(rules, phases)
    }

    /// Uses explicit phase definitions. Every referenced rule id must exist.
    pub fn with_phases(rules: Vec<Rule>, phases: Vec<Phase>) -> Result<RuleRegistry, ConfigError> {
        let mut by_id = HashMap::with_capacity(rules.len());
        for (index, rule) in rules.iter().enumerate() {
            check_rule(rule)?;
            if by_id.insert(rule.id.clone(), index).is_some() {
                return Err(ConfigError::new(
                    ConfigErrorKind::DuplicateRule,
                    format!("duplicate rule id '{}'", rule.id),
                )
                .in_rule(&rule.id));
            }
        }

        for (i, phase) in phases.iter().enumerate() {
            if phase.name == ALL_PHASE {
                return Err(ConfigError::malformed(format!(
                    "phase name '{}' is reserved",
                    ALL_PHASE
                ))
                .in_phase(&phase.name));
            }
            if !PHASE_NAME_RE.is_match(&phase.name) {
                return Err(ConfigError::malformed(format!(
                    "invalid phase name '{}'",
                    phase.name
                ))
                .in_phase(&phase.name));
            }
            if phases[..i].iter().any(|p| p.name == phase.name) {
                return Err(ConfigError::new(
                    ConfigErrorKind::DuplicatePhase,
                    format!("duplicate phase '{}'", phase.name),
                )
                .in_phase(&phase.name));
            }
            if let Some(missing) = phase.rule_ids.iter().find(|id| !by_id.contains_key(*id)) {
                return Err(ConfigError::malformed(format!(
                    "phase references unknown rule '{}'",
                    missing
                ))
                .in_phase(&phase.name));
            }
        }

        log::debug!(
            "registry built: {} rules in {} phases",
            rules.len(),
            phases.len()
        );
        Ok(RuleRegistry {
            rules,
            by_id,
            phases,
        })
    }

    /// Rules of the named phase, in evaluation order.
    ///
    /// [`ALL_PHASE`] selects every rule.
    pub fn resolve_phase(&self, name: &str) -> Result<Vec<&Rule>, ConfigError> {
        if name == ALL_PHASE {
            return Ok(self.rules.iter().collect());
        }
        let phase = self
            .phases
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ConfigError::unknown_phase(name))?;
        Ok(phase
            .rule_ids
            .iter()
            .filter_map(|id| self.rule(id))
            .collect())
    }

    pub fn phase_names(&self) -> impl Iterator<Item = &str> {
        self.phases.iter().map(|p| p.name.as_str())
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn rule(&self, id: &str) -> Option<&Rule> {
        self.by_id.get(id).map(|&i| &self.rules[i])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Load-time checks on one rule: id format and message template references.
fn check_rule(rule: &Rule) -> Result<(), ConfigError> {
    if !RULE_ID_RE.is_match(&rule.id) {
        return Err(
            ConfigError::malformed(format!("invalid rule id '{}'", rule.id)).in_rule(&rule.id),
        );
    }
    // Escaped `\{{` sequences are literal text, not references.
    let template = rule.message.replace("\\{{", "");
    for caps in TEMPLATE_REF_RE.captures_iter(&template) {
        let reference = caps[1].trim();
        let known = matches!(reference, "name" | "path" | "text" | "rule")
            || ATTR_REF_RE.is_match(reference);
        if !known {
            return Err(ConfigError::malformed(format!(
                "unknown message template reference '{{{{{}}}}}'",
                reference
            ))
            .in_rule(&rule.id));
        }
    }
    Ok(())
}

// ─── Packaged library ───────────────────────────────────────────────────────

static BUILTIN_SOURCE: &str = include_str!("../rules/sps.yaml");

static BUILTIN: LazyLock<Result<RuleRegistry, ConfigError>> =
    LazyLock::new(|| parse_library(BUILTIN_SOURCE)?.into_registry());

/// The packaged SPS rule library, compiled on first use.
pub fn builtin() -> Result<&'static RuleRegistry, ConfigError> {
    BUILTIN.as_ref().map_err(Clone::clone)
}
