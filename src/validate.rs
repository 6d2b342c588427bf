//! Validation session: runs one phase of a registry against a document.
//!
//! Only phase resolution can fail. Whatever the document contains, a
//! resolved phase always produces a report.

use crate::error::ConfigError;
use crate::evaluate::evaluate_rule;
use crate::registry::RuleRegistry;
use crate::tree::Document;
use crate::types::ValidationReport;
use log::debug;

/// Runs `phase` from `registry` against `doc`.
///
/// # Errors
///
/// Returns `UnknownPhase` when the registry has no such phase.
pub fn validate(
    doc: &Document,
    registry: &RuleRegistry,
    phase: &str,
) -> Result<ValidationReport, ConfigError> {
    Session::new(registry).validate(doc, phase)
}

/// A registry handle reused across documents.
///
/// Holds nothing but a shared reference, so one session may validate many
/// documents, including from several threads at once.
#[derive(Clone, Copy, Debug)]
pub struct Session<'r> {
    registry: &'r RuleRegistry,
}

impl<'r> Session<'r> {
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Session { registry }
    }

    pub fn registry(&self) -> &'r RuleRegistry {
        self.registry
    }

    pub fn validate(&self, doc: &Document, phase: &str) -> Result<ValidationReport, ConfigError> {
        let rules = self.registry.resolve_phase(phase)?;
        debug!("phase {}: running {} rules", phase, rules.len());

        let mut results = Vec::new();
        for rule in rules {
            let rule_results = evaluate_rule(rule, doc);
            debug!(
                "rule {}: {} assertions, {} failed",
                rule.id,
                rule_results.len(),
                rule_results.iter().filter(|r| !r.passed).count()
            );
            results.extend(rule_results);
        }

        let valid = results.iter().all(|r| r.passed);
        debug!("phase {}: valid = {}", phase, valid);
        Ok(ValidationReport {
            phase: phase.to_string(),
            valid,
            results,
        })
    }

    /// Runs several phases in order, stopping at the first unknown one.
    pub fn validate_phases<'p>(
        &self,
        doc: &Document,
        phases: impl IntoIterator<Item = &'p str>,
    ) -> Result<Vec<ValidationReport>, ConfigError> {
        phases
            .into_iter()
            .map(|phase| self.validate(doc, phase))
            .collect()
    }
}
