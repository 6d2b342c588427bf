//! Assertion evaluator.
//!
//! Runs one rule's test against every node its context selector matches.
//! The evaluator knows nothing about specific rules: everything a rule can
//! express goes through the [`Predicate`] forms.

use crate::enums::Quantifier;
use crate::primitives::{
    fallback_message, is_blank, literal_matches, location, parse_integer, render_message,
    text_matches,
};
use crate::query::{Expr, Item, select, select_from_root};
use crate::tree::Document;
use crate::types::*;
use log::{trace, warn};

/// Outcome of one test at one context node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail,
    /// The rule does not apply here; counts as a pass.
    Vacuous,
}

impl Verdict {
    pub fn passed(self) -> bool {
        !matches!(self, Verdict::Fail)
    }

    fn from_bool(holds: bool) -> Verdict {
        if holds { Verdict::Pass } else { Verdict::Fail }
    }
}

/// Per-evaluation settings carried down the predicate tree.
#[derive(Clone, Copy, Debug)]
struct Scope<'d> {
    doc: &'d Document,
    blank_is_absent: bool,
}

impl Scope<'_> {
    fn items(&self, context: &Item, path: &Expr) -> Vec<Item> {
        select(self.doc, context, path)
    }

    /// Items that count for presence checks.
    fn present_items(&self, context: &Item, path: &Expr) -> Vec<Item> {
        let items = self.items(context, path);
        if self.blank_is_absent {
            items
                .into_iter()
                .filter(|item| !is_blank(self.doc, item))
                .collect()
        } else {
            items
        }
    }

    /// String values of the items that count as present.
    fn values(&self, context: &Item, path: &Expr) -> Vec<String> {
        self.present_items(context, path)
            .iter()
            .map(|item| item.string_value(self.doc))
            .collect()
    }

    fn integers(&self, context: &Item, path: &Expr) -> Option<Vec<i64>> {
        let values = self.values(context, path);
        if values.is_empty() {
            return None;
        }
        values.iter().map(|v| parse_integer(v)).collect()
    }
}

// ─── Rule evaluation ────────────────────────────────────────────────────────

/// Evaluates `rule` against `doc`, producing one result per context node.
///
/// A rule whose context matches nothing yields exactly one vacuous pass.
pub fn evaluate_rule(rule: &Rule, doc: &Document) -> Vec<AssertionResult> {
    let contexts = select_from_root(doc, &rule.context);

    if contexts.is_empty() {
        trace!("rule {}: no context node, vacuous pass", rule.id);
        return vec![AssertionResult {
            rule_id: rule.id.clone(),
            severity: rule.severity,
            context: None,
            location: None,
            passed: true,
            vacuous: true,
            message: None,
        }];
    }

    contexts
        .iter()
        .map(|context| {
            let verdict = evaluate_test(&rule.test, doc, context, rule.blank_is_absent);
            let location = location(doc, context);
            trace!("rule {} at {}: {:?}", rule.id, location, verdict);

            let message =
                (!verdict.passed()).then(|| failure_message(rule, doc, context, &location));
            AssertionResult {
                rule_id: rule.id.clone(),
                severity: rule.severity,
                context: Some(context.node_id()),
                location: Some(location),
                passed: verdict.passed(),
                vacuous: verdict == Verdict::Vacuous,
                message,
            }
        })
        .collect()
}

fn failure_message(rule: &Rule, doc: &Document, context: &Item, location: &str) -> String {
    if rule.message.is_empty() {
        return fallback_message(&rule.id, location);
    }
    match render_message(&rule.message, &rule.id, doc, context) {
        Ok(message) => message,
        Err(e) => {
            warn!("rule {}: message template failed to render: {}", rule.id, e);
            fallback_message(&rule.id, location)
        }
    }
}

// ─── Predicate evaluation ───────────────────────────────────────────────────

/// Evaluates a rule test at one context item.
///
/// A top-level `When` whose condition is false yields [`Verdict::Vacuous`].
pub fn evaluate_test(
    test: &Predicate,
    doc: &Document,
    context: &Item,
    blank_is_absent: bool,
) -> Verdict {
    let scope = Scope {
        doc,
        blank_is_absent,
    };
    match test {
        Predicate::When { condition, then } => {
            if holds(&scope, condition, context) {
                Verdict::from_bool(holds(&scope, then, context))
            } else {
                Verdict::Vacuous
            }
        }
        other => Verdict::from_bool(holds(&scope, other, context)),
    }
}

fn holds(scope: &Scope<'_>, predicate: &Predicate, context: &Item) -> bool {
    match predicate {
        Predicate::Present(path) => !scope.present_items(context, path).is_empty(),
        Predicate::Absent(path) => scope.present_items(context, path).is_empty(),
        Predicate::Not(inner) => !holds(scope, inner, context),
        Predicate::All(parts) => parts.iter().all(|p| holds(scope, p, context)),
        Predicate::Any(parts) => parts.iter().any(|p| holds(scope, p, context)),
        Predicate::Xor(a, b) => holds(scope, a, context) != holds(scope, b, context),
        Predicate::Count { path, condition } => {
            count_holds(scope.items(context, path).len(), condition)
        }
        Predicate::Compare {
            path,
            value,
            quantifier,
            mode,
            allow_absent,
        } => {
            let values = scope.values(context, path);
            if values.is_empty() {
                return *allow_absent;
            }
            let matches = |v: &String| literal_matches(v, value, *mode);
            match quantifier {
                Quantifier::Any => values.iter().any(matches),
                Quantifier::All => values.iter().all(matches),
            }
        }
        Predicate::ExactlyOneOf { path, domain, mode } => {
            let carrying = scope
                .values(context, path)
                .iter()
                .filter(|v| domain.iter().any(|d| text_matches(v, d, *mode)))
                .count();
            carrying == 1
        }
        Predicate::CountEquals { declared, counted } => {
            let Some(declared) = scope.integers(context, declared) else {
                return false;
            };
            let actual = scope.items(context, counted).len() as i64;
            declared.iter().all(|&d| d == actual)
        }
        Predicate::SpanEquals {
            declared,
            first,
            last,
        } => {
            let (Some(declared), Some(first), Some(last)) = (
                scope.integers(context, declared),
                scope.integers(context, first),
                scope.integers(context, last),
            ) else {
                return false;
            };
            let (first, last) = (first[0], last[0]);
            let expected = if first == 0 && last == 0 {
                Some(0)
            } else {
                last.checked_sub(first).and_then(|d| d.checked_add(1))
            };
            expected.is_some_and(|expected| declared.iter().all(|&d| d == expected))
        }
        Predicate::When { condition, then } => {
            !holds(scope, condition, context) || holds(scope, then, context)
        }
    }
}

/// Applies every present operator of `condition` to `count`.
pub fn count_holds(count: usize, condition: &CountCondition) -> bool {
    condition.eq.is_none_or(|n| count == n)
        && condition.ne.is_none_or(|n| count != n)
        && condition.gt.is_none_or(|n| count > n)
        && condition.lt.is_none_or(|n| count < n)
        && condition.gte.is_none_or(|n| count >= n)
        && condition.lte.is_none_or(|n| count <= n)
}
