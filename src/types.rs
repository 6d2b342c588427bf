use serde::Serialize;

use crate::enums::*;
use crate::error::ConfigError;
use crate::query::Expr;
use crate::tree::NodeId;

// ─── Literal ────────────────────────────────────────────────────────────────

/// A comparison operand, typed when the rule is compiled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Literal {
    Text(String),
    /// Selected values are parsed as integers; non-numeric text never matches.
    Integer(i64),
    /// Matches any one member of the set.
    Enumerated(Vec<String>),
}

// ─── CountCondition ─────────────────────────────────────────────────────────

/// Operators applied to a match count. Every present operator must hold.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CountCondition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eq: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ne: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lt: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gte: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lte: Option<usize>,
}

impl CountCondition {
    pub fn exactly(n: usize) -> Self {
        CountCondition {
            eq: Some(n),
            ..Default::default()
        }
    }

    pub fn at_least(n: usize) -> Self {
        CountCondition {
            gte: Some(n),
            ..Default::default()
        }
    }

    pub fn at_most(n: usize) -> Self {
        CountCondition {
            lte: Some(n),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == CountCondition::default()
    }
}

// ─── Predicate ──────────────────────────────────────────────────────────────

/// A compiled rule test, evaluated once per context node.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// At least one item matches.
    Present(Expr),
    /// No item matches.
    Absent(Expr),
    Not(Box<Predicate>),
    /// Conjunction; empty is true.
    All(Vec<Predicate>),
    /// Inclusive disjunction; empty is false.
    Any(Vec<Predicate>),
    /// Exactly one of the two holds.
    Xor(Box<Predicate>, Box<Predicate>),
    Count {
        path: Expr,
        condition: CountCondition,
    },
    /// Typed value comparison over the selected items.
    Compare {
        path: Expr,
        value: Literal,
        quantifier: Quantifier,
        mode: MatchMode,
        /// When true an empty selection passes instead of failing.
        allow_absent: bool,
    },
    /// Precisely one selected item carries a value from `domain`.
    ExactlyOneOf {
        path: Expr,
        domain: Vec<String>,
        mode: MatchMode,
    },
    /// The integer at `declared` equals the number of items `counted` selects.
    CountEquals { declared: Expr, counted: Expr },
    /// The integer at `declared` equals `last - first + 1`; zero when both
    /// bounds are zero.
    SpanEquals {
        declared: Expr,
        first: Expr,
        last: Expr,
    },
    /// `then` is only required while `condition` holds; otherwise the
    /// assertion passes vacuously.
    When {
        condition: Box<Predicate>,
        then: Box<Predicate>,
    },
}

impl Predicate {
    pub fn present(path: &str) -> Result<Predicate, ConfigError> {
        Ok(Predicate::Present(Expr::compile(path)?))
    }

    pub fn absent(path: &str) -> Result<Predicate, ConfigError> {
        Ok(Predicate::Absent(Expr::compile(path)?))
    }

    pub fn count(path: &str, condition: CountCondition) -> Result<Predicate, ConfigError> {
        Ok(Predicate::Count {
            path: Expr::compile(path)?,
            condition,
        })
    }

    /// Every selected value must be one of `values`; absence fails.
    pub fn value_in(path: &str, values: &[&str]) -> Result<Predicate, ConfigError> {
        Ok(Predicate::Compare {
            path: Expr::compile(path)?,
            value: Literal::Enumerated(values.iter().map(|v| v.to_string()).collect()),
            quantifier: Quantifier::All,
            mode: MatchMode::Exact,
            allow_absent: false,
        })
    }

    pub fn exactly_one_of(path: &str, values: &[&str]) -> Result<Predicate, ConfigError> {
        Ok(Predicate::ExactlyOneOf {
            path: Expr::compile(path)?,
            domain: values.iter().map(|v| v.to_string()).collect(),
            mode: MatchMode::Exact,
        })
    }

    pub fn count_equals(declared: &str, counted: &str) -> Result<Predicate, ConfigError> {
        Ok(Predicate::CountEquals {
            declared: Expr::compile(declared)?,
            counted: Expr::compile(counted)?,
        })
    }

    pub fn not(inner: Predicate) -> Predicate {
        Predicate::Not(Box::new(inner))
    }

    pub fn xor(a: Predicate, b: Predicate) -> Predicate {
        Predicate::Xor(Box::new(a), Box::new(b))
    }

    pub fn when(condition: Predicate, then: Predicate) -> Predicate {
        Predicate::When {
            condition: Box::new(condition),
            then: Box::new(then),
        }
    }
}

// ─── Rule & Phase ───────────────────────────────────────────────────────────

/// One compiled assertion. Owns no tree references.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Rule {
    pub id: String,
    pub phase: String,
    /// Selects the context nodes from the document node.
    pub context: Expr,
    pub test: Predicate,
    pub severity: Severity,
    /// Failure message template; see [`crate::primitives::render_message`].
    pub message: String,
    /// Whitespace-only content counts as absent for presence checks and
    /// value reads. Off by default: presence is structural, as in a plain
    /// Schematron run.
    pub blank_is_absent: bool,
}

impl Rule {
    /// Compiles a rule with error severity, the fallback message and
    /// structural presence semantics.
    ///
    /// A relative `context` is anchored so it matches anywhere in the
    /// document, the way a Schematron rule context does.
    pub fn new(
        id: impl Into<String>,
        phase: impl Into<String>,
        context: &str,
        test: Predicate,
    ) -> Result<Rule, ConfigError> {
        let id = id.into();
        let context = Expr::compile(context)
            .map_err(|e| e.in_rule(&id))?
            .anchored();
        Ok(Rule {
            id,
            phase: phase.into(),
            context,
            test,
            severity: Severity::Error,
            message: String::new(),
            blank_is_absent: false,
        })
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_blank_is_absent(mut self, blank_is_absent: bool) -> Self {
        self.blank_is_absent = blank_is_absent;
        self
    }
}

/// A named, ordered selection of rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Phase {
    pub name: String,
    pub rule_ids: Vec<String>,
}

// ─── Results ────────────────────────────────────────────────────────────────

/// Verdict of one (rule, context node) evaluation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AssertionResult {
    pub rule_id: String,
    pub severity: Severity,
    /// `None` when the rule matched no context node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<NodeId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub passed: bool,
    /// The rule did not apply: no context node, or a `When` gate was false.
    pub vacuous: bool,
    /// Rendered failure message; only set when `passed` is false.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Outcome of running one phase against one document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub phase: String,
    /// Conjunction of every result's `passed`.
    pub valid: bool,
    pub results: Vec<AssertionResult>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn failures(&self) -> impl Iterator<Item = &AssertionResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn errors(&self) -> impl Iterator<Item = &AssertionResult> {
        self.failures().filter(|r| r.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &AssertionResult> {
        self.failures().filter(|r| r.severity == Severity::Warning)
    }
}
