//! Rule library loader.
//!
//! A library is a YAML file listing phases and, inline, the rules each phase
//! runs. Loading compiles every path expression, so a library that loads is
//! a library that can run.
//!
//! ```yaml
//! version: "1"
//! defaults:
//!   blank_is_absent: false
//!   mode: exact
//! phases:
//!   - name: journal-id
//!     rules:
//!       - id: journal-id
//!         context: article/front/journal-meta
//!         message: "<{{name}}> needs an nlm-ta or publisher-id journal-id"
//!         assert:
//!           any:
//!             - present: "journal-id[@journal-id-type='nlm-ta']"
//!             - present: "journal-id[@journal-id-type='publisher-id']"
//! ```

use crate::enums::{MatchMode, Quantifier, Severity};
use crate::error::{ConfigError, ConfigErrorKind};
use crate::query::Expr;
use crate::registry::RuleRegistry;
use crate::types::{CountCondition, Literal, Phase, Predicate, Rule};
use serde::{Deserialize, Serialize};

/// Library-wide settings applied where a rule or predicate is silent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Defaults {
    #[serde(default)]
    pub blank_is_absent: bool,
    #[serde(default)]
    pub mode: MatchMode,
}

/// A loaded, compiled rule library.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RuleLibrary {
    pub version: String,
    pub defaults: Defaults,
    /// Every rule, in file order.
    pub rules: Vec<Rule>,
    pub phases: Vec<Phase>,
}

impl RuleLibrary {
    /// Builds a registry with the library's explicit phases.
    pub fn into_registry(self) -> Result<RuleRegistry, ConfigError> {
        RuleRegistry::with_phases(self.rules, self.phases)
    }
}

// ─── Source model ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LibrarySource {
    version: String,
    #[serde(default)]
    defaults: Defaults,
    phases: Vec<PhaseSource>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PhaseSource {
    name: String,
    rules: Vec<RuleSource>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RuleSource {
    id: String,
    context: String,
    #[serde(default)]
    severity: Severity,
    #[serde(default)]
    message: String,
    #[serde(default)]
    blank_is_absent: Option<bool>,
    #[serde(rename = "assert")]
    test: PredicateSource,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ValueSource {
    Integer(i64),
    Text(String),
}

fn required_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
enum PredicateSource {
    Present(String),
    Absent(String),
    Not(Box<PredicateSource>),
    All(Vec<PredicateSource>),
    Any(Vec<PredicateSource>),
    Xor(Vec<PredicateSource>),
    Count {
        path: String,
        #[serde(default)]
        eq: Option<usize>,
        #[serde(default)]
        ne: Option<usize>,
        #[serde(default)]
        gt: Option<usize>,
        #[serde(default)]
        lt: Option<usize>,
        #[serde(default)]
        gte: Option<usize>,
        #[serde(default)]
        lte: Option<usize>,
    },
    Equals {
        path: String,
        value: ValueSource,
        #[serde(default)]
        quantifier: Quantifier,
        #[serde(default)]
        mode: Option<MatchMode>,
    },
    ValueIn {
        path: String,
        values: Vec<String>,
        #[serde(default = "required_default")]
        required: bool,
        #[serde(default)]
        mode: Option<MatchMode>,
    },
    ExactlyOneOf {
        path: String,
        values: Vec<String>,
        #[serde(default)]
        mode: Option<MatchMode>,
    },
    CountEquals {
        declared: String,
        counted: String,
    },
    SpanEquals {
        declared: String,
        first: String,
        last: String,
    },
    When {
        condition: Box<PredicateSource>,
        then: Box<PredicateSource>,
    },
}

// ─── Loading ────────────────────────────────────────────────────────────────

/// Parses and compiles a YAML rule library.
///
/// Malformed YAML is a `Syntax` error; a structurally wrong rule or an
/// unsupported path expression is reported with the offending rule id.
pub fn parse_library(input: &str) -> Result<RuleLibrary, ConfigError> {
    if input.trim().is_empty() {
        return Err(ConfigError::new(ConfigErrorKind::Syntax, "empty input"));
    }

    // YAML to serde_json::Value first, then into the typed source model.
    let value: serde_json::Value = serde_saphyr::from_str(input)
        .map_err(|e| ConfigError::new(ConfigErrorKind::Syntax, e.to_string()))?;

    if !value.is_object() {
        return Err(ConfigError::new(
            ConfigErrorKind::Syntax,
            "rule library root must be a YAML mapping",
        ));
    }

    let source: LibrarySource = serde_json::from_value(value).map_err(|e| {
        let msg = e.to_string();
        ConfigError::new(classify_json_error(&msg), msg)
    })?;

    compile_library(source)
}

fn classify_json_error(msg: &str) -> ConfigErrorKind {
    let lower = msg.to_lowercase();
    if lower.contains("unknown variant")
        || lower.contains("unknown field")
        || lower.contains("missing field")
    {
        ConfigErrorKind::MalformedRule
    } else {
        ConfigErrorKind::Syntax
    }
}

fn compile_library(source: LibrarySource) -> Result<RuleLibrary, ConfigError> {
    let defaults = source.defaults;
    let mut rules = Vec::new();
    let mut phases = Vec::with_capacity(source.phases.len());

    for phase in source.phases {
        let mut rule_ids = Vec::with_capacity(phase.rules.len());
        for rule in phase.rules {
            let compiled = compile_rule(rule, &phase.name, &defaults)
                .map_err(|e| e.in_phase(&phase.name))?;
            rule_ids.push(compiled.id.clone());
            rules.push(compiled);
        }
        phases.push(Phase {
            name: phase.name,
            rule_ids,
        });
    }

    Ok(RuleLibrary {
        version: source.version,
        defaults,
        rules,
        phases,
    })
}

fn compile_rule(source: RuleSource, phase: &str, defaults: &Defaults) -> Result<Rule, ConfigError> {
    let test = compile_predicate(source.test, defaults).map_err(|e| e.in_rule(&source.id))?;
    Ok(Rule::new(source.id, phase, &source.context, test)?
        .with_severity(source.severity)
        .with_message(source.message)
        .with_blank_is_absent(source.blank_is_absent.unwrap_or(defaults.blank_is_absent)))
}

fn compile_predicate(
    source: PredicateSource,
    defaults: &Defaults,
) -> Result<Predicate, ConfigError> {
    let mode = |mode: Option<MatchMode>| mode.unwrap_or(defaults.mode);

    Ok(match source {
        PredicateSource::Present(path) => Predicate::Present(Expr::compile(&path)?),
        PredicateSource::Absent(path) => Predicate::Absent(Expr::compile(&path)?),
        PredicateSource::Not(inner) => Predicate::not(compile_predicate(*inner, defaults)?),
        PredicateSource::All(parts) => Predicate::All(compile_all(parts, defaults)?),
        PredicateSource::Any(parts) => Predicate::Any(compile_all(parts, defaults)?),
        PredicateSource::Xor(parts) => {
            let [a, b]: [PredicateSource; 2] = parts.try_into().map_err(|parts: Vec<_>| {
                ConfigError::malformed(format!(
                    "xor takes exactly two operands, got {}",
                    parts.len()
                ))
            })?;
            Predicate::xor(compile_predicate(a, defaults)?, compile_predicate(b, defaults)?)
        }
        PredicateSource::Count {
            path,
            eq,
            ne,
            gt,
            lt,
            gte,
            lte,
        } => {
            let condition = CountCondition {
                eq,
                ne,
                gt,
                lt,
                gte,
                lte,
            };
            if condition.is_empty() {
                return Err(ConfigError::malformed(format!(
                    "count on '{}' needs at least one of eq, ne, gt, lt, gte, lte",
                    path
                )));
            }
            Predicate::count(&path, condition)?
        }
        PredicateSource::Equals {
            path,
            value,
            quantifier,
            mode: m,
        } => Predicate::Compare {
            path: Expr::compile(&path)?,
            value: match value {
                ValueSource::Integer(n) => Literal::Integer(n),
                ValueSource::Text(s) => Literal::Text(s),
            },
            quantifier,
            mode: mode(m),
            allow_absent: false,
        },
        PredicateSource::ValueIn {
            path,
            values,
            required,
            mode: m,
        } => {
            if values.is_empty() {
                return Err(ConfigError::malformed(format!(
                    "value_in on '{}' has an empty domain",
                    path
                )));
            }
            Predicate::Compare {
                path: Expr::compile(&path)?,
                value: Literal::Enumerated(values),
                quantifier: Quantifier::All,
                mode: mode(m),
                allow_absent: !required,
            }
        }
        PredicateSource::ExactlyOneOf {
            path,
            values,
            mode: m,
        } => Predicate::ExactlyOneOf {
            path: Expr::compile(&path)?,
            domain: values,
            mode: mode(m),
        },
        PredicateSource::CountEquals { declared, counted } => {
            Predicate::count_equals(&declared, &counted)?
        }
        PredicateSource::SpanEquals {
            declared,
            first,
            last,
        } => Predicate::SpanEquals {
            declared: Expr::compile(&declared)?,
            first: Expr::compile(&first)?,
            last: Expr::compile(&last)?,
        },
        PredicateSource::When { condition, then } => Predicate::when(
            compile_predicate(*condition, defaults)?,
            compile_predicate(*then, defaults)?,
        ),
    })
}

fn compile_all(
    parts: Vec<PredicateSource>,
    defaults: &Defaults,
) -> Result<Vec<Predicate>, ConfigError> {
    parts
        .into_iter()
        .map(|p| compile_predicate(p, defaults))
        .collect()
}
