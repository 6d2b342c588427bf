use serde::{Deserialize, Serialize};
use std::fmt;

/// Error kind for configuration failures.
///
/// Every kind means the rule set or the phase request is broken. None of them
/// is ever produced by document content.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigErrorKind {
    /// The requested phase does not exist in the registry.
    UnknownPhase,
    /// A path expression uses an axis, function or syntax the query layer
    /// does not implement.
    UnsupportedExpression,
    /// A rule or phase definition is structurally invalid.
    MalformedRule,
    DuplicateRule,
    DuplicatePhase,
    /// The rule library text could not be deserialized.
    Syntax,
}

/// Produced while compiling rules, building a registry, or resolving a phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigError {
    pub kind: ConfigErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rule_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phase: Option<String>,
}

impl ConfigError {
    pub fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        ConfigError {
            kind,
            message: message.into(),
            rule_id: None,
            phase: None,
        }
    }

    pub fn unknown_phase(name: &str) -> Self {
        ConfigError {
            kind: ConfigErrorKind::UnknownPhase,
            message: format!("unknown phase: '{}'", name),
            rule_id: None,
            phase: Some(name.to_string()),
        }
    }

    pub fn unsupported(expression: &str, offset: usize, detail: &str) -> Self {
        ConfigError::new(
            ConfigErrorKind::UnsupportedExpression,
            format!(
                "unsupported expression '{}' at offset {}: {}",
                expression, offset, detail
            ),
        )
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        ConfigError::new(ConfigErrorKind::MalformedRule, message)
    }

    /// Attaches the id of the rule being compiled, keeping an existing one.
    pub fn in_rule(mut self, rule_id: &str) -> Self {
        if self.rule_id.is_none() {
            self.rule_id = Some(rule_id.to_string());
        }
        self
    }

    pub fn in_phase(mut self, phase: &str) -> Self {
        if self.phase.is_none() {
            self.phase = Some(phase.to_string());
        }
        self
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.rule_id, &self.phase) {
            (Some(rule), _) => write!(f, "rule {}: {}", rule, self.message),
            (None, Some(phase)) if self.kind != ConfigErrorKind::UnknownPhase => {
                write!(f, "phase {}: {}", phase, self.message)
            }
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for ConfigError {}
