//! Closed enumerations used throughout the rule model.
//!
//! Only the defined variants are valid; rule library files naming anything
//! else are rejected at load time.

use serde::{Deserialize, Serialize};

/// How serious a failed assertion is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Error,
    Warning,
}

/// How a selected string value is compared against a literal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Byte-for-byte, case-sensitive.
    #[default]
    Exact,
    /// Unicode lowercase on both sides.
    CaseInsensitive,
    /// Leading/trailing whitespace stripped and inner runs collapsed to one
    /// space, like XPath `normalize-space()`.
    NormalizeSpace,
}

/// Which of the selected items must satisfy a value comparison.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quantifier {
    /// At least one selected item matches.
    #[default]
    Any,
    /// Every selected item matches, and there is at least one.
    All,
}
