//! Shared value-level operations used by the evaluator.
//!
//! String normalization, blank detection, typed literal matching and failure
//! message rendering.

use crate::enums::MatchMode;
use crate::query::Item;
use crate::tree::{Document, NodeKind};
use crate::types::Literal;
use std::fmt;

// ─── Values ─────────────────────────────────────────────────────────────────

/// Strips leading/trailing whitespace and collapses inner runs to one space.
pub fn normalize_space(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses a declared integer, tolerating surrounding whitespace.
pub fn parse_integer(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}

/// Compares a selected string value with one literal string under `mode`.
pub fn text_matches(value: &str, expected: &str, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Exact => value == expected,
        MatchMode::CaseInsensitive => value.to_lowercase() == expected.to_lowercase(),
        MatchMode::NormalizeSpace => normalize_space(value) == normalize_space(expected),
    }
}

/// Compares a selected string value with a typed literal.
pub fn literal_matches(value: &str, literal: &Literal, mode: MatchMode) -> bool {
    match literal {
        Literal::Text(expected) => text_matches(value, expected, mode),
        Literal::Integer(expected) => parse_integer(value) == Some(*expected),
        Literal::Enumerated(domain) => domain.iter().any(|d| text_matches(value, d, mode)),
    }
}

/// Whether an item carries no meaningful content.
///
/// Attributes and text nodes are blank when whitespace-only. Elements are
/// blank when they have no attributes, no child elements and only
/// whitespace text.
pub fn is_blank(doc: &Document, item: &Item) -> bool {
    match item {
        Item::Attribute { .. } => item.string_value(doc).trim().is_empty(),
        Item::Node(id) => {
            let node = doc.node(*id);
            match node.kind() {
                NodeKind::Root => false,
                NodeKind::Text(text) => text.trim().is_empty(),
                NodeKind::Element { .. } => {
                    !node.has_attributes()
                        && node.element_children().next().is_none()
                        && node.string_value().trim().is_empty()
                }
            }
        }
    }
}

// ─── Message rendering ──────────────────────────────────────────────────────

/// Why a message template could not be rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TemplateError {
    Unclosed,
    UnknownReference(String),
    MissingAttribute(String),
}

impl fmt::Display for TemplateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateError::Unclosed => write!(f, "unclosed '{{{{' in message template"),
            TemplateError::UnknownReference(r) => write!(f, "unknown template reference '{}'", r),
            TemplateError::MissingAttribute(a) => {
                write!(f, "context node has no attribute '{}'", a)
            }
        }
    }
}

impl std::error::Error for TemplateError {}

/// Renders a failure message against the context item.
///
/// References: `{{name}}` context element name, `{{path}}` positional
/// location, `{{text}}` normalized string value, `{{rule}}` rule id,
/// `{{@attr}}` an attribute of the context node. `\{{` yields a literal `{{`.
pub fn render_message(
    template: &str,
    rule_id: &str,
    doc: &Document,
    context: &Item,
) -> Result<String, TemplateError> {
    const PLACEHOLDER: &str = "\x00ESCAPED_OPEN_BRACE\x00";
    let working = template.replace("\\{{", PLACEHOLDER);

    let node = doc.node(context.node_id());
    let mut result = String::new();
    let mut remaining = working.as_str();

    while let Some(start) = remaining.find("{{") {
        result.push_str(&remaining[..start]);
        let after_open = &remaining[start + 2..];
        let end = after_open.find("}}").ok_or(TemplateError::Unclosed)?;
        let reference = after_open[..end].trim();

        match reference {
            "name" => match context {
                Item::Attribute { name, .. } => result.push_str(name),
                Item::Node(_) => result.push_str(node.name().unwrap_or_default()),
            },
            "path" => result.push_str(&location(doc, context)),
            "text" => result.push_str(&normalize_space(&context.string_value(doc))),
            "rule" => result.push_str(rule_id),
            other => match other.strip_prefix('@') {
                Some(attr) if !attr.is_empty() => {
                    let value = node
                        .attribute(attr)
                        .ok_or_else(|| TemplateError::MissingAttribute(attr.to_string()))?;
                    result.push_str(value);
                }
                _ => return Err(TemplateError::UnknownReference(other.to_string())),
            },
        }

        remaining = &after_open[end + 2..];
    }
    result.push_str(remaining);

    Ok(result.replace(PLACEHOLDER, "{{"))
}

/// Message used when a template is empty or fails to render.
pub fn fallback_message(rule_id: &str, location: &str) -> String {
    format!("rule '{}' failed at {}", rule_id, location)
}

/// Positional location of an item, with `/@name` for attributes.
pub fn location(doc: &Document, item: &Item) -> String {
    match item {
        Item::Node(id) => doc.node(*id).location(),
        Item::Attribute { owner, name } => {
            let owner = doc.node(*owner).location();
            if owner == "/" {
                format!("/@{}", name)
            } else {
                format!("{}/@{}", owner, name)
            }
        }
    }
}
