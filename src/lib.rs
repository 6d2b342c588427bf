//! Phase-based structural assertion engine for SciELO Publishing Schema (SPS)
//! article markup.
//!
//! Rules are declarative assertions over a document tree, grouped into
//! independently selectable phases. A run resolves one phase, evaluates each
//! rule against every node its context selects, and reports a verdict per
//! (rule, node):
//!
//! ```text
//! parse_library(yaml) → RuleLibrary → RuleRegistry
//! validate(document, registry, phase) → ValidationReport
//! ```
//!
//! Parsing XML is left to the caller: documents are handed over as a
//! [`tree::Document`], built from [`tree::Element`] values.
//!
//! # Quick Start
//!
//! ```rust
//! use spscheck::tree::{Document, Element};
//!
//! let doc = Document::new(
//!     Element::new("article").child(
//!         Element::new("front").child(
//!             Element::new("journal-meta").child(
//!                 Element::new("journal-id")
//!                     .attr("journal-id-type", "publisher-id")
//!                     .text("rsp"),
//!             ),
//!         ),
//!     ),
//! );
//!
//! let report = spscheck::check(&doc, "journal-id").expect("known phase");
//! assert!(report.is_valid());
//! ```
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade (`debug!` per phase and rule,
//! `trace!` per assertion, `warn!` when a message template falls back) and
//! never installs a logger itself.

pub mod enums;
pub mod error;
pub mod evaluate;
pub mod parse;
pub mod primitives;
pub mod query;
pub mod registry;
pub mod tree;
pub mod types;
pub mod validate;

pub use enums::*;
pub use error::*;
pub use types::*;

pub use parse::parse_library;
pub use registry::RuleRegistry;
pub use validate::{Session, validate};

/// Runs `phase` of the packaged SPS rule library against `doc`.
///
/// # Errors
///
/// Returns `UnknownPhase` for a phase the library does not define.
pub fn check(doc: &tree::Document, phase: &str) -> Result<ValidationReport, ConfigError> {
    validate(doc, registry::builtin()?, phase)
}
