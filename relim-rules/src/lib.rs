//! Relim Rules - Tolerance Rule Engine
//!
//! Turns declarative JSON rule records into immutable `Rule`s and evaluates
//! them against a declared content:
//! - `parser`: field-level validation of one rule record
//! - `eval`: first-match decision list over the rule's limit clauses
//! - `registry`: ordered rule collection with per-record error isolation

mod rule;
mod parser;
mod eval;
mod registry;

pub use rule::{Rule, LimitClause, OutputDescriptor, Threshold, Homogeneity, Sides};
pub use parser::parse_rule;
pub use eval::{evaluate, Evaluation, NamedOutput};
pub use registry::{RuleRegistry, SharedRegistry, LoadReport, SkippedRecord, DocumentError};

/// Re-export core types for callers
pub mod prelude {
    pub use crate::{Rule, RuleRegistry, SharedRegistry, Evaluation, NamedOutput};
    pub use relim_core::prelude::*;
}
