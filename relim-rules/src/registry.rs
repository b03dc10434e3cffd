//! Rule Registry

use std::collections::HashSet;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use relim_core::{ConfigError, Density, Quantity};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::eval::Evaluation;
use crate::parser::parse_rule;
use crate::rule::Rule;

/// The rule file as a whole could not be read
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("top level element is not an array")]
    NotAnArray,
}

/// A record that failed validation and was left out of the registry
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRecord {
    /// Position of the record in the input
    pub index: usize,
    /// The record's name, when it had a readable one
    pub name: Option<String>,
    pub error: ConfigError,
}

impl fmt::Display for SkippedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "skipping rule #{} ({}): {}", self.index, name, self.error),
            None => write!(f, "skipping rule #{}: {}", self.index, self.error),
        }
    }
}

/// Outcome of a bulk load
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub registry: RuleRegistry,
    pub skipped: Vec<SkippedRecord>,
}

impl LoadReport {
    pub fn into_parts(self) -> (RuleRegistry, Vec<SkippedRecord>) {
        (self.registry, self.skipped)
    }
}

/// Ordered, read-only collection of rules
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleRegistry {
    rules: Vec<Rule>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Parse every record independently; bad records are skipped, never fatal
    pub fn load_all(records: &[Value]) -> LoadReport {
        let mut report = LoadReport::default();

        for (index, record) in records.iter().enumerate() {
            match parse_rule(record) {
                Ok(rule) => report.registry.rules.push(rule),
                Err(error) => {
                    let name = record.get("name").and_then(Value::as_str).map(str::to_string);
                    let skipped = SkippedRecord { index, name, error };
                    warn!(index, code = skipped.error.code(), "{}", skipped);
                    report.skipped.push(skipped);
                }
            }
        }

        info!(
            loaded = report.registry.len(),
            skipped = report.skipped.len(),
            "rule records loaded"
        );
        report
    }

    /// Parse a whole rule file: a JSON array of rule records
    pub fn load_document(text: &str) -> Result<LoadReport, DocumentError> {
        match serde_json::from_str::<Value>(text)? {
            Value::Array(records) => Ok(Self::load_all(&records)),
            _ => Err(DocumentError::NotAnArray),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name.as_str()).collect()
    }

    /// Rules whose names are not hidden, in load order
    pub fn visible<'a>(&'a self, hidden: &'a HashSet<String>) -> impl Iterator<Item = &'a Rule> {
        self.rules.iter().filter(move |r| !hidden.contains(&r.name))
    }

    /// Evaluate every rule in order
    pub fn evaluate_all(&self, declared: Quantity, density: Density, homogeneous: bool) -> Vec<Evaluation<'_>> {
        self.rules.iter().map(|rule| rule.evaluation(declared, density, homogeneous)).collect()
    }

    /// Evaluate the rules not named in `hidden`, in order
    pub fn evaluate_visible<'a>(
        &'a self,
        hidden: &'a HashSet<String>,
        declared: Quantity,
        density: Density,
        homogeneous: bool,
    ) -> Vec<Evaluation<'a>> {
        self.visible(hidden).map(|rule| rule.evaluation(declared, density, homogeneous)).collect()
    }
}

impl<'a> IntoIterator for &'a RuleRegistry {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Registry handle shared between readers and a reloader
///
/// Readers take a snapshot and evaluate against it; a reload swaps in a
/// fully built registry, so a snapshot never observes a partial rule set.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    current: Arc<RwLock<Arc<RuleRegistry>>>,
}

impl SharedRegistry {
    pub fn new(registry: RuleRegistry) -> Self {
        Self { current: Arc::new(RwLock::new(Arc::new(registry))) }
    }

    pub fn snapshot(&self) -> Arc<RuleRegistry> {
        self.current.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Install `registry`, returning the one it replaced
    pub fn replace(&self, registry: RuleRegistry) -> Arc<RuleRegistry> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(registry))
    }
}
