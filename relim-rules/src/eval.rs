//! Rule evaluator
//!
//! Clauses form a decision list: the first clause that matches the declared
//! value decides the tolerance window, later clauses are never consulted.

use relim_core::{Density, Quantity};
use serde::Serialize;
use tracing::debug;

use crate::rule::{LimitClause, Rule};

/// An output bound paired with its title
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedOutput {
    pub title: String,
    pub quantity: Quantity,
}

/// All outputs of one rule for one calculation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation<'a> {
    #[serde(rename = "rule", serialize_with = "serialize_rule_name")]
    pub rule: &'a Rule,
    pub outputs: Vec<NamedOutput>,
}

impl Evaluation<'_> {
    /// Every output is finite in both units at `density`
    pub fn is_representable(&self, density: Density) -> bool {
        self.outputs.iter().all(|o| o.quantity.check_representable(density).is_ok())
    }
}

fn serialize_rule_name<S: serde::Serializer>(rule: &&Rule, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&rule.name)
}

/// Evaluate `rule` for a declared value
///
/// Returns one quantity per output descriptor, in the rule's unit and in
/// output order. Without a matching clause every output is the declared value.
/// `declared` has to be finite in the rule's unit
/// (see `Quantity::check_representable`).
pub fn evaluate(rule: &Rule, declared: Quantity, density: Density, homogeneous: bool) -> Vec<Quantity> {
    let x = declared.in_unit(rule.unit, density);

    let Some((index, clause)) = rule.matching_clause(x, homogeneous) else {
        debug!(rule = %rule.name, x, homogeneous, "no limit clause matched");
        return vec![Quantity::new(x, rule.unit); rule.outputs.len()];
    };

    let window = clause.tolerance(x);
    debug!(
        rule = %rule.name,
        x,
        homogeneous,
        clause = index,
        minus = window.minus,
        plus = window.plus,
        "limit clause selected"
    );

    rule.outputs
        .iter()
        .map(|output| {
            let side = if output.coefficient < 0.0 { window.minus } else { window.plus };
            Quantity::new(x + side * output.coefficient, rule.unit)
        })
        .collect()
}

impl Rule {
    /// First clause matching `x` (already in the rule's unit), with its index
    pub fn matching_clause(&self, x: f64, homogeneous: bool) -> Option<(usize, &LimitClause)> {
        self.clauses
            .iter()
            .enumerate()
            .find(|(_, clause)| clause.matches(x, homogeneous))
    }

    pub fn evaluate(&self, declared: Quantity, density: Density, homogeneous: bool) -> Vec<Quantity> {
        evaluate(self, declared, density, homogeneous)
    }

    /// Like `evaluate`, with each quantity paired with its output title
    pub fn evaluate_named(&self, declared: Quantity, density: Density, homogeneous: bool) -> Vec<NamedOutput> {
        self.outputs
            .iter()
            .zip(self.evaluate(declared, density, homogeneous))
            .map(|(output, quantity)| NamedOutput { title: output.title.clone(), quantity })
            .collect()
    }

    /// Outputs of this rule wrapped with a reference to it
    pub fn evaluation(&self, declared: Quantity, density: Density, homogeneous: bool) -> Evaluation<'_> {
        Evaluation { rule: self, outputs: self.evaluate_named(declared, density, homogeneous) }
    }
}
