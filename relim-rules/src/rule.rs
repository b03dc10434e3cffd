//! Rule data model

use relim_core::Unit;
use serde::{Deserialize, Serialize};

/// A `(minus, plus)` pair for the two sides of an asymmetric tolerance window
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Sides {
    pub minus: f64,
    pub plus: f64,
}

impl Sides {
    pub fn new(minus: f64, plus: f64) -> Self {
        Sides { minus, plus }
    }

    /// Same value on both sides
    pub fn symmetric(value: f64) -> Self {
        Sides { minus: value, plus: value }
    }
}

/// Which batches a limit clause applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Homogeneity {
    #[default]
    Any,
    RequireHomogeneous,
    RequireHeterogeneous,
}

impl Homogeneity {
    pub fn admits(&self, homogeneous: bool) -> bool {
        match self {
            Homogeneity::Any => true,
            Homogeneity::RequireHomogeneous => homogeneous,
            Homogeneity::RequireHeterogeneous => !homogeneous,
        }
    }
}

/// Upper bound a declared value must stay under for a clause to apply
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Threshold {
    /// No bound: the clause always applies
    CatchAll,
    /// `x < value`
    Below(f64),
    /// `x <= value`
    AtMost(f64),
}

impl Threshold {
    pub fn is_catch_all(&self) -> bool {
        matches!(self, Threshold::CatchAll)
    }

    pub fn is_inclusive(&self) -> bool {
        matches!(self, Threshold::AtMost(_))
    }

    /// The bound; catch-all clauses report `0`
    pub fn value(&self) -> f64 {
        match self {
            Threshold::CatchAll => 0.0,
            Threshold::Below(v) | Threshold::AtMost(v) => *v,
        }
    }

    pub fn covers(&self, x: f64) -> bool {
        match self {
            Threshold::CatchAll => true,
            Threshold::Below(t) => x < *t,
            Threshold::AtMost(t) => x <= *t,
        }
    }
}

/// One entry of a rule's decision list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitClause {
    pub threshold: Threshold,
    /// Relative tolerance as a fraction (5 % is stored as `0.05`)
    pub factor: Sides,
    /// Absolute tolerance in the rule's unit
    pub absolute: Sides,
    pub homogeneity: Homogeneity,
}

impl LimitClause {
    /// A catch-all clause never looks at homogeneity.
    pub fn matches(&self, x: f64, homogeneous: bool) -> bool {
        self.threshold.is_catch_all()
            || (self.threshold.covers(x) && self.homogeneity.admits(homogeneous))
    }

    /// Tolerance window around `x`: `absolute + x * factor` on each side
    pub fn tolerance(&self, x: f64) -> Sides {
        Sides::new(
            self.absolute.minus + x * self.factor.minus,
            self.absolute.plus + x * self.factor.plus,
        )
    }
}

/// A named output bound of a rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputDescriptor {
    pub title: String,
    /// Signed multiplier: negative selects the minus side, otherwise the plus side
    pub coefficient: f64,
}

/// A tolerance rule, immutable once built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub name: String,
    pub info: String,
    pub unit: Unit,
    pub outputs: Vec<OutputDescriptor>,
    pub clauses: Vec<LimitClause>,
}

impl Rule {
    /// Info text with `%1`, `%2`, `%3` replaced by `±`, `°`, `≥`
    pub fn expanded_info(&self) -> String {
        self.info
            .replace("%1", "\u{b1}")
            .replace("%2", "\u{b0}")
            .replace("%3", "\u{2265}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(threshold: Threshold, homogeneity: Homogeneity) -> LimitClause {
        LimitClause {
            threshold,
            factor: Sides::default(),
            absolute: Sides::symmetric(1.0),
            homogeneity,
        }
    }

    #[test]
    fn test_inclusive_threshold() {
        let t = Threshold::AtMost(10.0);
        assert!(t.covers(10.0));
        assert!(t.covers(9.0));
        assert!(!t.covers(10.0001));
        assert!(t.is_inclusive());
    }

    #[test]
    fn test_exclusive_threshold() {
        let t = Threshold::Below(10.0);
        assert!(!t.covers(10.0));
        assert!(t.covers(9.999));
        assert!(!t.is_inclusive());
    }

    #[test]
    fn test_catch_all_threshold() {
        let t = Threshold::CatchAll;
        assert!(t.covers(f64::MAX));
        assert_eq!(t.value(), 0.0);
    }

    #[test]
    fn test_homogeneity_admits() {
        assert!(Homogeneity::Any.admits(true));
        assert!(Homogeneity::Any.admits(false));
        assert!(Homogeneity::RequireHomogeneous.admits(true));
        assert!(!Homogeneity::RequireHomogeneous.admits(false));
        assert!(Homogeneity::RequireHeterogeneous.admits(false));
        assert!(!Homogeneity::RequireHeterogeneous.admits(true));
    }

    #[test]
    fn test_clause_gated_by_homogeneity() {
        let c = clause(Threshold::Below(10.0), Homogeneity::RequireHomogeneous);
        assert!(c.matches(5.0, true));
        assert!(!c.matches(5.0, false));
        assert!(!c.matches(15.0, true));
    }

    #[test]
    fn test_catch_all_ignores_homogeneity() {
        let c = clause(Threshold::CatchAll, Homogeneity::RequireHeterogeneous);
        assert!(c.matches(5.0, true));
    }

    #[test]
    fn test_expanded_info() {
        let rule = Rule {
            name: "r".to_string(),
            info: "%1 5 % at 20 %2C for content %3 10 g/l".to_string(),
            unit: Unit::MassConcentration,
            outputs: vec![],
            clauses: vec![],
        };
        assert_eq!(rule.expanded_info(), "\u{b1} 5 % at 20 \u{b0}C for content \u{2265} 10 g/l");
    }

    #[test]
    fn test_tolerance_window() {
        let c = LimitClause {
            threshold: Threshold::CatchAll,
            factor: Sides::new(0.25, 0.5),
            absolute: Sides::new(1.0, 2.0),
            homogeneity: Homogeneity::Any,
        };
        let window = c.tolerance(100.0);
        assert_eq!(window, Sides::new(26.0, 52.0));
    }
}
