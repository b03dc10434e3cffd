//! Concentration units and conversion errors

use std::fmt;
use std::str::FromStr;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// One of the two concentration units a declared content can be expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Grams of substance per liter of product
    #[serde(rename = "g/l")]
    MassConcentration,
    /// Percent weight of substance per weight of product
    #[serde(rename = "%w/w")]
    MassFraction,
}

impl Unit {
    /// All supported units, in display order
    pub const ALL: [Unit; 2] = [Unit::MassConcentration, Unit::MassFraction];

    /// The configuration symbol ("g/l" or "%w/w")
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::MassConcentration => "g/l",
            Unit::MassFraction => "%w/w",
        }
    }

    /// Human-readable label used in rendered output
    pub fn label(&self) -> &'static str {
        match self {
            Unit::MassConcentration => "g/l",
            Unit::MassFraction => "% w/w",
        }
    }

    /// Look up a unit by its exact configuration symbol
    pub fn from_symbol(s: &str) -> Option<Unit> {
        Unit::ALL.into_iter().find(|u| u.symbol() == s)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Unit {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::from_symbol(s).ok_or_else(|| ConversionError::UnknownUnit(s.to_string()))
    }
}

/// Errors that can occur during unit conversion
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Density is zero, negative or not finite
    #[error("density must be a positive finite value, got {0}")]
    InvalidDensity(f64),

    /// Unknown unit symbol
    #[error("unknown unit: {0:?} (expected \"g/l\" or \"%w/w\")")]
    UnknownUnit(String),

    /// The converted value does not fit in a finite `f64`
    #[error("{value} {from} is out of range when expressed in {to}")]
    OutOfRange { value: f64, from: Unit, to: Unit },
}
