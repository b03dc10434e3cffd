//! Quantity type - a concentration value with an associated unit

use std::fmt;
use serde::{Serialize, Deserialize};
use crate::unit::{ConversionError, Unit};

/// Density of the product in g/ml, always positive and finite
///
/// Converting between mass concentration and mass fraction needs the density
/// of the product. Holding it as a validated value makes every conversion
/// total; an invalid density is rejected where it enters the system.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct Density(f64);

impl Density {
    /// Validate a raw density
    pub fn new(value: f64) -> Result<Self, ConversionError> {
        if value.is_finite() && value > 0.0 {
            Ok(Density(value))
        } else {
            Err(ConversionError::InvalidDensity(value))
        }
    }

    /// The raw density in g/ml
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for Density {
    type Error = ConversionError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Density::new(value)
    }
}

impl<'de> Deserialize<'de> for Density {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        Density::new(raw).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Density {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*} g/ml", p, self.0),
            None => write!(f, "{} g/ml", self.0),
        }
    }
}

/// An immutable concentration: a value tagged with its unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    /// The numeric value
    pub value: f64,
    /// The unit of measurement
    pub unit: Unit,
}

impl Quantity {
    /// Create a new quantity
    pub fn new(value: f64, unit: Unit) -> Self {
        Quantity { value, unit }
    }

    /// The value expressed in `target`
    ///
    /// `%w/w = (g/l) / (10 * density)`; a quantity already in `target` is
    /// returned unchanged.
    pub fn in_unit(&self, target: Unit, density: Density) -> f64 {
        match (self.unit, target) {
            (Unit::MassConcentration, Unit::MassConcentration)
            | (Unit::MassFraction, Unit::MassFraction) => self.value,
            (Unit::MassFraction, Unit::MassConcentration) => self.value * 10.0 * density.value(),
            (Unit::MassConcentration, Unit::MassFraction) => self.value / (10.0 * density.value()),
        }
    }

    /// Like `in_unit`, but a value that overflows in `target` is an error
    pub fn try_in_unit(&self, target: Unit, density: Density) -> Result<f64, ConversionError> {
        let value = self.in_unit(target, density);
        if value.is_finite() {
            Ok(value)
        } else {
            Err(ConversionError::OutOfRange { value: self.value, from: self.unit, to: target })
        }
    }

    /// Check that the quantity is finite in every unit
    pub fn check_representable(&self, density: Density) -> Result<(), ConversionError> {
        for unit in Unit::ALL {
            self.try_in_unit(unit, density)?;
        }
        Ok(())
    }

    /// Convert to another unit
    pub fn convert_to(&self, target: Unit, density: Density) -> Quantity {
        Quantity::new(self.in_unit(target, density), target)
    }

    /// The value in g/l
    pub fn g_per_l(&self, density: Density) -> f64 {
        self.in_unit(Unit::MassConcentration, density)
    }

    /// The value in %w/w
    pub fn percent_ww(&self, density: Density) -> f64 {
        self.in_unit(Unit::MassFraction, density)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match f.precision() {
            Some(p) => write!(f, "{:.*} {}", p, self.value, self.unit.label()),
            None => write!(f, "{} {}", self.value, self.unit.label()),
        }
    }
}
