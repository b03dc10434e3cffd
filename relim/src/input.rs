//! User input for a calculation request

use relim_core::{ConversionError, Density, Quantity, Unit};
use thiserror::Error;
use tracing::info;

/// Density used when the user gives none, in g/ml
pub const DEFAULT_DENSITY: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    #[error("the declared value must not be left blank")]
    BlankDeclared,

    #[error("the declared value has to be a number, got {0:?} (point and comma may be used as decimal separator)")]
    DeclaredNotANumber(String),

    #[error("the density must be a positive value, got {0}")]
    NonPositiveDensity(f64),

    #[error("the declared value cannot be converted: {0}")]
    OutOfRange(#[from] ConversionError),
}

/// Parse a decimal number, accepting `,` as decimal separator
pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

pub fn parse_declared(text: &str, unit: Unit) -> Result<Quantity, InputError> {
    if text.trim().is_empty() {
        return Err(InputError::BlankDeclared);
    }
    parse_decimal(text)
        .map(|value| Quantity::new(value, unit))
        .ok_or_else(|| InputError::DeclaredNotANumber(text.to_string()))
}

/// Blank or unreadable density falls back to `DEFAULT_DENSITY`
pub fn parse_density(text: Option<&str>) -> Result<Density, InputError> {
    let value = match text.map(str::trim).filter(|t| !t.is_empty()) {
        None => {
            info!(density = DEFAULT_DENSITY, "no density given, using default");
            DEFAULT_DENSITY
        }
        Some(t) => match parse_decimal(t) {
            Some(v) => v,
            None => {
                info!(input = t, density = DEFAULT_DENSITY, "density is not a number, using default");
                DEFAULT_DENSITY
            }
        },
    };
    Density::new(value).map_err(|_| InputError::NonPositiveDensity(value))
}

/// The declared value must stay finite in both units at the given density
pub fn check_declared(declared: Quantity, density: Density) -> Result<(), InputError> {
    declared.check_representable(density)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comma_decimal_separator() {
        assert_eq!(parse_decimal("12,5"), Some(12.5));
        assert_eq!(parse_decimal(" 3.25 "), Some(3.25));
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("inf"), None);
    }

    #[test]
    fn test_declared_value() {
        let q = parse_declared("250,0", Unit::MassConcentration).unwrap();
        assert_eq!(q, Quantity::new(250.0, Unit::MassConcentration));

        assert_eq!(parse_declared("  ", Unit::MassFraction), Err(InputError::BlankDeclared));
        assert_eq!(
            parse_declared("ten", Unit::MassFraction),
            Err(InputError::DeclaredNotANumber("ten".to_string()))
        );
    }

    #[test]
    fn test_density_defaults() {
        assert_eq!(parse_density(None).unwrap().value(), DEFAULT_DENSITY);
        assert_eq!(parse_density(Some("")).unwrap().value(), DEFAULT_DENSITY);
        assert_eq!(parse_density(Some("n/a")).unwrap().value(), DEFAULT_DENSITY);
        assert_eq!(parse_density(Some("1,12")).unwrap().value(), 1.12);
    }

    #[test]
    fn test_declared_value_overflowing_in_other_unit() {
        let declared = parse_declared("1e308", Unit::MassFraction).unwrap();
        let err = check_declared(declared, parse_density(None).unwrap()).unwrap_err();
        assert!(matches!(err, InputError::OutOfRange(ConversionError::OutOfRange { .. })));

        let declared = parse_declared("1e308", Unit::MassConcentration).unwrap();
        assert!(check_declared(declared, parse_density(None).unwrap()).is_ok());
    }

    #[test]
    fn test_density_must_be_positive() {
        assert_eq!(parse_density(Some("0")), Err(InputError::NonPositiveDensity(0.0)));
        assert_eq!(parse_density(Some("-0,9")), Err(InputError::NonPositiveDensity(-0.9)));
    }
}
