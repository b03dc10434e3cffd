//! Rule definition parser
//!
//! Validates a single JSON rule record and decodes it into a `Rule`.
//! Every failure names the offending field and, inside `outputs` or `limits`,
//! the array index. A field given as `null` is treated as absent.

use relim_core::{ConfigError, Location, Unit};
use serde_json::{Map, Value};

use crate::rule::{Homogeneity, LimitClause, OutputDescriptor, Rule, Sides, Threshold};

type Object = Map<String, Value>;

/// Parse one rule record
pub fn parse_rule(record: &Value) -> Result<Rule, ConfigError> {
    let obj = record
        .as_object()
        .ok_or(ConfigError::NotAnObject { location: Location::Rule })?;

    let name = extract_text(obj, "name", Location::Rule)?;
    if name.is_empty() {
        return Err(ConfigError::EmptyName);
    }

    let symbol = extract_text(obj, "unit", Location::Rule)?;
    let unit = Unit::from_symbol(&symbol).ok_or(ConfigError::InvalidUnit { found: symbol })?;

    let outputs = extract_array(obj, "outputs", Location::Rule)?
        .iter()
        .enumerate()
        .map(|(i, output)| parse_output(i, output))
        .collect::<Result<Vec<_>, _>>()?;
    if outputs.is_empty() {
        return Err(ConfigError::EmptyOutputs);
    }

    let clauses = extract_array(obj, "limits", Location::Rule)?
        .iter()
        .enumerate()
        .map(|(i, limit)| parse_limit(i, limit))
        .collect::<Result<Vec<_>, _>>()?;

    let info = extract_optional_text(obj, "info", Location::Rule)?.unwrap_or_default();

    Ok(Rule { name, info, unit, outputs, clauses })
}

impl TryFrom<&Value> for Rule {
    type Error = ConfigError;

    fn try_from(record: &Value) -> Result<Self, Self::Error> {
        parse_rule(record)
    }
}

fn parse_output(index: usize, value: &Value) -> Result<OutputDescriptor, ConfigError> {
    let location = Location::Output(index);
    let obj = value.as_object().ok_or(ConfigError::NotAnObject { location })?;

    Ok(OutputDescriptor {
        title: extract_text(obj, "title", location)?,
        coefficient: extract_number(obj, "offset", location)?,
    })
}

fn parse_limit(index: usize, value: &Value) -> Result<LimitClause, ConfigError> {
    let location = Location::Limit(index);
    let obj = value.as_object().ok_or(ConfigError::NotAnObject { location })?;

    let percent = extract_tolerance(obj, "percent", location)?;
    let absolute = extract_tolerance(obj, "absolute", location)?;
    if percent.is_none() && absolute.is_none() {
        return Err(ConfigError::MissingTolerance { index });
    }
    let factor = percent
        .map(|p| Sides::new(p.minus / 100.0, p.plus / 100.0))
        .unwrap_or_default();

    let lte = extract_optional_number(obj, "lte", location)?;
    let lt = extract_optional_number(obj, "lt", location)?;
    let threshold = match (lte, lt) {
        (Some(t), _) => Threshold::AtMost(t),
        (None, Some(t)) => Threshold::Below(t),
        (None, None) => Threshold::CatchAll,
    };

    let homogenous = extract_optional_bool(obj, "homogenous", location)?.unwrap_or(false);
    let heterogenous = extract_optional_bool(obj, "heterogenous", location)?.unwrap_or(false);
    let homogeneity = match (homogenous, heterogenous) {
        (true, false) => Homogeneity::RequireHomogeneous,
        (false, true) => Homogeneity::RequireHeterogeneous,
        // both flags cancel out
        _ => Homogeneity::Any,
    };

    Ok(LimitClause {
        threshold,
        factor,
        absolute: absolute.unwrap_or_default(),
        homogeneity,
    })
}

/// A tolerance given as a number (both sides) or as a `{"+": .., "-": ..}` pair
fn extract_tolerance(obj: &Object, field: &str, location: Location) -> Result<Option<Sides>, ConfigError> {
    match get_present(obj, field) {
        None => Ok(None),
        Some(Value::Number(_)) => extract_number(obj, field, location).map(|v| Some(Sides::symmetric(v))),
        Some(Value::Object(pair)) => {
            let plus = extract_optional_number(pair, "+", location)
                .map_err(|e| qualify(e, field))?;
            let minus = extract_optional_number(pair, "-", location)
                .map_err(|e| qualify(e, field))?;
            if plus.is_none() && minus.is_none() {
                return Err(ConfigError::EmptyPair { location, field: field.to_string() });
            }
            Ok(Some(Sides::new(minus.unwrap_or(0.0), plus.unwrap_or(0.0))))
        }
        Some(other) => Err(ConfigError::wrong_type(
            location,
            field,
            "a number or a {\"+\", \"-\"} pair",
            type_name(other),
        )),
    }
}

/// Prefix a pair half's field name with its parent ("percent.+")
fn qualify(err: ConfigError, parent: &str) -> ConfigError {
    match err {
        ConfigError::WrongType { location, field, expected, found } => ConfigError::WrongType {
            location,
            field: format!("{}.{}", parent, field),
            expected,
            found,
        },
        other => other,
    }
}

// ========== Field extraction ==========

fn get_present<'a>(obj: &'a Object, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn extract_text(obj: &Object, field: &str, location: Location) -> Result<String, ConfigError> {
    extract_optional_text(obj, field, location)?.ok_or_else(|| ConfigError::missing(location, field))
}

fn extract_optional_text(obj: &Object, field: &str, location: Location) -> Result<Option<String>, ConfigError> {
    match get_present(obj, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(ConfigError::wrong_type(location, field, "a string", type_name(other))),
    }
}

fn extract_number(obj: &Object, field: &str, location: Location) -> Result<f64, ConfigError> {
    extract_optional_number(obj, field, location)?.ok_or_else(|| ConfigError::missing(location, field))
}

fn extract_optional_number(obj: &Object, field: &str, location: Location) -> Result<Option<f64>, ConfigError> {
    match get_present(obj, field) {
        None => Ok(None),
        Some(Value::Number(n)) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| ConfigError::wrong_type(location, field, "a finite number", "a number")),
        Some(other) => Err(ConfigError::wrong_type(location, field, "a number", type_name(other))),
    }
}

fn extract_optional_bool(obj: &Object, field: &str, location: Location) -> Result<Option<bool>, ConfigError> {
    match get_present(obj, field) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(other) => Err(ConfigError::wrong_type(location, field, "a boolean", type_name(other))),
    }
}

fn extract_array<'a>(obj: &'a Object, field: &str, location: Location) -> Result<&'a Vec<Value>, ConfigError> {
    match get_present(obj, field) {
        None => Err(ConfigError::missing(location, field)),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(ConfigError::wrong_type(location, field, "an array", type_name(other))),
    }
}
