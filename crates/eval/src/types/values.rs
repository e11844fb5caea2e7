//! Runtime values and JSON conversion helpers.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use time::Date;

use super::EvalError;

// ──────────────────────────────────────────────
// Runtime values
// ──────────────────────────────────────────────

/// A concrete fact value. Unknown facts have no `Value`; they are simply
/// absent from the [`FactSet`](super::FactSet).
///
/// All decimal values use `rust_decimal::Decimal` -- never `f64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    Date(Date),
}

impl Value {
    /// Returns a human-readable type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Decimal(_) => "Decimal",
            Value::Date(_) => "Date",
        }
    }

    /// Extracts a boolean or returns a type error.
    pub fn as_bool(&self) -> Result<bool, EvalError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(EvalError::TypeError {
                message: format!("expected Bool, got {}", other.type_name()),
            }),
        }
    }

    /// Extracts an integer or returns a type error.
    pub fn as_int(&self) -> Result<i64, EvalError> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Date(d) => Ok(i64::from(d.to_julian_day())),
            other => Err(EvalError::TypeError {
                message: format!("expected Int, got {}", other.type_name()),
            }),
        }
    }

    /// Serialize to the canonical JSON form. Decimals are emitted as
    /// strings so no precision is lost on the way out.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Decimal(d) => serde_json::Value::String(d.to_string()),
            Value::Date(d) => serde_json::Value::String(d.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Date(d) => write!(f, "{}", d),
        }
    }
}

// ──────────────────────────────────────────────
// JSON parsing helpers
// ──────────────────────────────────────────────

pub(crate) fn json_type_name(v: &serde_json::Value) -> &'static str {
    match v {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn mismatch(fact_id: &str, expected: &str, v: &serde_json::Value) -> EvalError {
    EvalError::TypeMismatch {
        fact_id: fact_id.to_string(),
        expected: expected.to_string(),
        got: json_type_name(v).to_string(),
    }
}

fn parse_decimal_str(s: &str) -> Option<Decimal> {
    let s = s.trim().replace(',', "");
    Decimal::from_str(&s)
        .or_else(|_| Decimal::from_scientific(&s))
        .ok()
}

/// Parse a decimal from a JSON number or numeric string. `null` is unknown.
pub(crate) fn parse_decimal(
    fact_id: &str,
    v: &serde_json::Value,
) -> Result<Option<Decimal>, EvalError> {
    match v {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => parse_decimal_str(&n.to_string())
            .map(Some)
            .ok_or_else(|| mismatch(fact_id, "Decimal", v)),
        serde_json::Value::String(s) => parse_decimal_str(s)
            .map(Some)
            .ok_or_else(|| mismatch(fact_id, "Decimal", v)),
        _ => Err(mismatch(fact_id, "Decimal", v)),
    }
}

/// Parse an integer from a JSON integer or integer string. `null` is unknown.
pub(crate) fn parse_int(fact_id: &str, v: &serde_json::Value) -> Result<Option<i64>, EvalError> {
    match v {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| mismatch(fact_id, "Int", v)),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| mismatch(fact_id, "Int", v)),
        _ => Err(mismatch(fact_id, "Int", v)),
    }
}

/// Parse a boolean. `null` is unknown.
pub(crate) fn parse_bool(fact_id: &str, v: &serde_json::Value) -> Result<Option<bool>, EvalError> {
    match v {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Bool(b) => Ok(Some(*b)),
        _ => Err(mismatch(fact_id, "Bool", v)),
    }
}

/// Parse an ISO 8601 calendar date (`YYYY-MM-DD`). `null` is unknown.
pub(crate) fn parse_date(fact_id: &str, v: &serde_json::Value) -> Result<Option<Date>, EvalError> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    match v {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) => Date::parse(s.trim(), &format)
            .map(Some)
            .map_err(|_| mismatch(fact_id, "Date", v)),
        _ => Err(mismatch(fact_id, "Date", v)),
    }
}
