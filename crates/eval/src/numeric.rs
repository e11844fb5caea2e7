//! Numeric model using `rust_decimal`.
//!
//! All arithmetic on decimal facts uses `rust_decimal::Decimal`. Mixed
//! Int/Decimal comparisons promote the Int side. No `f64` anywhere in the
//! evaluation path.

use std::cmp::Ordering;
use std::fmt;

use rust_decimal::Decimal;

use crate::types::{EvalError, Value};

/// Comparison operator of a predicate node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl CmpOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "<=",
            CmpOp::Gt => ">",
            CmpOp::Ge => ">=",
            CmpOp::Eq => "=",
            CmpOp::Ne => "!=",
        }
    }

    /// Human-readable symbol used in explanations.
    pub fn pretty(&self) -> &'static str {
        match self {
            CmpOp::Lt => "<",
            CmpOp::Le => "≤",
            CmpOp::Gt => ">",
            CmpOp::Ge => "≥",
            CmpOp::Eq => "=",
            CmpOp::Ne => "≠",
        }
    }

    /// The operator whose result is the logical negation of this one.
    pub fn negate(&self) -> CmpOp {
        match self {
            CmpOp::Lt => CmpOp::Ge,
            CmpOp::Le => CmpOp::Gt,
            CmpOp::Gt => CmpOp::Le,
            CmpOp::Ge => CmpOp::Lt,
            CmpOp::Eq => CmpOp::Ne,
            CmpOp::Ne => CmpOp::Eq,
        }
    }

    fn holds(&self, ord: Ordering) -> bool {
        match self {
            CmpOp::Lt => ord == Ordering::Less,
            CmpOp::Le => ord != Ordering::Greater,
            CmpOp::Gt => ord == Ordering::Greater,
            CmpOp::Ge => ord != Ordering::Less,
            CmpOp::Eq => ord == Ordering::Equal,
            CmpOp::Ne => ord != Ordering::Equal,
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Compare two values using the given operator.
///
/// Bools support only `=` and `!=`. Int and Decimal compare across types by
/// promoting the Int.
pub fn compare_values(left: &Value, right: &Value, op: CmpOp) -> Result<bool, EvalError> {
    match (left, right) {
        (Value::Bool(l), Value::Bool(r)) => match op {
            CmpOp::Eq => Ok(l == r),
            CmpOp::Ne => Ok(l != r),
            _ => Err(EvalError::TypeError {
                message: format!("operator '{}' not defined for Bool", op),
            }),
        },
        (Value::Int(l), Value::Int(r)) => Ok(op.holds(l.cmp(r))),
        (Value::Date(l), Value::Date(r)) => Ok(op.holds(l.cmp(r))),
        _ => {
            let l = coerce_to_decimal(left)?;
            let r = coerce_to_decimal(right)?;
            Ok(op.holds(l.cmp(&r)))
        }
    }
}

/// Coerce a numeric value to Decimal, promoting Int if necessary.
pub fn coerce_to_decimal(val: &Value) -> Result<Decimal, EvalError> {
    match val {
        Value::Decimal(d) => Ok(*d),
        Value::Int(i) => Ok(Decimal::from(*i)),
        _ => Err(EvalError::TypeError {
            message: format!("cannot coerce {} to Decimal", val.type_name()),
        }),
    }
}

/// Multiply a numeric value by a decimal factor with overflow checking.
pub fn scale(val: &Value, factor: Decimal) -> Result<Value, EvalError> {
    let base = coerce_to_decimal(val)?;
    let product = base
        .checked_mul(factor)
        .ok_or_else(|| EvalError::Overflow {
            message: format!("{} * {} overflows", base, factor),
        })?;
    Ok(Value::Decimal(product))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_decimal_promotion() {
        let l = Value::Int(5);
        let r = Value::Decimal(Decimal::new(50, 1));
        assert!(compare_values(&l, &r, CmpOp::Eq).unwrap());
        assert!(compare_values(&l, &r, CmpOp::Le).unwrap());
        assert!(!compare_values(&l, &r, CmpOp::Lt).unwrap());
    }

    #[test]
    fn decimal_boundary_is_inclusive_for_le() {
        let risk = Value::Decimal(Decimal::new(55, 2));
        let cap = Value::Decimal(Decimal::new(55, 2));
        assert!(compare_values(&risk, &cap, CmpOp::Le).unwrap());
        assert!(!compare_values(&risk, &cap, CmpOp::Gt).unwrap());
    }

    #[test]
    fn trailing_zeros_do_not_matter() {
        let a = Value::Decimal(Decimal::new(800, 3));
        let b = Value::Decimal(Decimal::new(80, 2));
        assert!(compare_values(&a, &b, CmpOp::Eq).unwrap());
    }

    #[test]
    fn bool_ordering_is_a_type_error() {
        let err = compare_values(&Value::Bool(true), &Value::Bool(false), CmpOp::Lt);
        assert!(matches!(err, Err(EvalError::TypeError { .. })));
    }

    #[test]
    fn bool_against_number_is_a_type_error() {
        let err = compare_values(&Value::Bool(true), &Value::Int(1), CmpOp::Eq);
        assert!(matches!(err, Err(EvalError::TypeError { .. })));
    }

    #[test]
    fn negate_flips_every_operator() {
        let l = Value::Int(3);
        let r = Value::Int(4);
        for op in [CmpOp::Lt, CmpOp::Le, CmpOp::Gt, CmpOp::Ge, CmpOp::Eq, CmpOp::Ne] {
            assert_ne!(
                compare_values(&l, &r, op).unwrap(),
                compare_values(&l, &r, op.negate()).unwrap()
            );
        }
    }

    #[test]
    fn scale_income_ratio() {
        let income = Value::Decimal(Decimal::from(50_000));
        let scaled = scale(&income, Decimal::new(3, 1)).unwrap();
        assert_eq!(scaled, Value::Decimal(Decimal::from(15_000)));
    }

    #[test]
    fn scale_overflow_is_reported() {
        let huge = Value::Decimal(Decimal::MAX);
        let err = scale(&huge, Decimal::from(2));
        assert!(matches!(err, Err(EvalError::Overflow { .. })));
    }
}
