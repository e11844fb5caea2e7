//! Counterfactual probing.

use crate::types::{EvalError, FactRecord};
use crate::{decide_record, Mode};

/// Decide `facts` and a copy with `field` replaced by `value`; true when
/// both decisions agree.
///
/// Used as a fairness probe: flipping an attribute that should be
/// irrelevant must not move the decision. Fails only when `field` is not a
/// fact of the record's domain or `value` does not have its type.
pub fn counterfactual_unchanged(
    facts: &FactRecord,
    field: &str,
    value: serde_json::Value,
    mode: Mode,
) -> Result<bool, EvalError> {
    let flipped = facts.with_fact(field, value)?;
    let before = decide_record(facts, mode)?;
    let after = decide_record(&flipped, mode)?;
    tracing::debug!(
        field,
        before = before.decision.as_str(),
        after = after.decision.as_str(),
        "counterfactual probe"
    );
    Ok(before.decision == after.decision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::assemble_facts;
    use crate::types::Domain;
    use serde_json::json;

    fn approve_no_otp() -> FactRecord {
        assemble_facts(
            Domain::Authorization,
            &json!({"amount": 120, "available_balance": 500, "credit_limit": 1000,
                    "risk_score": "0.30", "merchant_category_code": 5999,
                    "card_not_present": false, "velocity_1h": 1}),
        )
        .unwrap()
    }

    #[test]
    fn irrelevant_flip_is_unchanged() {
        // cnp only tightens risk above 0.55
        let rec = approve_no_otp();
        assert!(counterfactual_unchanged(&rec, "card_not_present", json!(true), Mode::Hard).unwrap());
    }

    #[test]
    fn relevant_flip_changes_decision() {
        let rec = approve_no_otp();
        assert!(!counterfactual_unchanged(&rec, "merchant_category_code", json!(7995), Mode::Hard).unwrap());
        assert!(!counterfactual_unchanged(&rec, "risk_score", json!(0.5), Mode::Soft).unwrap());
    }

    #[test]
    fn foreign_field_is_an_error() {
        let err = counterfactual_unchanged(&approve_no_otp(), "income", json!(1), Mode::Hard).unwrap_err();
        assert!(matches!(err, EvalError::UnknownField { .. }));
    }

    #[test]
    fn mistyped_value_is_an_error() {
        let err = counterfactual_unchanged(&approve_no_otp(), "velocity_1h", json!("lots"), Mode::Hard)
            .unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { .. }));
    }
}
