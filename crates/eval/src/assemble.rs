//! Fact record assembly from request JSON with type checking.
//!
//! For each declared field of the domain:
//! - If present under its canonical key or an accepted alias: parse and
//!   type-check it
//! - If absent or `null`: the fact is unknown
//!
//! A present value of the wrong JSON type is a `TypeMismatch`. Keys that no
//! field reads are ignored.

use time::Date;

use crate::types::values::{parse_bool, parse_date, parse_decimal, parse_int};
use crate::types::{
    AuthorizationFacts, CreditLineFacts, DisputeFacts, Domain, EvalError, FactRecord,
};

type Object = serde_json::Map<String, serde_json::Value>;

/// Assemble a typed fact record for `domain` from a JSON object.
pub fn assemble_facts(domain: Domain, json: &serde_json::Value) -> Result<FactRecord, EvalError> {
    let obj = json.as_object().ok_or_else(|| EvalError::DeserializeError {
        message: "facts must be a JSON object".to_string(),
    })?;

    let record = match domain {
        Domain::Authorization => FactRecord::Authorization(assemble_authorization(obj)?),
        Domain::Dispute => FactRecord::Dispute(assemble_dispute(obj)?),
        Domain::CreditLineIncrease => FactRecord::CreditLineIncrease(assemble_credit_line(obj)?),
    };
    tracing::trace!(domain = %domain, known = record.to_fact_set().0.len(), "facts assembled");
    Ok(record)
}

fn assemble_authorization(obj: &Object) -> Result<AuthorizationFacts, EvalError> {
    let risk_paths: &[&[&str]] = &[&["risk_score"], &["risk", "score"], &["risk"]];

    let card_not_present = match find(obj, &[&["card_not_present"], &["cnp"]]) {
        Some(v) => parse_bool("card_not_present", v)?,
        None => match find(obj, &[&["context", "is_card_present"]]) {
            Some(v) => parse_bool("card_not_present", v)?.map(|present| !present),
            None => None,
        },
    };

    Ok(AuthorizationFacts {
        amount: decimal(obj, "amount", &[&["amount"]])?,
        available_balance: decimal(
            obj,
            "available_balance",
            &[&["available_balance"], &["avail"], &["account", "available"]],
        )?,
        credit_limit: decimal(
            obj,
            "credit_limit",
            &[&["credit_limit"], &["limit"], &["account", "credit_limit"]],
        )?,
        risk_score: decimal(obj, "risk_score", risk_paths)?,
        merchant_category_code: int(
            obj,
            "merchant_category_code",
            &[&["merchant_category_code"], &["mcc"], &["context", "mcc"]],
        )?,
        card_not_present,
        velocity_1h: int(
            obj,
            "velocity_1h",
            &[&["velocity_1h"], &["vel1h"], &["risk", "velocity_1h"]],
        )?,
    })
}

fn assemble_dispute(obj: &Object) -> Result<DisputeFacts, EvalError> {
    let duplicate_charge = match find(obj, &[&["duplicate_charge"]]) {
        Some(v) => parse_bool("duplicate_charge", v)?,
        None => None,
    };
    let transaction_date = date(obj, "transaction_date", &[&["transaction_date"], &["txn_date"]])?;
    let claim_date = date(obj, "claim_date", &[&["claim_date"]])?;
    let days_since_transaction = match int(
        obj,
        "days_since_transaction",
        &[&["days_since_transaction"], &["days_since_txn"]],
    )? {
        Some(days) => Some(days),
        None => days_between(transaction_date, claim_date),
    };

    Ok(DisputeFacts {
        duplicate_charge,
        transaction_date,
        claim_date,
        days_since_transaction,
    })
}

fn assemble_credit_line(obj: &Object) -> Result<CreditLineFacts, EvalError> {
    Ok(CreditLineFacts {
        amount_requested: decimal(obj, "amount_requested", &[&["amount_requested"]])?,
        current_limit: decimal(obj, "current_limit", &[&["current_limit"]])?,
        income: decimal(obj, "income", &[&["income"]])?,
        tenure_months: int(obj, "tenure_months", &[&["tenure_months"]])?,
        delinquent: match find(obj, &[&["delinquent"]]) {
            Some(v) => parse_bool("delinquent", v)?,
            None => None,
        },
    })
}

/// Whole days from `from` to `to`; negative when the claim predates the
/// transaction.
fn days_between(from: Option<Date>, to: Option<Date>) -> Option<i64> {
    match (from, to) {
        (Some(from), Some(to)) => Some(i64::from(to.to_julian_day() - from.to_julian_day())),
        _ => None,
    }
}

// ──────────────────────────────────────────────
// Key lookup
// ──────────────────────────────────────────────

/// First non-null value among `paths`, in order.
///
/// An object found at a path that is the prefix of a later path is a
/// container (e.g. nested `risk`), not a value, and is skipped.
fn find<'a>(obj: &'a Object, paths: &[&[&str]]) -> Option<&'a serde_json::Value> {
    for (i, path) in paths.iter().enumerate() {
        let Some(v) = lookup(obj, path) else {
            continue;
        };
        if v.is_null() {
            continue;
        }
        let is_container = v.is_object()
            && paths
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.len() > path.len() && other.starts_with(path));
        if is_container {
            continue;
        }
        return Some(v);
    }
    None
}

fn lookup<'a>(obj: &'a Object, path: &[&str]) -> Option<&'a serde_json::Value> {
    let (first, rest) = path.split_first()?;
    let mut cur = obj.get(*first)?;
    for key in rest {
        cur = cur.as_object()?.get(*key)?;
    }
    Some(cur)
}

fn decimal(
    obj: &Object,
    fact_id: &str,
    paths: &[&[&str]],
) -> Result<Option<rust_decimal::Decimal>, EvalError> {
    match find(obj, paths) {
        Some(v) => parse_decimal(fact_id, v),
        None => Ok(None),
    }
}

fn int(obj: &Object, fact_id: &str, paths: &[&[&str]]) -> Result<Option<i64>, EvalError> {
    match find(obj, paths) {
        Some(v) => parse_int(fact_id, v),
        None => Ok(None),
    }
}

fn date(obj: &Object, fact_id: &str, paths: &[&[&str]]) -> Result<Option<Date>, EvalError> {
    match find(obj, paths) {
        Some(v) => parse_date(fact_id, v),
        None => Ok(None),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
