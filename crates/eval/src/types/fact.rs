//! Fact records (one per domain) and the flat fact set predicates read from.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use time::Date;

use super::values::Value;
use super::{Domain, Sort};

/// A declared fact field with its proof-program sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactDecl {
    pub id: &'static str,
    pub sort: Sort,
}

impl FactDecl {
    pub const fn new(id: &'static str, sort: Sort) -> Self {
        FactDecl { id, sort }
    }
}

/// Known fact values keyed by fact id. A fact that is unknown has no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactSet(pub BTreeMap<String, Value>);

impl FactSet {
    pub fn new() -> Self {
        FactSet(BTreeMap::new())
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.0.get(id)
    }

    pub fn is_known(&self, id: &str) -> bool {
        self.0.contains_key(id)
    }

    pub fn insert(&mut self, id: impl Into<String>, value: Value) {
        self.0.insert(id.into(), value);
    }

    /// Insert only when the value is known.
    fn put<T>(&mut self, id: &str, value: Option<T>, wrap: fn(T) -> Value) {
        if let Some(v) = value {
            self.0.insert(id.to_string(), wrap(v));
        }
    }

    /// Serialize the known values to a JSON object.
    pub fn to_json(&self) -> serde_json::Map<String, serde_json::Value> {
        self.0
            .iter()
            .map(|(k, v)| (k.clone(), v.to_json()))
            .collect()
    }
}

// ──────────────────────────────────────────────
// Per-domain records
// ──────────────────────────────────────────────

/// Card authorization request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthorizationFacts {
    pub amount: Option<Decimal>,
    pub available_balance: Option<Decimal>,
    pub credit_limit: Option<Decimal>,
    /// Nominally 0.0-1.0, not clamped.
    pub risk_score: Option<Decimal>,
    pub merchant_category_code: Option<i64>,
    pub card_not_present: Option<bool>,
    /// Transactions in the last hour.
    pub velocity_1h: Option<i64>,
}

/// Cardholder dispute claim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisputeFacts {
    pub duplicate_charge: Option<bool>,
    pub transaction_date: Option<Date>,
    pub claim_date: Option<Date>,
    pub days_since_transaction: Option<i64>,
}

/// Credit line increase request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreditLineFacts {
    pub amount_requested: Option<Decimal>,
    pub current_limit: Option<Decimal>,
    pub income: Option<Decimal>,
    pub tenure_months: Option<i64>,
    pub delinquent: Option<bool>,
}

/// Fully resolved input to verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FactRecord {
    Authorization(AuthorizationFacts),
    Dispute(DisputeFacts),
    CreditLineIncrease(CreditLineFacts),
}

impl FactRecord {
    pub fn domain(&self) -> Domain {
        match self {
            FactRecord::Authorization(_) => Domain::Authorization,
            FactRecord::Dispute(_) => Domain::Dispute,
            FactRecord::CreditLineIncrease(_) => Domain::CreditLineIncrease,
        }
    }

    /// Flatten the record into the fact set the predicates read from.
    pub fn to_fact_set(&self) -> FactSet {
        let mut fs = FactSet::new();
        match self {
            FactRecord::Authorization(f) => {
                fs.put("amount", f.amount, Value::Decimal);
                fs.put("available_balance", f.available_balance, Value::Decimal);
                fs.put("credit_limit", f.credit_limit, Value::Decimal);
                fs.put("risk_score", f.risk_score, Value::Decimal);
                fs.put("merchant_category_code", f.merchant_category_code, Value::Int);
                fs.put("card_not_present", f.card_not_present, Value::Bool);
                fs.put("velocity_1h", f.velocity_1h, Value::Int);
            }
            FactRecord::Dispute(f) => {
                fs.put("duplicate_charge", f.duplicate_charge, Value::Bool);
                fs.put("transaction_date", f.transaction_date, Value::Date);
                fs.put("claim_date", f.claim_date, Value::Date);
                fs.put("days_since_transaction", f.days_since_transaction, Value::Int);
            }
            FactRecord::CreditLineIncrease(f) => {
                fs.put("amount_requested", f.amount_requested, Value::Decimal);
                fs.put("current_limit", f.current_limit, Value::Decimal);
                fs.put("income", f.income, Value::Decimal);
                fs.put("tenure_months", f.tenure_months, Value::Int);
                fs.put("delinquent", f.delinquent, Value::Bool);
            }
        }
        fs
    }

    /// Canonical flat JSON form; unknown fields are `null`.
    pub fn to_json(&self) -> serde_json::Value {
        let known = self.to_fact_set();
        let decls = crate::policy::policy_for(self.domain()).facts.iter();
        let obj: serde_json::Map<String, serde_json::Value> = decls
            .map(|d| {
                let v = known
                    .get(d.id)
                    .map(Value::to_json)
                    .unwrap_or(serde_json::Value::Null);
                (d.id.to_string(), v)
            })
            .collect();
        serde_json::Value::Object(obj)
    }

    /// Return a copy with one field replaced, re-validated through assembly.
    pub fn with_fact(
        &self,
        field: &str,
        value: serde_json::Value,
    ) -> Result<FactRecord, super::EvalError> {
        let domain = self.domain();
        let policy = crate::policy::policy_for(domain);
        if !policy.facts.iter().any(|d| d.id == field) {
            return Err(super::EvalError::UnknownField {
                domain: domain.to_string(),
                field: field.to_string(),
            });
        }
        let mut json = self.to_json();
        if let Some(obj) = json.as_object_mut() {
            obj.insert(field.to_string(), value);
            // A stale derived day count must not shadow a replaced date.
            if field == "transaction_date" || field == "claim_date" {
                obj.insert("days_since_transaction".to_string(), serde_json::Value::Null);
            }
        }
        crate::assemble::assemble_facts(domain, &json)
    }
}
