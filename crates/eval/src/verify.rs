//! Verification engine.
//!
//! Evaluates every invariant of a domain policy in declaration order,
//! derives satisfiability and the unsat core, then turns the result into a
//! decision through the policy's decision rule.
//!
//! A predicate that cannot be evaluated (unknown fact, type error, overflow)
//! counts as `false`: an invariant that cannot be confirmed is violated, a
//! guard that cannot be confirmed does not match. Faults never escape
//! `verify`.

use serde::Serialize;

use crate::policy::{policy_for, DecisionRule, Policy};
use crate::predicate::{eval_pred, Predicate};
use crate::provenance::{PredicateOutcome, ProvenanceCollector};
use crate::types::{Decision, Domain, FactRecord, FactSet, Value};

/// Outcome of verifying one fact record against its domain policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerificationResult {
    /// `None` only for a request naming an unknown domain.
    pub domain: Option<Domain>,
    pub policy_id: String,
    /// True iff no invariant evaluated to false.
    pub satisfiable: bool,
    /// Every invariant name, in declaration order, regardless of outcome.
    pub checked_invariants: Vec<String>,
    /// Names of violated invariants, in declaration order.
    pub unsat_core: Vec<String>,
    /// First matching action of a guard-list policy; set only when
    /// satisfiable.
    pub chosen_action: Option<String>,
    pub decision: Decision,
    /// Per-invariant provenance.
    pub trace: Vec<PredicateOutcome>,
    /// Guards evaluated while selecting the action, up to the first match.
    pub guards: Vec<PredicateOutcome>,
}

impl VerificationResult {
    /// Result for a domain outside the known set: unsatisfiable, nothing
    /// checked, safe fallback.
    pub fn unknown_domain() -> Self {
        VerificationResult {
            domain: None,
            policy_id: "unknown".to_string(),
            satisfiable: false,
            checked_invariants: Vec::new(),
            unsat_core: Vec::new(),
            chosen_action: None,
            decision: Decision::Decline,
            trace: Vec::new(),
            guards: Vec::new(),
        }
    }

    /// Trace entry for an invariant, if it was checked.
    pub fn outcome(&self, name: &str) -> Option<&PredicateOutcome> {
        self.trace.iter().find(|o| o.name == name)
    }
}

/// Verify a fact record against its domain policy.
pub fn verify(facts: &FactRecord) -> VerificationResult {
    verify_facts(policy_for(facts.domain()), &facts.to_fact_set())
}

/// Verify an arbitrary fact set against a policy.
///
/// This is the engine proper; [`verify`] is the typed entry point. Values of
/// the wrong type in `facts` are evaluation faults, not errors.
pub fn verify_facts(policy: &Policy, facts: &FactSet) -> VerificationResult {
    let trace = check_invariants(policy, facts);
    let unsat_core: Vec<String> = trace
        .iter()
        .filter(|o| !o.holds)
        .map(|o| o.name.clone())
        .collect();
    let satisfiable = unsat_core.is_empty();

    let mut guards = Vec::new();
    let mut chosen_action = None;
    let decision = if !satisfiable {
        policy.fallback()
    } else {
        match policy.rule {
            DecisionRule::FirstMatch { fallback } => {
                let (matched, evaluated) = select_action(policy, facts);
                guards = evaluated;
                let name = matched.unwrap_or(fallback.as_str());
                chosen_action = Some(name.to_string());
                Decision::from_action(name).unwrap_or(fallback)
            }
            DecisionRule::DisputeRouting => {
                if facts.get("duplicate_charge") == Some(&Value::Bool(true)) {
                    Decision::Rc4834
                } else {
                    Decision::RequestMoreDocs
                }
            }
            DecisionRule::ApproveIfSatisfiable => Decision::Approve,
        }
    };

    tracing::debug!(
        policy = policy.id,
        satisfiable,
        unsat_core = ?unsat_core,
        decision = decision.as_str(),
        "verification complete"
    );

    VerificationResult {
        domain: Some(policy.domain),
        policy_id: policy.id.to_string(),
        satisfiable,
        checked_invariants: policy.invariants.iter().map(|i| i.name.to_string()).collect(),
        unsat_core,
        chosen_action,
        decision,
        trace,
        guards,
    }
}

/// Evaluate every invariant in declaration order.
pub fn check_invariants(policy: &Policy, facts: &FactSet) -> Vec<PredicateOutcome> {
    policy
        .invariants
        .iter()
        .map(|inv| eval_named(inv.name, &inv.predicate, facts))
        .collect()
}

/// Evaluate guards in priority order and stop at the first that holds.
///
/// Returns the matched action name (if any) and the outcomes of every guard
/// evaluated on the way.
pub fn select_action(
    policy: &Policy,
    facts: &FactSet,
) -> (Option<&'static str>, Vec<PredicateOutcome>) {
    let mut evaluated = Vec::new();
    for action in &policy.actions {
        let outcome = eval_named(action.name, &action.guard, facts);
        let holds = outcome.holds;
        evaluated.push(outcome);
        if holds {
            return (Some(action.name), evaluated);
        }
    }
    (None, evaluated)
}

/// Evaluate one named predicate in isolation, coercing faults to `false`.
pub(crate) fn eval_named(name: &str, pred: &Predicate, facts: &FactSet) -> PredicateOutcome {
    let mut collector = ProvenanceCollector::new();
    match eval_pred(pred, facts, &mut collector) {
        Ok(holds) => collector.into_outcome(name, holds, None),
        Err(e) => {
            tracing::debug!(predicate = name, error = %e, "evaluation fault, treating as false");
            collector.into_outcome(name, false, Some(e.to_string()))
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuthorizationFacts, CreditLineFacts, DisputeFacts};
    use rust_decimal::Decimal;

    fn d(s: &str) -> Option<Decimal> {
        Some(s.parse().unwrap())
    }

    fn auth(amount: &str, avail: &str, limit: &str, risk: &str, mcc: i64, cnp: bool, vel: i64) -> FactRecord {
        FactRecord::Authorization(AuthorizationFacts {
            amount: d(amount),
            available_balance: d(avail),
            credit_limit: d(limit),
            risk_score: d(risk),
            merchant_category_code: Some(mcc),
            card_not_present: Some(cnp),
            velocity_1h: Some(vel),
        })
    }

    #[test]
    fn low_risk_approves_without_otp() {
        let r = verify(&auth("120", "500", "1000", "0.30", 5999, false, 1));
        assert!(r.satisfiable);
        assert!(r.unsat_core.is_empty());
        assert_eq!(r.chosen_action.as_deref(), Some("approve_no_otp"));
        assert_eq!(r.decision, Decision::ApproveNoOtp);
        assert_eq!(r.guards.len(), 1);
    }

    #[test]
    fn borderline_cnp_needs_otp() {
        let r = verify(&auth("200", "600", "1000", "0.50", 5732, true, 1));
        assert!(r.satisfiable);
        assert_eq!(r.chosen_action.as_deref(), Some("approve_with_otp"));
        assert!(!r.guards[0].holds);
        assert!(r.guards[1].holds);
    }

    #[test]
    fn blocked_mcc_is_unsat() {
        let r = verify(&auth("50", "900", "1000", "0.20", 7995, true, 1));
        assert!(!r.satisfiable);
        assert_eq!(r.unsat_core, vec!["mcc_allowed"]);
        assert_eq!(r.chosen_action, None);
        assert_eq!(r.decision, Decision::Decline);
        assert!(r.guards.is_empty());
    }

    #[test]
    fn core_keeps_declaration_order() {
        // velocity and limit both violated; limit_ok is declared first
        let r = verify(&auth("1500", "900", "1000", "0.20", 5999, false, 9));
        assert_eq!(r.unsat_core, vec!["limit_ok", "velocity_cap"]);
    }

    #[test]
    fn unknown_amount_violates_limit_ok() {
        let mut rec = match auth("0", "500", "1000", "0.30", 5999, false, 1) {
            FactRecord::Authorization(f) => f,
            _ => unreachable!(),
        };
        rec.amount = None;
        let r = verify(&FactRecord::Authorization(rec));
        assert!(!r.satisfiable);
        assert_eq!(r.unsat_core, vec!["limit_ok"]);
        let o = r.outcome("limit_ok").unwrap();
        assert_eq!(o.fault.as_deref(), Some("unknown fact: amount"));
    }

    #[test]
    fn unknown_channel_is_not_card_not_present() {
        let unknown_cnp = |risk: &str| {
            let mut f = match auth("120", "500", "1000", risk, 5999, false, 1) {
                FactRecord::Authorization(f) => f,
                _ => unreachable!(),
            };
            f.card_not_present = None;
            verify(&FactRecord::Authorization(f))
        };

        let r = unknown_cnp("0.30");
        assert!(r.satisfiable);
        assert!(r.unsat_core.is_empty());
        let o = r.outcome("cnp_tightened").unwrap();
        assert!(o.holds);
        assert_eq!(o.fault, None);
        assert_eq!(r.chosen_action.as_deref(), Some("approve_no_otp"));
        assert_eq!(r.decision, Decision::ApproveNoOtp);

        // Above the tightened bound but under the ceiling: still no core entry.
        let r = unknown_cnp("0.70");
        assert!(r.satisfiable);
        assert!(r.unsat_core.is_empty());
        assert_eq!(r.decision, Decision::Decline);
    }

    #[test]
    fn no_matching_guard_falls_back_to_decline() {
        // Unknown available balance makes the no-OTP guard fault.
        let mut f = match auth("100", "50", "1000", "0.55", 5999, false, 1) {
            FactRecord::Authorization(f) => f,
            _ => unreachable!(),
        };
        f.available_balance = None;
        let r = verify(&FactRecord::Authorization(f.clone()));
        assert_eq!(r.chosen_action.as_deref(), Some("approve_with_otp"));

        // Nothing matches when every guard faults or fails.
        let mut facts = FactRecord::Authorization(f).to_fact_set();
        facts.insert("risk_score", Value::Bool(true));
        let policy = policy_for(Domain::Authorization);
        let mut stripped = policy.clone();
        stripped.invariants.clear();
        let r = verify_facts(&stripped, &facts);
        assert!(r.satisfiable);
        assert_eq!(r.chosen_action.as_deref(), Some("decline"));
        assert_eq!(r.decision, Decision::Decline);
        assert_eq!(r.guards.len(), 3);
        assert!(r.guards.iter().all(|g| !g.holds));
    }

    #[test]
    fn mistyped_fact_is_a_fault_not_a_panic() {
        let mut facts = auth("120", "500", "1000", "0.30", 5999, false, 1).to_fact_set();
        facts.insert("velocity_1h", Value::Bool(false));
        let r = verify_facts(policy_for(Domain::Authorization), &facts);
        assert_eq!(r.unsat_core, vec!["velocity_cap"]);
        assert!(r.outcome("velocity_cap").unwrap().fault.is_some());
    }

    #[test]
    fn dispute_routes_duplicates() {
        let r = verify(&FactRecord::Dispute(DisputeFacts {
            duplicate_charge: Some(true),
            days_since_transaction: Some(7),
            ..Default::default()
        }));
        assert!(r.satisfiable);
        assert_eq!(r.decision, Decision::Rc4834);
        assert_eq!(r.chosen_action, None);
    }

    #[test]
    fn dispute_unknown_window_is_vacuous() {
        let r = verify(&FactRecord::Dispute(DisputeFacts {
            duplicate_charge: Some(false),
            ..Default::default()
        }));
        assert!(r.satisfiable);
        assert_eq!(r.decision, Decision::RequestMoreDocs);
    }

    #[test]
    fn dispute_late_claim() {
        let r = verify(&FactRecord::Dispute(DisputeFacts {
            duplicate_charge: Some(true),
            days_since_transaction: Some(137),
            ..Default::default()
        }));
        assert!(!r.satisfiable);
        assert_eq!(r.unsat_core, vec!["refund_window"]);
        assert_eq!(r.decision, Decision::RequestMoreDocs);
    }

    #[test]
    fn credit_line_income_ratio() {
        let r = verify(&FactRecord::CreditLineIncrease(CreditLineFacts {
            amount_requested: d("20000"),
            current_limit: d("5000"),
            income: d("50000"),
            tenure_months: Some(36),
            delinquent: Some(false),
        }));
        assert!(!r.satisfiable);
        assert_eq!(r.unsat_core, vec!["within_income_ratio"]);
        assert_eq!(r.decision, Decision::Decline);
    }

    #[test]
    fn credit_line_approves() {
        let r = verify(&FactRecord::CreditLineIncrease(CreditLineFacts {
            amount_requested: d("7000"),
            current_limit: d("5000"),
            income: d("60000"),
            tenure_months: Some(24),
            delinquent: Some(false),
        }));
        assert!(r.satisfiable);
        assert_eq!(r.decision, Decision::Approve);
    }

    #[test]
    fn credit_line_unknown_delinquency_is_conservative() {
        let r = verify(&FactRecord::CreditLineIncrease(CreditLineFacts {
            amount_requested: d("7000"),
            current_limit: None,
            income: None,
            tenure_months: Some(24),
            delinquent: None,
        }));
        assert_eq!(r.unsat_core, vec!["no_delinquency"]);
    }

    #[test]
    fn unknown_domain_result_is_empty() {
        let r = VerificationResult::unknown_domain();
        assert!(!r.satisfiable);
        assert!(r.checked_invariants.is_empty());
        assert!(r.unsat_core.is_empty());
        assert_eq!(r.decision, Decision::Decline);
    }
}
