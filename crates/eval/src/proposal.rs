//! Proposal (soft) mode for authorization.
//!
//! A [`Proposer`] suggests an action with a justification. The suggestion
//! is never trusted: it is checked against every invariant plus the
//! proposed action's own guard, repaired once if the check fails, and
//! replaced by `decline` if the repair does not verify either.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::policy::policy_for;
use crate::types::{AuthorizationFacts, Decision, FactRecord};
use crate::verify::{check_invariants, eval_named, VerificationResult};

/// A suggested action and the reason given for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Proposal {
    pub action: String,
    pub justification: String,
}

impl Proposal {
    fn new(action: &str, justification: &str) -> Self {
        Proposal {
            action: action.to_string(),
            justification: justification.to_string(),
        }
    }
}

/// Source of authorization proposals.
///
/// Implementations may be arbitrarily clever or arbitrarily wrong; the
/// caller verifies whatever they return.
pub trait Proposer {
    fn propose(&self, facts: &AuthorizationFacts) -> Proposal;
}

/// Deterministic proposer that mirrors the authorization guard thresholds.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleProposer;

impl Proposer for RuleProposer {
    fn propose(&self, facts: &AuthorizationFacts) -> Proposal {
        let risk = facts.risk_score;
        let amount = facts.amount;
        if at_most(risk, Decimal::new(35, 2)) && within(amount, facts.available_balance) {
            Proposal::new("approve_no_otp", "Low risk and within available balance.")
        } else if at_most(risk, Decimal::new(55, 2)) && within(amount, facts.credit_limit) {
            Proposal::new("approve_with_otp", "Borderline risk; within limit; step-up auth.")
        } else {
            Proposal::new("decline", "High risk or exceeds limits.")
        }
    }
}

fn at_most(value: Option<Decimal>, cap: Decimal) -> bool {
    value.is_some_and(|v| v <= cap)
}

fn within(amount: Option<Decimal>, bound: Option<Decimal>) -> bool {
    matches!((amount, bound), (Some(a), Some(b)) if a <= b)
}

/// Check a proposed action: every invariant must hold and so must the
/// action's guard. A failing guard, or a name that is not an action of the
/// policy, joins the unsat core after the invariants.
pub fn check_proposal(facts: &FactRecord, action: &str) -> VerificationResult {
    let policy = policy_for(facts.domain());
    let fs = facts.to_fact_set();
    let trace = check_invariants(policy, &fs);
    let mut unsat_core: Vec<String> = trace
        .iter()
        .filter(|o| !o.holds)
        .map(|o| o.name.clone())
        .collect();

    let mut guards = Vec::new();
    match policy.action(action) {
        Some(a) => {
            let outcome = eval_named(a.name, &a.guard, &fs);
            if !outcome.holds {
                unsat_core.push(a.name.to_string());
            }
            guards.push(outcome);
        }
        None => unsat_core.push(action.to_string()),
    }

    let satisfiable = unsat_core.is_empty();
    let decision = if satisfiable {
        Decision::from_action(action).unwrap_or(policy.fallback())
    } else {
        policy.fallback()
    };

    VerificationResult {
        domain: Some(policy.domain),
        policy_id: policy.id.to_string(),
        satisfiable,
        checked_invariants: policy.invariants.iter().map(|i| i.name.to_string()).collect(),
        unsat_core,
        chosen_action: satisfiable.then(|| action.to_string()),
        decision,
        trace,
        guards,
    }
}

/// Suggest a replacement for a proposal whose check failed.
pub fn repair(previous: &str, unsat_core: &[String], facts: &AuthorizationFacts) -> Proposal {
    tracing::debug!(previous, unsat_core = ?unsat_core, "repairing proposal");
    if unsat_core.iter().any(|n| n == "cnp_tightened") {
        Proposal::new("decline", "CNP with risk above policy threshold.")
    } else if at_most(facts.risk_score, Decimal::new(55, 2)) && within(facts.amount, facts.credit_limit) {
        Proposal::new("approve_with_otp", "Within limit; risk acceptable for step-up.")
    } else {
        Proposal::new("decline", "Constraints unsatisfied after repair.")
    }
}

/// Outcome of the propose, check, repair loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftOutcome {
    /// Check of the final proposal.
    pub result: VerificationResult,
    /// The proposal the result refers to.
    pub proposal: Proposal,
    pub repaired: bool,
}

/// Propose, check, and repair at most once.
///
/// The final decision is the proposal's action when its check is
/// satisfiable and `decline` otherwise.
pub fn run_soft(facts: &AuthorizationFacts, proposer: &dyn Proposer) -> SoftOutcome {
    let record = FactRecord::Authorization(facts.clone());
    let proposal = proposer.propose(facts);
    let result = check_proposal(&record, &proposal.action);
    tracing::info!(
        action = %proposal.action,
        satisfiable = result.satisfiable,
        "proposal checked"
    );
    if result.satisfiable {
        return SoftOutcome {
            result,
            proposal,
            repaired: false,
        };
    }

    let fixed = repair(&proposal.action, &result.unsat_core, facts);
    let result = check_proposal(&record, &fixed.action);
    tracing::info!(
        action = %fixed.action,
        satisfiable = result.satisfiable,
        "repaired proposal checked"
    );
    SoftOutcome {
        result,
        proposal: fixed,
        repaired: true,
    }
}
