//! Proofgate decision evaluator -- verifies structured financial facts
//! against fixed domain policies and produces auditable decisions.
//!
//! A request flows through four pure stages: fact assembly, verification
//! (invariants then guards), explanation, and proof-program rendering.
//! [`decide`] runs all four and packs the result into a [`DecisionReport`].

pub mod assemble;
pub mod explain;
pub mod numeric;
pub mod policy;
pub mod predicate;
pub mod probe;
pub mod program;
pub mod proposal;
pub mod provenance;
pub mod types;
pub mod verify;

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

pub use assemble::assemble_facts;
pub use explain::explain;
pub use probe::counterfactual_unchanged;
pub use program::{build_program, ProgramError};
pub use proposal::{check_proposal, repair, Proposal, Proposer, RuleProposer};
pub use provenance::PredicateOutcome;
pub use types::{
    AuthorizationFacts, CreditLineFacts, Decision, DisputeFacts, Domain, EvalError, FactRecord,
    FactSet, Value,
};
pub use verify::{verify, VerificationResult};

/// Name reported as the proof's checker.
pub const SOLVER: &str = "proofgate-eval";

/// Decision mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Policy guards pick the action.
    #[default]
    Hard,
    /// A proposer picks the action and the policy checks it. Authorization
    /// only; other domains decide as in `Hard`.
    Soft,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Hard => write!(f, "hard"),
            Mode::Soft => write!(f, "soft"),
        }
    }
}

/// The proof half of a decision report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProofSummary {
    pub solver: &'static str,
    pub satisfiable: bool,
    /// Known fact values; empty unless satisfiable.
    pub model: serde_json::Map<String, serde_json::Value>,
    pub checked_invariants: Vec<String>,
    pub unsat_core: Vec<String>,
    pub chosen_action: Option<String>,
    pub trace: Vec<PredicateOutcome>,
}

/// Everything a caller needs to render, audit, or store one decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionReport {
    pub domain: String,
    pub decision: Decision,
    pub policy_version: String,
    pub mode: Mode,
    pub proof: ProofSummary,
    pub explanation: String,
    /// Proposer's own reason, in soft mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    /// Canonical flat facts; unknown fields are `null`.
    pub facts: serde_json::Value,
    pub program: String,
    /// SHA-256 of `program`, lowercase hex.
    pub program_digest: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decide a request given a domain name and raw facts JSON.
///
/// An unknown domain yields a complete report with a `decline` decision and
/// `error` set. Malformed or mistyped facts are an `Err`.
pub fn decide(
    domain: &str,
    facts: &serde_json::Value,
    mode: Mode,
) -> Result<DecisionReport, EvalError> {
    let domain = match domain.parse::<Domain>() {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(domain, "unknown domain, declining");
            return Ok(unknown_domain_report(domain, mode, &e));
        }
    };
    let record = assemble::assemble_facts(domain, facts)?;
    decide_record(&record, mode)
}

/// Decide an already assembled fact record.
pub fn decide_record(facts: &FactRecord, mode: Mode) -> Result<DecisionReport, EvalError> {
    let domain = facts.domain();
    let (result, justification) = match (mode, facts) {
        (Mode::Soft, FactRecord::Authorization(auth)) => {
            let outcome = proposal::run_soft(auth, &RuleProposer);
            (outcome.result, Some(outcome.proposal.justification))
        }
        _ => (verify::verify(facts), None),
    };

    let explanation = explain::explain(domain, result.decision, facts, &result);
    let program = program::build_program(facts)?;
    let program_digest = format!("{:x}", Sha256::digest(program.as_bytes()));
    let model = if result.satisfiable {
        facts.to_fact_set().to_json()
    } else {
        serde_json::Map::new()
    };

    tracing::info!(
        domain = %domain,
        mode = %mode,
        decision = result.decision.as_str(),
        satisfiable = result.satisfiable,
        "decision made"
    );

    Ok(DecisionReport {
        domain: domain.to_string(),
        decision: result.decision,
        policy_version: result.policy_id,
        mode,
        proof: ProofSummary {
            solver: SOLVER,
            satisfiable: result.satisfiable,
            model,
            checked_invariants: result.checked_invariants,
            unsat_core: result.unsat_core,
            chosen_action: result.chosen_action,
            trace: result.trace,
        },
        explanation,
        justification,
        facts: facts.to_json(),
        program,
        program_digest,
        error: None,
    })
}

fn unknown_domain_report(name: &str, mode: Mode, err: &EvalError) -> DecisionReport {
    let result = VerificationResult::unknown_domain();
    DecisionReport {
        domain: name.to_string(),
        decision: result.decision,
        policy_version: result.policy_id,
        mode,
        proof: ProofSummary {
            solver: SOLVER,
            satisfiable: false,
            model: serde_json::Map::new(),
            checked_invariants: Vec::new(),
            unsat_core: Vec::new(),
            chosen_action: None,
            trace: Vec::new(),
        },
        explanation: explain::explain_unknown_domain(name),
        justification: None,
        facts: serde_json::Value::Object(serde_json::Map::new()),
        program: String::new(),
        program_digest: format!("{:x}", Sha256::digest(b"")),
        error: Some(err.to_string()),
    }
}

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────
