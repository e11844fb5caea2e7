//! Dispute routing policy (`dispute_v1`).
//!
//! Only the refund window is an invariant. Routing on `duplicate_charge` is
//! part of the decision rule, not a guard list.

use crate::predicate::{Predicate, Term};
use crate::types::{Domain, FactDecl, Sort};

use super::{DecisionRule, Invariant, Policy};

/// Days after the transaction within which a claim may be filed.
const REFUND_WINDOW_DAYS: i64 = 120;

pub(super) fn policy() -> Policy {
    Policy {
        id: "dispute_v1",
        domain: Domain::Dispute,
        facts: vec![
            FactDecl::new("duplicate_charge", Sort::Bool),
            FactDecl::new("transaction_date", Sort::Int),
            FactDecl::new("claim_date", Sort::Int),
            FactDecl::new("days_since_transaction", Sort::Int),
        ],
        invariants: vec![Invariant {
            name: "refund_window",
            predicate: Predicate::implies(
                Predicate::Known(vec!["days_since_transaction"]),
                Predicate::le(
                    Term::fact("days_since_transaction"),
                    Term::int(REFUND_WINDOW_DAYS),
                ),
            ),
        }],
        actions: vec![],
        rule: DecisionRule::DisputeRouting,
    }
}
