//! Card authorization policy (`auth_v1`).

use crate::predicate::{Predicate, Term};
use crate::types::{Decision, Domain, FactDecl, Sort};

use super::{Action, DecisionRule, Invariant, Policy};

/// Merchant categories never authorized: wire transfers and betting.
const BLOCKED_MCCS: [i64; 2] = [4829, 7995];

pub(super) fn policy() -> Policy {
    let amount = || Term::fact("amount");
    let avail = || Term::fact("available_balance");
    let limit = || Term::fact("credit_limit");
    let risk = || Term::fact("risk_score");
    let velocity = || Term::fact("velocity_1h");

    Policy {
        id: "auth_v1",
        domain: Domain::Authorization,
        facts: vec![
            FactDecl::new("amount", Sort::Real),
            FactDecl::new("available_balance", Sort::Real),
            FactDecl::new("credit_limit", Sort::Real),
            FactDecl::new("risk_score", Sort::Real),
            FactDecl::new("merchant_category_code", Sort::Int),
            FactDecl::new("card_not_present", Sort::Bool),
            FactDecl::new("velocity_1h", Sort::Int),
        ],
        invariants: vec![
            Invariant {
                name: "limit_ok",
                predicate: Predicate::le(amount(), limit()),
            },
            Invariant {
                name: "risk_ceiling",
                predicate: Predicate::le(risk(), Term::dec(80, 2)),
            },
            Invariant {
                name: "cnp_tightened",
                // An unknown channel is not treated as card-not-present.
                predicate: Predicate::implies(
                    Predicate::And(vec![
                        Predicate::Known(vec!["card_not_present"]),
                        Predicate::Flag("card_not_present"),
                    ]),
                    Predicate::le(risk(), Term::dec(55, 2)),
                ),
            },
            Invariant {
                name: "velocity_cap",
                predicate: Predicate::le(velocity(), Term::int(5)),
            },
            Invariant {
                name: "mcc_allowed",
                predicate: Predicate::NotIn {
                    fact: "merchant_category_code",
                    values: BLOCKED_MCCS.to_vec(),
                },
            },
        ],
        actions: vec![
            Action {
                name: "approve_no_otp",
                guard: Predicate::And(vec![
                    Predicate::le(amount(), avail()),
                    Predicate::le(risk(), Term::dec(35, 2)),
                ]),
            },
            Action {
                name: "approve_with_otp",
                guard: Predicate::And(vec![
                    Predicate::le(amount(), limit()),
                    Predicate::le(risk(), Term::dec(55, 2)),
                ]),
            },
            Action {
                name: "decline",
                guard: Predicate::Or(vec![
                    Predicate::gt(risk(), Term::dec(55, 2)),
                    Predicate::gt(amount(), limit()),
                    Predicate::gt(velocity(), Term::int(5)),
                ]),
            },
        ],
        rule: DecisionRule::FirstMatch {
            fallback: Decision::Decline,
        },
    }
}
