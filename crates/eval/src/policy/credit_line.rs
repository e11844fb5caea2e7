//! Credit line increase policy (`cli_v1`).

use rust_decimal::Decimal;

use crate::predicate::{Predicate, Term};
use crate::types::{Domain, FactDecl, Sort};

use super::{DecisionRule, Invariant, Policy};

const MIN_TENURE_MONTHS: i64 = 6;

/// Largest requested line as a share of income (0.3).
fn income_ratio() -> Decimal {
    Decimal::new(3, 1)
}

pub(super) fn policy() -> Policy {
    Policy {
        id: "cli_v1",
        domain: Domain::CreditLineIncrease,
        facts: vec![
            FactDecl::new("amount_requested", Sort::Real),
            FactDecl::new("current_limit", Sort::Real),
            FactDecl::new("income", Sort::Real),
            FactDecl::new("tenure_months", Sort::Int),
            FactDecl::new("delinquent", Sort::Bool),
        ],
        invariants: vec![
            Invariant {
                name: "min_tenure",
                predicate: Predicate::ge(
                    Term::fact("tenure_months"),
                    Term::int(MIN_TENURE_MONTHS),
                ),
            },
            Invariant {
                name: "no_delinquency",
                predicate: Predicate::not(Predicate::Flag("delinquent")),
            },
            Invariant {
                name: "within_income_ratio",
                predicate: Predicate::implies(
                    Predicate::Known(vec!["amount_requested", "income"]),
                    Predicate::le(
                        Term::fact("amount_requested"),
                        Term::Scaled {
                            fact: "income",
                            factor: income_ratio(),
                        },
                    ),
                ),
            },
            Invariant {
                name: "not_below_current_limit",
                predicate: Predicate::implies(
                    Predicate::Known(vec!["amount_requested", "current_limit"]),
                    Predicate::ge(Term::fact("amount_requested"), Term::fact("current_limit")),
                ),
            },
        ],
        actions: vec![],
        rule: DecisionRule::ApproveIfSatisfiable,
    }
}
