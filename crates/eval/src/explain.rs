//! Natural-language explanations.
//!
//! The sentence template is keyed on domain, decision and satisfiability.
//! Details are rendered from the same predicate trees the engine evaluated,
//! so every value quoted is the value that was actually compared.

use crate::policy::{policy_for, Policy};
use crate::predicate::{eval_pred, eval_term, Predicate, Term};
use crate::provenance::ProvenanceCollector;
use crate::types::{Decision, Domain, FactRecord, FactSet};
use crate::verify::VerificationResult;

/// Explain a decision in one or two sentences, quoting concrete values.
///
/// When the result is unsatisfiable every unsat-core entry is listed.
pub fn explain(
    domain: Domain,
    decision: Decision,
    facts: &FactRecord,
    result: &VerificationResult,
) -> String {
    let policy = policy_for(domain);
    let fs = facts.to_fact_set();

    match domain {
        Domain::Authorization => {
            if !result.satisfiable {
                return format!("Declined: violated {}.", violations(policy, &fs, result));
            }
            match decision {
                Decision::ApproveNoOtp => format!(
                    "Approved without OTP: low risk and within available balance ({}).",
                    action_detail(policy, &fs, "approve_no_otp")
                ),
                Decision::ApproveWithOtp => format!(
                    "Approved with OTP: borderline risk within limit, step-up authentication required ({}).",
                    action_detail(policy, &fs, "approve_with_otp")
                ),
                _ => match policy.action("decline") {
                    Some(a) if eval_holds(&a.guard, &fs) => {
                        format!("Declined: {}.", describe(&a.guard, &fs, true))
                    }
                    _ => "Declined: no approval guard holds.".to_string(),
                },
            }
        }

        Domain::Dispute => {
            if !result.satisfiable {
                return format!(
                    "Declined: dispute outside allowed window, request additional documents. Violated {}.",
                    violations(policy, &fs, result)
                );
            }
            let window = invariant_detail(policy, &fs, "refund_window", true);
            match decision {
                Decision::Rc4834 => format!(
                    "Route to duplicate charge reason code (4834): duplicate_charge=true; {}.",
                    window
                ),
                _ => format!(
                    "Request additional documents: {}; {}.",
                    describe(&Predicate::Flag("duplicate_charge"), &fs, false),
                    window
                ),
            }
        }

        Domain::CreditLineIncrease => {
            if !result.satisfiable {
                return format!("Declined due to: {}.", violations(policy, &fs, result));
            }
            let held: Vec<String> = policy
                .invariants
                .iter()
                .map(|inv| describe(&inv.predicate, &fs, true))
                .collect();
            format!(
                "Approved: satisfies tenure, delinquency and income constraints ({}).",
                held.join("; ")
            )
        }
    }
}

/// Explanation for a request naming a domain outside the known set.
pub fn explain_unknown_domain(name: &str) -> String {
    format!("Declined: unknown domain '{}', no policy applies.", name)
}

/// Every unsat-core entry with its concrete detail, in core order.
fn violations(policy: &Policy, fs: &FactSet, result: &VerificationResult) -> String {
    result
        .unsat_core
        .iter()
        .map(|name| {
            let pred = policy
                .invariant(name)
                .map(|i| &i.predicate)
                .or_else(|| policy.action(name).map(|a| &a.guard));
            match pred {
                Some(p) => format!("`{}` ({})", name, describe(p, fs, false)),
                None => format!("`{}` (not an action of {})", name, policy.id),
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn action_detail(policy: &Policy, fs: &FactSet, name: &str) -> String {
    policy
        .action(name)
        .map(|a| describe(&a.guard, fs, true))
        .unwrap_or_default()
}

fn invariant_detail(policy: &Policy, fs: &FactSet, name: &str, want: bool) -> String {
    policy
        .invariant(name)
        .map(|i| describe(&i.predicate, fs, want))
        .unwrap_or_default()
}

fn eval_holds(pred: &Predicate, fs: &FactSet) -> bool {
    eval_pred(pred, fs, &mut ProvenanceCollector::new()).unwrap_or(false)
}

/// Describe why `pred` evaluates to `want` over `fs`.
///
/// Faulting operands are described by the unknown facts they read.
pub fn describe(pred: &Predicate, fs: &FactSet, want: bool) -> String {
    if let Err(e) = eval_pred(pred, fs, &mut ProvenanceCollector::new()) {
        let unknown: Vec<&str> = pred
            .fact_ids()
            .into_iter()
            .filter(|id| !fs.is_known(id))
            .collect();
        return match (unknown.is_empty(), pred) {
            (true, _) => e.to_string(),
            // Connectives may fault in one operand only; name just those.
            (false, Predicate::And(ps) | Predicate::Or(ps)) => ps
                .iter()
                .filter(|p| eval_pred(p, fs, &mut ProvenanceCollector::new()).is_err())
                .map(|p| describe(p, fs, want))
                .collect::<Vec<_>>()
                .join(" and "),
            (false, _) => format!("{} unknown", unknown.join(", ")),
        };
    }

    match pred {
        Predicate::Compare { left, op, right } => {
            let op = if want { *op } else { op.negate() };
            format!("{} {} {}", term(left, fs), op.pretty(), term(right, fs))
        }
        Predicate::Flag(id) => format!("{}={}", id, want),
        Predicate::Not(p) => describe(p, fs, !want),
        Predicate::And(ps) | Predicate::Or(ps) => {
            let conjunctive = matches!(pred, Predicate::And(_));
            // All operands explain an AND that holds or an OR that fails;
            // otherwise only the operands matching `want` do.
            let all = conjunctive == want;
            ps.iter()
                .filter(|p| all || eval_holds(p, fs) == want)
                .map(|p| describe(p, fs, want))
                .collect::<Vec<_>>()
                .join(", ")
        }
        Predicate::Implies {
            premise,
            conclusion,
        } => {
            if !want && matches!(**premise, Predicate::Known(_)) {
                describe(conclusion, fs, false)
            } else if !want {
                format!(
                    "{} and {}",
                    premise_detail(premise, fs),
                    describe(conclusion, fs, false)
                )
            } else if eval_holds(premise, fs) {
                describe(conclusion, fs, true)
            } else {
                describe(premise, fs, false)
            }
        }
        Predicate::Known(ids) => {
            if want {
                format!("{} known", ids.join(", "))
            } else {
                let missing: Vec<&str> = ids.iter().copied().filter(|id| !fs.is_known(id)).collect();
                format!("{} unknown", missing.join(", "))
            }
        }
        Predicate::NotIn { fact, .. } => {
            let shown = term(&Term::Fact(fact), fs);
            if want {
                format!("{} is allowed", shown)
            } else {
                format!("{} is blocked", shown)
            }
        }
    }
}

/// A premise that held, without the `known(...)` operands that guard it.
fn premise_detail(premise: &Predicate, fs: &FactSet) -> String {
    match premise {
        Predicate::And(ps) => ps
            .iter()
            .filter(|p| !matches!(p, Predicate::Known(_)))
            .map(|p| describe(p, fs, true))
            .collect::<Vec<_>>()
            .join(", "),
        other => describe(other, fs, true),
    }
}

fn term(t: &Term, fs: &FactSet) -> String {
    let value = eval_term(t, fs, &mut ProvenanceCollector::new());
    match (t, value) {
        (Term::Fact(id), Ok(v)) => format!("{}={}", id, v),
        (Term::Scaled { fact, factor }, Ok(v)) => format!("{}×{}={}", fact, factor, v),
        (_, Ok(v)) => v.to_string(),
        (_, Err(_)) => format!("{} unknown", t.fact_id().unwrap_or("?")),
    }
}
