//! Proof program builder.
//!
//! Renders a fact record and its domain policy into an SMT-LIB flavoured
//! text: typed declarations, value bindings, then one named assertion per
//! invariant and per action guard. Nothing is evaluated here; a record that
//! fails verification renders just the same.
//!
//! Output is a pure function of the record, byte for byte.

use std::fmt::Write as _;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::numeric::CmpOp;
use crate::policy::{policy_for, Policy};
use crate::predicate::{Predicate, Term};
use crate::types::{FactRecord, FactSet, Sort, Value};

/// Placeholder symbol bound to a fact whose value is unknown.
pub const UNKNOWN: &str = "?unknown";

/// A fact value that cannot be rendered under its declared sort.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProgramError {
    #[error("fact '{fact_id}' is declared {declared} but holds a {found} value")]
    SortMismatch {
        fact_id: String,
        declared: &'static str,
        found: &'static str,
    },
}

/// Build the proof program for a fact record.
pub fn build_program(facts: &FactRecord) -> Result<String, ProgramError> {
    render_program(policy_for(facts.domain()), &facts.to_fact_set())
}

/// Render a policy over an arbitrary fact set.
pub fn render_program(policy: &Policy, facts: &FactSet) -> Result<String, ProgramError> {
    let known_ids = known_facts(policy);
    let mut out = String::new();

    line(&mut out, format_args!("; proofgate program {} ({})", policy.id, policy.domain));

    line(&mut out, format_args!("; declarations"));
    for decl in &policy.facts {
        line(&mut out, format_args!("(declare-const {} {})", decl.id, decl.sort.as_str()));
    }
    for id in &known_ids {
        line(&mut out, format_args!("(declare-const known.{} Bool)", id));
    }

    line(&mut out, format_args!("; bindings"));
    for decl in &policy.facts {
        match facts.get(decl.id) {
            Some(value) => {
                let (lit, comment) = literal(decl.id, decl.sort, value)?;
                match comment {
                    Some(c) => line(&mut out, format_args!("(assert (= {} {})) ; {}", decl.id, lit, c)),
                    None => line(&mut out, format_args!("(assert (= {} {}))", decl.id, lit)),
                }
            }
            None => line(&mut out, format_args!("(assert (= {} {}))", decl.id, UNKNOWN)),
        }
    }
    for id in &known_ids {
        line(&mut out, format_args!("(assert (= known.{} {}))", id, facts.is_known(id)));
    }

    line(&mut out, format_args!("; invariants"));
    for inv in &policy.invariants {
        line(
            &mut out,
            format_args!("(assert (! {} :named {}))", render_predicate(policy, &inv.predicate), inv.name),
        );
    }

    line(&mut out, format_args!("; actions"));
    for action in &policy.actions {
        line(&mut out, format_args!("(declare-const pick.{} Bool)", action.name));
        line(
            &mut out,
            format_args!(
                "(assert (! (=> pick.{} {}) :named {}))",
                action.name,
                render_predicate(policy, &action.guard),
                action.name
            ),
        );
    }

    Ok(out)
}

fn line(out: &mut String, args: std::fmt::Arguments<'_>) {
    // Writing to a String cannot fail.
    let _ = out.write_fmt(args);
    out.push('\n');
}

/// Facts referenced by any `known(...)` node, in first-occurrence order.
fn known_facts(policy: &Policy) -> Vec<&'static str> {
    let mut ids: Vec<&'static str> = Vec::new();
    let preds = policy
        .invariants
        .iter()
        .map(|i| &i.predicate)
        .chain(policy.actions.iter().map(|a| &a.guard));
    for pred in preds {
        for id in pred.known_fact_ids() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Render a bound value under its declared sort. Dates also return an ISO
/// comment.
fn literal(fact_id: &str, sort: Sort, value: &Value) -> Result<(String, Option<String>), ProgramError> {
    let rendered = match (sort, value) {
        (Sort::Bool, Value::Bool(b)) => (b.to_string(), None),
        (Sort::Int, Value::Int(i)) => (int_literal(*i), None),
        (Sort::Int, Value::Date(d)) => (int_literal(i64::from(d.to_julian_day())), Some(d.to_string())),
        (Sort::Real, Value::Decimal(d)) => (real_literal(*d), None),
        (Sort::Real, Value::Int(i)) => (real_literal(Decimal::from(*i)), None),
        (declared, found) => {
            return Err(ProgramError::SortMismatch {
                fact_id: fact_id.to_string(),
                declared: declared.as_str(),
                found: found.type_name(),
            })
        }
    };
    Ok(rendered)
}

fn int_literal(i: i64) -> String {
    if i < 0 {
        format!("(- {})", i.unsigned_abs())
    } else {
        i.to_string()
    }
}

fn real_literal(d: Decimal) -> String {
    let mut s = d.abs().to_string();
    if !s.contains('.') {
        s.push_str(".0");
    }
    if d.is_sign_negative() && !d.is_zero() {
        format!("(- {})", s)
    } else {
        s
    }
}

/// Render a predicate tree in proof-program notation.
pub fn render_predicate(policy: &Policy, pred: &Predicate) -> String {
    match pred {
        Predicate::Compare { left, op, right } => {
            let real = term_sort(policy, left) == Some(Sort::Real)
                || term_sort(policy, right) == Some(Sort::Real);
            let l = render_term(left, real);
            let r = render_term(right, real);
            match op {
                CmpOp::Ne => format!("(not (= {} {}))", l, r),
                _ => format!("({} {} {})", op.symbol(), l, r),
            }
        }
        Predicate::Flag(id) => id.to_string(),
        Predicate::Not(p) => format!("(not {})", render_predicate(policy, p)),
        Predicate::And(ps) => connective("and", "true", policy, ps),
        Predicate::Or(ps) => connective("or", "false", policy, ps),
        Predicate::Implies {
            premise,
            conclusion,
        } => format!(
            "(=> {} {})",
            render_predicate(policy, premise),
            render_predicate(policy, conclusion)
        ),
        Predicate::Known(ids) => {
            let parts: Vec<String> = ids.iter().map(|id| format!("known.{}", id)).collect();
            join_op("and", "true", parts)
        }
        Predicate::NotIn { fact, values } => {
            let parts: Vec<String> = values
                .iter()
                .map(|v| format!("(= {} {})", fact, int_literal(*v)))
                .collect();
            format!("(not {})", join_op("or", "false", parts))
        }
    }
}

fn connective(op: &str, empty: &str, policy: &Policy, ps: &[Predicate]) -> String {
    join_op(op, empty, ps.iter().map(|p| render_predicate(policy, p)).collect())
}

fn join_op(op: &str, empty: &str, mut parts: Vec<String>) -> String {
    match parts.len() {
        0 => empty.to_string(),
        1 => parts.remove(0),
        _ => format!("({} {})", op, parts.join(" ")),
    }
}

fn term_sort(policy: &Policy, t: &Term) -> Option<Sort> {
    match t {
        Term::Fact(id) => policy.fact(id).map(|d| d.sort),
        Term::Int(_) => Some(Sort::Int),
        Term::Decimal(_) | Term::Scaled { .. } => Some(Sort::Real),
    }
}

fn render_term(t: &Term, real: bool) -> String {
    match t {
        Term::Fact(id) => id.to_string(),
        Term::Int(i) if real => real_literal(Decimal::from(*i)),
        Term::Int(i) => int_literal(*i),
        Term::Decimal(d) => real_literal(*d),
        Term::Scaled { fact, factor } => format!("(* {} {})", fact, real_literal(*factor)),
    }
}
