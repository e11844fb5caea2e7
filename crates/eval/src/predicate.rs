//! Predicate expression trees and their evaluator.
//!
//! Invariants and action guards are plain data built from [`Predicate`] and
//! [`Term`] nodes. The same tree is evaluated here and rendered by the proof
//! program builder, so the two outputs can never drift apart.
//!
//! Evaluation is strict: reading an unknown fact or comparing incompatible
//! values is an [`EvalError`]. Callers decide what a fault means; the
//! verification engine treats it as `false`.

use rust_decimal::Decimal;

use crate::numeric::{self, CmpOp};
use crate::provenance::ProvenanceCollector;
use crate::types::{EvalError, FactSet, Value};

/// A value-producing leaf of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Reference to a fact by id.
    Fact(&'static str),
    Int(i64),
    Decimal(Decimal),
    /// `fact * factor`, overflow-checked.
    Scaled {
        fact: &'static str,
        factor: Decimal,
    },
}

impl Term {
    pub fn fact(id: &'static str) -> Term {
        Term::Fact(id)
    }

    /// Decimal literal `num * 10^-scale`, e.g. `Term::dec(80, 2)` is `0.80`.
    pub fn dec(num: i64, scale: u32) -> Term {
        Term::Decimal(Decimal::new(num, scale))
    }

    pub fn int(i: i64) -> Term {
        Term::Int(i)
    }

    /// The fact this term reads, if any.
    pub fn fact_id(&self) -> Option<&'static str> {
        match self {
            Term::Fact(id) | Term::Scaled { fact: id, .. } => Some(*id),
            Term::Int(_) | Term::Decimal(_) => None,
        }
    }
}

/// A boolean-valued policy expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    Compare {
        left: Term,
        op: CmpOp,
        right: Term,
    },
    /// A boolean fact is true.
    Flag(&'static str),
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Implies {
        premise: Box<Predicate>,
        conclusion: Box<Predicate>,
    },
    /// Every listed fact is known. Never faults.
    Known(Vec<&'static str>),
    /// An integer fact is outside a fixed set.
    NotIn {
        fact: &'static str,
        values: Vec<i64>,
    },
}

impl Predicate {
    pub fn cmp(left: Term, op: CmpOp, right: Term) -> Predicate {
        Predicate::Compare { left, op, right }
    }

    pub fn le(left: Term, right: Term) -> Predicate {
        Predicate::cmp(left, CmpOp::Le, right)
    }

    pub fn ge(left: Term, right: Term) -> Predicate {
        Predicate::cmp(left, CmpOp::Ge, right)
    }

    pub fn gt(left: Term, right: Term) -> Predicate {
        Predicate::cmp(left, CmpOp::Gt, right)
    }

    pub fn implies(premise: Predicate, conclusion: Predicate) -> Predicate {
        Predicate::Implies {
            premise: Box::new(premise),
            conclusion: Box::new(conclusion),
        }
    }

    pub fn not(operand: Predicate) -> Predicate {
        Predicate::Not(Box::new(operand))
    }

    /// Fact ids referenced anywhere in the tree, in first-occurrence order.
    pub fn fact_ids(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        self.walk_facts(&mut out, false);
        out
    }

    /// Fact ids referenced inside `Known` nodes, in first-occurrence order.
    pub fn known_fact_ids(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        self.walk_facts(&mut out, true);
        out
    }

    fn walk_facts(&self, out: &mut Vec<&'static str>, known_only: bool) {
        match self {
            Predicate::Compare { left, right, .. } => {
                if !known_only {
                    for id in [left.fact_id(), right.fact_id()].into_iter().flatten() {
                        push_unique(out, id);
                    }
                }
            }
            Predicate::Flag(id) | Predicate::NotIn { fact: id, .. } => {
                if !known_only {
                    push_unique(out, *id);
                }
            }
            Predicate::Known(ids) => {
                for id in ids {
                    push_unique(out, *id);
                }
            }
            Predicate::Not(p) => p.walk_facts(out, known_only),
            Predicate::And(ps) | Predicate::Or(ps) => {
                for p in ps {
                    p.walk_facts(out, known_only);
                }
            }
            Predicate::Implies {
                premise,
                conclusion,
            } => {
                premise.walk_facts(out, known_only);
                conclusion.walk_facts(out, known_only);
            }
        }
    }
}

fn push_unique(out: &mut Vec<&'static str>, id: &'static str) {
    if !out.contains(&id) {
        out.push(id);
    }
}

/// Evaluate a term to a value.
pub fn eval_term(
    term: &Term,
    facts: &FactSet,
    collector: &mut ProvenanceCollector,
) -> Result<Value, EvalError> {
    match term {
        Term::Fact(id) => lookup(id, facts, collector).cloned(),
        Term::Int(i) => Ok(Value::Int(*i)),
        Term::Decimal(d) => Ok(Value::Decimal(*d)),
        Term::Scaled { fact, factor } => {
            let base = lookup(fact, facts, collector)?;
            numeric::scale(base, *factor)
        }
    }
}

fn lookup<'a>(
    id: &str,
    facts: &'a FactSet,
    collector: &mut ProvenanceCollector,
) -> Result<&'a Value, EvalError> {
    collector.record_fact(id);
    facts.get(id).ok_or_else(|| EvalError::UnknownFact {
        fact_id: id.to_string(),
    })
}

/// Evaluate a predicate against a fact set.
///
/// `And`, `Or` and `Implies` short-circuit left to right, so a fault in an
/// operand that is never reached does not surface.
pub fn eval_pred(
    pred: &Predicate,
    facts: &FactSet,
    collector: &mut ProvenanceCollector,
) -> Result<bool, EvalError> {
    match pred {
        Predicate::Compare { left, op, right } => {
            let l = eval_term(left, facts, collector)?;
            let r = eval_term(right, facts, collector)?;
            numeric::compare_values(&l, &r, *op)
        }

        Predicate::Flag(id) => lookup(id, facts, collector)?.as_bool(),

        Predicate::Not(operand) => Ok(!eval_pred(operand, facts, collector)?),

        Predicate::And(operands) => {
            for p in operands {
                if !eval_pred(p, facts, collector)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }

        Predicate::Or(operands) => {
            for p in operands {
                if eval_pred(p, facts, collector)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }

        Predicate::Implies {
            premise,
            conclusion,
        } => {
            if !eval_pred(premise, facts, collector)? {
                // Vacuously true
                return Ok(true);
            }
            eval_pred(conclusion, facts, collector)
        }

        Predicate::Known(ids) => {
            for id in ids {
                collector.record_fact(id);
            }
            Ok(ids.iter().all(|id| facts.is_known(id)))
        }

        Predicate::NotIn { fact, values } => {
            let v = lookup(fact, facts, collector)?.as_int()?;
            Ok(!values.contains(&v))
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
