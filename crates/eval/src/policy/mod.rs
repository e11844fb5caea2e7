//! Policy tables.
//!
//! A policy is data: the declared facts of a domain, its invariants in
//! declaration order, its actions in priority order, and the decision rule
//! that turns a verification result into a decision. Tables are built once
//! per process and never mutated.

mod authorization;
mod credit_line;
mod dispute;

use std::sync::LazyLock;

use crate::predicate::Predicate;
use crate::types::{Decision, Domain, FactDecl};

/// A named precondition. Every invariant must hold for the policy to be
/// satisfiable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invariant {
    pub name: &'static str,
    pub predicate: Predicate,
}

/// A candidate action with its guard. Evaluated only once every invariant
/// holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: &'static str,
    pub guard: Predicate,
}

/// How a domain turns a verification result into a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionRule {
    /// First action whose guard holds wins; `fallback` when no guard holds
    /// or the policy is unsatisfiable.
    FirstMatch { fallback: Decision },
    /// Duplicate charges inside the refund window route to reason code
    /// 4834; everything else asks for documents.
    DisputeRouting,
    /// Approve iff every invariant holds.
    ApproveIfSatisfiable,
}

/// A complete domain policy.
#[derive(Debug, Clone)]
pub struct Policy {
    /// Policy version identifier reported with every decision.
    pub id: &'static str,
    pub domain: Domain,
    pub facts: Vec<FactDecl>,
    pub invariants: Vec<Invariant>,
    pub actions: Vec<Action>,
    pub rule: DecisionRule,
}

impl Policy {
    /// The decision used when the policy is not satisfiable.
    pub fn fallback(&self) -> Decision {
        match self.rule {
            DecisionRule::FirstMatch { fallback } => fallback,
            DecisionRule::DisputeRouting => Decision::RequestMoreDocs,
            DecisionRule::ApproveIfSatisfiable => Decision::Decline,
        }
    }

    pub fn invariant_names(&self) -> Vec<&'static str> {
        self.invariants.iter().map(|i| i.name).collect()
    }

    pub fn invariant(&self, name: &str) -> Option<&Invariant> {
        self.invariants.iter().find(|i| i.name == name)
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions.iter().find(|a| a.name == name)
    }

    /// Declared sort of a fact, if the domain has it.
    pub fn fact(&self, id: &str) -> Option<&FactDecl> {
        self.facts.iter().find(|d| d.id == id)
    }
}

static AUTHORIZATION: LazyLock<Policy> = LazyLock::new(authorization::policy);
static DISPUTE: LazyLock<Policy> = LazyLock::new(dispute::policy);
static CREDIT_LINE_INCREASE: LazyLock<Policy> = LazyLock::new(credit_line::policy);

/// The process-wide policy table for a domain.
pub fn policy_for(domain: Domain) -> &'static Policy {
    match domain {
        Domain::Authorization => &*AUTHORIZATION,
        Domain::Dispute => &*DISPUTE,
        Domain::CreditLineIncrease => &*CREDIT_LINE_INCREASE,
    }
}
