//! Runtime value types, fact records, and errors for the proofgate evaluator.
//!
//! Fact records are produced by an upstream extractor and are immutable once
//! assembled. Unknown fields are kept distinct from zero/false all the way
//! down to the predicate evaluator.

pub mod fact;
pub mod values;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

pub use fact::{
    AuthorizationFacts, CreditLineFacts, DisputeFacts, FactDecl, FactRecord, FactSet,
};
pub use values::Value;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors that can occur while assembling facts or evaluating predicates.
///
/// Inside `verify` every variant raised by a predicate is recovered locally
/// and coerced to `false`; only assembly and `decide` surface them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// The requested domain is not one of the three policy domains.
    #[error("unknown domain: {name}")]
    UnknownDomain { name: String },
    /// A referenced fact is unknown (absent or null).
    #[error("unknown fact: {fact_id}")]
    UnknownFact { fact_id: String },
    /// A fact value does not match its declared type.
    #[error("type mismatch for fact '{fact_id}': expected {expected}, got {got}")]
    TypeMismatch {
        fact_id: String,
        expected: String,
        got: String,
    },
    /// Type error during predicate evaluation.
    #[error("type error: {message}")]
    TypeError { message: String },
    /// Numeric overflow during arithmetic.
    #[error("numeric overflow: {message}")]
    Overflow { message: String },
    /// Malformed input document.
    #[error("deserialization error: {message}")]
    DeserializeError { message: String },
    /// A field name that the domain's fact record does not declare.
    #[error("domain '{domain}' has no fact named '{field}'")]
    UnknownField { domain: String, field: String },
    /// The proof program could not be rendered.
    #[error("proof program: {0}")]
    Program(#[from] crate::program::ProgramError),
}

// ──────────────────────────────────────────────
// Domains and decisions
// ──────────────────────────────────────────────

/// The three policy domains. Each is a leaf with its own fact schema,
/// invariant set and decision rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Authorization,
    Dispute,
    CreditLineIncrease,
}

impl Domain {
    pub const ALL: [Domain; 3] = [
        Domain::Authorization,
        Domain::Dispute,
        Domain::CreditLineIncrease,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Authorization => "authorization",
            Domain::Dispute => "dispute",
            Domain::CreditLineIncrease => "credit_line_increase",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = EvalError;

    /// Accepts the canonical names plus the short forms `auth` and `cli`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "authorization" | "auth" => Ok(Domain::Authorization),
            "dispute" => Ok(Domain::Dispute),
            "credit_line_increase" | "credit-line-increase" | "cli" => {
                Ok(Domain::CreditLineIncrease)
            }
            _ => Err(EvalError::UnknownDomain {
                name: s.to_string(),
            }),
        }
    }
}

/// Final outcome handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Decision {
    #[serde(rename = "approve_no_otp")]
    ApproveNoOtp,
    #[serde(rename = "approve_with_otp")]
    ApproveWithOtp,
    #[serde(rename = "approve")]
    Approve,
    #[serde(rename = "decline")]
    Decline,
    /// Route to dispute reason code 4834 (duplicate processing).
    #[serde(rename = "rc_4834")]
    Rc4834,
    #[serde(rename = "request_more_docs")]
    RequestMoreDocs,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::ApproveNoOtp => "approve_no_otp",
            Decision::ApproveWithOtp => "approve_with_otp",
            Decision::Approve => "approve",
            Decision::Decline => "decline",
            Decision::Rc4834 => "rc_4834",
            Decision::RequestMoreDocs => "request_more_docs",
        }
    }

    /// Map an action name from a guard list onto a decision.
    pub fn from_action(name: &str) -> Option<Decision> {
        match name {
            "approve_no_otp" => Some(Decision::ApproveNoOtp),
            "approve_with_otp" => Some(Decision::ApproveWithOtp),
            "approve" => Some(Decision::Approve),
            "decline" => Some(Decision::Decline),
            "rc_4834" => Some(Decision::Rc4834),
            "request_more_docs" => Some(Decision::RequestMoreDocs),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ──────────────────────────────────────────────
// Sorts
// ──────────────────────────────────────────────

/// Primitive type tag of a declared fact, as written in the proof program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sort {
    Real,
    Int,
    Bool,
}

impl Sort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sort::Real => "Real",
            Sort::Int => "Int",
            Sort::Bool => "Bool",
        }
    }
}
