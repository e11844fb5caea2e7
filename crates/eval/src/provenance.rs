//! Provenance for invariant and guard outcomes.
//!
//! Each evaluated predicate carries a record of which facts were read and,
//! when evaluation faulted, why it was coerced to `false`.

use serde::Serialize;

/// Outcome of one named predicate (invariant or guard).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredicateOutcome {
    /// Invariant or action name.
    pub name: String,
    /// Final boolean result after fault coercion.
    pub holds: bool,
    /// Fact ids read during evaluation, in first-access order.
    pub facts_used: Vec<String>,
    /// Evaluation fault message, if the result was coerced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fault: Option<String>,
}

/// Collector that tracks fact references during predicate evaluation.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceCollector {
    pub facts_used: Vec<String>,
}

impl ProvenanceCollector {
    pub fn new() -> Self {
        ProvenanceCollector {
            facts_used: Vec::new(),
        }
    }

    /// Record a fact reference access.
    pub fn record_fact(&mut self, fact_id: &str) {
        if !self.facts_used.iter().any(|f| f == fact_id) {
            self.facts_used.push(fact_id.to_string());
        }
    }

    /// Finalize into an outcome.
    pub fn into_outcome(self, name: &str, holds: bool, fault: Option<String>) -> PredicateOutcome {
        PredicateOutcome {
            name: name.to_string(),
            holds,
            facts_used: self.facts_used,
            fault,
        }
    }
}
