use std::path::Path;
use std::process;

use proofgate_eval::{DecisionReport, Mode};

use super::{print_json, read_facts};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_verify(
    domain: &str,
    facts_path: &Path,
    mode: Mode,
    output: OutputFormat,
    quiet: bool,
) {
    let facts = read_facts(facts_path, output, quiet);

    let report = match proofgate_eval::decide(domain, &facts, mode) {
        Ok(r) => r,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    if !quiet {
        match output {
            OutputFormat::Json => print_json(&report),
            OutputFormat::Text => print_text(&report),
        }
    }

    if report.error.is_some() {
        process::exit(1);
    }
}

fn print_text(report: &DecisionReport) {
    let none = "(none)".to_string();
    let list = |items: &[String]| {
        if items.is_empty() {
            none.clone()
        } else {
            items.join(", ")
        }
    };

    println!("decision: {}", report.decision);
    println!("policy: {} ({} mode)", report.policy_version, report.mode);
    println!("satisfiable: {}", report.proof.satisfiable);
    println!("checked: {}", list(&report.proof.checked_invariants));
    println!("unsat core: {}", list(&report.proof.unsat_core));
    if let Some(action) = &report.proof.chosen_action {
        println!("chosen action: {}", action);
    }
    println!("explanation: {}", report.explanation);
    if let Some(j) = &report.justification {
        println!("justification: {}", j);
    }
    if let Some(e) = &report.error {
        println!("error: {}", e);
    } else {
        println!("program digest: {}", report.program_digest);
    }
}
