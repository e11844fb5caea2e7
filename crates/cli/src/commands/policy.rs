use proofgate_eval::policy::policy_for;
use proofgate_eval::program::render_predicate;

use super::{parse_domain, print_json};
use crate::OutputFormat;

pub(crate) fn cmd_policy(domain: &str, output: OutputFormat, quiet: bool) {
    let domain = parse_domain(domain, output, quiet);
    if quiet {
        return;
    }
    let policy = policy_for(domain);

    match output {
        OutputFormat::Json => {
            let facts: Vec<serde_json::Value> = policy
                .facts
                .iter()
                .map(|d| serde_json::json!({ "id": d.id, "sort": d.sort.as_str() }))
                .collect();
            let invariants: Vec<serde_json::Value> = policy
                .invariants
                .iter()
                .map(|i| {
                    serde_json::json!({
                        "name": i.name,
                        "expr": render_predicate(policy, &i.predicate),
                    })
                })
                .collect();
            let actions: Vec<serde_json::Value> = policy
                .actions
                .iter()
                .map(|a| {
                    serde_json::json!({
                        "name": a.name,
                        "guard": render_predicate(policy, &a.guard),
                    })
                })
                .collect();
            print_json(&serde_json::json!({
                "id": policy.id,
                "domain": domain.as_str(),
                "facts": facts,
                "invariants": invariants,
                "actions": actions,
                "fallback": policy.fallback().as_str(),
            }));
        }
        OutputFormat::Text => {
            println!("policy {} ({})", policy.id, domain);
            println!();
            println!("facts:");
            for d in &policy.facts {
                println!("  {:<24} {}", d.id, d.sort.as_str());
            }
            println!("invariants:");
            for i in &policy.invariants {
                println!("  {:<24} {}", i.name, render_predicate(policy, &i.predicate));
            }
            if !policy.actions.is_empty() {
                println!("actions (priority order):");
                for a in &policy.actions {
                    println!("  {:<24} {}", a.name, render_predicate(policy, &a.guard));
                }
            }
            println!("fallback: {}", policy.fallback());
        }
    }
}
