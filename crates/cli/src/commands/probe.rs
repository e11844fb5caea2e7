use std::path::Path;
use std::process;

use proofgate_eval::Mode;

use super::{parse_domain, print_json, read_facts};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_probe(
    domain: &str,
    facts_path: &Path,
    flip: &str,
    mode: Mode,
    output: OutputFormat,
    quiet: bool,
) {
    let domain = parse_domain(domain, output, quiet);
    let (field, value) = match parse_flip(flip) {
        Some(pair) => pair,
        None => {
            let msg = format!("error: --flip must be field=value, got '{}'", flip);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    };
    let facts = read_facts(facts_path, output, quiet);

    let unchanged = proofgate_eval::assemble_facts(domain, &facts).and_then(|record| {
        proofgate_eval::counterfactual_unchanged(&record, field, value.clone(), mode)
    });
    let unchanged = match unchanged {
        Ok(u) => u,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => {
            let verdict = if unchanged { "unchanged" } else { "changed" };
            println!("{}={}: decision {}", field, value, verdict);
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "domain": domain.as_str(),
            "field": field,
            "value": value,
            "unchanged": unchanged,
        })),
    }
}

/// Split `field=value`. The value is parsed as JSON, falling back to a
/// plain string so `claim_date=2025-09-15` works unquoted.
fn parse_flip(flip: &str) -> Option<(&str, serde_json::Value)> {
    let (field, raw) = flip.split_once('=')?;
    let field = field.trim();
    if field.is_empty() {
        return None;
    }
    let value = serde_json::from_str(raw.trim())
        .unwrap_or_else(|_| serde_json::Value::String(raw.trim().to_string()));
    Some((field, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flip_values() {
        assert_eq!(parse_flip("card_not_present=true"), Some(("card_not_present", json!(true))));
        assert_eq!(parse_flip("amount = 12.5"), Some(("amount", json!(12.5))));
        assert_eq!(
            parse_flip("claim_date=2025-09-15"),
            Some(("claim_date", json!("2025-09-15")))
        );
        assert_eq!(parse_flip("income=null"), Some(("income", json!(null))));
    }

    #[test]
    fn flip_needs_field() {
        assert_eq!(parse_flip("true"), None);
        assert_eq!(parse_flip("=1"), None);
    }
}
