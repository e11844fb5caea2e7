use std::path::Path;
use std::process;

use super::{parse_domain, print_json, read_facts};
use crate::{report_error, OutputFormat};

pub(crate) fn cmd_program(domain: &str, facts_path: &Path, output: OutputFormat, quiet: bool) {
    let domain = parse_domain(domain, output, quiet);
    let facts = read_facts(facts_path, output, quiet);

    let record = match proofgate_eval::assemble_facts(domain, &facts) {
        Ok(r) => r,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    let program = match proofgate_eval::build_program(&record) {
        Ok(p) => p,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    };

    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => print!("{}", program),
        OutputFormat::Json => print_json(&serde_json::json!({
            "domain": domain.as_str(),
            "program": program,
        })),
    }
}
