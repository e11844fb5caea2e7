pub(crate) mod policy;
pub(crate) mod probe;
pub(crate) mod program;
pub(crate) mod verify;

use std::io::Read;
use std::path::Path;
use std::process;

use proofgate_eval::Domain;

use crate::{report_error, OutputFormat};

/// Read and parse a facts JSON document from a path, or stdin for `-`.
/// Exits with status 1 on failure.
pub(crate) fn read_facts(path: &Path, output: OutputFormat, quiet: bool) -> serde_json::Value {
    tracing::debug!(path = %path.display(), "reading facts");
    let text = if path == Path::new("-") {
        let mut buf = String::new();
        match std::io::stdin().read_to_string(&mut buf) {
            Ok(_) => buf,
            Err(e) => {
                report_error(&format!("error: cannot read stdin: {}", e), output, quiet);
                process::exit(1);
            }
        }
    } else {
        match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                let msg = format!("error: cannot read facts file {}: {}", path.display(), e);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        }
    };

    match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("error: invalid JSON in {}: {}", path.display(), e);
            report_error(&msg, output, quiet);
            process::exit(1);
        }
    }
}

/// Parse a domain name. Exits with status 1 when it is not a known domain.
pub(crate) fn parse_domain(name: &str, output: OutputFormat, quiet: bool) -> Domain {
    match name.parse::<Domain>() {
        Ok(d) => d,
        Err(e) => {
            report_error(&format!("error: {}", e), output, quiet);
            process::exit(1);
        }
    }
}

/// Pretty-print a serializable value to stdout.
pub(crate) fn print_json<T: serde::Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value)
            .unwrap_or_else(|e| format!("serialization error: {}", e))
    );
}
