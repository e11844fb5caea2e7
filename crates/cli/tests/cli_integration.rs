//! CLI integration tests for all subcommands.
//!
//! Uses `assert_cmd` to spawn the `proofgate` binary and verify
//! exit codes, stdout content, and stderr content.
//!
//! All tests set `current_dir` to the workspace root so that relative
//! paths to `fixtures/` resolve correctly.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Locate the workspace root by walking up from CARGO_MANIFEST_DIR.
fn workspace_root() -> PathBuf {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    // crates/cli -> workspace root is two levels up
    manifest_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root")
        .to_path_buf()
}

/// Helper: create a Command for the `proofgate` binary, rooted at workspace.
fn proofgate() -> Command {
    let mut cmd = cargo_bin_cmd!("proofgate");
    cmd.current_dir(workspace_root());
    cmd
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.output().expect("run proofgate");
    serde_json::from_slice(&out.stdout).expect("stdout is JSON")
}

// ──────────────────────────────────────────────
// 1. Help and version
// ──────────────────────────────────────────────

#[test]
fn help_exits_0_with_description() {
    proofgate()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Policy-verified financial decisions",
        ));
}

#[test]
fn version_exits_0() {
    proofgate()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("proofgate"));
}

// ──────────────────────────────────────────────
// 2. Verify subcommand
// ──────────────────────────────────────────────

#[test]
fn verify_low_risk_text() {
    proofgate()
        .args(["verify", "authorization", "--facts", "fixtures/auth_low_risk.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("decision: approve_no_otp"))
        .stdout(predicate::str::contains("unsat core: (none)"))
        .stdout(predicate::str::contains("policy: auth_v1 (hard mode)"));
}

#[test]
fn verify_borderline_json() {
    let v = json_stdout(proofgate().args([
        "--output",
        "json",
        "verify",
        "auth",
        "--facts",
        "fixtures/auth_borderline_cnp.json",
    ]));
    assert_eq!(v["decision"], "approve_with_otp");
    assert_eq!(v["proof"]["satisfiable"], true);
    assert_eq!(v["proof"]["chosen_action"], "approve_with_otp");
    assert_eq!(v["proof"]["checked_invariants"].as_array().unwrap().len(), 5);
    assert_eq!(v["program_digest"].as_str().unwrap().len(), 64);
}

#[test]
fn verify_blocked_mcc_reports_core() {
    let v = json_stdout(proofgate().args([
        "--output",
        "json",
        "verify",
        "authorization",
        "--facts",
        "fixtures/auth_blocked_mcc.json",
    ]));
    assert_eq!(v["decision"], "decline");
    assert_eq!(v["proof"]["unsat_core"], serde_json::json!(["mcc_allowed"]));
    assert_eq!(v["proof"]["model"], serde_json::json!({}));
}

#[test]
fn verify_dispute_scenarios() {
    proofgate()
        .args(["verify", "dispute", "--facts", "fixtures/dispute_duplicate.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("decision: rc_4834"));
    proofgate()
        .args(["verify", "dispute", "--facts", "fixtures/dispute_late.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("decision: request_more_docs"))
        .stdout(predicate::str::contains("unsat core: refund_window"))
        .stdout(predicate::str::contains("outside allowed window"));
}

#[test]
fn verify_credit_line_over_ratio() {
    proofgate()
        .args([
            "verify",
            "credit_line_increase",
            "--facts",
            "fixtures/cli_over_ratio.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("decision: decline"))
        .stdout(predicate::str::contains("within_income_ratio"));
}

#[test]
fn verify_soft_mode_shows_justification() {
    proofgate()
        .args([
            "verify",
            "authorization",
            "--facts",
            "fixtures/auth_borderline_cnp.json",
            "--mode",
            "soft",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("(soft mode)"))
        .stdout(predicate::str::contains(
            "justification: Borderline risk; within limit; step-up auth.",
        ));
}

#[test]
fn verify_reads_stdin() {
    proofgate()
        .args(["verify", "dispute", "--facts", "-"])
        .write_stdin(r#"{"duplicate_charge": true, "days_since_transaction": 7}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains("decision: rc_4834"));
}

#[test]
fn verify_unknown_domain_exits_1_with_report() {
    let out = proofgate()
        .args([
            "--output",
            "json",
            "verify",
            "mortgage",
            "--facts",
            "fixtures/auth_low_risk.json",
        ])
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let v: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(v["decision"], "decline");
    assert_eq!(v["proof"]["satisfiable"], false);
    assert_eq!(v["proof"]["checked_invariants"], serde_json::json!([]));
    assert_eq!(v["error"], "unknown domain: mortgage");
}

#[test]
fn verify_mistyped_facts_exits_1() {
    proofgate()
        .args(["verify", "authorization", "--facts", "fixtures/auth_mistyped.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("velocity_1h"));
}

#[test]
fn verify_missing_file_exits_1() {
    proofgate()
        .args(["verify", "dispute", "--facts", "fixtures/nope.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot read facts file fixtures/nope.json"));
}

#[test]
fn verify_directory_as_facts_reports_io_error() {
    let dir = TempDir::new().unwrap();
    let out = proofgate()
        .args(["verify", "dispute", "--facts"])
        .arg(dir.path())
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("cannot read facts file"), "{}", stderr);
    // The underlying io error follows the path.
    let detail = stderr
        .split_once(&format!("{}: ", dir.path().display()))
        .map(|(_, rest)| rest.trim())
        .unwrap_or("");
    assert!(!detail.is_empty(), "{}", stderr);
    assert!(!stderr.contains("not found"), "{}", stderr);
}

#[test]
fn verify_invalid_json_exits_1_json_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();
    proofgate()
        .args(["--output", "json", "verify", "dispute", "--facts"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("\"error\""));
}

#[test]
fn quiet_suppresses_output() {
    proofgate()
        .args([
            "--quiet",
            "verify",
            "authorization",
            "--facts",
            "fixtures/auth_low_risk.json",
        ])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

// ──────────────────────────────────────────────
// 3. Program subcommand
// ──────────────────────────────────────────────

#[test]
fn program_prints_named_assertions() {
    proofgate()
        .args(["program", "authorization", "--facts", "fixtures/auth_low_risk.json"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with(
            "; proofgate program auth_v1 (authorization)",
        ))
        .stdout(predicate::str::contains("(assert (= risk_score 0.3))"))
        .stdout(predicate::str::contains(":named mcc_allowed))"))
        .stdout(predicate::str::contains(":named approve_no_otp))"));
}

#[test]
fn program_is_reproducible() {
    let run = || {
        proofgate()
            .args(["program", "dispute", "--facts", "fixtures/dispute_late.json"])
            .output()
            .unwrap()
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn program_unknown_domain_exits_1() {
    proofgate()
        .args(["program", "mortgage", "--facts", "fixtures/auth_low_risk.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown domain"));
}

// ──────────────────────────────────────────────
// 4. Probe subcommand
// ──────────────────────────────────────────────

#[test]
fn probe_irrelevant_flip() {
    proofgate()
        .args([
            "probe",
            "authorization",
            "--facts",
            "fixtures/auth_low_risk.json",
            "--flip",
            "card_not_present=true",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("decision unchanged"));
}

#[test]
fn probe_relevant_flip_json() {
    let v = json_stdout(proofgate().args([
        "--output",
        "json",
        "probe",
        "authorization",
        "--facts",
        "fixtures/auth_low_risk.json",
        "--flip",
        "merchant_category_code=7995",
    ]));
    assert_eq!(v["unchanged"], false);
    assert_eq!(v["field"], "merchant_category_code");
}

#[test]
fn probe_unknown_field_exits_1() {
    proofgate()
        .args([
            "probe",
            "authorization",
            "--facts",
            "fixtures/auth_low_risk.json",
            "--flip",
            "income=1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no fact named 'income'"));
}

// ──────────────────────────────────────────────
// 5. Policy subcommand
// ──────────────────────────────────────────────

#[test]
fn policy_lists_invariants_in_order() {
    let out = proofgate()
        .args(["policy", "authorization"])
        .output()
        .unwrap();
    assert!(out.status.success());
    let text = String::from_utf8(out.stdout).unwrap();
    let pos = |needle: &str| text.find(needle).unwrap_or_else(|| panic!("{} missing", needle));
    assert!(pos("limit_ok") < pos("risk_ceiling"));
    assert!(pos("velocity_cap") < pos("mcc_allowed"));
    assert!(pos("approve_no_otp") < pos("approve_with_otp"));
    assert!(text.contains("(<= amount credit_limit)"));
}

#[test]
fn policy_json() {
    let v = json_stdout(proofgate().args(["--output", "json", "policy", "cli"]));
    assert_eq!(v["id"], "cli_v1");
    assert_eq!(v["fallback"], "decline");
    assert_eq!(v["invariants"][2]["name"], "within_income_ratio");
    assert_eq!(
        v["invariants"][2]["expr"],
        "(=> (and known.amount_requested known.income) (<= amount_requested (* income 0.3)))"
    );
    assert_eq!(v["actions"], serde_json::json!([]));
}
