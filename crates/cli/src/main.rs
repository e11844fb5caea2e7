mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Decision mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum ModeArg {
    /// Policy guards pick the action
    Hard,
    /// A rule-based proposer picks the action; the policy checks it
    Soft,
}

impl From<ModeArg> for proofgate_eval::Mode {
    fn from(m: ModeArg) -> Self {
        match m {
            ModeArg::Hard => proofgate_eval::Mode::Hard,
            ModeArg::Soft => proofgate_eval::Mode::Soft,
        }
    }
}

/// Policy-verified decisions for card authorizations, disputes and credit
/// line increases.
#[derive(Parser)]
#[command(
    name = "proofgate",
    version,
    about = "Policy-verified financial decisions with auditable proofs"
)]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide a request and print the decision report
    Verify {
        /// Domain: authorization, dispute or credit_line_increase
        domain: String,
        /// Path to the facts JSON file, or - for stdin
        #[arg(long)]
        facts: PathBuf,
        #[arg(long, default_value = "hard", value_enum)]
        mode: ModeArg,
    },

    /// Print the proof program for a request
    Program {
        /// Domain: authorization, dispute or credit_line_increase
        domain: String,
        /// Path to the facts JSON file, or - for stdin
        #[arg(long)]
        facts: PathBuf,
    },

    /// Check whether replacing one fact changes the decision
    Probe {
        /// Domain: authorization, dispute or credit_line_increase
        domain: String,
        /// Path to the facts JSON file, or - for stdin
        #[arg(long)]
        facts: PathBuf,
        /// Replacement as field=value; value is JSON, or a bare string
        #[arg(long)]
        flip: String,
        #[arg(long, default_value = "hard", value_enum)]
        mode: ModeArg,
    },

    /// List a domain's facts, invariants and actions
    Policy {
        /// Domain: authorization, dispute or credit_line_increase
        domain: String,
    },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Verify {
            domain,
            facts,
            mode,
        } => {
            commands::verify::cmd_verify(&domain, &facts, mode.into(), cli.output, cli.quiet);
        }
        Commands::Program { domain, facts } => {
            commands::program::cmd_program(&domain, &facts, cli.output, cli.quiet);
        }
        Commands::Probe {
            domain,
            facts,
            flip,
            mode,
        } => {
            commands::probe::cmd_probe(&domain, &facts, &flip, mode.into(), cli.output, cli.quiet);
        }
        Commands::Policy { domain } => {
            commands::policy::cmd_policy(&domain, cli.output, cli.quiet);
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable. `RUST_LOG`
/// overrides the default `warn` level.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(env_filter)
        .init();
}

/// Report an error to stderr in the selected output format.
pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}
