//! # evp CLI entry point
//!
//! Parses arguments, installs logging, loads configuration and dispatches.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use evp_cli::evidence::{
    run_list, run_retrieve, run_resume, run_submit, ListArgs, ResumeArgs, RetrieveArgs, SubmitArgs,
};
use evp_cli::journal::{run_verify_journal, VerifyJournalArgs};
use evp_cli::keygen::{run_keygen, KeygenArgs};
use evp_cli::CliConfig;

/// Evidence protection: encrypt documents, store them by content address
/// and register them on an append-only ledger.
#[derive(Parser, Debug)]
#[command(name = "evp", version, about, long_about = None)]
struct Cli {
    /// Verbose output. Repeat for more (-v, -vv). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to configuration file (default: ./evp.yaml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate an Ed25519 signing key.
    Keygen(KeygenArgs),

    /// Encrypt, store and register a document.
    Submit(SubmitArgs),

    /// Register already-stored content after a failed submission.
    Resume(ResumeArgs),

    /// Fetch and decrypt evidence by id.
    Retrieve(RetrieveArgs),

    /// List all evidence records.
    List(ListArgs),

    /// Verify a ledger journal's hash chain.
    VerifyJournal(VerifyJournalArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let config = match CliConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };

    let result = match &cli.command {
        Commands::Keygen(args) => run_keygen(args, &config.key_file),
        Commands::Submit(args) => run_submit(args, &config).await,
        Commands::Resume(args) => run_resume(args, &config).await,
        Commands::Retrieve(args) => run_retrieve(args, &config).await,
        Commands::List(args) => run_list(args, &config).await,
        Commands::VerifyJournal(args) => run_verify_journal(args, &config).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
