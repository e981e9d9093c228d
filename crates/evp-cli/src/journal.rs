//! # Verify-Journal Subcommand
//!
//! Replays a ledger journal offline and checks its hash chain.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use evp_ledger::{JournalLedger, LedgerError};

use crate::config::CliConfig;

/// Arguments for `evp verify-journal`.
#[derive(Args, Debug)]
pub struct VerifyJournalArgs {
    /// Journal to check. Defaults to `journal` from the configuration.
    #[arg(value_name = "JOURNAL")]
    pub path: Option<PathBuf>,
}

pub async fn run_verify_journal(args: &VerifyJournalArgs, config: &CliConfig) -> Result<u8> {
    let path = args.path.as_ref().unwrap_or(&config.journal);

    match JournalLedger::verify(path).await {
        Ok(summary) => {
            println!("OK: journal {} verified", path.display());
            println!("  Ledger:  {}", summary.ledger_id);
            println!("  Records: {}", summary.count);
            println!("  Head:    {}", summary.head_digest);
            if summary.torn_tail_bytes > 0 {
                println!(
                    "  Torn tail: {} bytes (an interrupted append; dropped on next open)",
                    summary.torn_tail_bytes
                );
            }
            Ok(0)
        }
        Err(LedgerError::Tampered { line, reason }) => {
            println!("FAIL: journal {} is tampered at line {line}: {reason}", path.display());
            Ok(2)
        }
        Err(e) => Err(e.into()),
    }
}
