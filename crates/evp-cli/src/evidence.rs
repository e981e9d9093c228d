//! # Evidence Subcommands
//!
//! `submit`, `resume`, `retrieve` and `list`. Handlers parse arguments,
//! build the service and print results; the protocol lives in
//! `evp-protocol`.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use evp_core::ContentId;
use evp_crypto::Passphrase;
use evp_protocol::{ProtocolError, SubmissionRequest};

use crate::backend::{load_key, open_service, Signer};
use crate::config::CliConfig;

pub const DEFAULT_PASSPHRASE_ENV: &str = "EVP_PASSPHRASE";

/// Arguments for `evp submit`.
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Document to encrypt and register.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Environment variable holding the passphrase.
    #[arg(long, default_value = DEFAULT_PASSPHRASE_ENV)]
    pub passphrase_env: String,
}

/// Arguments for `evp resume`.
#[derive(Args, Debug)]
pub struct ResumeArgs {
    /// Content id reported by a submission whose registration failed.
    #[arg(value_name = "CONTENT_ID")]
    pub content_id: String,
}

/// Arguments for `evp retrieve`.
#[derive(Args, Debug)]
pub struct RetrieveArgs {
    /// Evidence id (1-based).
    #[arg(value_name = "ID")]
    pub id: u64,

    /// Output path. Defaults to `evidence_{id}_{cid prefix}.decrypted`.
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Overwrite an existing output file.
    #[arg(long)]
    pub force: bool,

    /// Environment variable holding the passphrase.
    #[arg(long, default_value = DEFAULT_PASSPHRASE_ENV)]
    pub passphrase_env: String,
}

/// Arguments for `evp list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Print records as a JSON array.
    #[arg(long)]
    pub json: bool,
}

/// Read the passphrase from the named environment variable.
pub fn passphrase_from_env(var: &str) -> Result<Passphrase> {
    let value = zeroize::Zeroizing::new(
        std::env::var(var).with_context(|| format!("set {var} to the passphrase"))?,
    );
    Passphrase::new(value.as_str()).with_context(|| format!("{var} is empty"))
}

pub async fn run_submit(args: &SubmitArgs, config: &CliConfig) -> Result<u8> {
    let passphrase = passphrase_from_env(&args.passphrase_env)?;
    let document = std::fs::read(&args.file)
        .with_context(|| format!("failed to read document: {}", args.file.display()))?;

    let mut request = SubmissionRequest::new(document);
    if let Some(name) = args.file.file_name().and_then(|n| n.to_str()) {
        request = request.with_file_name(name);
    }

    let service = open_service(config, Signer::with_key(load_key(&config.key_file)?)).await?;
    let receipt = service
        .submit(request, &passphrase)
        .await
        .map_err(report_orphan)?;

    println!("OK: evidence #{} registered", receipt.evidence_id);
    println!("  Content:   {}", receipt.content_id);
    println!("  Submitter: {}", receipt.submitter);
    Ok(0)
}

pub async fn run_resume(args: &ResumeArgs, config: &CliConfig) -> Result<u8> {
    let content_id = ContentId::new(args.content_id.as_str()).context("invalid content id")?;
    let service = open_service(config, Signer::with_key(load_key(&config.key_file)?)).await?;
    let receipt = service
        .resume_registration(content_id)
        .await
        .map_err(report_orphan)?;

    println!("OK: evidence #{} registered", receipt.evidence_id);
    println!("  Content:   {}", receipt.content_id);
    Ok(0)
}

pub async fn run_retrieve(args: &RetrieveArgs, config: &CliConfig) -> Result<u8> {
    let passphrase = passphrase_from_env(&args.passphrase_env)?;
    let service = open_service(config, Signer::none()).await?;
    let evidence = service.retrieve(args.id, &passphrase).await?;

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| PathBuf::from(evidence.suggested_file_name()));
    write_output(&out, &evidence.plaintext, args.force)?;

    println!("OK: evidence #{} decrypted", evidence.record.id);
    println!("  {}", evidence.record);
    println!("  Written to: {} ({} bytes)", out.display(), evidence.plaintext.len());
    Ok(0)
}

pub async fn run_list(args: &ListArgs, config: &CliConfig) -> Result<u8> {
    let service = open_service(config, Signer::none()).await?;
    let records = service.list().await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&records)?);
    } else if records.is_empty() {
        println!("No evidence submitted yet.");
    } else {
        for record in &records {
            println!("{record}");
        }
    }
    Ok(0)
}

fn write_output(path: &Path, bytes: &[u8], force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "refusing to overwrite {} (use --force or --out)",
            path.display()
        );
    }
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))
}

/// Tell the user how to finish a submission whose content was stored.
fn report_orphan(err: ProtocolError) -> anyhow::Error {
    if let Some(cid) = err.orphaned_content() {
        eprintln!("note: content {cid} is stored but not registered; run `evp resume {cid}`");
    }
    err.into()
}
