//! # Keygen Subcommand
//!
//! Generates the Ed25519 signing key that authorizes ledger appends. The
//! seed is written hex-encoded; the public key and submitter identity are
//! printed.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;

use evp_crypto::Ed25519KeyPair;

/// Arguments for `evp keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Where to write the key. Defaults to `key_file` from the configuration.
    #[arg(long, short)]
    pub out: Option<PathBuf>,

    /// Overwrite an existing key file.
    #[arg(long)]
    pub force: bool,
}

pub fn run_keygen(args: &KeygenArgs, default_path: &Path) -> Result<u8> {
    let path = args.out.as_deref().unwrap_or(default_path);
    if path.exists() && !args.force {
        bail!(
            "refusing to overwrite existing key file {} (use --force)",
            path.display()
        );
    }

    let key = Ed25519KeyPair::generate();
    write_secret(path, key.seed_hex().as_bytes())?;
    tracing::info!(path = %path.display(), "signing key written");

    println!("OK: generated Ed25519 signing key");
    println!("  Key file:   {}", path.display());
    println!("  Public key: {}", key.public_key().to_hex());
    println!("  Submitter:  {}", key.submitter_id());
    Ok(0)
}

fn write_secret(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory: {}", parent.display()))?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options
        .open(path)
        .with_context(|| format!("failed to create key file: {}", path.display()))?;
    file.write_all(contents)
        .and_then(|()| file.sync_all())
        .with_context(|| format!("failed to write key file: {}", path.display()))
}
