//! # CLI Configuration
//!
//! Loaded from a YAML file (`--config`, else `evp.yaml` in the working
//! directory if present, else built-in defaults). Relative paths in the file
//! resolve against the file's directory. Pinata credentials never live in
//! the file; they come from `EVP_PINATA_*` environment variables.
//!
//! ```yaml
//! store:
//!   backend: fs          # or: pinata
//!   path: ./evp-store
//! journal: ./evp-ledger.jsonl
//! key_file: ./evp-signing.key
//! kdf: interactive       # or: sensitive
//! timeouts:
//!   store_secs: 60
//!   ledger_secs: 30
//!   max_retries: 3
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use evp_crypto::{CipherCodec, KdfParams};
use evp_protocol::{ProtocolConfig, RetryPolicy};

pub const DEFAULT_CONFIG_FILE: &str = "evp.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CliConfig {
    #[serde(default)]
    pub store: StoreBackend,
    #[serde(default = "default_journal")]
    pub journal: PathBuf,
    #[serde(default = "default_key_file")]
    pub key_file: PathBuf,
    #[serde(default)]
    pub kdf: KdfProfile,
    #[serde(default)]
    pub timeouts: Timeouts,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreBackend {
    /// Filesystem content store rooted at `path`.
    Fs {
        #[serde(default = "default_store_dir")]
        path: PathBuf,
    },
    /// Pinata IPFS pinning service, configured from the environment.
    Pinata,
}

impl Default for StoreBackend {
    fn default() -> Self {
        Self::Fs {
            path: default_store_dir(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KdfProfile {
    #[default]
    Interactive,
    Sensitive,
}

impl KdfProfile {
    pub fn params(self) -> KdfParams {
        match self {
            Self::Interactive => KdfParams::interactive(),
            Self::Sensitive => KdfParams::sensitive(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Timeouts {
    pub store_secs: u64,
    pub ledger_secs: u64,
    pub max_retries: u32,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            store_secs: 60,
            ledger_secs: 30,
            max_retries: 3,
        }
    }
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("evp-store")
}

fn default_journal() -> PathBuf {
    PathBuf::from("evp-ledger.jsonl")
}

fn default_key_file() -> PathBuf {
    PathBuf::from("evp-signing.key")
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::default(),
            journal: default_journal(),
            key_file: default_key_file(),
            kdf: KdfProfile::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl CliConfig {
    /// Load the configuration. An explicit path must exist; the default
    /// `evp.yaml` is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("invalid config file: {}", path.display()))?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        tracing::debug!(config = %path.display(), "loaded configuration");
        Ok(config.relative_to(base))
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document is a valid "all defaults" file.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// Resolve relative paths against `base`.
    pub fn relative_to(mut self, base: &Path) -> Self {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        resolve(&mut self.journal);
        resolve(&mut self.key_file);
        if let StoreBackend::Fs { path } = &mut self.store {
            resolve(path);
        }
        self
    }

    pub fn protocol(&self) -> ProtocolConfig {
        ProtocolConfig {
            store_timeout: Duration::from_secs(self.timeouts.store_secs),
            ledger_timeout: Duration::from_secs(self.timeouts.ledger_secs),
            retry: RetryPolicy {
                max_retries: self.timeouts.max_retries,
                ..RetryPolicy::default()
            },
        }
    }

    pub fn codec(&self) -> Result<CipherCodec> {
        CipherCodec::new(self.kdf.params()).context("invalid KDF profile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(CliConfig::from_yaml("").unwrap(), CliConfig::default());
    }

    #[test]
    fn parses_full_file() {
        let cfg = CliConfig::from_yaml(
            "store:\n  backend: fs\n  path: /var/evp/blobs\njournal: /var/evp/ledger.jsonl\n\
             key_file: me.key\nkdf: sensitive\ntimeouts:\n  ledger_secs: 5\n",
        )
        .unwrap();
        assert_eq!(
            cfg.store,
            StoreBackend::Fs {
                path: PathBuf::from("/var/evp/blobs")
            }
        );
        assert_eq!(cfg.kdf, KdfProfile::Sensitive);
        assert_eq!(cfg.timeouts.ledger_secs, 5);
        assert_eq!(cfg.timeouts.store_secs, 60);
        assert_eq!(cfg.protocol().ledger_timeout, Duration::from_secs(5));
    }

    #[test]
    fn pinata_backend_has_no_fields() {
        let cfg = CliConfig::from_yaml("store:\n  backend: pinata\n").unwrap();
        assert_eq!(cfg.store, StoreBackend::Pinata);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(CliConfig::from_yaml("jurnal: typo.jsonl\n").is_err());
        assert!(CliConfig::from_yaml("store:\n  backend: s3\n").is_err());
    }

    #[test]
    fn relative_paths_follow_the_config_file() {
        let cfg = CliConfig::from_yaml("key_file: keys/me.key\njournal: /abs/ledger.jsonl\n")
            .unwrap()
            .relative_to(Path::new("/etc/evp"));
        assert_eq!(cfg.key_file, PathBuf::from("/etc/evp/keys/me.key"));
        assert_eq!(cfg.journal, PathBuf::from("/abs/ledger.jsonl"));
        assert_eq!(
            cfg.store,
            StoreBackend::Fs {
                path: PathBuf::from("/etc/evp/evp-store")
            }
        );
    }

    #[test]
    fn retry_count_flows_into_protocol_config() {
        let mut cfg = CliConfig::default();
        cfg.timeouts.max_retries = 0;
        assert_eq!(cfg.protocol().retry.max_retries, 0);
        assert_eq!(cfg.protocol().retry.base_delay, RetryPolicy::default().base_delay);
    }
}
