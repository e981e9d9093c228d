//! # Hash-Chained Journal Ledger
//!
//! A file-backed ledger. The journal is JSON lines: a header naming the
//! ledger instance, then one entry per record.
//!
//! ```text
//! {"format":"evp-journal/1","ledger_id":"evp-journal-…","created_at":1700000000}
//! {"record":{…},"authorization":{…},"prev_digest":"sha256:…","entry_digest":"sha256:…"}
//! ```
//!
//! ## Integrity Model
//!
//! 1. The genesis `prev_digest` is the SHA-256 of the canonical header.
//! 2. `entry_digest` is the SHA-256 of the canonical
//!    `{authorization, prev_digest, record}`.
//! 3. Each entry's `prev_digest` equals the previous `entry_digest`.
//! 4. Every entry keeps the signed authorization, so provenance can be
//!    re-verified from the journal alone.
//!
//! Replay checks all four plus dense ids and nonce uniqueness. Any mismatch
//! is [`LedgerError::Tampered`].
//!
//! ## Commit
//!
//! An append is one `write` of a full line followed by `fsync`; the id is
//! returned only after both succeed. The write and the in-memory chain
//! update run in a spawned task that holds the state lock, so dropping an
//! `append` future (a caller's timeout) cannot separate the two. A final
//! line without its newline was never acknowledged and is truncated on open.
//!
//! Only an empty or missing file, or a torn header, is initialized as a new
//! journal. Any other file without a complete line is refused.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use evp_core::{sha256_digest, CanonicalBytes, EvidenceId, EvidenceRecord, SubmitterId, Timestamp};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::authorization::{AppendAuthorization, AppendNonce};
use crate::clock::{Clock, SystemClock};
use crate::error::LedgerError;
use crate::ledger::EvidenceLedger;

const JOURNAL_FORMAT: &str = "evp-journal/1";

/// How every header line written by [`JournalLedger`] begins.
const HEADER_PREFIX: &[u8] = br#"{"format":"evp-journal/1""#;

/// Whether `bytes` could be an interrupted write of a header line.
fn is_torn_header(bytes: &[u8]) -> bool {
    if bytes.len() <= HEADER_PREFIX.len() {
        HEADER_PREFIX.starts_with(bytes)
    } else {
        bytes.starts_with(HEADER_PREFIX)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JournalHeader {
    format: String,
    ledger_id: String,
    created_at: Timestamp,
}

#[derive(Serialize)]
struct EntryBody<'a> {
    record: &'a EvidenceRecord,
    authorization: &'a AppendAuthorization,
    prev_digest: &'a str,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct JournalEntry {
    record: EvidenceRecord,
    authorization: AppendAuthorization,
    prev_digest: String,
    entry_digest: String,
}

impl JournalEntry {
    fn seal(
        record: EvidenceRecord,
        authorization: AppendAuthorization,
        prev_digest: String,
    ) -> Result<Self, LedgerError> {
        let entry_digest = entry_digest(&record, &authorization, &prev_digest)?;
        Ok(Self {
            record,
            authorization,
            prev_digest,
            entry_digest,
        })
    }
}

fn entry_digest(
    record: &EvidenceRecord,
    authorization: &AppendAuthorization,
    prev_digest: &str,
) -> Result<String, LedgerError> {
    let body = CanonicalBytes::new(&EntryBody {
        record,
        authorization,
        prev_digest,
    })?;
    Ok(sha256_digest(&body).to_prefixed())
}

fn genesis_digest(header: &JournalHeader) -> Result<String, LedgerError> {
    Ok(sha256_digest(&CanonicalBytes::new(header)?).to_prefixed())
}

/// Result of replaying a journal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalSummary {
    pub ledger_id: String,
    pub count: u64,
    /// `entry_digest` of the last record, or the genesis digest if empty.
    pub head_digest: String,
    /// Bytes after the last newline (an unacknowledged, torn append).
    pub torn_tail_bytes: usize,
}

struct Replay {
    header: JournalHeader,
    records: Vec<EvidenceRecord>,
    nonces: HashSet<AppendNonce>,
    head: String,
    valid_len: usize,
}

impl Replay {
    fn summary(&self, total_len: usize) -> JournalSummary {
        JournalSummary {
            ledger_id: self.header.ledger_id.clone(),
            count: self.records.len() as u64,
            head_digest: self.head.clone(),
            torn_tail_bytes: total_len - self.valid_len,
        }
    }
}

fn tampered(line: usize, reason: impl Into<String>) -> LedgerError {
    LedgerError::Tampered {
        line,
        reason: reason.into(),
    }
}

fn replay(bytes: &[u8]) -> Result<Replay, LedgerError> {
    let valid_len = bytes
        .iter()
        .rposition(|b| *b == b'\n')
        .map(|i| i + 1)
        .ok_or_else(|| tampered(1, "missing journal header"))?;
    let mut lines = bytes[..valid_len - 1].split(|b| *b == b'\n');

    let header: JournalHeader = lines
        .next()
        .and_then(|l| serde_json::from_slice(l).ok())
        .ok_or_else(|| tampered(1, "unreadable journal header"))?;
    if header.format != JOURNAL_FORMAT {
        return Err(tampered(1, format!("unknown format {:?}", header.format)));
    }

    let mut records: Vec<EvidenceRecord> = Vec::new();
    let mut nonces = HashSet::new();
    let mut head = genesis_digest(&header)?;

    for (i, raw) in lines.enumerate() {
        let line = i + 2;
        let entry: JournalEntry = serde_json::from_slice(raw)
            .map_err(|e| tampered(line, format!("unreadable entry: {e}")))?;

        if entry.prev_digest != head {
            return Err(tampered(line, "prev_digest does not match chain head"));
        }
        let recomputed = entry_digest(&entry.record, &entry.authorization, &entry.prev_digest)?;
        if recomputed != entry.entry_digest {
            return Err(tampered(line, "entry_digest does not match entry contents"));
        }
        let expected_id = EvidenceId::after_count(records.len() as u64);
        if entry.record.id != expected_id {
            return Err(tampered(
                line,
                format!("expected id {expected_id}, found {}", entry.record.id),
            ));
        }
        if entry.authorization.content_id != entry.record.content_id {
            return Err(tampered(line, "authorization is for a different content id"));
        }
        let submitter = entry
            .authorization
            .verify(&header.ledger_id)
            .map_err(|e| tampered(line, e.to_string()))?;
        if submitter != entry.record.submitter {
            return Err(tampered(line, "submitter does not match authorization key"));
        }
        if !nonces.insert(entry.authorization.nonce) {
            return Err(tampered(line, "authorization nonce reused"));
        }

        head = entry.entry_digest;
        records.push(entry.record);
    }

    Ok(Replay {
        header,
        records,
        nonces,
        head,
        valid_len,
    })
}

struct JournalState {
    file: tokio::fs::File,
    len: u64,
    records: Vec<EvidenceRecord>,
    nonces: HashSet<AppendNonce>,
    head: String,
}

impl JournalState {
    /// Write one entry, sync it, then advance the chain. On a failed write
    /// the file is cut back to the last acknowledged length.
    async fn commit(
        &mut self,
        authorization: AppendAuthorization,
        submitter: SubmitterId,
        submitted_at: Timestamp,
    ) -> Result<EvidenceId, LedgerError> {
        let nonce = authorization.nonce;
        if self.nonces.contains(&nonce) {
            return Err(LedgerError::NonceReused(nonce.to_hex()));
        }

        let id = EvidenceId::after_count(self.records.len() as u64);
        let record = EvidenceRecord {
            id,
            content_id: authorization.content_id.clone(),
            submitted_at,
            submitter,
        };
        let entry = JournalEntry::seal(record, authorization, self.head.clone())?;
        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        let written = async {
            self.file.write_all(&line).await?;
            self.file.flush().await?;
            self.file.sync_data().await
        }
        .await;
        if let Err(e) = written {
            if let Err(rollback) = self.file.set_len(self.len).await {
                tracing::warn!(error = %rollback, "failed to roll back partial journal write");
            }
            return Err(e.into());
        }

        self.len += line.len() as u64;
        self.head = entry.entry_digest;
        self.nonces.insert(nonce);
        self.records.push(entry.record);
        Ok(id)
    }
}

/// File-backed, hash-chained ledger.
pub struct JournalLedger<C = SystemClock> {
    path: PathBuf,
    ledger_id: String,
    clock: Arc<C>,
    state: Arc<Mutex<JournalState>>,
}

impl<C> std::fmt::Debug for JournalLedger<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalLedger")
            .field("path", &self.path)
            .field("ledger_id", &self.ledger_id)
            .finish()
    }
}

impl JournalLedger<SystemClock> {
    /// Open the journal at `path`, creating it if absent.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        Self::open_with_clock(path, SystemClock).await
    }
}

impl<C: Clock> JournalLedger<C> {
    pub async fn open_with_clock(path: impl Into<PathBuf>, clock: C) -> Result<Self, LedgerError> {
        let path = path.into();
        let existing = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };

        if existing.is_empty() {
            return Self::initialize(path, clock).await;
        }
        if !existing.contains(&b'\n') {
            if !is_torn_header(&existing) {
                return Err(tampered(1, "not an evidence journal: no header line"));
            }
            tracing::warn!(path = %path.display(), "replacing torn journal header");
            return Self::initialize(path, clock).await;
        }

        let replay = replay(&existing)?;
        if replay.valid_len < existing.len() {
            tracing::warn!(
                path = %path.display(),
                torn_bytes = existing.len() - replay.valid_len,
                "truncating unacknowledged journal tail"
            );
            let file = tokio::fs::OpenOptions::new().write(true).open(&path).await?;
            file.set_len(replay.valid_len as u64).await?;
            file.sync_all().await?;
        }

        let file = tokio::fs::OpenOptions::new().append(true).open(&path).await?;
        tracing::info!(
            path = %path.display(),
            ledger_id = %replay.header.ledger_id,
            records = replay.records.len(),
            "opened evidence journal"
        );
        Ok(Self {
            path,
            ledger_id: replay.header.ledger_id,
            clock: Arc::new(clock),
            state: Arc::new(Mutex::new(JournalState {
                file,
                len: replay.valid_len as u64,
                records: replay.records,
                nonces: replay.nonces,
                head: replay.head,
            })),
        })
    }

    async fn initialize(path: PathBuf, clock: C) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let header = JournalHeader {
            format: JOURNAL_FORMAT.to_string(),
            ledger_id: crate::generate_ledger_id("evp-journal")?,
            created_at: clock.now(),
        };
        let mut line = serde_json::to_vec(&header)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&path)
            .await?;
        file.write_all(&line).await?;
        file.sync_all().await?;
        drop(file);

        let file = tokio::fs::OpenOptions::new().append(true).open(&path).await?;
        tracing::info!(path = %path.display(), ledger_id = %header.ledger_id, "created evidence journal");
        Ok(Self {
            path,
            ledger_id: header.ledger_id.clone(),
            clock: Arc::new(clock),
            state: Arc::new(Mutex::new(JournalState {
                file,
                len: line.len() as u64,
                records: Vec::new(),
                nonces: HashSet::new(),
                head: genesis_digest(&header)?,
            })),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Digest at the head of the hash chain.
    pub async fn head_digest(&self) -> String {
        self.state.lock().await.head.clone()
    }
}

impl JournalLedger {
    /// Replay and verify a journal without opening it for writing.
    pub async fn verify(path: impl AsRef<Path>) -> Result<JournalSummary, LedgerError> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        let replay = replay(&bytes)?;
        Ok(replay.summary(bytes.len()))
    }
}

impl<C: Clock + 'static> EvidenceLedger for JournalLedger<C> {
    fn ledger_id(&self) -> &str {
        &self.ledger_id
    }

    async fn append(&self, authorization: &AppendAuthorization) -> Result<EvidenceId, LedgerError> {
        let submitter = authorization.verify(&self.ledger_id)?;
        let content_id = authorization.content_id.clone();

        let shared = Arc::clone(&self.state);
        let clock = Arc::clone(&self.clock);
        let authorization = authorization.clone();
        let commit = tokio::spawn(async move {
            let mut state = shared.lock().await;
            let submitted_at = clock.now();
            state.commit(authorization, submitter, submitted_at).await
        });
        let id = commit
            .await
            .map_err(|e| LedgerError::Unavailable(format!("journal commit task failed: {e}")))??;

        tracing::info!(
            evidence_id = %id,
            content_id = %content_id,
            "appended evidence record to journal"
        );
        Ok(id)
    }

    async fn count(&self) -> Result<u64, LedgerError> {
        Ok(self.state.lock().await.records.len() as u64)
    }

    async fn get(&self, id: u64) -> Result<EvidenceRecord, LedgerError> {
        let state = self.state.lock().await;
        let count = state.records.len() as u64;
        if id == 0 || id > count {
            return Err(LedgerError::NotFound { id, count });
        }
        tracing::debug!(evidence_id = id, "read evidence record");
        Ok(state.records[(id - 1) as usize].clone())
    }
}
