//! In-process ledger.
//!
//! Appends are serialized under a `parking_lot::Mutex`; signature
//! verification happens before the lock is taken and no I/O happens inside
//! it. Fault injection lets tests exercise rejected commits and unavailable
//! reads.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use evp_core::{EvidenceId, EvidenceRecord};
use parking_lot::Mutex;

use crate::authorization::{AppendAuthorization, AppendNonce};
use crate::clock::{Clock, SystemClock};
use crate::error::LedgerError;
use crate::ledger::EvidenceLedger;

#[derive(Debug, Default)]
struct MemoryState {
    records: Vec<EvidenceRecord>,
    used_nonces: HashSet<AppendNonce>,
}

#[derive(Debug)]
pub struct MemoryLedger<C = SystemClock> {
    ledger_id: String,
    clock: C,
    state: Mutex<MemoryState>,
    revert_appends: AtomicU32,
    fail_reads: AtomicU32,
}

impl MemoryLedger<SystemClock> {
    /// A ledger with a random instance id and the system clock.
    pub fn new() -> Result<Self, LedgerError> {
        Ok(Self::with_clock(
            crate::generate_ledger_id("evp-memory")?,
            SystemClock,
        ))
    }
}

impl<C: Clock> MemoryLedger<C> {
    pub fn with_clock(ledger_id: impl Into<String>, clock: C) -> Self {
        Self {
            ledger_id: ledger_id.into(),
            clock,
            state: Mutex::new(MemoryState::default()),
            revert_appends: AtomicU32::new(0),
            fail_reads: AtomicU32::new(0),
        }
    }

    /// Make the next `n` appends fail with `Reverted`.
    pub fn revert_next_appends(&self, n: u32) {
        self.revert_appends.store(n, Ordering::SeqCst);
    }

    /// Make the next `n` calls to `count`/`get` fail with `Unavailable`.
    pub fn fail_next_reads(&self, n: u32) {
        self.fail_reads.store(n, Ordering::SeqCst);
    }

    fn take_fault(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    fn check_read(&self) -> Result<(), LedgerError> {
        if Self::take_fault(&self.fail_reads) {
            return Err(LedgerError::Unavailable("injected read failure".to_string()));
        }
        Ok(())
    }

    fn commit(&self, authorization: &AppendAuthorization) -> Result<EvidenceId, LedgerError> {
        let submitter = authorization.verify(&self.ledger_id)?;
        if Self::take_fault(&self.revert_appends) {
            return Err(LedgerError::Reverted("injected revert".to_string()));
        }

        let mut state = self.state.lock();
        if state.used_nonces.contains(&authorization.nonce) {
            return Err(LedgerError::NonceReused(authorization.nonce.to_hex()));
        }
        let id = EvidenceId::after_count(state.records.len() as u64);
        state.records.push(EvidenceRecord {
            id,
            content_id: authorization.content_id.clone(),
            submitted_at: self.clock.now(),
            submitter,
        });
        state.used_nonces.insert(authorization.nonce);
        Ok(id)
    }
}

impl<C: Clock> EvidenceLedger for MemoryLedger<C> {
    fn ledger_id(&self) -> &str {
        &self.ledger_id
    }

    async fn append(&self, authorization: &AppendAuthorization) -> Result<EvidenceId, LedgerError> {
        let id = self.commit(authorization)?;
        tracing::info!(
            evidence_id = %id,
            content_id = %authorization.content_id,
            "appended evidence record"
        );
        Ok(id)
    }

    async fn count(&self) -> Result<u64, LedgerError> {
        self.check_read()?;
        Ok(self.state.lock().records.len() as u64)
    }

    async fn get(&self, id: u64) -> Result<EvidenceRecord, LedgerError> {
        self.check_read()?;
        let state = self.state.lock();
        let count = state.records.len() as u64;
        if id == 0 || id > count {
            return Err(LedgerError::NotFound { id, count });
        }
        tracing::debug!(evidence_id = id, "read evidence record");
        Ok(state.records[(id - 1) as usize].clone())
    }
}
