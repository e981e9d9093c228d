//! The [`EvidenceLedger`] capability and lazy iteration over it.

use std::future::Future;

use evp_core::{EvidenceId, EvidenceRecord};

use crate::authorization::AppendAuthorization;
use crate::error::LedgerError;

/// Upper bound on records reserved up front; `count()` comes from the backend.
const PREALLOCATE_LIMIT: u64 = 1024;

/// An append-only log of evidence records with authenticated writes.
///
/// - `append` is atomic: it either returns the new id with the record
///   durable, or fails with no record created.
/// - ids are dense: after `n` successful appends, `count() == n` and
///   `get(i)` succeeds exactly for `1 <= i <= n`.
/// - `submitted_at` and `submitter` are stamped by the ledger.
/// - Implementations never retry on their own.
pub trait EvidenceLedger: Send + Sync {
    /// Identity of this ledger instance, bound into every authorization.
    fn ledger_id(&self) -> &str;

    /// Verify `authorization` and commit a new record for its content id.
    fn append(
        &self,
        authorization: &AppendAuthorization,
    ) -> impl Future<Output = Result<EvidenceId, LedgerError>> + Send;

    /// Number of committed records.
    fn count(&self) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    /// Record with 1-based `id`; `NotFound` outside `[1, count]`.
    fn get(&self, id: u64) -> impl Future<Output = Result<EvidenceRecord, LedgerError>> + Send;

    /// Lazy ascending iteration over `1..=count()`.
    fn iterate(&self) -> impl Future<Output = Result<LedgerIter<'_, Self>, LedgerError>> + Send
    where
        Self: Sized,
    {
        LedgerIter::open(self)
    }
}

/// Ascending, finite walk over a ledger's records.
///
/// The bound is read from `count()` when the iterator is opened; records are
/// fetched one at a time. Opening a new iterator restarts from id 1 and sees
/// any records appended since.
#[derive(Debug)]
pub struct LedgerIter<'a, L: ?Sized> {
    ledger: &'a L,
    next_id: u64,
    count: u64,
}

impl<'a, L: EvidenceLedger> LedgerIter<'a, L> {
    pub async fn open(ledger: &'a L) -> Result<Self, LedgerError> {
        let count = ledger.count().await?;
        Ok(Self {
            ledger,
            next_id: 1,
            count,
        })
    }

    /// Fetch the next record, or `None` once `count` records were yielded.
    pub async fn next(&mut self) -> Option<Result<EvidenceRecord, LedgerError>> {
        if self.next_id > self.count {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        Some(self.ledger.get(id).await)
    }

    /// Records not yet yielded.
    pub fn remaining(&self) -> u64 {
        self.count.saturating_sub(self.next_id - 1)
    }

    /// The `count()` observed when the iterator was opened.
    pub fn len(&self) -> u64 {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Drain into a vector, stopping at the first failed read.
    pub async fn collect_all(mut self) -> Result<Vec<EvidenceRecord>, LedgerError> {
        let mut out = Vec::with_capacity(self.remaining().min(PREALLOCATE_LIMIT) as usize);
        while let Some(record) = self.next().await {
            out.push(record?);
        }
        Ok(out)
    }
}
