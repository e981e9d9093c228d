//! Time source used by ledgers to stamp `submitted_at`.

use std::sync::atomic::{AtomicI64, Ordering};

use evp_core::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time, truncated to whole seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A settable clock for deterministic tests.
#[derive(Debug)]
pub struct FixedClock {
    unix_seconds: AtomicI64,
}

impl FixedClock {
    pub fn new(at: Timestamp) -> Self {
        Self {
            unix_seconds: AtomicI64::new(at.unix_seconds()),
        }
    }

    pub fn set(&self, at: Timestamp) {
        self.unix_seconds.store(at.unix_seconds(), Ordering::SeqCst);
    }

    /// Move the clock forward by `secs`.
    pub fn advance(&self, secs: i64) {
        self.unix_seconds.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        let secs = self.unix_seconds.load(Ordering::SeqCst);
        // Only values that came from a valid Timestamp (plus small advances)
        // are ever stored.
        Timestamp::from_unix_seconds(secs).unwrap_or_else(|_| Timestamp::now())
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}
