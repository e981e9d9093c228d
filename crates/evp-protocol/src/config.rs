//! Orchestrator timeouts and retry policy.

use std::time::Duration;

/// Exponential backoff for transient failures.
///
/// Delays double from `base_delay` and are capped at `max_delay`:
/// 200ms, 400ms, 800ms with the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts after the first one.
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Try exactly once.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// Bound on each content store call.
    pub store_timeout: Duration,
    /// Bound on each ledger call.
    pub ledger_timeout: Duration,
    /// Applied to store calls and ledger reads, never to appends.
    pub retry: RetryPolicy,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(60),
            ledger_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backoff_doubles() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_for(0), Duration::from_millis(200));
        assert_eq!(p.delay_for(1), Duration::from_millis(400));
        assert_eq!(p.delay_for(2), Duration::from_millis(800));
    }

    #[test]
    fn backoff_is_capped() {
        let p = RetryPolicy::default();
        assert_eq!(p.delay_for(10), Duration::from_secs(5));
        assert_eq!(p.delay_for(u32::MAX), Duration::from_secs(5));
    }

    #[test]
    fn none_never_waits() {
        let p = RetryPolicy::none();
        assert_eq!(p.max_retries, 0);
        assert_eq!(p.delay_for(3), Duration::ZERO);
    }
}
