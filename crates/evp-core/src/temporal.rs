//! # Temporal Types
//!
//! Ledger timestamps are whole seconds since the Unix epoch, UTC. They
//! serialize as a bare integer, which is what the ledger boundary returns
//! from `get_evidence`.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A UTC timestamp with second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Current UTC time, truncated to whole seconds.
    pub fn now() -> Self {
        Self::truncate(Utc::now())
    }

    /// Build a timestamp from seconds since the Unix epoch.
    pub fn from_unix_seconds(secs: i64) -> Result<Self, ValidationError> {
        Utc.timestamp_opt(secs, 0)
            .single()
            .map(Self)
            .ok_or(ValidationError::InvalidTimestamp(secs))
    }

    /// Seconds since the Unix epoch.
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }

    /// Access the underlying `chrono::DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    /// ISO 8601 with `Z` suffix, e.g. `2026-01-15T12:00:00Z`.
    pub fn to_canonical_string(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    fn truncate(dt: DateTime<Utc>) -> Self {
        Self(Utc.timestamp_opt(dt.timestamp(), 0).single().unwrap_or(dt))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::truncate(dt)
    }
}

impl TryFrom<i64> for Timestamp {
    type Error = ValidationError;

    fn try_from(secs: i64) -> Result<Self, Self::Error> {
        Self::from_unix_seconds(secs)
    }
}

impl From<Timestamp> for i64 {
    fn from(ts: Timestamp) -> Self {
        ts.unix_seconds()
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_canonical_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unix_seconds_roundtrip() {
        let ts = Timestamp::from_unix_seconds(1_768_478_400).unwrap();
        assert_eq!(ts.unix_seconds(), 1_768_478_400);
        assert_eq!(ts.to_canonical_string(), "2026-01-15T12:00:00Z");
    }

    #[test]
    fn now_has_no_subsecond_component() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn from_datetime_truncates() {
        let dt = Utc.timestamp_opt(100, 999_000_000).single().unwrap();
        assert_eq!(Timestamp::from(dt).unix_seconds(), 100);
        assert_eq!(Timestamp::from(dt).as_datetime().timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn serde_is_integer_seconds() {
        let ts = Timestamp::from_unix_seconds(1_700_000_000).unwrap();
        assert_eq!(serde_json::to_string(&ts).unwrap(), "1700000000");
        let back: Timestamp = serde_json::from_str("1700000000").unwrap();
        assert_eq!(back, ts);
    }

    #[test]
    fn out_of_range_is_rejected() {
        assert!(Timestamp::from_unix_seconds(i64::MAX).is_err());
    }
}
