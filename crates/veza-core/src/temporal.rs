//! # Temporal Types — UTC-Only Timestamps
//!
//! Defines [`Timestamp`], a UTC-only timestamp truncated to seconds
//! precision with a canonical `YYYY-MM-DDTHH:MM:SSZ` rendering.
//!
//! ## Security Invariant
//!
//! The consent digest is computed over a timestamp's canonical string form.
//! Local timezone offsets or sub-second components would produce different
//! digest inputs for the same instant, so non-UTC inputs are rejected at
//! construction — there is no silent conversion on the digest path.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// A UTC-only timestamp, truncated to seconds precision.
///
/// # Construction
///
/// - [`Timestamp::now()`] — current UTC time, truncated.
/// - [`Timestamp::from_utc()`] — from a `DateTime<Utc>`, truncating sub-seconds.
/// - [`Timestamp::parse()`] — from an ISO8601 string, rejecting non-UTC offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Create a timestamp from the current UTC time, truncated to seconds.
    pub fn now() -> Self {
        Self(truncate_to_seconds(Utc::now()))
    }

    /// Create a timestamp from a `chrono::DateTime<Utc>`, truncating sub-seconds.
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(truncate_to_seconds(dt))
    }

    /// Parse a timestamp from an RFC 3339 string.
    ///
    /// **Rejects non-UTC inputs.** Only timestamps with the `Z` suffix are
    /// accepted — even `+00:00`, which is semantically equivalent, is
    /// rejected so that canonical byte representations stay deterministic.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        if !s.ends_with('Z') {
            return Err(CoreError::InvalidTimestamp(format!(
                "timestamp must use Z suffix (UTC only), got: {s:?}"
            )));
        }
        let dt = DateTime::parse_from_rfc3339(s)
            .map_err(|e| CoreError::InvalidTimestamp(format!("invalid RFC 3339 {s:?}: {e}")))?;
        Ok(Self(truncate_to_seconds(dt.with_timezone(&Utc))))
    }

    /// Render as the canonical `YYYY-MM-DDTHH:MM:SSZ` form.
    ///
    /// This string is the exact byte sequence fed into the consent digest.
    pub fn to_iso8601(&self) -> String {
        self.0.format("%Y-%m-%dT%H:%M:%SZ").to_string()
    }

    /// Access the inner `DateTime<Utc>`.
    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_iso8601())
    }
}

fn truncate_to_seconds(dt: DateTime<Utc>) -> DateTime<Utc> {
    // with_nanosecond(0) only fails for out-of-range values; 0 is always valid.
    dt.with_nanosecond(0).unwrap_or(dt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn now_has_no_subseconds() {
        let ts = Timestamp::now();
        assert_eq!(ts.as_datetime().nanosecond(), 0);
    }

    #[test]
    fn parse_accepts_z_suffix() {
        let ts = Timestamp::parse("2026-03-01T12:30:45Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-01T12:30:45Z");
    }

    #[test]
    fn parse_truncates_subseconds() {
        let ts = Timestamp::parse("2026-03-01T12:30:45.987Z").unwrap();
        assert_eq!(ts.to_iso8601(), "2026-03-01T12:30:45Z");
    }

    #[test]
    fn parse_rejects_offset_forms() {
        assert!(Timestamp::parse("2026-03-01T12:30:45+00:00").is_err());
        assert!(Timestamp::parse("2026-03-01T12:30:45+05:30").is_err());
        assert!(Timestamp::parse("2026-03-01T12:30:45").is_err());
    }

    #[test]
    fn round_trip_is_stable() {
        let ts = Timestamp::parse("2026-03-01T12:30:45Z").unwrap();
        let again = Timestamp::parse(&ts.to_iso8601()).unwrap();
        assert_eq!(ts, again);
    }
}
