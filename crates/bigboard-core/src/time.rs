//! Time primitives for BigBoard
//!
//! Liveness announcements and message payloads both carry wall-clock time as
//! decimal milliseconds since the Unix epoch. `Timestamp` keeps that unit.

use std::ops::{Add, Sub};
use std::time::Duration;

use chrono::{SecondsFormat, TimeZone, Utc};

use crate::{BoardError, BoardResult};

/// Wall-clock time in milliseconds since the Unix epoch
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    /// Current wall-clock time
    pub fn now() -> Self {
        Timestamp(Utc::now().timestamp_millis())
    }

    #[inline]
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    #[inline]
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Parse a decimal millisecond field.
    ///
    /// Rejects anything that is not a plain (optionally signed) integer, and
    /// values outside the calendar range we can render.
    pub fn parse_millis(field: &str) -> BoardResult<Self> {
        let millis: i64 = field
            .parse()
            .map_err(|_| BoardError::InvalidTimestamp(field.to_string()))?;

        if Utc.timestamp_millis_opt(millis).single().is_none() {
            return Err(BoardError::InvalidTimestamp(field.to_string()));
        }

        Ok(Timestamp(millis))
    }

    /// Render as ISO-8601 UTC with millisecond precision,
    /// e.g. `2023-11-14T22:13:20.000Z`
    pub fn to_iso8601(self) -> BoardResult<String> {
        Utc.timestamp_millis_opt(self.0)
            .single()
            .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
            .ok_or_else(|| BoardError::InvalidTimestamp(self.0.to_string()))
    }

    #[inline]
    pub fn saturating_sub(self, duration: Duration) -> Self {
        Timestamp(self.0.saturating_sub(duration_millis(duration)))
    }

    #[inline]
    pub fn saturating_add(self, duration: Duration) -> Self {
        Timestamp(self.0.saturating_add(duration_millis(duration)))
    }
}

#[inline]
fn duration_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

impl Add<Duration> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn add(self, rhs: Duration) -> Self::Output {
        self.saturating_add(rhs)
    }
}

impl Sub<Duration> for Timestamp {
    type Output = Timestamp;

    #[inline]
    fn sub(self, rhs: Duration) -> Self::Output {
        self.saturating_sub(rhs)
    }
}

impl std::fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Timestamp({}ms)", self.0)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
