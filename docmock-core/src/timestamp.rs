//! Point-in-time value type.
//!
//! A [`Timestamp`] stores whole seconds since the Unix epoch plus a sub-second
//! nanosecond remainder, and converts back to a [`chrono::DateTime<Utc>`] or a
//! millisecond count. Comparison is defined on the millisecond count, so two
//! timestamps that differ only below millisecond precision are equal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{cmp::Ordering, fmt};

const NANOS_PER_SECOND: u32 = 1_000_000_000;
const NANOS_PER_MILLI: u32 = 1_000_000;
const MILLIS_PER_SECOND: i64 = 1_000;

/// An immutable instant in time.
///
/// # Example
///
/// ```ignore
/// use docmock::Timestamp;
///
/// let ts = Timestamp::from_millis(1_700_000_000_123);
/// assert_eq!(ts.seconds(), 1_700_000_000);
/// assert_eq!(ts.nanoseconds(), 123_000_000);
/// assert_eq!(ts.to_millis(), 1_700_000_000_123);
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Timestamp {
    seconds: i64,
    nanoseconds: u32,
}

impl Timestamp {
    /// Creates a timestamp from raw parts, carrying excess nanoseconds into seconds.
    pub fn new(seconds: i64, nanoseconds: u32) -> Self {
        Self {
            seconds: seconds.saturating_add(i64::from(nanoseconds / NANOS_PER_SECOND)),
            nanoseconds: nanoseconds % NANOS_PER_SECOND,
        }
    }

    /// Creates a timestamp bound to the current instant.
    pub fn now() -> Self {
        Self::from_date(Utc::now())
    }

    /// Creates a timestamp bound to the instant of `date`.
    pub fn from_date(date: DateTime<Utc>) -> Self {
        // Leap seconds are reported as nanoseconds >= 1e9; `new` folds them.
        Self::new(date.timestamp(), date.timestamp_subsec_nanos())
    }

    /// Creates a timestamp from milliseconds since the Unix epoch.
    ///
    /// Negative counts keep a non-negative nanosecond remainder, so
    /// `-1` becomes `seconds = -1, nanoseconds = 999_000_000`.
    pub fn from_millis(millis: i64) -> Self {
        Self {
            seconds: millis.div_euclid(MILLIS_PER_SECOND),
            nanoseconds: millis.rem_euclid(MILLIS_PER_SECOND) as u32 * NANOS_PER_MILLI,
        }
    }

    /// Whole seconds since the Unix epoch.
    pub fn seconds(&self) -> i64 {
        self.seconds
    }

    /// Sub-second remainder in nanoseconds, always below one second.
    pub fn nanoseconds(&self) -> u32 {
        self.nanoseconds
    }

    /// Converts to a native date.
    ///
    /// Instants outside the range chrono can represent clamp to its bounds.
    pub fn to_date(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.seconds, self.nanoseconds).unwrap_or(if self.seconds < 0 {
            DateTime::<Utc>::MIN_UTC
        } else {
            DateTime::<Utc>::MAX_UTC
        })
    }

    /// Milliseconds since the Unix epoch, truncating sub-millisecond precision.
    pub fn to_millis(&self) -> i64 {
        self.seconds
            .saturating_mul(MILLIS_PER_SECOND)
            .saturating_add(i64::from(self.nanoseconds / NANOS_PER_MILLI))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(date: DateTime<Utc>) -> Self {
        Timestamp::from_date(date)
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.to_millis() == other.to_millis()
    }
}

impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_millis().cmp(&other.to_millis())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_date().to_rfc3339())
    }
}
