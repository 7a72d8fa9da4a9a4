//! Seconds-resolution UTC time and the clock seam.
//!
//! Offer expiry and event expiry are judged against a [`Clock`], never
//! against the system time directly, so tests can pin time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unix time in whole seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn new(secs: u64) -> Self {
        Self(secs)
    }

    /// Wall-clock now. A clock set before 1970 reads as zero.
    pub fn now() -> Self {
        Self(u64::try_from(Utc::now().timestamp()).unwrap_or(0))
    }

    pub fn as_secs(&self) -> u64 {
        self.0
    }

    /// Saturating.
    pub fn plus_secs(&self, secs: u64) -> Self {
        Self(self.0.saturating_add(secs))
    }
}

/// RFC 3339 in UTC, or raw seconds when outside chrono's range.
impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match i64::try_from(self.0)
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        {
            Some(at) => f.write_str(&at.to_rfc3339()),
            None => write!(f, "{}", self.0),
        }
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_as_utc_date() {
        assert_eq!(Timestamp::new(1_668_965_400).to_string(), "2022-11-20T17:30:00+00:00");
        assert_eq!(Timestamp::new(u64::MAX).to_string(), u64::MAX.to_string());
    }

    #[test]
    fn plus_secs_saturates() {
        assert_eq!(Timestamp::new(10).plus_secs(5), Timestamp::new(15));
        assert_eq!(Timestamp::new(u64::MAX).plus_secs(1), Timestamp::new(u64::MAX));
    }

    #[test]
    fn system_clock_is_after_2022() {
        assert!(SystemClock.now() > Timestamp::new(1_668_965_400));
    }
}
