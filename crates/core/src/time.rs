//! Timestamps for progress records.
//!
//! Recorders stamp `completed_at` and `last_updated` from a `Clock` rather
//! than `Utc::now()`, so tests can pin and step time.

use chrono::{DateTime, Duration, Utc};

/// Wall clock, or a pinned instant for tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match *self {
            Self::System => Utc::now(),
            Self::Fixed(at) => at,
        }
    }

    /// Step a pinned clock forward, e.g. to simulate a learner returning the
    /// next day. The system clock is left alone.
    pub fn advance(&mut self, by: Duration) {
        if let Self::Fixed(at) = self {
            *at += by;
        }
    }
}

/// Unix seconds of the instant tests pin to (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// The instant tests pin to.
///
/// # Panics
///
/// Panics if `FIXED_TEST_TIMESTAMP` were out of chrono's range.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// A clock pinned at [`fixed_now`].
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
