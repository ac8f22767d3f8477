//! Time source used by the scheduling and purchase rules.
//!
//! "Today" and "now" are local wall-clock values; purchase timestamps are UTC.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::fmt::Debug;

/// Supplies the current date and time.
pub trait Clock: Send + Sync + Debug {
    /// Current instant, used for record timestamps.
    fn now(&self) -> DateTime<Utc>;

    /// Current local calendar date.
    fn today(&self) -> NaiveDate;

    /// Current local time of day.
    fn time_of_day(&self) -> NaiveTime;
}

/// Reads the host clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn time_of_day(&self) -> NaiveTime {
        Local::now().time()
    }
}

/// A clock frozen at one local date and time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    local: NaiveDateTime,
}

impl FixedClock {
    /// Freezes the clock at `date` `time`.
    #[must_use]
    pub const fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            local: NaiveDateTime::new(date, time),
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.local.and_utc()
    }

    fn today(&self) -> NaiveDate {
        self.local.date()
    }

    fn time_of_day(&self) -> NaiveTime {
        self.local.time()
    }
}
