//! Calendar clock
//!
//! Everything that depends on "today" asks a [`Clock`], so tests and
//! benchmarks can pin the date.

use chrono::{DateTime, Local, NaiveDate, Utc};

/// Source of the current calendar day
pub trait Clock {
    /// Today's date on the user's local calendar
    fn today(&self) -> NaiveDate;

    /// Current instant, used for export timestamps
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Reads the local system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock stuck on one day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// Parse a `YYYY-MM-DD` date
    pub fn parse(date: &str) -> Option<Self> {
        date.parse().ok().map(Self::new)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now(&self) -> DateTime<Utc> {
        self.today
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
