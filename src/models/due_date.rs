//! Due dates on a fixed 30-day calendar

use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

/// Length of a loan term, in days
pub const LOAN_TERM_DAYS: u8 = 7;

/// Days per month in loan arithmetic
pub const DAYS_PER_MONTH: u8 = 30;

/// Date used when a catalog line carries an unreadable date
pub const FALLBACK_DATE: DueDate = DueDate {
    day: 1,
    month: 1,
    year: 2000,
};

/// A loan due date, formatted `dd-mm-yyyy`.
///
/// Arithmetic deliberately ignores real month lengths: every month has
/// 30 days and the year never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DueDate {
    pub day: u8,
    pub month: u8,
    pub year: u16,
}

impl DueDate {
    pub fn new(day: u8, month: u8, year: u16) -> Self {
        Self { day, month, year }
    }

    /// Today's local date.
    pub fn today() -> Self {
        Self::from(chrono::Local::now().date_naive())
    }

    /// The date one loan term (7 days) later.
    pub fn extended(self) -> Self {
        let mut day = self.day.saturating_add(LOAN_TERM_DAYS);
        let mut month = self.month;

        if day > DAYS_PER_MONTH {
            day -= DAYS_PER_MONTH;
            month = month.saturating_add(1);
            if !(1..=12).contains(&month) {
                month = 1;
            }
        }
        if !(1..=DAYS_PER_MONTH).contains(&day) {
            day = 1;
        }

        Self {
            day,
            month,
            year: self.year,
        }
    }
}

impl From<NaiveDate> for DueDate {
    fn from(date: NaiveDate) -> Self {
        Self {
            day: date.day() as u8,
            month: date.month() as u8,
            year: date.year().clamp(0, i32::from(u16::MAX)) as u16,
        }
    }
}

impl fmt::Display for DueDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}-{:02}-{:04}", self.day, self.month, self.year)
    }
}

impl FromStr for DueDate {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || AppError::Parse(format!("invalid date '{}'", s));

        let mut parts = s.trim().splitn(3, '-');
        let day = parts.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;
        let month = parts.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;
        let year = parts.next().ok_or_else(bad)?.trim().parse().map_err(|_| bad())?;

        Ok(Self { day, month, year })
    }
}
