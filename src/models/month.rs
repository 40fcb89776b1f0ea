//! The calendar month a payroll run covers.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A calendar month identified by year and month number.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayrollMonth;
///
/// let month = PayrollMonth::new(2025, 2).unwrap();
/// assert_eq!(month.to_string(), "2025-02");
/// assert_eq!(month.day_count(), 28);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PayrollMonth {
    /// The calendar year.
    pub year: i32,
    /// The month number, 1 through 12.
    pub month: u32,
}

impl PayrollMonth {
    /// Creates a month, rejecting month numbers outside 1..=12.
    pub fn new(year: i32, month: u32) -> EngineResult<Self> {
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(EngineError::validation(
                "month",
                format!("{}-{} is not a valid calendar month", year, month),
            ));
        }
        Ok(Self { year, month })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// The first day of the month.
    pub fn first_day(&self) -> EngineResult<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(|| {
            EngineError::validation("month", format!("{} is not a valid calendar month", self))
        })
    }

    /// The last day of the month.
    pub fn last_day(&self) -> EngineResult<NaiveDate> {
        let first = self.first_day()?;
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        next.and_then(|d| d.pred_opt()).ok_or_else(|| {
            EngineError::validation("month", format!("{} has no representable end", first))
        })
    }

    /// Number of calendar days in the month (0 for an invalid month).
    pub fn day_count(&self) -> u32 {
        self.last_day().map(|d| d.day()).unwrap_or(0)
    }

    /// Returns true if `date` falls within this month.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    /// Every calendar date of the month in order.
    pub fn dates(&self) -> Vec<NaiveDate> {
        match self.first_day() {
            Ok(first) => first
                .iter_days()
                .take_while(|d| self.contains(*d))
                .collect(),
            Err(_) => Vec::new(),
        }
    }
}

impl fmt::Display for PayrollMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PayrollMonth {
    type Err = EngineError;

    /// Parses `YYYY-MM`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EngineError::validation("month", format!("'{}' is not YYYY-MM", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}
