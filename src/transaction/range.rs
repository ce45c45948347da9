//! Inclusive date ranges used to filter transactions and reports.

use serde::Serialize;
use time::{Date, Duration, Month};

use crate::Error;

/// An inclusive range of dates where `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Date,
    pub end: Date,
}

impl DateRange {
    /// Create a date range.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if `start` is after `end`.
    pub fn new(start: Date, end: Date) -> Result<Self, Error> {
        if start > end {
            return Err(Error::InvalidDateRange);
        }

        Ok(Self { start, end })
    }

    /// Build a range from optional `from`/`to` query parameters.
    ///
    /// `to` defaults to `today` and `from` defaults to `default_span` before `to`.
    ///
    /// # Errors
    /// Returns [Error::InvalidDateRange] if the resolved `from` is after `to`.
    pub fn from_query(
        from: Option<Date>,
        to: Option<Date>,
        today: Date,
        default_span: Duration,
    ) -> Result<Self, Error> {
        let end = to.unwrap_or(today);
        let start = from.unwrap_or_else(|| end.saturating_sub(default_span));

        Self::new(start, end)
    }

    /// The range covering every day of `month` in `year`.
    ///
    /// # Errors
    /// Returns [Error::ValidationError] if the year is out of range.
    pub fn month(year: i32, month: Month) -> Result<Self, Error> {
        let invalid_month = |_| Error::ValidationError(format!("invalid month {year}-{month}"));

        let start = Date::from_calendar_date(year, month, 1).map_err(invalid_month)?;
        let (next_year, next_month) = match month {
            Month::December => (year + 1, Month::January),
            month => (year, month.next()),
        };
        let end = Date::from_calendar_date(next_year, next_month, 1)
            .map_err(invalid_month)?
            .previous_day()
            .ok_or_else(|| Error::ValidationError(format!("invalid month {year}-{month}")))?;

        Ok(Self { start, end })
    }

    /// Whether `date` falls within the range.
    pub fn contains(&self, date: Date) -> bool {
        self.start <= date && date <= self.end
    }
}
