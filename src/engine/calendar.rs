use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::error::ExpenseError;

/// A calendar month from the first day at 00:00:00 to the last day at 23:59:59.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MonthWindow {
    pub(crate) start: NaiveDateTime,
    pub(crate) end: NaiveDateTime,
}

impl MonthWindow {
    pub(crate) fn containing(at: NaiveDateTime) -> Self {
        Self::from_first_day(first_of_month(at.date()))
    }

    /// Parse a `YYYY-MM` string.
    pub(crate) fn parse(month: &str) -> Result<Self, ExpenseError> {
        let trimmed = month.trim();
        NaiveDate::parse_from_str(&format!("{trimmed}-01"), "%Y-%m-%d")
            .map(Self::from_first_day)
            .map_err(|_| ExpenseError::InvalidMonth(trimmed.to_string()))
    }

    fn from_first_day(first: NaiveDate) -> Self {
        let start = first.and_time(NaiveTime::MIN);
        let end = next_month_start(first) - Duration::seconds(1);
        Self { start, end }
    }

    pub(crate) fn previous(&self) -> Self {
        let first = self
            .start
            .date()
            .checked_sub_months(Months::new(1))
            .unwrap_or(NaiveDate::MIN);
        Self::from_first_day(first)
    }

    /// Inclusive at both ends.
    pub(crate) fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }

    pub(crate) fn days(&self) -> u32 {
        self.end.day()
    }

    pub(crate) fn label(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap_or(date)
}

fn next_month_start(first: NaiveDate) -> NaiveDateTime {
    first
        .checked_add_months(Months::new(1))
        .unwrap_or(NaiveDate::MAX)
        .and_time(NaiveTime::MIN)
}

/// Monday of the week containing `date`.
pub(crate) fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

pub(crate) fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}
