//! The (year, month) pair a calendar displays

use std::convert::TryFrom;
use std::fmt::{Display, Formatter};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A displayed month. `month` is 0-based (January is 0), so that it always lies in `0..=11`
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawMonthView")]
pub struct MonthView {
    year: i32,
    month: u32,
}

/// A (year, month) pair that has not been validated yet
#[derive(Deserialize)]
struct RawMonthView {
    year: i32,
    month: u32,
}

impl TryFrom<RawMonthView> for MonthView {
    type Error = String;

    fn try_from(raw: RawMonthView) -> Result<Self, Self::Error> {
        MonthView::new(raw.year, raw.month)
            .ok_or_else(|| format!("Invalid month {} of year {} (months are 0-based)", raw.month, raw.year))
    }
}

impl MonthView {
    /// Returns `None` when `month` is not in `0..=11` (or the year is out of the supported calendar range)
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if month > 11 {
            return None;
        }
        NaiveDate::from_ymd_opt(year, month + 1, 1)?;
        Some(Self { year, month })
    }

    /// The month that contains `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self { year: date.year(), month: date.month0() }
    }

    pub fn year(&self) -> i32 { self.year }
    /// 0-based month
    pub fn month(&self) -> u32 { self.month }

    /// The following month. The last month chrono supports is its own successor
    pub fn next(&self) -> Self {
        let next = match self.month {
            11 => Self::new(self.year.saturating_add(1), 0),
            m => Self::new(self.year, m + 1),
        };
        next.unwrap_or(*self)
    }

    /// The preceding month. The first month chrono supports is its own predecessor
    pub fn prev(&self) -> Self {
        let prev = match self.month {
            0 => Self::new(self.year.saturating_sub(1), 11),
            m => Self::new(self.year, m - 1),
        };
        prev.unwrap_or(*self)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, 1).unwrap(/* this cannot panic since month is always in 0..=11 */)
    }

    pub fn last_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month + 1, self.days_in_month()).unwrap(/* same as above */)
    }

    pub fn days_in_month(&self) -> u32 {
        match self.month {
            1 => if is_leap_year(self.year) { 29 } else { 28 },
            3 | 5 | 8 | 10 => 30,
            _ => 31,
        }
    }

    /// Number of blank cells before the 1st, in a week that starts on Sunday
    pub fn leading_blanks(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    /// The ISO date (`YYYY-MM-DD`) of a day of this month
    pub fn iso_date(&self, day: u32) -> String {
        format!("{:04}-{:02}-{:02}", self.year, self.month + 1, day)
    }

    /// First and last ISO dates of this month, as used in `from`/`to` queries
    pub fn date_range(&self) -> (String, String) {
        (self.iso_date(1), self.iso_date(self.days_in_month()))
    }

    /// Whether an ISO date string falls in this month
    pub fn contains(&self, iso_date: &str) -> bool {
        iso_date.starts_with(&format!("{}-", self.label()))
    }

    /// `YYYY-MM`, with a 1-based month
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month + 1)
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

impl Display for MonthView {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
