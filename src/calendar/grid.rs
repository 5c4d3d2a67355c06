//! Month grid: one row per week, weeks start on Sunday

use std::fmt::{Display, Formatter};

use chrono::NaiveDate;

use crate::calendar::CalendarIndex;
use crate::month::MonthView;

pub const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// A cell of the month grid
#[derive(Clone, Debug, PartialEq)]
pub enum GridCell {
    /// Padding before the 1st or after the last day of the month
    Blank,
    Day(DayCell),
}

impl GridCell {
    pub fn is_blank(&self) -> bool {
        matches!(self, GridCell::Blank)
    }

    pub fn day(&self) -> Option<&DayCell> {
        match self {
            GridCell::Day(d) => Some(d),
            GridCell::Blank => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DayCell {
    pub day: u32,
    /// `YYYY-MM-DD`
    pub date: String,
    pub is_today: bool,
    pub is_selected: bool,
    pub titles: Vec<String>,
}

/// The rendering contract of a month: cells, row by row
#[derive(Clone, Debug, PartialEq)]
pub struct MonthGrid {
    month: MonthView,
    cells: Vec<GridCell>,
}

impl MonthGrid {
    /// Lay out `month`. `today` is flagged if it falls in this month
    pub fn build(month: MonthView, index: &CalendarIndex, today: NaiveDate, selected: Option<&str>) -> Self {
        let today = today.format("%Y-%m-%d").to_string();
        let mut cells = Vec::with_capacity(42);

        for _ in 0..month.leading_blanks() {
            cells.push(GridCell::Blank);
        }

        for day in 1..=month.days_in_month() {
            let date = month.iso_date(day);
            let titles = index.tasks_on(&date)
                .iter()
                .map(|t| t.title().to_string())
                .collect();
            cells.push(GridCell::Day(DayCell {
                day,
                is_today: date == today,
                is_selected: selected == Some(date.as_str()),
                date,
                titles,
            }));
        }

        while cells.len() % 7 != 0 {
            cells.push(GridCell::Blank);
        }

        Self { month, cells }
    }

    pub fn month(&self) -> MonthView { self.month }
    pub fn cells(&self) -> &[GridCell] { &self.cells }

    /// Rows of exactly 7 cells
    pub fn weeks(&self) -> impl Iterator<Item = &[GridCell]> {
        self.cells.chunks(7)
    }

    pub fn day_cells(&self) -> impl Iterator<Item = &DayCell> {
        self.cells.iter().filter_map(|c| c.day())
    }
}

/// A plain-text month table. `*` marks today, `>` the selected day, `+n` the number of tasks
impl Display for MonthGrid {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:^42}", self.month.label())?;
        for label in WEEKDAY_LABELS.iter() {
            write!(f, " {:<5}", label)?;
        }
        writeln!(f)?;

        for week in self.weeks() {
            for cell in week {
                match cell {
                    GridCell::Blank => write!(f, "      ")?,
                    GridCell::Day(d) => {
                        let mark = if d.is_selected { '>' } else if d.is_today { '*' } else { ' ' };
                        let count = match d.titles.len() {
                            0 => String::new(),
                            n => format!("+{}", n),
                        };
                        write!(f, "{}{:>2}{:<3}", mark, d.day, count)?;
                    },
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
