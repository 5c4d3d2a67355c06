//! Tasks of a displayed month, grouped by day, and the views built from them

pub mod grid;
pub mod day_pane;

use std::collections::BTreeMap;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::task::{Task, TaskId, FieldId};

pub use grid::{MonthGrid, GridCell, DayCell, WEEKDAY_LABELS};
pub use day_pane::{DayPane, DayPaneEntry};


/// Tasks grouped by their day (`YYYY-MM-DD`).
///
/// Days are kept in natural string order, which is chronological for zero-padded ISO dates.
/// Within a day, tasks keep the order in which they were loaded.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalendarIndex {
    days: BTreeMap<String, Vec<Task>>,
}

impl CalendarIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from scratch
    pub fn from_tasks<I: IntoIterator<Item = Task>>(tasks: I) -> Self {
        let mut index = Self::new();
        index.load(tasks);
        index
    }

    /// Replace the whole content of this index
    pub fn load<I: IntoIterator<Item = Task>>(&mut self, tasks: I) {
        self.days.clear();
        for task in tasks {
            self.insert(task);
        }
    }

    /// Append a task at the end of its day
    pub fn insert(&mut self, task: Task) {
        self.days.entry(task.day_key().to_string())
            .or_insert_with(Vec::new)
            .push(task);
    }

    /// The tasks of a day (an empty slice if there are none)
    pub fn tasks_on(&self, date: &str) -> &[Task] {
        self.days.get(date).map(|tasks| tasks.as_slice()).unwrap_or(&[])
    }

    pub fn has_tasks_on(&self, date: &str) -> bool {
        self.tasks_on(date).is_empty() == false
    }

    /// Every day that has at least one task, in chronological order
    pub fn dates(&self) -> impl Iterator<Item = &str> {
        self.days.keys().map(|k| k.as_str())
    }

    pub fn first_date(&self) -> Option<&str> {
        self.days.keys().next().map(|k| k.as_str())
    }

    pub fn last_date(&self) -> Option<&str> {
        self.days.keys().next_back().map(|k| k.as_str())
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.days.values().flat_map(|tasks| tasks.iter())
    }

    pub fn task(&self, task_id: TaskId) -> Option<&Task> {
        self.tasks().find(|t| t.id() == task_id)
    }

    pub fn task_mut(&mut self, task_id: TaskId) -> Option<&mut Task> {
        self.days.values_mut()
            .flat_map(|tasks| tasks.iter_mut())
            .find(|t| t.id() == task_id)
    }

    /// Number of tasks (not days)
    pub fn len(&self) -> usize {
        self.days.values().map(|tasks| tasks.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}


/// The answer to a plan generation request made with `format=calendar`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlanCalendar {
    pub field_id: FieldId,
    pub plan_id: u64,
    #[serde(default)]
    pub version: i64,
    /// Items per day. Items do not carry their own date: the key is their date
    #[serde(default)]
    pub calendar: HashMap<String, Vec<Task>>,
}

impl PlanCalendar {
    /// Flatten the calendar into dated tasks, in chronological order of days
    pub fn into_tasks(self) -> Vec<Task> {
        let days: BTreeMap<String, Vec<Task>> = self.calendar.into_iter().collect();
        let mut tasks = Vec::new();
        for (date, items) in days {
            for mut item in items {
                item.set_date(&date);
                tasks.push(item);
            }
        }
        tasks
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_day_in_response_order() {
        let index = CalendarIndex::from_tasks(vec![
            Task::new(1, "2024-03-05", "irrigation", "Water"),
            Task::new(2, "2024-03-02T08:00:00+07:00", "observe", "Walk the field"),
            Task::new(3, "2024-03-05T17:00:00Z", "fertilizer", "Urea"),
        ]);

        let ids: Vec<TaskId> = index.tasks_on("2024-03-05").iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(index.dates().collect::<Vec<_>>(), vec!["2024-03-02", "2024-03-05"]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.first_date(), Some("2024-03-02"));
        assert_eq!(index.last_date(), Some("2024-03-05"));
        assert!(index.tasks_on("2024-03-06").is_empty());
    }

    #[test]
    fn every_task_is_under_its_date_prefix() {
        let tasks = vec![
            Task::new(1, "2024-01-31T23:59:59Z", "pest", "a"),
            Task::new(2, "2024-02-01", "pest", "b"),
            Task::new(3, "2024-02-01T00:00:00+07:00", "pest", "c"),
        ];
        let index = CalendarIndex::from_tasks(tasks.clone());
        for task in &tasks {
            let key = &task.date()[..10];
            assert!(index.tasks_on(key).iter().any(|t| t.id() == task.id()));
        }
    }

    #[test]
    fn load_replaces_previous_content() {
        let mut index = CalendarIndex::from_tasks(vec![Task::new(1, "2024-03-05", "pest", "a")]);
        index.load(vec![Task::new(2, "2024-04-01", "pest", "b")]);
        assert_eq!(index.len(), 1);
        assert!(index.task(1).is_none());
        assert!(index.task(2).is_some());
    }

    #[test]
    fn plan_calendar_stamps_dates() {
        let json = r#"{
            "field_id": 1, "plan_id": 9, "version": 2,
            "calendar": {
                "2024-05-02": [{"task_id": 11, "type": "observe", "title": "Check shoots", "status": "todo"}],
                "2024-05-01": [{"task_id": 10, "type": "irrigation", "title": "Water", "qty": 25.0, "unit": "mm", "status": "done"}]
            }
        }"#;
        let plan: PlanCalendar = serde_json::from_str(json).unwrap();
        let tasks = plan.into_tasks();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].id(), 10);
        assert_eq!(tasks[0].date(), "2024-05-01");
        assert_eq!(tasks[1].date(), "2024-05-02");
    }
}
