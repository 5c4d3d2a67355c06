//! The list of tasks of a single day

use std::fmt::{Display, Formatter};

use crate::task::{Task, TaskId};

/// One task, as shown in the day pane
#[derive(Clone, Debug, PartialEq)]
pub struct DayPaneEntry {
    pub task_id: TaskId,
    /// Upper-cased task type, e.g. `IRRIGATION`
    pub kind: String,
    pub title: String,
    /// `"{qty} {unit}"` with one decimal, when the task has a quantity
    pub quantity: Option<String>,
    pub notes: Option<String>,
    pub done: bool,
    /// The status shown has not been acknowledged by the server yet
    pub pending: bool,
}

impl DayPaneEntry {
    pub fn from_task(task: &Task) -> Self {
        let quantity = task.qty().map(|qty| {
            format!("{:.1} {}", qty, task.unit().unwrap_or("")).trim_end().to_string()
        });
        Self {
            task_id: task.id(),
            kind: task.kind().to_uppercase(),
            title: task.title().to_string(),
            quantity,
            notes: task.notes().map(|n| n.to_string()),
            done: task.completed(),
            pending: task.is_pending(),
        }
    }

    /// `TYPE: title`
    pub fn headline(&self) -> String {
        format!("{}: {}", self.kind, self.title)
    }

    /// Quantity and notes joined with a bullet, empty when there are none
    pub fn meta(&self) -> String {
        self.quantity.iter()
            .chain(self.notes.iter())
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(" • ")
    }
}

/// The rendering contract of the day pane
#[derive(Clone, Debug, PartialEq)]
pub struct DayPane {
    date: Option<String>,
    entries: Vec<DayPaneEntry>,
}

impl DayPane {
    /// The pane shown when no day is selected
    pub fn none() -> Self {
        Self { date: None, entries: Vec::new() }
    }

    pub fn build(date: &str, tasks: &[Task]) -> Self {
        Self {
            date: Some(date.to_string()),
            entries: tasks.iter().map(DayPaneEntry::from_task).collect(),
        }
    }

    pub fn date(&self) -> Option<&str> { self.date.as_deref() }
    pub fn entries(&self) -> &[DayPaneEntry] { &self.entries }

    pub fn heading(&self) -> String {
        match &self.date {
            None => "Selected Day".to_string(),
            Some(date) => format!("Tasks on {}", date),
        }
    }

    /// Whether the "No tasks" indicator should be shown
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Display for DayPane {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.heading())?;
        if self.date.is_none() {
            return Ok(());
        }
        if self.is_empty() {
            return writeln!(f, "  No tasks");
        }
        for entry in &self.entries {
            let check = if entry.done { "x" } else { " " };
            let pending = if entry.pending { " (saving)" } else { "" };
            writeln!(f, "  [{}] {}{}", check, entry.headline(), pending)?;
            let meta = entry.meta();
            if meta.is_empty() == false {
                writeln!(f, "      {}", meta)?;
            }
        }
        Ok(())
    }
}
