//! Scheduled field tasks (irrigation, fertilizer, pest control...)

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The identifier the server gives to a scheduled task
pub type TaskId = u64;

/// The identifier of a field (a plot of land) on the server
pub type FieldId = u64;

/// The completion status of a task, as understood by the server
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Done,
    Skipped,
}

impl TaskStatus {
    /// The status a checkbox maps to
    pub fn from_done(done: bool) -> Self {
        match done {
            true => TaskStatus::Done,
            false => TaskStatus::Todo,
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, TaskStatus::Done)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Done => "done",
            TaskStatus::Skipped => "skipped",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

impl Display for TaskStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "done" => Ok(TaskStatus::Done),
            "skipped" => Ok(TaskStatus::Skipped),
            other => Err(format!("Unknown task status {:?}", other)),
        }
    }
}


/// Describes whether the local status of a task is known to the server
#[derive(Clone, Debug, PartialEq)]
pub enum SyncStatus {
    /// The local status is the one the server last sent or acknowledged
    Synced,
    /// The status has been changed locally and the change is not acknowledged yet.
    /// The embedded value is the last status the server acknowledged, which is restored if the change is rejected.
    LocallyModified(TaskStatus),
}

impl Default for SyncStatus {
    fn default() -> Self {
        SyncStatus::Synced
    }
}


/// A scheduled task, as returned by the schedule endpoint
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    task_id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field_id: Option<FieldId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    plan_id: Option<u64>,

    /// Either a plain `YYYY-MM-DD` date or a full RFC3339 timestamp
    #[serde(default)]
    date: String,
    title: String,
    /// One of `irrigation`, `fertilizer`, `pest` or `observe` on the server, kept free-form here
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    qty: Option<f64>,
    #[serde(default)]
    unit: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    status: TaskStatus,

    #[serde(skip)]
    sync_status: SyncStatus,
}

impl Task {
    /// Create a task that has never been modified locally
    pub fn new<S: ToString, T: ToString, U: ToString>(task_id: TaskId, date: S, kind: T, title: U) -> Self {
        Self {
            task_id,
            field_id: None,
            plan_id: None,
            date: date.to_string(),
            title: title.to_string(),
            kind: kind.to_string(),
            qty: None,
            unit: None,
            notes: None,
            status: TaskStatus::Todo,
            sync_status: SyncStatus::Synced,
        }
    }

    /// Set the quantity and its unit (builder style)
    pub fn with_quantity<S: ToString>(mut self, qty: f64, unit: S) -> Self {
        self.qty = Some(qty);
        self.unit = Some(unit.to_string());
        self
    }

    /// Set the notes (builder style)
    pub fn with_notes<S: ToString>(mut self, notes: S) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Set the server status (builder style)
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn id(&self) -> TaskId                { self.task_id }
    pub fn field_id(&self) -> Option<FieldId> { self.field_id }
    pub fn plan_id(&self) -> Option<u64>      { self.plan_id }
    pub fn date(&self) -> &str                { &self.date }
    pub fn title(&self) -> &str               { &self.title }
    pub fn kind(&self) -> &str                { &self.kind }
    pub fn qty(&self) -> Option<f64>          { self.qty }
    pub fn status(&self) -> TaskStatus        { self.status }
    pub fn sync_status(&self) -> &SyncStatus  { &self.sync_status }
    pub fn completed(&self) -> bool           { self.status.is_done() }

    /// The unit, if the server sent a non-empty one
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref().filter(|u| u.is_empty() == false)
    }

    /// The notes, if the server sent non-empty ones
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| n.is_empty() == false)
    }

    /// The day this task belongs to, i.e. the first ten characters of its date (`YYYY-MM-DD`)
    pub fn day_key(&self) -> &str {
        self.date.get(..10).unwrap_or(&self.date)
    }

    /// Whether a local status change is waiting for the server
    pub fn is_pending(&self) -> bool {
        matches!(self.sync_status, SyncStatus::LocallyModified(_))
    }

    /// Overwrite the date. Used when a task comes from a plan calendar, where the date is the map key
    pub(crate) fn set_date<S: ToString>(&mut self, date: S) {
        self.date = date.to_string();
    }

    /// Change the status locally.
    /// The status the server last acknowledged is remembered, so that it can be restored with [`Self::revert_status`]
    pub fn set_status(&mut self, new_status: TaskStatus) {
        if let SyncStatus::Synced = self.sync_status {
            self.sync_status = SyncStatus::LocallyModified(self.status);
        }
        self.status = new_status;
    }

    /// The server acknowledged that this task now has status `acknowledged`
    pub fn confirm_status(&mut self, acknowledged: TaskStatus) {
        if self.status == acknowledged {
            self.sync_status = SyncStatus::Synced;
        } else {
            // a newer local change is still on its way
            self.sync_status = SyncStatus::LocallyModified(acknowledged);
        }
    }

    /// The server rejected the local change to `rejected`.
    ///
    /// Returns whether the status has been restored. A newer local change (to another status) is left untouched.
    pub fn revert_status(&mut self, rejected: TaskStatus) -> bool {
        match self.sync_status {
            SyncStatus::Synced => false,
            SyncStatus::LocallyModified(acknowledged) => {
                if self.status != rejected {
                    return false;
                }
                self.status = acknowledged;
                self.sync_status = SyncStatus::Synced;
                true
            },
        }
    }
}
