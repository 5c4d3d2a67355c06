//! Drives a [`CalendarViewModel`] from user actions, fetching and persisting through a [`ScheduleSource`]

use std::error::Error;

use crate::calendar::PlanCalendar;
use crate::month::MonthView;
use crate::status::{StatusEvent, StatusReporter};
use crate::task::{FieldId, Task, TaskId};
use crate::traits::ScheduleSource;
use crate::view_model::{CalendarViewModel, ReloadTicket};

/// A calendar of scheduled tasks for one field.
///
/// `S` is usually a [`Client`](crate::client::Client).
#[derive(Debug)]
pub struct CalendarController<S>
where
    S: ScheduleSource,
{
    source: S,
    view_model: CalendarViewModel,
    field_id: Option<FieldId>,
    status: StatusReporter,
}

impl<S> CalendarController<S>
where
    S: ScheduleSource,
{
    pub fn new(source: S, view_model: CalendarViewModel) -> Self {
        Self::new_with_status(source, view_model, StatusReporter::new())
    }

    /// Create a controller that reports its progress to `status` (see [`crate::status::status_channel`])
    pub fn new_with_status(source: S, view_model: CalendarViewModel, status: StatusReporter) -> Self {
        Self { source, view_model, field_id: None, status }
    }

    pub fn source(&self) -> &S { &self.source }
    pub fn source_mut(&mut self) -> &mut S { &mut self.source }
    pub fn view_model(&self) -> &CalendarViewModel { &self.view_model }
    pub fn status(&self) -> &StatusReporter { &self.status }
    pub fn field_id(&self) -> Option<FieldId> { self.field_id }

    /// Display the schedule of another field. Call [`Self::reload`] afterwards
    pub fn set_field(&mut self, field_id: FieldId) {
        self.field_id = Some(field_id);
    }

    /// Fetch the tasks of the displayed month, and refresh the selection.
    ///
    /// Returns whether the fetched tasks are now displayed. Errors are reported, not returned.
    pub async fn reload(&mut self) -> bool {
        let field_id = match self.field_id {
            None => {
                self.status.report(StatusEvent::Failed{ details: "Create a field and generate plan first.".to_string() });
                return false;
            },
            Some(id) => id,
        };

        let ticket = self.view_model.begin_reload();
        self.status.report(StatusEvent::Loading{ month: ticket.month() });
        let fetched = fetch(&self.source, field_id, ticket).await;
        self.finish_reload(ticket, fetched)
    }

    /// Apply the result of a fetch started with [`CalendarViewModel::begin_reload`]
    pub fn finish_reload(&mut self, ticket: ReloadTicket, fetched: Result<Vec<Task>, Box<dyn Error>>) -> bool {
        let tasks = match fetched {
            Err(err) => {
                if self.view_model.is_stale(&ticket) {
                    log::debug!("Ignoring a failed reload of {}, which is outdated: {}", ticket.month(), err);
                } else {
                    self.view_model.fail_reload(ticket);
                    self.status.report(StatusEvent::Failed{ details: format!("Unable to load {}: {}", ticket.month(), err) });
                }
                return false;
            },
            Ok(tasks) => tasks,
        };

        let n_tasks = tasks.len();
        if self.view_model.finish_reload(ticket, tasks) {
            self.status.report(StatusEvent::Loaded{ month: ticket.month(), tasks: n_tasks });
            true
        } else {
            self.status.report(StatusEvent::Discarded{ month: ticket.month() });
            false
        }
    }

    pub async fn set_month(&mut self, month: MonthView) -> bool {
        self.view_model.set_month(month);
        self.reload().await
    }

    pub async fn next_month(&mut self) -> bool {
        self.view_model.next_month();
        self.reload().await
    }

    pub async fn prev_month(&mut self) -> bool {
        self.view_model.prev_month();
        self.reload().await
    }

    /// Go back to the current month
    pub async fn today(&mut self) -> bool {
        self.view_model.go_to_today();
        self.reload().await
    }

    pub fn pick_day(&mut self, date: &str) {
        self.view_model.select_day(date);
    }

    /// Display a freshly generated plan right away, without waiting for a reload
    pub fn apply_plan(&mut self, plan: PlanCalendar) {
        self.field_id = Some(plan.field_id);
        self.view_model.inject_plan_calendar(plan);
        let month = self.view_model.month();
        self.status.report(StatusEvent::Loaded{ month, tasks: self.view_model.index().len() });
    }

    /// Tick or untick a task.
    ///
    /// The change is displayed at once, then persisted. If the source rejects it, it is undone.
    /// Returns whether the change has been persisted.
    pub async fn toggle_task(&mut self, task_id: TaskId, done: bool) -> bool {
        let pending = match self.view_model.toggle_task_status(task_id, done) {
            None => {
                self.status.report(StatusEvent::Failed{ details: format!("Task {} is not displayed", task_id) });
                return false;
            },
            Some(p) => p,
        };

        let details = match self.source.patch_task_status(task_id, pending.requested()).await {
            Ok(()) => None,
            Err(err) => Some(err.to_string()),
        };

        match details {
            None => {
                if self.view_model.confirm_toggle(pending) == false {
                    log::debug!("Task {} has been saved, but is not displayed anymore", task_id);
                }
                self.status.report(StatusEvent::Saved{ task_id });
                true
            },
            Some(details) => {
                if self.view_model.revert_toggle(pending) == false {
                    log::debug!("Task {} was changed again (or reloaded) meanwhile, leaving it as is", task_id);
                }
                self.status.report(StatusEvent::Reverted{ task_id, details });
                false
            },
        }
    }
}

/// Fetch the tasks a reload ticket asks for
pub async fn fetch<S>(source: &S, field_id: FieldId, ticket: ReloadTicket) -> Result<Vec<Task>, Box<dyn Error>>
where
    S: ScheduleSource,
{
    let (from, to) = ticket.date_range();
    source.get_schedule(field_id, &from, &to).await
}
