//! The calendar view model: displayed month, tasks per day and selected day
//!
//! It is an owned value that rendering code borrows, and that the [`controller`](crate::controller) mutates
//! in response to user actions or network completions. It never performs I/O itself.
//!
//! Two redesigned behaviours live here:
//! * every navigation and every reload bumps a *generation*. A reload result is only applied if it
//!   belongs to the latest generation, so that a slow response for a month the user already left cannot
//!   overwrite a newer one;
//! * status toggles are optimistic. The view changes immediately, the task remembers the status the server
//!   last acknowledged, and the change is later confirmed or reverted.

use chrono::{Local, NaiveDate};

use crate::calendar::{CalendarIndex, DayPane, MonthGrid, PlanCalendar};
use crate::month::MonthView;
use crate::task::{Task, TaskId, TaskStatus};

/// Identifies a navigation or reload request. Later requests have greater generations
pub type Generation = u64;

/// Handed out by [`CalendarViewModel::begin_reload`], handed back with the fetched tasks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReloadTicket {
    generation: Generation,
    month: MonthView,
}

impl ReloadTicket {
    pub fn generation(&self) -> Generation { self.generation }
    /// The month whose tasks should be fetched
    pub fn month(&self) -> MonthView { self.month }
    /// `from`/`to` dates of the fetch
    pub fn date_range(&self) -> (String, String) { self.month.date_range() }
}

/// A local status change that still has to be persisted
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingToggle {
    task_id: TaskId,
    requested: TaskStatus,
}

impl PendingToggle {
    pub fn task_id(&self) -> TaskId { self.task_id }
    pub fn requested(&self) -> TaskStatus { self.requested }
}


#[derive(Clone, Debug)]
pub struct CalendarViewModel {
    month: MonthView,
    index: CalendarIndex,
    /// The month `index` holds the tasks of, if any
    loaded_month: Option<MonthView>,
    selection: Option<String>,
    generation: Generation,
    /// Overrides the real current date (used in tests and reproducible renders)
    fixed_today: Option<NaiveDate>,
}

impl CalendarViewModel {
    /// A view model displaying `month`, with no task and no selection
    pub fn new(month: MonthView) -> Self {
        Self {
            month,
            index: CalendarIndex::new(),
            loaded_month: None,
            selection: None,
            generation: 0,
            fixed_today: None,
        }
    }

    /// A view model displaying the current month
    pub fn for_current_month() -> Self {
        Self::new(MonthView::containing(Local::now().date_naive()))
    }

    /// Pin the date that is considered "today"
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    pub fn today(&self) -> NaiveDate {
        self.fixed_today.unwrap_or_else(|| Local::now().date_naive())
    }

    pub fn month(&self) -> MonthView { self.month }
    pub fn index(&self) -> &CalendarIndex { &self.index }
    pub fn loaded_month(&self) -> Option<MonthView> { self.loaded_month }
    pub fn selection(&self) -> Option<&str> { self.selection.as_deref() }
    pub fn generation(&self) -> Generation { self.generation }

    /// `YYYY-MM` of the displayed month
    pub fn month_label(&self) -> String {
        self.month.label()
    }

    /// First and last day of the displayed month
    pub fn date_range(&self) -> (String, String) {
        self.month.date_range()
    }

    //
    // Navigation
    //

    /// Display another month.
    ///
    /// The index and the selection are left as they are: they are refreshed by the next load
    /// (see [`Self::refresh_selection`]).
    pub fn set_month(&mut self, month: MonthView) {
        self.month = month;
        self.generation += 1;
    }

    pub fn next_month(&mut self) {
        self.set_month(self.month.next());
    }

    pub fn prev_month(&mut self) {
        self.set_month(self.month.prev());
    }

    pub fn go_to_today(&mut self) {
        let month = MonthView::containing(self.today());
        self.set_month(month);
    }

    //
    // Loading
    //

    /// Rebuild the index from the tasks of the displayed month, in server order
    pub fn load_month(&mut self, tasks: Vec<Task>) {
        self.index.load(tasks);
        self.loaded_month = Some(self.month);
        log::debug!("Loaded {} tasks over {} days for {}", self.index.len(), self.index.dates().count(), self.month);
    }

    /// Start a reload of the displayed month. Any reload started before is now stale
    pub fn begin_reload(&mut self) -> ReloadTicket {
        self.generation += 1;
        ReloadTicket { generation: self.generation, month: self.month }
    }

    /// Apply the tasks fetched for `ticket`, unless a newer navigation or reload happened meanwhile.
    ///
    /// Returns whether the tasks have been applied
    pub fn finish_reload(&mut self, ticket: ReloadTicket, tasks: Vec<Task>) -> bool {
        if self.is_stale(&ticket) {
            log::debug!("Discarding {} tasks for {} (generation {}, current is {})",
                tasks.len(), ticket.month, ticket.generation, self.generation);
            return false;
        }
        self.load_month(tasks);
        self.refresh_selection();
        true
    }

    /// The fetch for `ticket` failed.
    ///
    /// If the index still holds the tasks of another month, they are dropped, so that nothing outside the
    /// displayed month can be shown or toggled. Returns whether the index has been cleared
    pub fn fail_reload(&mut self, ticket: ReloadTicket) -> bool {
        if self.is_stale(&ticket) || self.loaded_month == Some(ticket.month) {
            return false;
        }
        log::debug!("Dropping the tasks of {:?}, {} could not be loaded", self.loaded_month, ticket.month);
        self.index.load(Vec::new());
        self.loaded_month = None;
        self.refresh_selection();
        true
    }

    pub fn is_stale(&self, ticket: &ReloadTicket) -> bool {
        ticket.generation != self.generation
    }

    /// Replace the index with a freshly generated plan, and jump to the month of its first task
    pub fn inject_plan_calendar(&mut self, plan: PlanCalendar) {
        let tasks = plan.into_tasks();
        let first_month = tasks.first()
            .and_then(|t| NaiveDate::parse_from_str(t.day_key(), "%Y-%m-%d").ok())
            .map(MonthView::containing);
        if let Some(month) = first_month {
            self.set_month(month);
        } else {
            // still invalidates reloads started before the plan was generated
            self.generation += 1;
        }
        self.load_month(tasks);
        self.pick_first_task_day();
    }

    /// The last day of the loaded plan, if any task is loaded
    pub fn last_plan_date(&self) -> Option<&str> {
        self.index.last_date()
    }

    //
    // Selection
    //

    /// Select a day. Days outside of the displayed month are accepted, and simply show no task
    pub fn select_day<S: ToString>(&mut self, date: S) {
        self.selection = Some(date.to_string());
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Select today if it is in the displayed month and has tasks, else the earliest day with tasks, else nothing
    pub fn pick_first_task_day(&mut self) {
        let today = self.today().format("%Y-%m-%d").to_string();
        if self.month.contains(&today) && self.index.has_tasks_on(&today) {
            self.selection = Some(today);
            return;
        }
        self.selection = self.index.first_date().map(|d| d.to_string());
    }

    /// Keep the selection if it lies in the displayed month, otherwise pick a day again
    pub fn refresh_selection(&mut self) {
        match &self.selection {
            Some(date) if self.month.contains(date) => {},
            _ => self.pick_first_task_day(),
        }
    }

    //
    // Task status
    //

    /// Mark a task as done (or back to do) right away.
    ///
    /// Returns `None` if no loaded task has this ID. Otherwise, the returned handle must be
    /// given back to [`Self::confirm_toggle`] or [`Self::revert_toggle`] once the server answered.
    pub fn toggle_task_status(&mut self, task_id: TaskId, done: bool) -> Option<PendingToggle> {
        let task = self.index.task_mut(task_id)?;
        let requested = TaskStatus::from_done(done);
        task.set_status(requested);
        Some(PendingToggle { task_id, requested })
    }

    /// The server accepted the change. Returns `false` if the task is not loaded anymore
    pub fn confirm_toggle(&mut self, pending: PendingToggle) -> bool {
        match self.index.task_mut(pending.task_id) {
            None => false,
            Some(task) => {
                task.confirm_status(pending.requested);
                true
            },
        }
    }

    /// The server rejected the change. Returns whether the previous status has been restored
    pub fn revert_toggle(&mut self, pending: PendingToggle) -> bool {
        match self.index.task_mut(pending.task_id) {
            None => false,
            Some(task) => task.revert_status(pending.requested),
        }
    }

    //
    // Rendering
    //

    pub fn render_grid(&self) -> MonthGrid {
        MonthGrid::build(self.month, &self.index, self.today(), self.selection())
    }

    pub fn render_day_pane(&self, date: &str) -> DayPane {
        DayPane::build(date, self.index.tasks_on(date))
    }

    /// The day pane of the current selection
    pub fn render_selected_day(&self) -> DayPane {
        match self.selection() {
            None => DayPane::none(),
            Some(date) => self.render_day_pane(date),
        }
    }
}
