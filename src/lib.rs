//! This crate is the client side of the AOI field-planning application.
//!
//! It provides a client to the planning API in the [`client`] module, that can be used as a stand-alone module.
//!
//! Its core is a month calendar of scheduled field tasks: a [`CalendarViewModel`] owns the displayed month, the tasks
//! of that month grouped by day and the selected day, and renders them as a [`MonthGrid`](calendar::MonthGrid) and a
//! [`DayPane`](calendar::DayPane), independently of any UI toolkit. \
//! A [`CalendarController`] keeps a view model in sync with a [`ScheduleSource`](traits::ScheduleSource) (usually a
//! [`Client`](client::Client)): it discards answers to outdated month loads, and undoes task status changes the
//! server rejected.

pub mod traits;

pub mod calendar;
pub mod month;
pub use month::MonthView;
pub mod task;
pub use task::Task;
pub mod view_model;
pub use view_model::CalendarViewModel;
pub mod controller;
pub use controller::CalendarController;
pub mod records;
pub mod status;

pub mod client;
pub mod config;
pub mod utils;

#[cfg(any(test, feature = "mock_source"))]
pub mod mock_behaviour;
#[cfg(any(test, feature = "mock_source"))]
pub mod mock_source;

/// A calendar backed by the remote API
pub type ApiCalendar = CalendarController<client::Client>;
