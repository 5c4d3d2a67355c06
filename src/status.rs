//! Utilities to report what the calendar is doing, e.g. in a status line

use std::fmt::{Display, Error, Formatter};

use crate::month::MonthView;
use crate::task::TaskId;

/// Something that happened to the calendar
#[derive(Clone, Debug, PartialEq)]
pub enum StatusEvent {
    /// Nothing happened yet
    Idle,
    /// The tasks of a month are being fetched
    Loading{ month: MonthView },
    /// The tasks of a month are displayed
    Loaded{ month: MonthView, tasks: usize },
    /// The tasks of a month arrived after the user navigated elsewhere, and have been dropped
    Discarded{ month: MonthView },
    /// A task status change has been persisted
    Saved{ task_id: TaskId },
    /// A task status change has been rejected and undone
    Reverted{ task_id: TaskId, details: String },
    /// Something went wrong
    Failed{ details: String },
}

impl Display for StatusEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            StatusEvent::Idle => write!(f, "Ready"),
            StatusEvent::Loading{month} => write!(f, "Loading {}...", month),
            StatusEvent::Loaded{month, tasks} => write!(f, "{}: {} task(s)", month, tasks),
            StatusEvent::Discarded{month} => write!(f, "Ignored an outdated answer for {}", month),
            StatusEvent::Saved{task_id} => write!(f, "Task {} saved", task_id),
            StatusEvent::Reverted{task_id, details} => write!(f, "Task {} could not be saved: {}", task_id, details),
            StatusEvent::Failed{details} => write!(f, "Failed: {}", details),
        }
    }
}

impl Default for StatusEvent {
    fn default() -> Self {
        Self::Idle
    }
}



/// See [`status_channel`]
pub type StatusSender = tokio::sync::watch::Sender<StatusEvent>;
/// See [`status_channel`]
pub type StatusReceiver = tokio::sync::watch::Receiver<StatusEvent>;

/// Create a status channel, that can be used to display the latest event (e.g. in a status bar)
pub fn status_channel() -> (StatusSender, StatusReceiver) {
    tokio::sync::watch::channel(StatusEvent::default())
}



/// Logs status events, counts the failures, and forwards events to a listener (if any)
#[derive(Debug, Default)]
pub struct StatusReporter {
    n_errors: u32,
    last: StatusEvent,
    channel: Option<StatusSender>,
}

impl StatusReporter {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn new_with_channel(channel: StatusSender) -> Self {
        Self { channel: Some(channel), ..Self::default() }
    }

    pub fn n_errors(&self) -> u32 {
        self.n_errors
    }

    /// The latest reported event
    pub fn last(&self) -> &StatusEvent {
        &self.last
    }

    /// Log an event and send it to the listener
    pub fn report(&mut self, event: StatusEvent) {
        match &event {
            StatusEvent::Failed{..} => {
                log::error!("{}", event);
                self.n_errors += 1;
            },
            StatusEvent::Reverted{..} => {
                log::warn!("{}", event);
                self.n_errors += 1;
            },
            StatusEvent::Discarded{..} => log::debug!("{}", event),
            _ => log::info!("{}", event),
        }

        if let Some(sender) = &self.channel {
            // nobody listening is fine
            let _ = sender.send(event.clone());
        }
        self.last = event;
    }
}
