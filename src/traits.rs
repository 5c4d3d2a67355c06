use std::error::Error;

use async_trait::async_trait;

use crate::task::{FieldId, Task, TaskId, TaskStatus};

/// Something the calendar can read scheduled tasks from, and write task statuses to.
///
/// This is usually the remote API ([`Client`](crate::client::Client)), but tests use an in-memory source.
#[async_trait]
pub trait ScheduleSource {
    /// Returns the tasks of a field between two `YYYY-MM-DD` dates (inclusive), in server order.
    /// This is a network round-trip for remote sources, and can fail
    async fn get_schedule(&self, field_id: FieldId, from: &str, to: &str) -> Result<Vec<Task>, Box<dyn Error>>;

    /// Persist the status of a task
    async fn patch_task_status(&mut self, task_id: TaskId, status: TaskStatus) -> Result<(), Box<dyn Error>>;
}
