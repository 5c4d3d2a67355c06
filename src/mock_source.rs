//! An in-memory schedule source, that behaves like the remote API
#![cfg(any(test, feature = "mock_source"))]

use std::error::Error;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::mock_behaviour::MockBehaviour;
use crate::task::{FieldId, Task, TaskId, TaskStatus};
use crate::traits::ScheduleSource;

/// Holds the tasks of several fields, in insertion order (which is the order `get_schedule` returns)
#[derive(Debug, Default)]
pub struct MockSource {
    tasks: Vec<(FieldId, Task)>,
    /// Every status successfully patched, in call order
    patches: Vec<(TaskId, TaskStatus)>,
    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make this source fail according to a shared [`MockBehaviour`]
    pub fn set_mock_behaviour(&mut self, mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>) {
        self.mock_behaviour = mock_behaviour;
    }

    pub fn add_task(&mut self, field_id: FieldId, task: Task) {
        self.tasks.push((field_id, task));
    }

    /// The status the "server" currently has for a task
    pub fn status_of(&self, task_id: TaskId) -> Option<TaskStatus> {
        self.tasks.iter()
            .find(|(_, t)| t.id() == task_id)
            .map(|(_, t)| t.status())
    }

    pub fn patches(&self) -> &[(TaskId, TaskStatus)] {
        &self.patches
    }

    fn check(&self, f: fn(&mut MockBehaviour) -> Result<(), Box<dyn Error>>) -> Result<(), Box<dyn Error>> {
        match &self.mock_behaviour {
            None => Ok(()),
            Some(behaviour) => match behaviour.lock() {
                Ok(mut b) => f(&mut *b),
                Err(_) => Err("Mock behaviour mutex is poisoned".into()),
            },
        }
    }
}

#[async_trait]
impl ScheduleSource for MockSource {
    async fn get_schedule(&self, field_id: FieldId, from: &str, to: &str) -> Result<Vec<Task>, Box<dyn Error>> {
        self.check(MockBehaviour::can_get_schedule)?;
        Ok(self.tasks.iter()
            .filter(|(f, t)| *f == field_id && t.day_key() >= from && t.day_key() <= to)
            .map(|(_, t)| t.clone())
            .collect())
    }

    async fn patch_task_status(&mut self, task_id: TaskId, status: TaskStatus) -> Result<(), Box<dyn Error>> {
        self.check(MockBehaviour::can_patch_task_status)?;
        let task = match self.tasks.iter_mut().find(|(_, t)| t.id() == task_id) {
            None => return Err(format!("No task {}", task_id).into()),
            Some((_, t)) => t,
        };
        *task = task.clone().with_status(status);
        self.patches.push((task_id, status));
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn filters_by_field_and_range() {
        let mut source = MockSource::new();
        source.add_task(1, Task::new(10, "2024-03-01", "observe", "a"));
        source.add_task(1, Task::new(11, "2024-03-31T22:00:00Z", "observe", "b"));
        source.add_task(1, Task::new(12, "2024-04-01", "observe", "c"));
        source.add_task(2, Task::new(13, "2024-03-15", "observe", "d"));

        let tasks = source.get_schedule(1, "2024-03-01", "2024-03-31").await.unwrap();
        let ids: Vec<TaskId> = tasks.iter().map(|t| t.id()).collect();
        assert_eq!(ids, vec![10, 11]);
    }

    #[tokio::test]
    async fn patches_can_fail() {
        let mut source = MockSource::new();
        source.add_task(1, Task::new(10, "2024-03-01", "observe", "a"));
        source.set_mock_behaviour(Some(Arc::new(Mutex::new(MockBehaviour::fail_now(1)))));

        assert!(source.patch_task_status(10, TaskStatus::Done).await.is_err());
        assert_eq!(source.status_of(10), Some(TaskStatus::Todo));
        assert!(source.patch_task_status(10, TaskStatus::Done).await.is_ok());
        assert_eq!(source.status_of(10), Some(TaskStatus::Done));
        assert!(source.patch_task_status(99, TaskStatus::Done).await.is_err());
        assert_eq!(source.patches(), &[(10, TaskStatus::Done)]);
    }
}
