//! Some utility functions

use crate::calendar::CalendarIndex;
use crate::task::{SyncStatus, Task};
use crate::view_model::CalendarViewModel;

/// A debug utility that pretty-prints the month grid and the selected day
pub fn print_calendar(view_model: &CalendarViewModel) {
    println!("{}", view_model.render_grid());
    println!("{}", view_model.render_selected_day());
}

/// A debug utility that pretty-prints every loaded task, day by day
pub fn print_index(index: &CalendarIndex) {
    for date in index.dates() {
        println!("{}", date);
        for task in index.tasks_on(date) {
            print_task(task);
        }
    }
}

pub fn print_task(task: &Task) {
    println!("    {}", task_line(task));
}

/// `✓=` style one-line summary: completion, then sync status (`=` synced, `~` modified locally)
pub fn task_line(task: &Task) -> String {
    let completion = if task.completed() { "✓" } else { " " };
    let sync = match task.sync_status() {
        SyncStatus::Synced => "=",
        SyncStatus::LocallyModified(_) => "~",
    };
    format!("{}{} {}\t{}", completion, sync, task.title(), task.id())
}

/// Wait for the user to press Enter
pub fn pause() {
    let mut buf = String::new();
    let _ = std::io::stdin().read_line(&mut buf);
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskStatus;

    #[test]
    fn task_lines() {
        let mut task = Task::new(4, "2024-03-05", "observe", "Walk");
        assert_eq!(task_line(&task), " = Walk\t4");
        task.set_status(TaskStatus::Done);
        assert_eq!(task_line(&task), "✓~ Walk\t4");
    }
}
