//! This is an example of how aoi-planner can be used.
//! This binary simply toggles the completion statuses of the tasks of the selected day.

use aoi_planner::task::TaskId;
use aoi_planner::utils::{pause, print_calendar};
use aoi_planner::ApiCalendar;

mod shared;
use shared::initial_load;
use shared::{FIELD_ID, URL};


#[tokio::main]
async fn main() {
    env_logger::init();

    println!("This example toggles every task of the selected day of a field.");
    println!("Make sure you have edited the constants in the 'shared.rs' file to include a correct URL and field.");
    println!("");
    println!("This will use the following settings:");
    println!("  * URL = {}", URL);
    println!("  * FIELD_ID = {}", FIELD_ID);
    pause();

    let mut calendar = initial_load().await;
    toggle_selected_day(&mut calendar).await;
    print_calendar(calendar.view_model());
}

async fn toggle_selected_day(calendar: &mut ApiCalendar) {
    let to_toggle: Vec<(TaskId, bool)> = calendar.view_model()
        .render_selected_day()
        .entries()
        .iter()
        .map(|entry| (entry.task_id, entry.done == false))
        .collect();

    let mut n_saved = 0;
    for (task_id, done) in &to_toggle {
        if calendar.toggle_task(*task_id, *done).await {
            n_saved += 1;
        }
    }

    println!("{} of {} tasks toggled.", n_saved, to_toggle.len());
}
