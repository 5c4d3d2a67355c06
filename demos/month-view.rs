//! This is an example of how aoi-planner can be used.
//! It displays the current month of a field, then walks to the next months until one has tasks.

use aoi_planner::utils::{pause, print_calendar};

mod shared;
use shared::initial_load;
use shared::{FIELD_ID, URL};

/// How many months to look ahead before giving up
const MAX_MONTHS: usize = 12;


#[tokio::main]
async fn main() {
    env_logger::init();

    println!("This example shows the planned tasks of a field, month by month.");
    println!("Make sure you have edited the constants in the 'shared.rs' file to include a correct URL and field.");
    println!("");
    println!("This will use the following settings:");
    println!("  * URL = {}", URL);
    println!("  * FIELD_ID = {}", FIELD_ID);
    pause();

    let mut calendar = initial_load().await;
    print_calendar(calendar.view_model());

    for _ in 0..MAX_MONTHS {
        if calendar.view_model().index().is_empty() == false {
            break;
        }
        println!("No task in {}, trying the next month.", calendar.view_model().month_label());
        calendar.next_month().await;
    }
    print_calendar(calendar.view_model());
}
