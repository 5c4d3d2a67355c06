use aoi_planner::client::Client;
use aoi_planner::{ApiCalendar, CalendarController, CalendarViewModel};


// TODO: change these values with yours
pub const URL: &str = "http://localhost:8080";
pub const FIELD_ID: u64 = 1;


/// Creates a calendar for the current month, and loads it from the server
pub async fn initial_load() -> ApiCalendar {
    let client = Client::new(URL).unwrap();
    let mut calendar = CalendarController::new(client, CalendarViewModel::for_current_month());
    calendar.set_field(FIELD_ID);

    println!("Loading {}...", calendar.view_model().month_label());
    println!("Depending on your RUST_LOG value, you may see more or less details about the progress.");
    if calendar.reload().await == false {
        log::warn!("Loading did not complete: {}", calendar.status().last());
    }
    calendar
}
