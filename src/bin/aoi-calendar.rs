use std::error::Error;

use clap::{Parser, Subcommand};

use aoi_planner::client::Client;
use aoi_planner::config::Settings;
use aoi_planner::status::StatusEvent;
use aoi_planner::{CalendarController, CalendarViewModel, MonthView};


#[derive(Parser)]
#[command(name = "aoi-calendar", about = "Month calendar of the tasks planned for a field")]
struct Cli {
    /// Base URL of the planning API (defaults to $AOI_API_URL, then http://localhost:8080)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// The field to display (defaults to $AOI_FIELD_ID)
    #[arg(long, global = true)]
    field: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show a month and the tasks of a day
    Show {
        /// Year to display (defaults to the current one)
        #[arg(long, requires = "month")]
        year: Option<i32>,
        /// Month to display, 1 to 12
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=12))]
        month: Option<u32>,
        /// Day to select (YYYY-MM-DD). Defaults to today or to the first day with tasks
        #[arg(long)]
        day: Option<String>,
    },
    /// Mark a task as done
    Done {
        task_id: u64,
        /// Mark it back as to do instead
        #[arg(long)]
        undo: bool,
    },
    /// Generate the first plan of the field, and show it
    Plan,
    /// Log in as a development user and show who the server thinks we are
    Login {
        /// User ID (defaults to $AOI_DEV_UID, then U_DEV_DEFAULT)
        uid: Option<String>,
    },
}


#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(err) = run(Cli::parse()).await {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut settings = Settings::from_env()?;
    if let Some(url) = cli.api_url {
        settings.api_url = url.parse()?;
    }
    if let Some(field) = cli.field {
        settings.field_id = Some(field);
    }

    let client = Client::from_settings(&settings)?;
    let mut calendar = CalendarController::new(client, CalendarViewModel::for_current_month());
    if let Some(field) = settings.field_id {
        calendar.set_field(field);
    }

    match cli.command {
        Command::Show { year, month, day } => {
            if let Some(month) = month {
                let year = year.unwrap_or_else(|| calendar.view_model().month().year());
                let displayed = MonthView::new(year, month - 1)
                    .ok_or_else(|| format!("Invalid month {}-{}", year, month))?;
                calendar.set_month(displayed).await;
            } else {
                calendar.reload().await;
            }
            fail_on_error(calendar.status().last())?;
            if let Some(day) = day {
                calendar.pick_day(&day);
            }
            aoi_planner::utils::print_calendar(calendar.view_model());
        },
        Command::Done { task_id, undo } => {
            let field = settings.field_id.ok_or("No field given (use --field or AOI_FIELD_ID)")?;
            // only displayed tasks can be toggled: find the task in the field's schedule first
            let tasks = calendar.source().get_schedule(field, "0001-01-01", "9999-12-31").await?;
            let task = tasks.iter().find(|t| t.id() == task_id).ok_or_else(|| format!("No task {} in field {}", task_id, field))?;
            let month = chrono::NaiveDate::parse_from_str(task.day_key(), "%Y-%m-%d")
                .map(MonthView::containing)?;
            calendar.set_month(month).await;
            calendar.toggle_task(task_id, undo == false).await;
            fail_on_error(calendar.status().last())?;
            println!("{}", calendar.status().last());
        },
        Command::Plan => {
            let field = settings.field_id.ok_or("No field given (use --field or AOI_FIELD_ID)")?;
            let plan = calendar.source().generate_plan(field).await?;
            calendar.apply_plan(plan);
            aoi_planner::utils::print_calendar(calendar.view_model());
            if let Some(last) = calendar.view_model().last_plan_date() {
                println!("Last day of plan: {}", last);
            }
        },
        Command::Login { uid } => {
            let uid = uid.unwrap_or(settings.dev_uid);
            let who = calendar.source().dev_login(&uid).await?;
            println!("{}", serde_json::to_string_pretty(&who)?);
        },
    }

    Ok(())
}

fn fail_on_error(event: &StatusEvent) -> Result<(), Box<dyn Error>> {
    match event {
        StatusEvent::Failed{..} | StatusEvent::Reverted{..} => Err(event.to_string().into()),
        _ => Ok(()),
    }
}
