use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use clap::{Parser, Subcommand};

use calendar_store::config;
use calendar_store::controller::CalendarController;
use calendar_store::database::LocalDatabase;
use calendar_store::form::{EventDraft, EventForm, FormOutcome, FormRequest};
use calendar_store::selectors::select_day_entries;
use calendar_store::store::{wait_for_outcome, ActionReceiver, Dispatched};
use calendar_store::{EventId, Store, StoreError};

#[derive(Parser)]
#[command(name = "calendar", about = "Manage your local calendar events", version)]
struct Cli {
    /// Folder of the local database (defaults to $CALENDAR_DATA_DIR, or ./calendar_data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show every event, day by day
    List,
    /// Add a new event
    Add {
        #[arg(long)]
        title: String,
        /// RFC 3339, or "YYYY-MM-DD HH:MM" (UTC)
        #[arg(long, value_parser = parse_date)]
        date: DateTime<Utc>,
        /// The category of the event, e.g. "race" or "training"
        #[arg(long = "type")]
        event_type: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change some fields of an event
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_date)]
        date: Option<DateTime<Utc>>,
        #[arg(long = "type")]
        event_type: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },
    /// Mark an event as completed
    Complete { id: String },
    /// Delete an event
    Remove {
        id: String,
        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },
}

/// A form whose fields are given on the command line
#[derive(Default)]
struct ArgsForm {
    title: Option<String>,
    date: Option<DateTime<Utc>>,
    event_type: Option<String>,
    description: Option<String>,
}

#[async_trait]
impl EventForm for ArgsForm {
    async fn open(&self, request: FormRequest) -> FormOutcome {
        let prefilled = request.event.as_ref().map(EventDraft::from_event);

        let date = match self.date.or_else(|| prefilled.as_ref().map(|draft| draft.date)) {
            Some(date) => date,
            None => return FormOutcome::Cancelled,
        };
        let title = self.title.clone()
            .or_else(|| prefilled.as_ref().map(|draft| draft.title.clone()))
            .unwrap_or_default();
        let description = self.description.clone()
            .or_else(|| prefilled.as_ref().and_then(|draft| draft.description.clone()));
        let event_type = self.event_type.clone().unwrap_or(request.event_type);

        FormOutcome::Submitted(EventDraft { title, date, description, event_type })
    }
}

fn parse_date(input: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M")
        .map(|naive| Utc.from_utc_datetime(&naive))
        .map_err(|err| format!("Invalid date {:?}: {}", input, err))
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), StoreError> {
    if let Some(data_dir) = cli.data_dir {
        *config::DATA_FOLDER.lock().unwrap() = data_dir;
    }

    let command = cli.command.unwrap_or(Command::List);
    let form = match &command {
        Command::Edit { title, date, event_type, description, .. } => ArgsForm {
            title: title.clone(),
            date: *date,
            event_type: event_type.clone(),
            description: description.clone(),
        },
        Command::Add { title, date, description, .. } => ArgsForm {
            title: Some(title.clone()),
            date: Some(*date),
            event_type: None,
            description: description.clone(),
        },
        _ => ArgsForm::default(),
    };

    let database = LocalDatabase::calendar_events();
    log::info!("Using database {:?}", database.backing_file());
    let store = Store::new(Arc::new(database));
    let controller = CalendarController::new(store.clone(), form);

    let mut actions = store.subscribe_actions();
    let load = controller.load()?;
    wait_for_success(&mut actions, &load).await?;

    let intent = match &command {
        Command::List => None,
        Command::Add { event_type, .. } => controller.add_event(event_type).await?,
        Command::Edit { id, .. } => controller.edit_event(&EventId::from(id.as_str())).await?,
        Command::Complete { id } => controller.complete_event(&EventId::from(id.as_str()))?,
        Command::Remove { id, yes } => {
            let confirmed = *yes || confirm(&format!("Are you sure you want to delete event {}?", id))?;
            controller.remove_event(&EventId::from(id.as_str()), confirmed)?
        },
    };

    match intent {
        Some(intent) => wait_for_success(&mut actions, &intent).await?,
        None if matches!(command, Command::List) => {},
        None => println!("Nothing to do."),
    }

    let entries = store.select(select_day_entries);
    calendar_store::utils::print_day_entries(&entries);
    Ok(())
}

/// Wait for the outcome of `intent`, and turn failure outcomes into errors
async fn wait_for_success(actions: &mut ActionReceiver, intent: &Dispatched) -> Result<(), StoreError> {
    let outcome = wait_for_outcome(actions, intent.ticket).await?;
    match outcome.error() {
        Some(err) => Err(format!("{}: {}", outcome.label(), err).into()),
        None => Ok(()),
    }
}

fn confirm(question: &str) -> Result<bool, StoreError> {
    use std::io::Write;

    print!("{} [y/N] ", question);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
