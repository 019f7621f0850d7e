use std::sync::Arc;

use calendar_store::database::LocalDatabase;
use calendar_store::selectors::select_day_entries;
use calendar_store::{Action, Event, EventId, Store};

const DATA_FOLDER: &str = "example_data";

#[tokio::main]
async fn main() {
    env_logger::init();

    *calendar_store::config::DATA_FOLDER.lock().unwrap() = DATA_FOLDER.into();
    let store = Store::new(Arc::new(LocalDatabase::calendar_events()));

    if let Err(err) = run(&store).await {
        log::error!("Unable to update the calendar: {}", err);
    }

    println!("---- events -----");
    calendar_store::utils::print_day_entries(&store.select(select_day_entries));
}

async fn run(store: &Store) -> Result<(), calendar_store::StoreError> {
    let outcome = store.dispatch_and_wait(Action::Load).await?;
    if let Some(err) = outcome.error() {
        return Err(format!("Invalid database: {}", err).into());
    }
    println!("---- before -----");
    calendar_store::utils::print_day_entries(&store.select(select_day_entries));

    let event = Event::new(
        EventId::generate(),
        "Park run".to_string(),
        chrono::Utc::now(),
        Some("5km, easy pace".to_string()),
        "race".to_string(),
    );
    let id = event.id().clone();
    for intent in vec![Action::Add(event), Action::Complete(id)] {
        let outcome = store.dispatch_and_wait(intent).await?;
        if let Some(err) = outcome.error() {
            return Err(format!("{}: {}", outcome.label(), err).into());
        }
    }
    Ok(())
}
