//! User actions of a calendar view, wired to a store

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use calendar_store::controller::CalendarController;
use calendar_store::database::MemoryDatabase;
use calendar_store::form::{EventDraft, EventForm, FormOutcome, FormRequest};
use calendar_store::selectors::select_day_entries;
use calendar_store::store::{wait_for_outcome, ActionReceiver, Dispatched};
use calendar_store::{Action, Event, EventId, Store};

/// A form that answers with a preset outcome, and remembers what it has been opened for
struct ScriptedForm {
    outcome: FormOutcome,
    requests: Arc<Mutex<Vec<FormRequest>>>,
}

#[async_trait]
impl EventForm for ScriptedForm {
    async fn open(&self, request: FormRequest) -> FormOutcome {
        self.requests.lock().unwrap().push(request);
        self.outcome.clone()
    }
}

fn date(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn draft(title: &str) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        date: date("2024-06-02T07:30:00Z"),
        description: Some("Easy pace".to_string()),
        event_type: "training".to_string(),
    }
}

async fn controller_with(events: &[Event], outcome: FormOutcome) -> (CalendarController<ScriptedForm>, Arc<Mutex<Vec<FormRequest>>>) {
    let _ = env_logger::builder().is_test(true).try_init();

    let store = Store::new(Arc::new(MemoryDatabase::with_events(events).unwrap()));
    store.dispatch_and_wait(Action::Load).await.unwrap();

    let requests = Arc::new(Mutex::new(Vec::new()));
    let form = ScriptedForm { outcome, requests: requests.clone() };
    (CalendarController::new(store, form), requests)
}

async fn wait_for(actions: &mut ActionReceiver, intent: &Dispatched) -> Action {
    wait_for_outcome(actions, intent.ticket).await.unwrap()
}

fn existing() -> Event {
    Event::new(EventId::from("1714557600000"), "Marathon".to_string(), date("2024-05-01T10:00:00Z"), None, "race".to_string())
}

#[tokio::test]
async fn add_from_the_form() {
    let (controller, requests) = controller_with(&[], FormOutcome::Submitted(draft("Long run"))).await;
    let mut actions = controller.store().subscribe_actions();

    let intent = controller.add_event("Training").await.unwrap().unwrap();
    let event = match &intent.action {
        Action::Add(event) => event.clone(),
        other => panic!("Unexpected intent {}", other),
    };
    assert_eq!(event.title(), "Long run");
    assert_eq!(event.completed(), false);
    assert_eq!(requests.lock().unwrap()[0].event_type, "training");
    assert!(requests.lock().unwrap()[0].is_edition() == false);

    let outcome = wait_for(&mut actions, &intent).await;
    assert!(matches!(outcome, Action::AddSucceeded(_)));
}

#[tokio::test]
async fn cancelled_forms_dispatch_nothing() {
    let (controller, _) = controller_with(&[existing()], FormOutcome::Cancelled).await;
    assert!(controller.add_event("race").await.unwrap().is_none());
    assert!(controller.edit_event(existing().id()).await.unwrap().is_none());
}

#[tokio::test]
async fn invalid_drafts_are_rejected() {
    let (controller, _) = controller_with(&[], FormOutcome::Submitted(draft("   "))).await;
    assert!(controller.add_event("race").await.is_err());
}

#[tokio::test]
async fn edit_keeps_the_identity() {
    let mut original = existing();
    original.set_completed(true);
    let (controller, requests) = controller_with(&[original.clone()], FormOutcome::Submitted(draft("Half marathon"))).await;
    let mut actions = controller.store().subscribe_actions();

    let intent = controller.edit_event(original.id()).await.unwrap().unwrap();
    wait_for(&mut actions, &intent).await;

    assert_eq!(requests.lock().unwrap()[0].event.as_ref(), Some(&original));
    let events = controller.store().get_state().events;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id(), original.id());
    assert_eq!(events[0].title(), "Half marathon");
    assert_eq!(events[0].completed(), true);
}

#[tokio::test]
async fn row_actions() {
    let (controller, _) = controller_with(&[existing()], FormOutcome::Cancelled).await;
    let id = existing().id().clone();
    let mut actions = controller.store().subscribe_actions();

    assert!(controller.complete_event(&EventId::from("unknown")).unwrap().is_none());
    assert!(controller.remove_event(&id, false).unwrap().is_none());

    let intent = controller.complete_event(&id).unwrap().unwrap();
    wait_for(&mut actions, &intent).await;
    let entries = controller.store().select(select_day_entries);
    assert_eq!(entries[0].completed, true);
    assert_eq!(entries[0].title, "Marathon (race)");

    // Completed events cannot be completed again
    assert!(controller.complete_event(&id).unwrap().is_none());

    let intent = controller.remove_event(&id, true).unwrap().unwrap();
    wait_for(&mut actions, &intent).await;
    assert!(controller.store().get_state().events.is_empty());
}
