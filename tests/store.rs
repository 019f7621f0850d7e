//! Scenarios that go through the whole pipeline: dispatch, effects, persistence, reduction and derived views

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::json;

use calendar_store::database::{LocalDatabase, MemoryDatabase};
use calendar_store::mock_behaviour::MockBehaviour;
use calendar_store::selectors::select_all_events;
use calendar_store::store::{next_outcome, wait_for_outcome};
use calendar_store::{config, Action, CalendarState, Event, EventId, Store};

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn event(id: &str, title: &str) -> Event {
    Event::new(
        EventId::from(id),
        title.to_string(),
        "2024-05-01T10:00:00Z".parse().unwrap(),
        None,
        "race".to_string(),
    )
}

fn completed(mut event: Event) -> Event {
    event.set_completed(true);
    event
}

/// A store that already holds (and has persisted) these events
async fn populated_store(events: &[Event]) -> (Store, Arc<MemoryDatabase>) {
    let db = Arc::new(MemoryDatabase::with_events(events).unwrap());
    let store = Store::new(db.clone());
    let outcome = store.dispatch_and_wait(Action::Load).await.unwrap();
    assert!(matches!(outcome, Action::LoadSucceeded(_)));
    (store, db)
}

#[tokio::test]
async fn add_to_an_empty_store() {
    init_logs();
    let (store, db) = populated_store(&[]).await;

    let outcome = store.dispatch_and_wait(Action::Add(event("1", "Run"))).await.unwrap();
    assert!(matches!(outcome, Action::AddSucceeded(_)));

    assert_eq!(db.saved_snapshots(), vec![vec![event("1", "Run")]]);
    assert_eq!(store.select(|state| select_all_events(state).to_vec()), vec![event("1", "Run")]);
}

#[tokio::test]
async fn complete_an_event() {
    init_logs();
    let (store, db) = populated_store(&[event("1", "Run")]).await;

    let outcome = store.dispatch_and_wait(Action::Complete(EventId::from("1"))).await.unwrap();
    assert!(matches!(outcome, Action::CompleteSucceeded(_)));

    assert_eq!(db.saved_snapshots(), vec![vec![completed(event("1", "Run"))]]);
    assert_eq!(store.get_state().events[0].completed(), true);
}

#[tokio::test]
async fn remove_an_event() {
    init_logs();
    let (store, db) = populated_store(&[event("1", "Run"), event("2", "Swim")]).await;

    store.dispatch_and_wait(Action::Remove(EventId::from("1"))).await.unwrap();

    assert_eq!(db.saved_snapshots(), vec![vec![event("2", "Swim")]]);
    assert_eq!(store.get_state(), CalendarState::new(vec![event("2", "Swim")]));
}

#[tokio::test]
async fn update_an_event() {
    init_logs();
    let (store, db) = populated_store(&[event("1", "Run"), event("2", "Swim")]).await;

    store.dispatch_and_wait(Action::Update(event("2", "Open water swim"))).await.unwrap();

    let expected = vec![event("1", "Run"), event("2", "Open water swim")];
    assert_eq!(db.saved_snapshots(), vec![expected.clone()]);
    assert_eq!(store.get_state().events, expected);
}

#[tokio::test]
async fn garbage_is_loaded_as_an_empty_list() {
    init_logs();
    let db = Arc::new(MemoryDatabase::with_raw_content(json!("definitely not a list")));
    let store = Store::new(db);

    let outcome = store.dispatch_and_wait(Action::Load).await.unwrap();
    assert!(matches!(outcome, Action::LoadSucceeded(events) if events.is_empty()));
    assert!(store.get_state().events.is_empty());
}

#[tokio::test]
async fn failures_leave_the_state_unchanged() {
    init_logs();
    let mut db = MemoryDatabase::with_events(&[event("1", "Run")]).unwrap();
    let behaviour = Arc::new(Mutex::new(MockBehaviour::new()));
    db.set_mock_behaviour(Some(behaviour.clone()));
    let store = Store::new(Arc::new(db));
    store.dispatch_and_wait(Action::Load).await.unwrap();
    let before = store.get_state();

    *behaviour.lock().unwrap() = MockBehaviour::fail_now(4);
    for intent in vec![
        Action::Add(event("2", "Swim")),
        Action::Update(event("1", "Walk")),
        Action::Remove(EventId::from("1")),
        Action::Complete(EventId::from("1")),
    ] {
        let outcome = store.dispatch_and_wait(intent.clone()).await.unwrap();
        assert!(outcome.is_failure(), "{} should have failed", intent);
        assert_eq!(store.get_state(), before);
    }

    *behaviour.lock().unwrap() = MockBehaviour::fail_now(1);
    let outcome = store.dispatch_and_wait(Action::Load).await.unwrap();
    assert!(matches!(outcome, Action::LoadFailed(_)));
    assert_eq!(store.get_state(), before);
}

#[tokio::test]
async fn every_intent_gets_exactly_one_outcome() {
    init_logs();
    let (store, _db) = populated_store(&[event("1", "Run")]).await;
    let mut actions = store.subscribe_actions();

    let ticket = store.dispatch(Action::Complete(EventId::from("1"))).unwrap();
    let outcome = next_outcome(&mut actions).await.unwrap();
    assert_eq!(outcome.ticket, ticket);
    assert!(matches!(outcome.action, Action::CompleteSucceeded(_)));

    let ticket = store.dispatch(Action::Remove(EventId::from("1"))).unwrap();
    let outcome = next_outcome(&mut actions).await.unwrap();
    assert_eq!(outcome.ticket, ticket);
    assert!(matches!(outcome.action, Action::RemoveSucceeded(_)));

    // Nothing else is pending
    assert!(actions.try_recv().is_err());
}

#[tokio::test]
async fn overlapping_writes_race() {
    init_logs();
    let mut db = MemoryDatabase::new();
    db.set_save_delay(Some(Duration::from_millis(50)));
    let db = Arc::new(db);
    let store = Store::new(db.clone());
    let mut actions = store.subscribe_actions();

    // Both effects read the same (empty) snapshot
    let first = store.dispatch(Action::Add(event("1", "Run"))).unwrap();
    let second = store.dispatch(Action::Add(event("2", "Swim"))).unwrap();
    wait_for_outcome(&mut actions, first).await.unwrap();
    wait_for_outcome(&mut actions, second).await.unwrap();

    assert_eq!(db.saved_snapshots().len(), 2);
    for snapshot in db.saved_snapshots() {
        assert_eq!(snapshot.len(), 1);
    }
    // The in-memory store has both events, but the last write wins in the durable copy
    assert_eq!(store.get_state().events.len(), 2);
    assert_eq!(db.stored_events().unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_intents_get_their_own_outcome() {
    init_logs();
    let mut db = MemoryDatabase::new();
    let behaviour = Arc::new(Mutex::new(MockBehaviour::new()));
    db.set_mock_behaviour(Some(behaviour.clone()));
    db.set_save_delay(Some(Duration::from_millis(20)));
    let store = Store::new(Arc::new(db));
    store.dispatch_and_wait(Action::Load).await.unwrap();

    // One of both saves fails, the other one succeeds
    *behaviour.lock().unwrap() = MockBehaviour { save_behaviour: (0, 1), ..MockBehaviour::default() };
    let (first, second) = tokio::join!(
        store.dispatch_and_wait(Action::Add(event("1", "Run"))),
        store.dispatch_and_wait(Action::Add(event("2", "Swim"))),
    );

    let state = store.get_state();
    let mut n_failures = 0;
    for (outcome, id) in vec![(first.unwrap(), "1"), (second.unwrap(), "2")] {
        let in_state = state.events.iter().any(|e| e.id() == &EventId::from(id));
        match outcome {
            Action::AddSucceeded(added) => {
                assert_eq!(added.id(), &EventId::from(id));
                assert!(in_state);
            },
            Action::AddFailed(_) => {
                n_failures += 1;
                assert!(in_state == false);
            },
            other => panic!("Unexpected outcome {}", other),
        }
    }
    assert_eq!(n_failures, 1);
}

#[tokio::test]
async fn lagging_listeners_get_an_error() {
    init_logs();
    let (store, _db) = populated_store(&[]).await;
    let mut actions = store.subscribe_actions();

    for i in 0..300 {
        store.dispatch(Action::RemoveSucceeded(EventId::from(i.to_string()))).unwrap();
    }
    // Once this is done, every action above has been broadcast
    store.dispatch_and_wait(Action::Load).await.unwrap();

    assert!(next_outcome(&mut actions).await.is_err());
}

#[tokio::test]
async fn listeners_are_notified() {
    init_logs();
    let (store, _db) = populated_store(&[]).await;
    let mut receiver = store.subscribe();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_by_listener = seen.clone();
    let listener = store.on_change(move |state| {
        seen_by_listener.lock().unwrap().push(state.events.len());
    });

    store.dispatch_and_wait(Action::Add(event("1", "Run"))).await.unwrap();
    receiver.changed().await.unwrap();
    assert_eq!(receiver.borrow_and_update().events.len(), 1);

    store.dispatch_and_wait(Action::Add(event("2", "Swim"))).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    listener.abort();

    assert_eq!(seen.lock().unwrap().last(), Some(&2));
}

#[tokio::test]
async fn persisted_events_survive_a_restart() {
    init_logs();
    let folder = tempfile::tempdir().unwrap();
    let database = || LocalDatabase::new(folder.path(), config::DATABASE_NAME, config::DATABASE_VERSION, config::OBJECT_STORE_NAME);

    let store = Store::new(Arc::new(database()));
    store.dispatch_and_wait(Action::Load).await.unwrap();
    store.dispatch_and_wait(Action::Add(event("1", "Run"))).await.unwrap();
    store.dispatch_and_wait(Action::Add(event("2", "Swim"))).await.unwrap();
    store.dispatch_and_wait(Action::Complete(EventId::from("2"))).await.unwrap();
    drop(store);

    let store = Store::new(Arc::new(database()));
    store.dispatch_and_wait(Action::Load).await.unwrap();
    let mut events = store.get_state().events;
    events.sort_by(|a, b| a.id().cmp(b.id()));
    assert_eq!(events, vec![event("1", "Run"), completed(event("2", "Swim"))]);
}

#[tokio::test]
async fn outcomes_cannot_be_awaited() {
    let (store, _db) = populated_store(&[]).await;
    assert!(store.dispatch_and_wait(Action::RemoveSucceeded(EventId::from("1"))).await.is_err());
}
