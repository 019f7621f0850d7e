//! The effect pipeline: turns intents into persistence calls, and persistence results into outcomes

use std::sync::Arc;

use serde_json::Value;

use crate::action::Action;
use crate::event::Event;
use crate::reducer;
use crate::traits::EventPersistence;
use crate::ActionError;

/// Performs the I/O that intents ask for
#[derive(Clone)]
pub struct Effects {
    persistence: Arc<dyn EventPersistence>,
}

impl Effects {
    pub fn new(persistence: Arc<dyn EventPersistence>) -> Self {
        Self { persistence }
    }

    /// Run the effect of an intent, given the events the store held when the intent was dispatched.
    ///
    /// This performs exactly one persistence call, and returns exactly one outcome (success or failure).
    /// Mutating intents save the whole resulting collection.
    /// Returns `None` for actions that are not intents.
    pub async fn run(&self, intent: &Action, current_events: &[Event]) -> Option<Action> {
        let outcome = match intent {
            Action::Load => match self.persistence.load().await {
                Ok(raw) => Action::LoadSucceeded(coerce_events(raw)),
                Err(err) => Action::LoadFailed(ActionError::from(err)),
            },
            Action::Add(event) => {
                let events = reducer::append(current_events, event);
                self.save_then(&events, Action::AddSucceeded(event.clone()), Action::AddFailed).await
            },
            Action::Update(event) => {
                let events = reducer::replace_by_id(current_events, event);
                self.save_then(&events, Action::UpdateSucceeded(event.clone()), Action::UpdateFailed).await
            },
            Action::Remove(id) => {
                let events = reducer::remove_by_id(current_events, id);
                self.save_then(&events, Action::RemoveSucceeded(id.clone()), Action::RemoveFailed).await
            },
            Action::Complete(id) => {
                let events = reducer::complete_by_id(current_events, id);
                self.save_then(&events, Action::CompleteSucceeded(id.clone()), Action::CompleteFailed).await
            },
            _ => return None,
        };
        Some(outcome)
    }

    async fn save_then(&self, events: &[Event], success: Action, failure: fn(ActionError) -> Action) -> Action {
        log::trace!("Saving {} events", events.len());
        match self.persistence.save(events).await {
            Ok(()) => success,
            Err(err) => failure(ActionError::from(err)),
        }
    }
}

/// Turn whatever the storage returned into a list of events.
///
/// Anything that is not a list becomes an empty list. List elements that are not valid events are dropped.
pub fn coerce_events(raw: Value) -> Vec<Event> {
    let records = match raw {
        Value::Array(records) => records,
        other => {
            log::warn!("Stored events are not a list (got {}). Using an empty list instead", other);
            return Vec::new();
        },
    };

    records.into_iter()
        .filter_map(|record| match serde_json::from_value::<Event>(record.clone()) {
            Ok(event) => Some(event),
            Err(err) => {
                log::warn!("Ignoring invalid stored event {}: {}", record, err);
                None
            },
        })
        .collect()
}
