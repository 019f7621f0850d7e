//! The pure state reduction of the event store

use crate::action::Action;
use crate::event::{Event, EventId};

/// The canonical in-memory collection of events, in insertion order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CalendarState {
    pub events: Vec<Event>,
}

impl CalendarState {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }
}

/// Compute the next state from the current state and one action.
///
/// Only success outcomes change the collection. Intents and failures return an unchanged copy.
pub fn reduce(state: &CalendarState, action: &Action) -> CalendarState {
    let events = match action {
        Action::LoadSucceeded(events) => events.clone(),
        Action::AddSucceeded(event) => append(&state.events, event),
        Action::UpdateSucceeded(event) => replace_by_id(&state.events, event),
        Action::RemoveSucceeded(id) => remove_by_id(&state.events, id),
        Action::CompleteSucceeded(id) => complete_by_id(&state.events, id),
        _ => return state.clone(),
    };
    CalendarState { events }
}

/// `events + [event]`
pub fn append(events: &[Event], event: &Event) -> Vec<Event> {
    let mut result = events.to_vec();
    result.push(event.clone());
    result
}

/// Replace the element that has the same ID as `event`. Unchanged if there is none.
pub fn replace_by_id(events: &[Event], event: &Event) -> Vec<Event> {
    events.iter()
        .map(|item| if item.id() == event.id() { event.clone() } else { item.clone() })
        .collect()
}

pub fn remove_by_id(events: &[Event], id: &EventId) -> Vec<Event> {
    events.iter()
        .filter(|item| item.id() != id)
        .cloned()
        .collect()
}

/// Mark the matching element as completed. Unchanged if there is none.
pub fn complete_by_id(events: &[Event], id: &EventId) -> Vec<Event> {
    events.iter()
        .map(|item| {
            let mut item = item.clone();
            if item.id() == id {
                item.set_completed(true);
            }
            item
        })
        .collect()
}
