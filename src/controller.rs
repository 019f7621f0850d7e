//! Handlers for the user actions of a calendar view
//!
//! Each handler dispatches (at most) one intent to the store, and returns it with its ticket, so that the caller can wait for its outcome.

use crate::action::Action;
use crate::event::{Event, EventId};
use crate::form::{EventForm, FormOutcome, FormRequest};
use crate::selectors::select_event_by_id;
use crate::store::{Dispatched, Store};
use crate::StoreError;

pub struct CalendarController<F: EventForm> {
    store: Store,
    form: F,
}

impl<F: EventForm> CalendarController<F> {
    pub fn new(store: Store, form: F) -> Self {
        Self { store, form }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn load(&self) -> Result<Dispatched, StoreError> {
        self.dispatch(Action::Load)
    }

    /// Open the form for a new event of this category, and add it unless the form has been cancelled
    pub async fn add_event(&self, event_type: &str) -> Result<Option<Dispatched>, StoreError> {
        let draft = match self.form.open(FormRequest::for_new_event(event_type)).await {
            FormOutcome::Cancelled => {
                log::debug!("Event creation cancelled");
                return Ok(None);
            },
            FormOutcome::Submitted(draft) => draft,
        };
        draft.validate()?;

        self.dispatch(Action::Add(Event::from_draft(&draft))).map(Some)
    }

    /// Open the form for an existing event, and update it unless the form has been cancelled
    pub async fn edit_event(&self, id: &EventId) -> Result<Option<Dispatched>, StoreError> {
        let event = match self.find(id) {
            None => return Ok(None),
            Some(event) => event,
        };

        let draft = match self.form.open(FormRequest::for_edition(&event)).await {
            FormOutcome::Cancelled => {
                log::debug!("Edition of event {} cancelled", id);
                return Ok(None);
            },
            FormOutcome::Submitted(draft) => draft,
        };
        draft.validate()?;

        self.dispatch(Action::Update(event.with_draft(&draft))).map(Some)
    }

    /// Remove an event, provided the user has confirmed it
    pub fn remove_event(&self, id: &EventId, confirmed: bool) -> Result<Option<Dispatched>, StoreError> {
        if confirmed == false {
            log::debug!("Removal of event {} not confirmed", id);
            return Ok(None);
        }
        if self.find(id).is_none() {
            return Ok(None);
        }
        self.dispatch(Action::Remove(id.clone())).map(Some)
    }

    /// Mark an event as completed. Events that already are completed are left alone
    pub fn complete_event(&self, id: &EventId) -> Result<Option<Dispatched>, StoreError> {
        match self.find(id) {
            None => return Ok(None),
            Some(event) if event.completed() => {
                log::debug!("Event {} is already completed", id);
                return Ok(None);
            },
            Some(_) => {},
        }
        self.dispatch(Action::Complete(id.clone())).map(Some)
    }

    fn find(&self, id: &EventId) -> Option<Event> {
        let found = self.store.select(|state| select_event_by_id(state, id).cloned());
        if found.is_none() {
            log::warn!("No event with ID {}", id);
        }
        found
    }

    fn dispatch(&self, intent: Action) -> Result<Dispatched, StoreError> {
        let ticket = self.store.dispatch(intent.clone())?;
        Ok(Dispatched { ticket, action: intent })
    }
}
