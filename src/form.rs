//! The boundary with the event form, that lets users fill in event details

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::event::Event;
use crate::StoreError;

/// The fields a user fills in when adding or editing an event
#[derive(Clone, Debug, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub date: DateTime<Utc>,
    pub description: Option<String>,
    pub event_type: String,
}

impl EventDraft {
    /// Pre-fill a form from an existing event
    pub fn from_event(event: &Event) -> Self {
        Self {
            title: event.title().to_string(),
            date: *event.date(),
            description: event.description().map(|d| d.to_string()),
            event_type: event.event_type().to_string(),
        }
    }

    /// Check the draft can become an event
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.title.trim().is_empty() {
            return Err("Title is required".into());
        }
        if self.event_type.trim().is_empty() {
            return Err("Type is required".into());
        }
        Ok(())
    }
}

/// What the form is opened for
#[derive(Clone, Debug)]
pub struct FormRequest {
    /// The category of the event (pre-filled, lowercased, for new events)
    pub event_type: String,
    /// The event being edited, if any
    pub event: Option<Event>,
}

impl FormRequest {
    pub fn for_new_event(event_type: &str) -> Self {
        Self { event_type: event_type.to_lowercase(), event: None }
    }

    pub fn for_edition(event: &Event) -> Self {
        Self { event_type: event.event_type().to_string(), event: Some(event.clone()) }
    }

    pub fn is_edition(&self) -> bool {
        self.event.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum FormOutcome {
    Submitted(EventDraft),
    Cancelled,
}

/// Something that asks the user for event details (a dialog, a command line...)
#[async_trait]
pub trait EventForm: Send + Sync {
    async fn open(&self, request: FormRequest) -> FormOutcome;
}
