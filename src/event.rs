//! Calendar events

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::form::EventDraft;

/// The identifier of an [`Event`].
///
/// This is an opaque token, chosen by the caller when the event is created, and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId {
    content: String,
}

impl EventId {
    /// Build a timestamp-derived identifier (milliseconds since the Unix epoch)
    pub fn from_timestamp(timepoint: DateTime<Utc>) -> Self {
        Self { content: timepoint.timestamp_millis().to_string() }
    }

    /// Build an identifier from the current time
    pub fn generate() -> Self {
        Self::from_timestamp(Utc::now())
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl From<String> for EventId {
    fn from(content: String) -> Self {
        Self { content }
    }
}
impl From<&str> for EventId {
    fn from(content: &str) -> Self {
        Self { content: content.to_string() }
    }
}
impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}



/// A dated calendar event
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique within a collection, immutable after creation
    id: EventId,
    /// The display name of the event
    title: String,
    /// The scheduled instant (ISO 8601 when serialized)
    date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    /// A free-form category label (e.g. "race", "training"), only used for display
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    completed: bool,
}

impl Event {
    /// Create a new, uncompleted event
    pub fn new(id: EventId, title: String, date: DateTime<Utc>, description: Option<String>, event_type: String) -> Self {
        Self {
            id,
            title,
            date,
            description,
            event_type,
            completed: false,
        }
    }

    /// Create a brand new event from a submitted form.
    /// This picks a new (timestamp-derived) ID.
    pub fn from_draft(draft: &EventDraft) -> Self {
        Self::new(
            EventId::generate(),
            draft.title.clone(),
            draft.date,
            draft.description.clone(),
            draft.event_type.clone(),
        )
    }

    /// Returns a copy of this event, with the fields of an edit form applied.
    ///
    /// The ID and the completion status are kept.
    pub fn with_draft(&self, draft: &EventDraft) -> Self {
        Self {
            id: self.id.clone(),
            title: draft.title.clone(),
            date: draft.date,
            description: draft.description.clone(),
            event_type: draft.event_type.clone(),
            completed: self.completed,
        }
    }

    pub fn id(&self) -> &EventId                { &self.id          }
    pub fn title(&self) -> &str                 { &self.title       }
    pub fn date(&self) -> &DateTime<Utc>        { &self.date        }
    pub fn description(&self) -> Option<&str>   { self.description.as_deref() }
    pub fn event_type(&self) -> &str            { &self.event_type  }
    pub fn completed(&self) -> bool             { self.completed    }

    pub fn set_completed(&mut self, completed: bool) {
        self.completed = completed;
    }
}
