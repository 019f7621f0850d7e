//! Actions: declarations of requested changes (intents) and of their outcomes

use std::fmt::{Display, Formatter};

use crate::event::{Event, EventId};
use crate::ActionError;

/// Everything that can be dispatched to a [`Store`](crate::store::Store).
///
/// Intents (`Load`, `Add`...) are emitted by the presentation layer and handled by the effects.
/// Every intent is answered by exactly one outcome (`...Succeeded` or `...Failed`), and only outcomes change the state.
#[derive(Clone, Debug)]
pub enum Action {
    Load,
    LoadSucceeded(Vec<Event>),
    LoadFailed(ActionError),

    Add(Event),
    AddSucceeded(Event),
    AddFailed(ActionError),

    Update(Event),
    UpdateSucceeded(Event),
    UpdateFailed(ActionError),

    Remove(EventId),
    RemoveSucceeded(EventId),
    RemoveFailed(ActionError),

    Complete(EventId),
    CompleteSucceeded(EventId),
    CompleteFailed(ActionError),
}

impl Action {
    /// A human-readable tag for this kind of action
    pub fn label(&self) -> &'static str {
        match self {
            Action::Load => "[Calendar] Load Events",
            Action::LoadSucceeded(_) => "[Calendar] Load Events Success",
            Action::LoadFailed(_) => "[Calendar] Load Events Failure",
            Action::Add(_) => "[Calendar] Add Event",
            Action::AddSucceeded(_) => "[Calendar] Add Event Success",
            Action::AddFailed(_) => "[Calendar] Add Event Failure",
            Action::Update(_) => "[Calendar] Update Event",
            Action::UpdateSucceeded(_) => "[Calendar] Update Event Success",
            Action::UpdateFailed(_) => "[Calendar] Update Event Failure",
            Action::Remove(_) => "[Calendar] Remove Event",
            Action::RemoveSucceeded(_) => "[Calendar] Remove Event Success",
            Action::RemoveFailed(_) => "[Calendar] Remove Event Failure",
            Action::Complete(_) => "[Calendar] Complete Event",
            Action::CompleteSucceeded(_) => "[Calendar] Complete Event Success",
            Action::CompleteFailed(_) => "[Calendar] Complete Event Failure",
        }
    }

    /// Whether this action asks for some work to be done (i.e. must be handled by the effects)
    pub fn is_intent(&self) -> bool {
        match self {
            Action::Load | Action::Add(_) | Action::Update(_) | Action::Remove(_) | Action::Complete(_) => true,
            _ => false,
        }
    }

    pub fn is_outcome(&self) -> bool {
        self.is_intent() == false
    }

    pub fn is_failure(&self) -> bool {
        self.error().is_some()
    }

    /// Returns the underlying error, in case this is a failure outcome
    pub fn error(&self) -> Option<&ActionError> {
        match self {
            Action::LoadFailed(err)
            | Action::AddFailed(err)
            | Action::UpdateFailed(err)
            | Action::RemoveFailed(err)
            | Action::CompleteFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::LoadSucceeded(events) => write!(f, "{} ({} events)", self.label(), events.len()),
            Action::Add(event)
            | Action::AddSucceeded(event)
            | Action::Update(event)
            | Action::UpdateSucceeded(event) => write!(f, "{} ({})", self.label(), event.id()),
            Action::Remove(id)
            | Action::RemoveSucceeded(id)
            | Action::Complete(id)
            | Action::CompleteSucceeded(id) => write!(f, "{} ({})", self.label(), id),
            other => match other.error() {
                Some(err) => write!(f, "{}: {}", self.label(), err),
                None => write!(f, "{}", self.label()),
            },
        }
    }
}
