//! Derived, read-only views over a [`CalendarState`]

use chrono::NaiveDate;
use csscolorparser::Color;

use crate::config;
use crate::event::{Event, EventId};
use crate::reducer::CalendarState;

/// All events, in insertion order
pub fn select_all_events(state: &CalendarState) -> &[Event] {
    &state.events
}

pub fn select_event_by_id<'a>(state: &'a CalendarState, id: &EventId) -> Option<&'a Event> {
    state.events.iter().find(|event| event.id() == id)
}

/// An all-day entry, the way a month grid displays an event
#[derive(Clone, Debug, PartialEq)]
pub struct DayEntry {
    pub id: EventId,
    /// `"<title> (<type>)"`
    pub title: String,
    pub day: NaiveDate,
    pub color: Color,
    pub event_type: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Events sorted by date (ties keep their insertion order), one entry on the (UTC) day of each event
pub fn select_day_entries(state: &CalendarState) -> Vec<DayEntry> {
    let mut sorted: Vec<&Event> = select_all_events(state).iter().collect();
    sorted.sort_by_key(|event| *event.date());

    sorted.into_iter()
        .map(|event| DayEntry {
            id: event.id().clone(),
            title: format!("{} ({})", event.title(), event.event_type()),
            day: event.date().date_naive(),
            color: category_color(event.event_type()),
            event_type: event.event_type().to_string(),
            description: event.description().map(|d| d.to_string()),
            completed: event.completed(),
        })
        .collect()
}

/// The display color of a category
pub fn category_color(event_type: &str) -> Color {
    let highlighted = config::HIGHLIGHTED_CATEGORY.lock().unwrap().to_lowercase();
    let color_string = if event_type.to_lowercase() == highlighted {
        config::HIGHLIGHT_COLOR.lock().unwrap().clone()
    } else {
        config::DEFAULT_COLOR.lock().unwrap().clone()
    };

    match csscolorparser::parse(&color_string) {
        Ok(color) => color,
        Err(err) => {
            log::warn!("Invalid display color {:?}: {}. Using black instead", color_string, err);
            Color::from_rgba_u8(0, 0, 0, 255)
        }
    }
}
