//! This crate manages a local collection of calendar events.
//!
//! The [`Store`](store::Store) holds the events, and is the single source of truth. It is only changed by dispatching [`Action`]s:
//! * intents (e.g. [`Action::Add`]) are handled by the [`effects`], that persist the resulting collection and emit an outcome,
//! * outcomes (e.g. [`Action::AddSucceeded`]) are applied to the state by the pure [`reducer`].
//!
//! Derived views of the state are computed by the [`selectors`].
//!
//! Events are durably stored using an [`EventPersistence`](traits::EventPersistence), usually a [`LocalDatabase`](database::LocalDatabase).
//! The [`controller`] module wires the user actions of a calendar view (add, edit, complete, remove) to the store.

use std::error::Error;
use std::sync::Arc;

pub mod traits;

mod event;
pub use event::{Event, EventId};
pub mod action;
pub use action::Action;
pub mod reducer;
pub use reducer::CalendarState;
pub mod selectors;
pub mod effects;
pub mod store;
pub use store::Store;

pub mod database;
pub mod form;
pub mod controller;

pub mod config;
pub mod mock_behaviour;
pub mod utils;

/// The error type of fallible operations of this crate
pub type StoreError = Box<dyn Error + Send + Sync>;
/// The error carried by failure outcomes. It can be shared between every listener of the store.
pub type ActionError = Arc<dyn Error + Send + Sync>;
