//! Support for library configuration options

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;

/// The name of the local database that holds the events
pub const DATABASE_NAME: &str = "CalendarDB";
/// The schema version of the local database. Opening a database with a higher version runs the upgrade hook.
pub const DATABASE_VERSION: u32 = 1;
/// The object store that holds the events, inside [`DATABASE_NAME`]
pub const OBJECT_STORE_NAME: &str = "calendar_events";
/// The record attribute the object store is keyed by
pub const KEY_PATH: &str = "id";

/// Environment variable that overrides the default [`DATA_FOLDER`]
pub const DATA_FOLDER_ENV: &str = "CALENDAR_DATA_DIR";

/// Folder where local databases are created.
/// Feel free to override it when initing this library.
pub static DATA_FOLDER: Lazy<Arc<Mutex<PathBuf>>> = Lazy::new(|| {
    let folder = std::env::var_os(DATA_FOLDER_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("calendar_data"));
    Arc::new(Mutex::new(folder))
});

/// The category that is displayed with [`HIGHLIGHT_COLOR`] (case-insensitive)
pub static HIGHLIGHTED_CATEGORY: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("race".to_string())));
/// A CSS color string
pub static HIGHLIGHT_COLOR: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("#ff4081".to_string())));
/// A CSS color string, used for every other category
pub static DEFAULT_COLOR: Lazy<Arc<Mutex<String>>> = Lazy::new(|| Arc::new(Mutex::new("#3f51b5".to_string())));
