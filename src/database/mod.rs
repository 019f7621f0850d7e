//! Local, durable storage for calendar events
//!
//! A [`LocalDatabase`] is a named, versioned set of object stores, each of them holding JSON records keyed by one of their attributes.
//! A [`MemoryDatabase`] implements the same contract in memory, and can be tweaked to fail on demand (see [`MockBehaviour`](crate::mock_behaviour::MockBehaviour)).

pub mod local_database;
pub mod memory_database;

pub use local_database::LocalDatabase;
pub use memory_database::MemoryDatabase;

use serde_json::Value;

use crate::StoreError;

/// Extract the key of a record, i.e. the value of its `key_path` attribute
pub fn record_key(record: &Value, key_path: &str) -> Result<String, StoreError> {
    match record.get(key_path) {
        Some(Value::String(key)) => Ok(key.clone()),
        Some(Value::Number(key)) => Ok(key.to_string()),
        Some(other) => Err(format!("Record key {:?} is not a valid key (got {})", key_path, other).into()),
        None => Err(format!("Record has no {:?} key", key_path).into()),
    }
}
