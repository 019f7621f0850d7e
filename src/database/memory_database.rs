//! A database that only lives in memory, mostly useful for tests

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::config;
use crate::database::record_key;
use crate::event::Event;
use crate::mock_behaviour::MockBehaviour;
use crate::traits::EventPersistence;
use crate::StoreError;

/// An in-memory [`EventPersistence`], that behaves like a [`LocalDatabase`](crate::database::LocalDatabase) with a single object store.
///
/// It can be told to fail (see [`MockBehaviour`]) or to be slow, and it records every snapshot it has been asked to save.
#[derive(Debug)]
pub struct MemoryDatabase {
    content: Mutex<Value>,
    saved_snapshots: Mutex<Vec<Vec<Event>>>,

    mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>,
    save_delay: Option<Duration>,
}

impl Default for MemoryDatabase {
    fn default() -> Self {
        Self::with_raw_content(Value::Array(Vec::new()))
    }
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a database that already holds these events
    pub fn with_events(events: &[Event]) -> Result<Self, StoreError> {
        let db = Self::new();
        *db.content.lock().unwrap() = keyed_records(events)?;
        Ok(db)
    }

    /// Create a database whose storage holds anything, even something that is not a list of records
    pub fn with_raw_content(content: Value) -> Self {
        Self {
            content: Mutex::new(content),
            saved_snapshots: Mutex::new(Vec::new()),
            mock_behaviour: None,
            save_delay: None,
        }
    }

    pub fn set_mock_behaviour(&mut self, mock_behaviour: Option<Arc<Mutex<MockBehaviour>>>) {
        self.mock_behaviour = mock_behaviour;
    }

    /// Make every save wait for this duration before committing
    pub fn set_save_delay(&mut self, delay: Option<Duration>) {
        self.save_delay = delay;
    }

    /// Every collection that has been passed to `save` (including the failed ones), in call order
    pub fn saved_snapshots(&self) -> Vec<Vec<Event>> {
        self.saved_snapshots.lock().unwrap().clone()
    }

    /// The currently committed content
    pub fn raw_content(&self) -> Value {
        self.content.lock().unwrap().clone()
    }

    /// The currently committed events
    pub fn stored_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(serde_json::from_value(self.raw_content())?)
    }

    fn check_load(&self) -> Result<(), StoreError> {
        match &self.mock_behaviour {
            None => Ok(()),
            Some(behaviour) => behaviour.lock().unwrap().can_load(),
        }
    }

    fn check_save(&self) -> Result<(), StoreError> {
        match &self.mock_behaviour {
            None => Ok(()),
            Some(behaviour) => behaviour.lock().unwrap().can_save(),
        }
    }
}

/// Records keyed by ID, in key order, just like an object store would return them
fn keyed_records(events: &[Event]) -> Result<Value, StoreError> {
    let mut records = BTreeMap::new();
    for event in events {
        let record = serde_json::to_value(event)?;
        let key = record_key(&record, config::KEY_PATH)?;
        if records.insert(key.clone(), record).is_some() {
            return Err(format!("A record with key {:?} already exists in this object store", key).into());
        }
    }
    Ok(Value::Array(records.into_iter().map(|(_, record)| record).collect()))
}

#[async_trait]
impl EventPersistence for MemoryDatabase {
    async fn load(&self) -> Result<Value, StoreError> {
        self.check_load()?;
        Ok(self.raw_content())
    }

    async fn save(&self, events: &[Event]) -> Result<(), StoreError> {
        self.saved_snapshots.lock().unwrap().push(events.to_vec());

        if let Some(delay) = self.save_delay {
            tokio::time::sleep(delay).await;
        }
        self.check_save()?;

        let records = keyed_records(events)?;
        *self.content.lock().unwrap() = records;
        Ok(())
    }
}
