//! A database that stores its records in a local file

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::config;
use crate::database::record_key;
use crate::event::Event;
use crate::traits::EventPersistence;
use crate::StoreError;

/// A named, versioned database, stored in a single JSON file.
///
/// It is lazily opened on its first transaction. Transactions are serialized, and every read-write transaction is committed atomically.
#[derive(Debug)]
pub struct LocalDatabase {
    backing_file: PathBuf,
    name: String,
    version: u32,
    store_name: String,

    /// Whether the database has already been opened (and upgraded if needed).
    /// This lock is held for the whole duration of a transaction.
    opened: Mutex<bool>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct DatabaseContent {
    version: u32,
    stores: BTreeMap<String, ObjectStore>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ObjectStore {
    key_path: String,
    records: BTreeMap<String, Value>,
}

impl ObjectStore {
    fn new(key_path: &str) -> Self {
        Self { key_path: key_path.to_string(), records: BTreeMap::new() }
    }

    fn clear(&mut self) {
        self.records.clear();
    }

    /// Insert a new record. This fails if a record with the same key already exists
    fn add(&mut self, record: Value) -> Result<(), StoreError> {
        let key = record_key(&record, &self.key_path)?;
        if self.records.contains_key(&key) {
            return Err(format!("A record with key {:?} already exists in this object store", key).into());
        }
        self.records.insert(key, record);
        Ok(())
    }
}

impl LocalDatabase {
    /// Describe a database that lives in `folder`. Nothing is read nor created until the first transaction.
    pub fn new(folder: &Path, name: &str, version: u32, store_name: &str) -> Self {
        let file_name = format!("{}.json", sanitize_filename::sanitize(name));
        Self {
            backing_file: folder.join(file_name),
            name: name.to_string(),
            version,
            store_name: store_name.to_string(),
            opened: Mutex::new(false),
        }
    }

    /// The calendar events database, in the configured [`DATA_FOLDER`](config::DATA_FOLDER)
    pub fn calendar_events() -> Self {
        let folder = config::DATA_FOLDER.lock().unwrap().clone();
        Self::new(&folder, config::DATABASE_NAME, config::DATABASE_VERSION, config::OBJECT_STORE_NAME)
    }

    pub fn backing_file(&self) -> &Path { &self.backing_file }
    pub fn name(&self) -> &str          { &self.name         }
    pub fn version(&self) -> u32        { self.version       }

    /// Returns every record of the object store, in key order
    pub async fn get_all(&self) -> Result<Vec<Value>, StoreError> {
        let mut opened = self.opened.lock().await;
        self.ensure_open(&mut opened).await?;

        let content = self.read_content().await?.unwrap_or_default();
        let store = content.stores.get(&self.store_name)
            .ok_or_else(|| format!("No object store named {:?} in database {:?}", self.store_name, self.name))?;
        log::trace!("Read {} records from {:?}", store.records.len(), self.store_name);
        Ok(store.records.values().cloned().collect())
    }

    /// Clear the object store, then insert every record, in a single transaction.
    ///
    /// In case any insertion fails, the transaction is aborted and nothing is written.
    pub async fn replace_all(&self, records: Vec<Value>) -> Result<(), StoreError> {
        let mut opened = self.opened.lock().await;
        self.ensure_open(&mut opened).await?;

        let mut content = self.read_content().await?.unwrap_or_default();
        let store = content.stores.get_mut(&self.store_name)
            .ok_or_else(|| format!("No object store named {:?} in database {:?}", self.store_name, self.name))?;

        store.clear();
        for record in records {
            if let Err(err) = store.add(record) {
                log::warn!("Aborting transaction on {:?}: {}", self.store_name, err);
                return Err(err);
            }
        }
        let n_records = store.records.len();

        self.write_content(&content).await?;
        log::debug!("Committed {} records to {:?}", n_records, self.backing_file);
        Ok(())
    }

    /// Open the database if this has not been done yet.
    /// The upgrade hook runs when the stored version is older than ours.
    async fn ensure_open(&self, opened: &mut bool) -> Result<(), StoreError> {
        if *opened {
            return Ok(());
        }

        let existing = self.read_content().await?;
        let stored_version = existing.as_ref().map(|content| content.version).unwrap_or(0);
        if stored_version > self.version {
            return Err(format!("Unable to open database {:?} with version {}: it already has version {}",
                self.name, self.version, stored_version).into());
        }

        if stored_version < self.version {
            log::info!("Upgrading database {:?} from version {} to {}", self.name, stored_version, self.version);
            let mut content = existing.unwrap_or_default();
            self.upgrade(&mut content);
            content.version = self.version;
            self.write_content(&content).await?;
        }

        *opened = true;
        Ok(())
    }

    /// Create the object store if it is missing. This is a no-op otherwise
    fn upgrade(&self, content: &mut DatabaseContent) {
        if content.stores.contains_key(&self.store_name) == false {
            log::debug!("Creating object store {:?}", self.store_name);
            content.stores.insert(self.store_name.clone(), ObjectStore::new(config::KEY_PATH));
        }
    }

    async fn read_content(&self) -> Result<Option<DatabaseContent>, StoreError> {
        match tokio::fs::read(&self.backing_file).await {
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(format!("Unable to open file {:?}: {}", self.backing_file, err).into()),
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        }
    }

    async fn write_content(&self, content: &DatabaseContent) -> Result<(), StoreError> {
        let serialized = serde_json::to_vec(content)?;
        commit_file(&self.backing_file, &serialized).await
    }
}

/// Replace `target`, so that readers either see the previous or the new content, never a mix of both.
///
/// Nothing is left behind in case of failure.
async fn commit_file(target: &Path, content: &[u8]) -> Result<(), StoreError> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let temp_file = target.with_extension(format!("{}.tmp", Uuid::new_v4().to_hyphenated()));
    let committed = match tokio::fs::write(&temp_file, content).await {
        Ok(()) => tokio::fs::rename(&temp_file, target).await,
        Err(err) => Err(err),
    };

    if let Err(err) = committed {
        if let Err(cleanup_err) = tokio::fs::remove_file(&temp_file).await {
            log::debug!("Unable to remove {:?}: {}", temp_file, cleanup_err);
        }
        return Err(format!("Unable to save file {:?}: {}", target, err).into());
    }
    Ok(())
}

#[async_trait]
impl EventPersistence for LocalDatabase {
    async fn load(&self) -> Result<Value, StoreError> {
        Ok(Value::Array(self.get_all().await?))
    }

    async fn save(&self, events: &[Event]) -> Result<(), StoreError> {
        let records = events.iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        self.replace_all(records).await
    }
}
