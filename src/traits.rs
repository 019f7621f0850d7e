use async_trait::async_trait;

use crate::event::Event;
use crate::StoreError;

/// A durable copy of the event collection.
///
/// This is treated as a cache of the in-memory store: it is always overwritten as a whole, there is no incremental diffing.
#[async_trait]
pub trait EventPersistence: Send + Sync {
    /// Returns every stored record, in storage-defined order.
    ///
    /// This returns raw records, because the storage is not guaranteed to hold well-formed events
    /// (see [`coerce_events`](crate::effects::coerce_events)).
    async fn load(&self) -> Result<serde_json::Value, StoreError>;

    /// Replace the whole stored collection with `events`.
    ///
    /// This either fully succeeds, or fails without any observable change.
    async fn save(&self, events: &[Event]) -> Result<(), StoreError>;
}
