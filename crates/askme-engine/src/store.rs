//! Conversation store: the append-only log mirrored into a storage slot.
//!
//! The whole log is serialized as a JSON array of [`Exchange`] and written
//! to a single key on every append. Reads never fail: a missing or
//! unreadable slot is treated as an empty history and reset to `[]`.

use thiserror::Error;
use tracing::{info, warn};

use crate::exchange::Exchange;
use crate::storage::{KeyValueStorage, StorageError};

/// Default key of the persisted slot.
pub const DEFAULT_HISTORY_KEY: &str = "history";

/// Error type for store writes.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// In-memory conversation log plus the storage slot it mirrors to.
#[derive(Debug)]
pub struct ConversationStore<S> {
    storage: S,
    key: String,
    exchanges: Vec<Exchange>,
}

impl<S: KeyValueStorage> ConversationStore<S> {
    /// Open the store over `storage`, hydrating the log from `key`.
    pub fn open(storage: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            storage,
            key: key.into(),
            exchanges: Vec::new(),
        };
        store.exchanges = store.load();
        store
    }

    /// Read the persisted slot.
    ///
    /// Absent, unreadable, or unparsable data yields an empty log, and the
    /// slot is rewritten to an empty array.
    pub fn load(&self) -> Vec<Exchange> {
        let raw = match self.storage.get(&self.key) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read history slot");
                None
            }
        };

        if let Some(raw) = raw {
            match serde_json::from_str::<Vec<Exchange>>(&raw) {
                Ok(exchanges) => return exchanges,
                Err(e) => {
                    warn!(key = %self.key, error = %e, "Discarding malformed history");
                }
            }
        }

        if let Err(e) = self.storage.set(&self.key, "[]") {
            warn!(key = %self.key, error = %e, "Failed to reset history slot");
        }
        Vec::new()
    }

    /// Append an exchange and write the full log back to the slot.
    ///
    /// The in-memory log grows even when the write fails; there is no
    /// rollback.
    pub fn append(&mut self, exchange: Exchange) -> Result<&[Exchange], StoreError> {
        self.exchanges.push(exchange);
        let json = serde_json::to_string(&self.exchanges)?;
        self.storage.set(&self.key, &json)?;
        info!(count = self.exchanges.len(), "Appended exchange");
        Ok(&self.exchanges)
    }

    /// The current in-memory log, oldest first.
    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    /// Key of the persisted slot.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }
}
