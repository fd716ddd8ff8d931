//! Durable mirror of the favorites and recently-played lists
//!
//! Storage is abstracted as a string key-value store. Each list lives in
//! its own record and is rewritten whole on every change.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::storage::{FAVORITES_KEY, RECENT_KEY};
use crate::error::{AirwaveError, Result};

use super::lists::{Favorites, RecentList};
use super::station::Station;

/// Durable string-keyed storage
pub trait KeyValueStore {
    /// Read a record. `Ok(None)` means the record does not exist.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a record
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-memory store, for tests and sessions that should leave no trace
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record directly
    pub fn with_record(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.records.insert(key.into(), value.into());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.records.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.records.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Reads and writes the library records through a `KeyValueStore`
pub struct Persistence<S> {
    store: S,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load favorites. Absent or unreadable records yield an empty list.
    pub fn load_favorites(&self) -> Favorites {
        Favorites::from_stations(self.load_stations(FAVORITES_KEY))
    }

    /// Load recently played. Absent or unreadable records yield an empty list.
    pub fn load_recent(&self) -> RecentList {
        RecentList::from_stations(self.load_stations(RECENT_KEY))
    }

    pub fn save_favorites(&mut self, favorites: &Favorites) -> Result<()> {
        self.save(FAVORITES_KEY, favorites)
    }

    pub fn save_recent(&mut self, recent: &RecentList) -> Result<()> {
        self.save(RECENT_KEY, recent)
    }

    fn load_stations(&self, key: &str) -> Vec<Station> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(key, "no stored record");
                return Vec::new();
            }
            Err(e) => {
                warn!(key, error = %e, "storage read failed, starting empty");
                return Vec::new();
            }
        };

        if raw.trim().is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<Vec<Station>>(&raw) {
            Ok(stations) => stations,
            Err(e) => {
                warn!(key, error = %e, "malformed stored record, starting empty");
                Vec::new()
            }
        }
    }

    fn save<T: Serialize>(&mut self, key: &str, value: &T) -> Result<()> {
        let json = serde_json::to_string(value)?;
        self.store
            .set(key, &json)
            .map_err(|e| {
                let detail = match e {
                    AirwaveError::Storage(msg) => msg,
                    other => other.to_string(),
                };
                AirwaveError::Storage(format!("cannot write '{key}': {detail}"))
            })
    }
}
