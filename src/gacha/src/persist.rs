//! Key-value persistence for collection state.
//!
//! The engine depends only on string get/set/remove. State is stored under
//! two keys: the draw counter as a decimal string and the seen-set as a JSON
//! array of ids. Reads never fail: absent keys mean empty values, and any
//! corrupt value falls back to the empty state.

use crate::catalog::ItemId;
use crate::collection::CollectionState;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// Error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// String key-value store backing the collection state
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;

    fn set(&self, key: &str, value: &str) -> StoreResult<()>;

    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &S {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Storage keys for the two persisted fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateKeys {
    pub draw_count: String,
    pub seen_ids: String,
}

impl StateKeys {
    pub const DEFAULT_DRAW_COUNT: &'static str = "dropCount";
    pub const DEFAULT_SEEN_IDS: &'static str = "seenSnoopys";

    pub fn new(draw_count: impl Into<String>, seen_ids: impl Into<String>) -> Self {
        Self {
            draw_count: draw_count.into(),
            seen_ids: seen_ids.into(),
        }
    }
}

impl Default for StateKeys {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DRAW_COUNT, Self::DEFAULT_SEEN_IDS)
    }
}

/// Why a persisted state could not be read
#[derive(Debug, Error)]
enum CorruptState {
    #[error("store read failed: {0}")]
    Read(#[from] StoreError),

    #[error("draw count {0:?} is not a non-negative integer")]
    Counter(String),

    #[error("seen ids are not a JSON array of ids: {0}")]
    SeenIds(#[from] serde_json::Error),
}

/// Codec between [`CollectionState`] and a [`KeyValueStore`]
pub struct StateStore;

impl StateStore {
    /// Read the persisted state. Never fails: a corrupt or unreadable value
    /// yields the empty state.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S, keys: &StateKeys) -> CollectionState {
        match Self::try_load(store, keys) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!("persisted collection unreadable, starting empty: {}", e);
                CollectionState::default()
            }
        }
    }

    fn try_load<S: KeyValueStore + ?Sized>(
        store: &S,
        keys: &StateKeys,
    ) -> Result<CollectionState, CorruptState> {
        let total_draws = match store.get(&keys.draw_count)? {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| CorruptState::Counter(raw.clone()))?,
            None => 0,
        };

        let seen: Vec<ItemId> = match store.get(&keys.seen_ids)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };

        Ok(CollectionState::from_parts(total_draws, seen))
    }

    /// Write both fields: the seen-set first, then the counter. If the
    /// counter write fails, the previous seen-set is put back so the stored
    /// pair still matches the state the caller holds.
    pub fn save<S: KeyValueStore + ?Sized>(
        store: &S,
        keys: &StateKeys,
        state: &CollectionState,
    ) -> StoreResult<()> {
        let seen = serde_json::to_string(state.seen())?;
        let previous_seen = store.get(&keys.seen_ids)?;

        store.set(&keys.seen_ids, &seen)?;
        if let Err(e) = store.set(&keys.draw_count, &state.total_draws().to_string()) {
            let rollback = match &previous_seen {
                Some(previous) => store.set(&keys.seen_ids, previous),
                None => store.remove(&keys.seen_ids),
            };
            if let Err(rollback_err) = rollback {
                tracing::warn!("could not restore seen ids after failed save: {}", rollback_err);
            }
            return Err(e);
        }
        Ok(())
    }

    /// Remove both fields
    pub fn clear<S: KeyValueStore + ?Sized>(store: &S, keys: &StateKeys) -> StoreResult<()> {
        store.remove(&keys.seen_ids)?;
        store.remove(&keys.draw_count)?;
        Ok(())
    }
}
