//! Draw engine with write-through collection persistence
//!
//! [`Gacha`] owns the catalog, the single live [`CollectionState`], the
//! store and the random source. Every mutation is written to the store
//! before it is applied in memory, so the in-memory state never runs ahead
//! of what has been persisted.

use crate::catalog::{Catalog, CatalogError, CatalogItem};
use crate::collection::{CollectionState, TierProgress};
use crate::persist::{KeyValueStore, StateKeys, StateStore, StoreError};
use crate::rarity::RarityTier;
use crate::rng::RandomSource;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GachaError {
    #[error("Invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Failed to persist collection: {0}")]
    Store(#[from] StoreError),
}

/// A drawn item as presented to the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reveal<'a> {
    pub item: &'a CatalogItem,
    pub tier: RarityTier,
    /// First time this item was drawn since the last reset
    pub is_new: bool,
}

#[derive(Debug, Clone, Copy)]
struct CurrentReveal {
    index: usize,
    is_new: bool,
}

/// Draw engine bound to a store and a random source
pub struct Gacha<S, R> {
    catalog: Catalog,
    state: CollectionState,
    current: Option<CurrentReveal>,
    store: S,
    keys: StateKeys,
    rng: R,
}

impl<S: KeyValueStore, R: RandomSource> Gacha<S, R> {
    /// Rehydrate the collection from `store` (or start empty) and bind the
    /// engine to it
    pub fn open(catalog: Catalog, store: S, keys: StateKeys, rng: R) -> Self {
        let persisted = StateStore::load(&store, &keys);
        let state = CollectionState::rehydrate(persisted, &catalog);
        tracing::debug!(
            total_draws = state.total_draws(),
            seen = state.seen_count(),
            "collection loaded"
        );

        Self {
            catalog,
            state,
            current: None,
            store,
            keys,
            rng,
        }
    }

    /// Load the catalog file and open the engine
    pub fn load<P: AsRef<Path>>(
        catalog_path: P,
        store: S,
        keys: StateKeys,
        rng: R,
    ) -> Result<Self, GachaError> {
        let catalog = Catalog::load(catalog_path)?;
        Ok(Self::open(catalog, store, keys, rng))
    }

    /// Draw one item, record it and persist the new collection state
    pub fn draw(&mut self) -> Result<Reveal<'_>, GachaError> {
        let index = self.catalog.draw_index(&mut self.rng);
        let item = &self.catalog.items()[index];
        let is_new = !self.state.is_seen(item.id.as_str());

        let next = self.state.clone().record_draw(item);
        StateStore::save(&self.store, &self.keys, &next)?;

        tracing::debug!(
            id = %item.id,
            tier = %item.tier(),
            is_new,
            total_draws = next.total_draws(),
            "draw recorded"
        );

        self.state = next;
        self.current = Some(CurrentReveal { index, is_new });
        Ok(self.reveal(index, is_new))
    }

    /// Clear the collection and its stored representation
    pub fn reset(&mut self) -> Result<(), GachaError> {
        StateStore::clear(&self.store, &self.keys)?;
        tracing::info!(
            total_draws = self.state.total_draws(),
            "collection reset"
        );
        self.state = CollectionState::reset();
        self.current = None;
        Ok(())
    }
}

impl<S, R> Gacha<S, R> {
    /// Item revealed by the most recent draw in this session
    pub fn current_reveal(&self) -> Option<Reveal<'_>> {
        self.current.map(|c| self.reveal(c.index, c.is_new))
    }

    pub fn collection(&self) -> &CollectionState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Per-tier progress for the live collection
    pub fn progress(&self) -> Vec<TierProgress> {
        self.state.tiers_with_progress(&self.catalog)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn reveal(&self, index: usize, is_new: bool) -> Reveal<'_> {
        let item = &self.catalog.items()[index];
        Reveal {
            item,
            tier: item.tier(),
            is_new,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::{MemoryStore, StoreResult};
    use crate::rng::RngSource;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    fn catalog() -> Catalog {
        Catalog::from_json_str(
            r#"[
                {"id": "a", "name": "Alpha", "rarity": 0.1},
                {"id": "b", "name": "Bravo", "rarity": 0.6},
                {"id": "c", "name": "Charlie", "rarity": 0.92},
                {"id": "d", "name": "Delta", "rarity": 1.0}
            ]"#,
        )
        .unwrap()
    }

    /// Source that replays a fixed sequence of unit values
    fn replay(values: Vec<f64>) -> impl FnMut() -> f64 {
        let mut iter = values.into_iter().cycle();
        move || iter.next().unwrap_or(0.0)
    }

    #[test]
    fn test_draw_records_and_persists() {
        let store = MemoryStore::new();
        let mut gacha = Gacha::open(catalog(), &store, StateKeys::default(), replay(vec![0.0]));

        let reveal = gacha.draw().unwrap();
        assert_eq!(reveal.item.id.as_str(), "a");
        assert_eq!(reveal.tier, RarityTier::Common);
        assert!(reveal.is_new);

        assert_eq!(gacha.collection().total_draws(), 1);
        assert!(gacha.collection().is_seen("a"));
        assert_eq!(store.get("dropCount").unwrap().as_deref(), Some("1"));
        assert_eq!(store.get("seenSnoopys").unwrap().as_deref(), Some(r#"["a"]"#));
    }

    #[test]
    fn test_redraw_not_new() {
        let mut gacha = Gacha::open(
            catalog(),
            MemoryStore::new(),
            StateKeys::default(),
            replay(vec![0.0]),
        );
        assert!(gacha.draw().unwrap().is_new);
        assert!(!gacha.draw().unwrap().is_new);
        assert_eq!(gacha.collection().total_draws(), 2);
        assert_eq!(gacha.collection().seen_count(), 1);
    }

    #[test]
    fn test_current_reveal() {
        let mut gacha = Gacha::open(
            catalog(),
            MemoryStore::new(),
            StateKeys::default(),
            replay(vec![0.99]),
        );
        assert!(gacha.current_reveal().is_none());
        let drawn = gacha.draw().unwrap().item.id.clone();
        let current = gacha.current_reveal().unwrap();
        assert_eq!(current.item.id, drawn);
        assert!(current.is_new);
    }

    #[test]
    fn test_state_survives_restart() {
        let store = MemoryStore::new();
        let keys = StateKeys::default();
        {
            let mut gacha = Gacha::open(catalog(), &store, keys.clone(), RngSource::seeded(3));
            for _ in 0..25 {
                gacha.draw().unwrap();
            }
        }

        let reopened = Gacha::open(catalog(), &store, keys, RngSource::seeded(4));
        assert_eq!(reopened.collection().total_draws(), 25);
        assert!(reopened.collection().seen_count() >= 1);
        assert!(reopened.current_reveal().is_none());
    }

    #[test]
    fn test_reset_clears_store() {
        let store = MemoryStore::new();
        let keys = StateKeys::default();
        let mut gacha = Gacha::open(catalog(), &store, keys.clone(), RngSource::seeded(9));
        for _ in 0..10 {
            gacha.draw().unwrap();
        }

        gacha.reset().unwrap();
        assert_eq!(gacha.collection(), &CollectionState::default());
        assert!(gacha.current_reveal().is_none());
        assert!(store.is_empty());
        assert_eq!(StateStore::load(&store, &keys), CollectionState::default());
    }

    #[test]
    fn test_undrawable_item_never_drawn() {
        let mut gacha = Gacha::open(
            catalog(),
            MemoryStore::new(),
            StateKeys::default(),
            RngSource::seeded(11),
        );
        for _ in 0..2_000 {
            gacha.draw().unwrap();
        }
        assert!(!gacha.collection().is_seen("d"));
    }

    #[test]
    fn test_progress() {
        let mut gacha = Gacha::open(
            catalog(),
            MemoryStore::new(),
            StateKeys::default(),
            replay(vec![0.0]),
        );
        gacha.draw().unwrap();
        let progress = gacha.progress();
        assert_eq!(progress.len(), 3);
        assert_eq!(progress[0].tier, RarityTier::Common);
        assert_eq!(progress[0].seen, 1);
        assert_eq!(progress[2].tier, RarityTier::Legendary);
        assert_eq!(progress[2].seen, 0);
    }

    #[test]
    fn test_rehydrate_repairs_on_open() {
        let store = MemoryStore::new();
        store.set("dropCount", "0").unwrap();
        store.set("seenSnoopys", r#"["a", "gone"]"#).unwrap();
        let gacha = Gacha::open(catalog(), &store, StateKeys::default(), replay(vec![0.0]));
        assert_eq!(gacha.collection().total_draws(), 1);
        assert_eq!(gacha.collection().seen_count(), 1);
    }

    #[test]
    fn test_corrupt_store_starts_empty() {
        let store = MemoryStore::new();
        store.set("dropCount", "NaN").unwrap();
        let gacha = Gacha::open(catalog(), &store, StateKeys::default(), replay(vec![0.0]));
        assert_eq!(gacha.collection(), &CollectionState::default());
    }

    /// Store whose writes can be switched off
    #[derive(Default)]
    struct FlakyStore {
        inner: MemoryStore,
        fail_writes: AtomicBool,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Database("read-only".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(StoreError::Database("read-only".into()));
            }
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_failed_write_leaves_state_unchanged() {
        let store = FlakyStore::default();
        let mut gacha = Gacha::open(catalog(), &store, StateKeys::default(), replay(vec![0.0, 0.5]));
        gacha.draw().unwrap();
        let before = gacha.collection().clone();

        store.fail_writes.store(true, Ordering::SeqCst);
        assert!(matches!(gacha.draw(), Err(GachaError::Store(_))));
        assert_eq!(gacha.collection(), &before);
        assert_eq!(gacha.current_reveal().unwrap().item.id.as_str(), "a");

        assert!(gacha.reset().is_err());
        assert_eq!(gacha.collection(), &before);
    }

    /// Store that rejects counter writes only, after the seen-set write
    /// has already gone through
    #[derive(Default)]
    struct CounterFailStore {
        inner: MemoryStore,
        fail_counter: AtomicBool,
    }

    impl KeyValueStore for CounterFailStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StoreResult<()> {
            if key == "dropCount" && self.fail_counter.load(Ordering::SeqCst) {
                return Err(StoreError::Database("disk full".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> StoreResult<()> {
            self.inner.remove(key)
        }
    }

    #[test]
    fn test_partial_write_keeps_store_matching_memory() {
        let store = CounterFailStore::default();
        let keys = StateKeys::default();
        let mut gacha = Gacha::open(catalog(), &store, keys.clone(), replay(vec![0.0, 0.7]));
        gacha.draw().unwrap();

        store.fail_counter.store(true, Ordering::SeqCst);
        assert!(matches!(gacha.draw(), Err(GachaError::Store(_))));
        assert_eq!(&StateStore::load(&store, &keys), gacha.collection());

        store.fail_counter.store(false, Ordering::SeqCst);
        gacha.draw().unwrap();
        assert_eq!(&StateStore::load(&store, &keys), gacha.collection());
    }

    #[test]
    fn test_load_missing_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let result = Gacha::load(
            dir.path().join("missing.json"),
            MemoryStore::new(),
            StateKeys::default(),
            RngSource::seeded(1),
        );
        assert!(matches!(result, Err(GachaError::Catalog(CatalogError::Io(_)))));
    }

    #[test]
    fn test_shared_engine_loses_no_updates() {
        let store = MemoryStore::new();
        let gacha = Mutex::new(Gacha::open(
            catalog(),
            &store,
            StateKeys::default(),
            RngSource::seeded(5),
        ));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..250 {
                        gacha.lock().unwrap().draw().unwrap();
                    }
                });
            }
        });

        let gacha = gacha.into_inner().unwrap();
        assert_eq!(gacha.collection().total_draws(), 1_000);
        assert_eq!(store.get("dropCount").unwrap().as_deref(), Some("1000"));
    }
}
