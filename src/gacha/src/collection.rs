//! Collection state: draw counter and seen-set
//!
//! Updates are pure: each takes the current state by value and returns the
//! next one. Persisting the result is the caller's job (see
//! [`crate::engine::Gacha`] for the write-through wrapper).

use crate::catalog::{Catalog, CatalogItem, ItemId};
use crate::rarity::RarityTier;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Cumulative draw count and the set of item ids ever drawn
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionState {
    total_draws: u64,
    seen: BTreeSet<ItemId>,
}

/// Seen/total counts for one tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierProgress {
    pub tier: RarityTier,
    pub seen: usize,
    pub total: usize,
}

impl TierProgress {
    pub fn is_complete(&self) -> bool {
        self.seen == self.total
    }
}

impl CollectionState {
    /// Build a state from raw parts without checking it against a catalog
    pub fn from_parts(total_draws: u64, seen: impl IntoIterator<Item = ItemId>) -> Self {
        Self {
            total_draws,
            seen: seen.into_iter().collect(),
        }
    }

    /// Empty initial state
    pub fn reset() -> Self {
        Self::default()
    }

    /// Restore a persisted state against the current catalog.
    ///
    /// Ids the catalog no longer contains are dropped, and a counter lower
    /// than the number of seen items is raised to match it.
    pub fn rehydrate(raw: Self, catalog: &Catalog) -> Self {
        let Self {
            mut total_draws,
            mut seen,
        } = raw;

        let before = seen.len();
        seen.retain(|id| catalog.contains(id.as_str()));
        if seen.len() != before {
            tracing::warn!(
                dropped = before - seen.len(),
                "persisted collection referenced unknown items, dropping them"
            );
        }

        let seen_count = seen.len() as u64;
        if total_draws < seen_count {
            tracing::warn!(
                total_draws,
                seen = seen_count,
                "persisted draw count lower than seen items, raising it"
            );
            total_draws = seen_count;
        }

        Self { total_draws, seen }
    }

    /// Record one draw of `item`
    #[must_use]
    pub fn record_draw(mut self, item: &CatalogItem) -> Self {
        self.total_draws += 1;
        self.seen.insert(item.id.clone());
        self
    }

    pub fn total_draws(&self) -> u64 {
        self.total_draws
    }

    pub fn seen(&self) -> &BTreeSet<ItemId> {
        &self.seen
    }

    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }

    pub fn is_seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Fraction of the catalog seen so far (0.0-1.0)
    pub fn completion(&self, catalog: &Catalog) -> f64 {
        if catalog.is_empty() {
            return 0.0;
        }
        let seen = catalog
            .items()
            .iter()
            .filter(|item| self.is_seen(item.id.as_str()))
            .count();
        seen as f64 / catalog.len() as f64
    }

    /// Catalog items not drawn yet, in catalog order
    pub fn missing<'a>(&'a self, catalog: &'a Catalog) -> impl Iterator<Item = &'a CatalogItem> {
        catalog
            .items()
            .iter()
            .filter(move |item| !self.is_seen(item.id.as_str()))
    }

    /// Per-tier progress, least rare first. Tiers without catalog items are
    /// omitted.
    pub fn tiers_with_progress(&self, catalog: &Catalog) -> Vec<TierProgress> {
        RarityTier::ALL
            .into_iter()
            .filter_map(|tier| {
                let (seen, total) = catalog
                    .items_in_tier(tier)
                    .fold((0, 0), |(seen, total), item| {
                        let hit = usize::from(self.is_seen(item.id.as_str()));
                        (seen + hit, total + 1)
                    });
                (total > 0).then_some(TierProgress { tier, seen, total })
            })
            .collect()
    }
}
