//! # gacha
//!
//! Rarity-weighted collectible draws with a persistent collection.
//!
//! This library provides functionality to:
//! - Load an immutable item catalog from JSON or YAML
//! - Classify rarity scores into discrete tiers
//! - Draw items with inverse-rarity weighting from an injectable random source
//! - Track draw counts and the set of seen items, written through to a
//!   local key-value store after every mutation
//!
//! ## Example
//!
//! ```
//! use gacha::{Catalog, Gacha, MemoryStore, StateKeys};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let catalog = Catalog::from_json_str(
//!     r#"[
//!         {"id": "joe-cool", "name": "Joe Cool", "rarity": 0.2},
//!         {"id": "flying-ace", "name": "Flying Ace", "rarity": 0.95}
//!     ]"#,
//! )?;
//!
//! // Deterministic source for the example; production uses RngSource::thread()
//! let mut next = 0.0;
//! let rng = move || {
//!     next = (next + 0.37) % 1.0;
//!     next
//! };
//!
//! let mut gacha = Gacha::open(catalog, MemoryStore::new(), StateKeys::default(), rng);
//! let reveal = gacha.draw()?;
//! println!("Drew {} ({})", reveal.item.name, reveal.tier);
//!
//! assert_eq!(gacha.collection().total_draws(), 1);
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod collection;
pub mod draw;
pub mod engine;
pub mod persist;
pub mod rarity;
pub mod rng;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used items
#[doc(inline)]
pub use catalog::{Catalog, CatalogError, CatalogItem, ItemId};
#[doc(inline)]
pub use collection::{CollectionState, TierProgress};
#[doc(inline)]
pub use draw::{draw, item_weight, select_index, Odds};
#[doc(inline)]
pub use engine::{Gacha, GachaError, Reveal};
#[doc(inline)]
pub use persist::{
    KeyValueStore, MemoryStore, StateKeys, StateStore, StoreError, StoreResult,
};
#[doc(inline)]
pub use rarity::{classify, RarityTier};
#[doc(inline)]
pub use rng::{RandomSource, RngSource};
