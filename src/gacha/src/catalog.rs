//! Item catalog loading and validation
//!
//! The catalog is loaded once at startup and never modified. Loading
//! validates it up front so that every later draw is infallible.

use crate::draw::{item_weight, select_index, Odds};
use crate::rarity::{classify, RarityTier};
use crate::rng::RandomSource;
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Catalog is empty")]
    Empty,

    #[error("Duplicate item id: {0}")]
    DuplicateId(ItemId),

    #[error("Item {id} has a non-finite rarity score")]
    NonFiniteScore { id: ItemId },

    #[error("Catalog has no drawable items (total draw weight is zero)")]
    NoDrawableItems,

    #[error("Failed to parse catalog {source_name}: {message}")]
    Parse {
        source_name: String,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stable item identifier.
///
/// Catalog files may use strings or integers; both normalize to a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ItemId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Signed(n) => Self(n.to_string()),
            RawId::Unsigned(n) => Self(n.to_string()),
        })
    }
}

/// A collectible item definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ItemId,
    pub name: String,

    /// Rarity score in `[0, 1]`; higher is rarer
    #[serde(rename = "rarity", alias = "rarityScore", alias = "rarity_score")]
    pub rarity_score: f64,

    // Display payload, passed through untouched
    #[serde(
        rename = "image",
        alias = "imageRef",
        alias = "image_ref",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub image_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mood: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
}

impl CatalogItem {
    pub fn new(id: impl Into<ItemId>, name: impl Into<String>, rarity_score: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            rarity_score,
            image_ref: None,
            mood: None,
            quote: None,
        }
    }

    /// Rarity tier, recomputed from the score
    pub fn tier(&self) -> RarityTier {
        classify(self.rarity_score)
    }

    /// Draw weight (`1 - rarity_score`)
    pub fn weight(&self) -> f64 {
        item_weight(self.rarity_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Yaml,
}

impl Format {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Format::Yaml
            }
            _ => Format::Json,
        }
    }
}

/// Validated, immutable item catalog with precomputed draw weights
#[derive(Debug, Clone)]
pub struct Catalog {
    items: Vec<CatalogItem>,
    weights: Vec<f64>,
    total_weight: f64,
    by_id: HashMap<ItemId, usize>,
}

impl Catalog {
    /// Validate items and build the catalog
    pub fn new(items: Vec<CatalogItem>) -> Result<Self, CatalogError> {
        if items.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut by_id = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            if !item.rarity_score.is_finite() {
                return Err(CatalogError::NonFiniteScore {
                    id: item.id.clone(),
                });
            }
            if !(0.0..=1.0).contains(&item.rarity_score) {
                tracing::warn!(
                    id = %item.id,
                    score = item.rarity_score,
                    "rarity score outside [0, 1], clamping"
                );
            }
            if by_id.insert(item.id.clone(), i).is_some() {
                return Err(CatalogError::DuplicateId(item.id.clone()));
            }
        }

        let weights: Vec<f64> = items.iter().map(CatalogItem::weight).collect();
        let total_weight: f64 = weights.iter().sum();
        if total_weight <= 0.0 {
            return Err(CatalogError::NoDrawableItems);
        }

        for (item, weight) in items.iter().zip(&weights) {
            if *weight == 0.0 {
                tracing::warn!(id = %item.id, "item has zero draw weight and can never be drawn");
            }
        }

        tracing::debug!(items = items.len(), total_weight, "catalog loaded");

        Ok(Self {
            items,
            weights,
            total_weight,
            by_id,
        })
    }

    /// Load a catalog file. `.yaml`/`.yml` files are parsed as YAML,
    /// everything else as JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let items = parse_items(&content, Format::from_path(path), &path.display().to_string())?;
        Self::new(items)
    }

    /// Parse a JSON array of items
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        Self::new(parse_items(json, Format::Json, "<json>")?)
    }

    /// Parse a YAML sequence of items
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        Self::new(parse_items(yaml, Format::Yaml, "<yaml>")?)
    }

    /// Items in their fixed catalog order
    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for a validated catalog
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CatalogItem> {
        self.index_of(id).map(|i| &self.items[i])
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.by_id.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Draw weights in catalog order
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// Draw one item
    pub fn draw<R: RandomSource + ?Sized>(&self, rng: &mut R) -> &CatalogItem {
        &self.items[self.draw_index(rng)]
    }

    /// Draw one item, returning its catalog index
    pub fn draw_index<R: RandomSource + ?Sized>(&self, rng: &mut R) -> usize {
        // Validated catalogs are non-empty, so a selection always exists
        select_index(&self.weights, self.total_weight, rng.next_unit())
            .unwrap_or(self.items.len() - 1)
    }

    /// Probability of drawing `id` on a single draw
    pub fn probability(&self, id: &str) -> Option<f64> {
        self.index_of(id)
            .map(|i| self.weights[i] / self.total_weight)
    }

    /// Single-draw odds for `id`
    pub fn odds(&self, id: &str) -> Option<Odds> {
        self.probability(id).map(Odds::new)
    }

    /// Probability that a single draw lands in `tier`
    pub fn tier_probability(&self, tier: RarityTier) -> f64 {
        self.items
            .iter()
            .zip(&self.weights)
            .filter(|(item, _)| item.tier() == tier)
            .map(|(_, w)| w / self.total_weight)
            .sum()
    }

    /// Items belonging to `tier`, in catalog order
    pub fn items_in_tier(&self, tier: RarityTier) -> impl Iterator<Item = &CatalogItem> {
        self.items.iter().filter(move |item| item.tier() == tier)
    }
}

fn parse_items(
    content: &str,
    format: Format,
    source_name: &str,
) -> Result<Vec<CatalogItem>, CatalogError> {
    let parsed = match format {
        Format::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
        Format::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
    };
    parsed.map_err(|message| CatalogError::Parse {
        source_name: source_name.to_string(),
        message,
    })
}
