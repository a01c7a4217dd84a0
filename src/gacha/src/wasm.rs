//! WebAssembly bindings for gacha
//!
//! This module exposes the draw engine to JavaScript. Collection state is
//! persisted through any object with `getItem`/`setItem`/`removeItem`
//! (for example `window.localStorage`), and draws use `Math.random()`.

use crate::catalog::{Catalog, CatalogItem, ItemId};
use crate::engine::{Gacha, Reveal};
use crate::persist::{KeyValueStore, StateKeys, StoreError, StoreResult};
use crate::rarity::{classify, RarityTier};
use crate::TierProgress;
use js_sys::{Array, Function, Math, Reflect};
use serde::Serialize;
use std::collections::BTreeSet;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn js_error(value: JsValue) -> StoreError {
    StoreError::Database(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn to_js(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Key-value store backed by a Web Storage-like JS object
pub struct JsStorage {
    target: JsValue,
}

impl JsStorage {
    pub fn new(target: JsValue) -> Self {
        Self { target }
    }

    fn call(&self, method: &str, args: &[JsValue]) -> StoreResult<JsValue> {
        let func: Function = Reflect::get(&self.target, &JsValue::from_str(method))
            .map_err(js_error)?
            .dyn_into()
            .map_err(|_| StoreError::Database(format!("storage has no {}() method", method)))?;
        let args: Array = args.iter().collect();
        func.apply(&self.target, &args).map_err(js_error)
    }
}

impl KeyValueStore for JsStorage {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self.call("getItem", &[JsValue::from_str(key)])?;
        if value.is_null() || value.is_undefined() {
            return Ok(None);
        }
        Ok(value.as_string())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.call("setItem", &[JsValue::from_str(key), JsValue::from_str(value)])?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.call("removeItem", &[JsValue::from_str(key)])?;
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RevealView<'a> {
    #[serde(flatten)]
    item: &'a CatalogItem,
    tier: RarityTier,
    color: &'static str,
    is_new: bool,
}

impl<'a> From<Reveal<'a>> for RevealView<'a> {
    fn from(reveal: Reveal<'a>) -> Self {
        Self {
            item: reveal.item,
            tier: reveal.tier,
            color: reveal.tier.color(),
            is_new: reveal.is_new,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionView<'a> {
    total_draws: u64,
    seen: &'a BTreeSet<ItemId>,
}

/// JavaScript-friendly draw engine
#[wasm_bindgen]
pub struct GachaDrop {
    inner: Gacha<JsStorage, fn() -> f64>,
}

#[wasm_bindgen]
impl GachaDrop {
    /// Create an engine from a JSON catalog and a storage object
    ///
    /// # Arguments
    /// * `catalog_json` - JSON array of catalog items
    /// * `storage` - Object with `getItem`, `setItem` and `removeItem`
    #[wasm_bindgen(constructor)]
    pub fn new(catalog_json: &str, storage: JsValue) -> Result<GachaDrop, JsValue> {
        let catalog = Catalog::from_json_str(catalog_json).map_err(to_js)?;
        let rng: fn() -> f64 = Math::random;
        let inner = Gacha::open(catalog, JsStorage::new(storage), StateKeys::default(), rng);
        Ok(GachaDrop { inner })
    }

    /// Draw one item and return it as JSON
    #[wasm_bindgen(js_name = draw)]
    pub fn draw(&mut self) -> Result<String, JsValue> {
        let reveal = self.inner.draw().map_err(to_js)?;
        serde_json::to_string(&RevealView::from(reveal)).map_err(to_js)
    }

    /// Most recent draw as JSON, if any
    #[wasm_bindgen(js_name = currentReveal)]
    pub fn current_reveal(&self) -> Option<String> {
        let reveal = self.inner.current_reveal()?;
        serde_json::to_string(&RevealView::from(reveal)).ok()
    }

    /// `{ totalDraws, seen }` as JSON
    #[wasm_bindgen(js_name = collectionState)]
    pub fn collection_state(&self) -> Result<String, JsValue> {
        let state = self.inner.collection();
        let view = CollectionView {
            total_draws: state.total_draws(),
            seen: state.seen(),
        };
        serde_json::to_string(&view).map_err(to_js)
    }

    /// Per-tier progress as JSON
    #[wasm_bindgen(js_name = progress)]
    pub fn progress(&self) -> Result<String, JsValue> {
        let progress: Vec<TierProgress> = self.inner.progress();
        serde_json::to_string(&progress).map_err(to_js)
    }

    #[wasm_bindgen(js_name = isSeen)]
    pub fn is_seen(&self, id: &str) -> bool {
        self.inner.collection().is_seen(id)
    }

    /// Clear all progress
    #[wasm_bindgen(js_name = reset)]
    pub fn reset(&mut self) -> Result<(), JsValue> {
        self.inner.reset().map_err(to_js)
    }
}

/// Tier label for a rarity score
#[wasm_bindgen(js_name = rarityLabel)]
pub fn rarity_label(score: f64) -> String {
    classify(score).name().to_string()
}

/// Display color for a rarity score
#[wasm_bindgen(js_name = rarityColor)]
pub fn rarity_color(score: f64) -> String {
    classify(score).color().to_string()
}
