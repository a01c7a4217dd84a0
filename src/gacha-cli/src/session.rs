//! Engine setup shared by the subcommands

use crate::cli::GlobalArgs;
use crate::config::Config;
use anyhow::{Context, Result};
use gacha::{Catalog, Gacha, KeyValueStore, RngSource, StateKeys};
use rand::rngs::StdRng;
use std::path::Path;

/// Catalog compiled into the binary, used when no path is configured
pub const DEFAULT_CATALOG: &str = include_str!("../../../share/catalog.json");

pub type Engine = Gacha<Box<dyn KeyValueStore>, RngSource<StdRng>>;

pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading catalog");
            Catalog::load(path)
                .with_context(|| format!("Failed to load catalog from {}", path.display()))
        }
        None => Catalog::from_json_str(DEFAULT_CATALOG).context("Built-in catalog is invalid"),
    }
}

/// Load the catalog and open the store named by flags or config
pub fn open(global: &GlobalArgs, config: &Config, seed: Option<u64>) -> Result<Engine> {
    let catalog = load_catalog(config.resolve_catalog(global.catalog.as_deref()).as_deref())?;

    let store_path = config.resolve_store(global.store.as_deref())?;
    let store = gacha_store::open_store(&store_path)
        .with_context(|| format!("Failed to open store at {}", store_path.display()))?;
    tracing::info!(path = %store_path.display(), items = catalog.len(), "session opened");

    Ok(Gacha::open(
        catalog,
        store,
        StateKeys::default(),
        RngSource::from_seed_or_entropy(seed),
    ))
}

#[cfg(test)]
pub(crate) fn test_engine(seed: u64) -> Engine {
    let catalog = load_catalog(None).unwrap();
    let store: Box<dyn KeyValueStore> = Box::new(gacha::MemoryStore::new());
    Gacha::open(catalog, store, StateKeys::default(), RngSource::seeded(seed))
}
