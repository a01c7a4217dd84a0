//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up gacha CLI defaults.

use crate::cli::GlobalArgs;
use crate::config::Config;
use anyhow::Result;
use std::path::PathBuf;

/// Handle the configure command
///
/// # Arguments
/// * `global` - `--catalog` and `--store` values to save as defaults
/// * `show` - If true, show current configuration
pub fn handle(global: &GlobalArgs, show: bool) -> Result<()> {
    let mut config = Config::load()?;

    if show {
        show_config(&config);
        return Ok(());
    }

    if apply(&mut config, global.catalog.clone(), global.store.clone()) {
        let path = config.save()?;
        show_config(&config);
        println!("Config saved to: {}", path.display());
    } else {
        show_usage();
    }

    Ok(())
}

/// Copy any given paths into `config`; returns whether anything changed
fn apply(config: &mut Config, catalog: Option<PathBuf>, store: Option<PathBuf>) -> bool {
    let mut changed = false;
    if let Some(path) = catalog {
        config.catalog = Some(path);
        changed = true;
    }
    if let Some(path) = store {
        config.store = Some(path);
        changed = true;
    }
    changed
}

/// Display current configuration
fn show_config(config: &Config) {
    match &config.catalog {
        Some(path) => println!("Catalog: {}", path.display()),
        None => println!("Catalog: (built-in)"),
    }

    match (&config.store, Config::default_store_path()) {
        (Some(path), _) => println!("Store: {}", path.display()),
        (None, Ok(path)) => println!("Store: {} (default)", path.display()),
        (None, Err(_)) => println!("Store: (not configured)"),
    }

    if let Ok(path) = Config::config_path() {
        println!("Config file: {}", path.display());
    }
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: gacha configure --catalog PATH --store PATH");
    println!("   or: gacha configure --show");
    println!();
    println!("Catalogs may be .json, .yaml or .yml.");
    println!("Stores ending in .json are plain JSON files; anything else is SQLite.");
}
