//! Local key-value stores for gacha collection state
//!
//! Both stores implement [`gacha::KeyValueStore`] and can back a
//! [`gacha::Gacha`] engine directly.
//!
//! # Features
//!
//! - `sqlite` (default) - SQLite `settings` table using rusqlite
//!
//! # Example
//!
//! ```no_run
//! use gacha::{Catalog, Gacha, RngSource, StateKeys};
//! use gacha_store::SqliteStore;
//!
//! let store = SqliteStore::open("gacha.db").unwrap();
//! store.init().unwrap();
//!
//! let catalog = Catalog::load("catalog.json").unwrap();
//! let mut gacha = Gacha::open(catalog, store, StateKeys::default(), RngSource::thread());
//! let reveal = gacha.draw().unwrap();
//! println!("{}", reveal.item.name);
//! ```

pub mod file;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::FileStore;

#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteStore, DEFAULT_DB_PATH};

#[cfg(feature = "sqlite")]
use gacha::KeyValueStore;
#[cfg(feature = "sqlite")]
use std::path::Path;

/// Open the store for `path`, picking the backend by extension:
/// `.json` uses [`FileStore`], anything else [`SqliteStore`]. Damaged local
/// state never fails here; see [`SqliteStore::open_or_recover`].
#[cfg(feature = "sqlite")]
pub fn open_store<P: AsRef<Path>>(path: P) -> gacha::StoreResult<Box<dyn KeyValueStore>> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    if is_json {
        tracing::debug!(path = %path.display(), "using JSON file store");
        return Ok(Box::new(FileStore::open(path)?));
    }

    tracing::debug!(path = %path.display(), "using SQLite store");
    Ok(Box::new(SqliteStore::open_or_recover(path)?))
}
