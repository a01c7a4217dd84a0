//! SQLite store using rusqlite (synchronous).
//!
//! State lives in a single `settings` table of string keys and values.

use gacha::{KeyValueStore, StoreError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Default database location
pub const DEFAULT_DB_PATH: &str = "gacha.db";

fn db_err(e: rusqlite::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

fn corrupt_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".corrupt");
    PathBuf::from(name)
}

/// SQLite-backed key-value store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create the database
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path).map_err(db_err)?;
        Ok(Self { conn })
    }

    /// Open and initialize the database at `path`.
    ///
    /// A file that exists but cannot be initialized (not a database, or a
    /// damaged one) is renamed to `<path>.corrupt` and replaced with a fresh
    /// database.
    pub fn open_or_recover<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        match Self::open_initialized(path) {
            Ok(store) => Ok(store),
            Err(e) if path.exists() => {
                let aside = corrupt_path(path);
                tracing::warn!(
                    path = %path.display(),
                    moved_to = %aside.display(),
                    "database unreadable, starting fresh: {}",
                    e
                );
                std::fs::rename(path, &aside)?;
                Self::open_initialized(path)
            }
            Err(e) => Err(e),
        }
    }

    fn open_initialized(path: &Path) -> StoreResult<Self> {
        let store = Self::open(path)?;
        store.init()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory().map_err(db_err)?;
        Ok(Self { conn })
    }

    /// Create the schema if it does not exist yet
    pub fn init(&self) -> StoreResult<()> {
        self.conn
            .execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS settings (
                    key TEXT PRIMARY KEY NOT NULL,
                    value TEXT NOT NULL
                );
                "#,
            )
            .map_err(db_err)
    }

    /// All stored keys, sorted
    pub fn keys(&self) -> StoreResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT key FROM settings ORDER BY key")
            .map_err(db_err)?;
        let keys = stmt
            .query_map([], |row| row.get(0))
            .map_err(db_err)?
            .collect::<Result<Vec<String>, _>>()
            .map_err(db_err)?;
        Ok(keys)
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM settings WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .map_err(db_err)
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn
            .execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                params![key, value],
            )
            .map_err(db_err)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM settings WHERE key = ?1", params![key])
            .map_err(db_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gacha::{CollectionState, StateKeys, StateStore};

    fn setup_db() -> SqliteStore {
        let db = SqliteStore::open_in_memory().unwrap();
        db.init().unwrap();
        db
    }

    #[test]
    fn test_init_creates_table() {
        let db = setup_db();
        let count: i64 = db
            .conn
            .query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_init_is_idempotent() {
        let db = setup_db();
        db.set("k", "v").unwrap();
        db.init().unwrap();
        assert_eq!(db.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_get_missing() {
        let db = setup_db();
        assert_eq!(db.get("nope").unwrap(), None);
    }

    #[test]
    fn test_set_overwrites() {
        let db = setup_db();
        db.set("dropCount", "1").unwrap();
        db.set("dropCount", "2").unwrap();
        assert_eq!(db.get("dropCount").unwrap().as_deref(), Some("2"));
        assert_eq!(db.keys().unwrap(), vec!["dropCount".to_string()]);
    }

    #[test]
    fn test_remove() {
        let db = setup_db();
        db.set("a", "1").unwrap();
        db.remove("a").unwrap();
        db.remove("never-set").unwrap();
        assert_eq!(db.get("a").unwrap(), None);
        assert!(db.keys().unwrap().is_empty());
    }

    #[test]
    fn test_uninitialized_reports_error() {
        let db = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(db.get("a"), Err(StoreError::Database(_))));
    }

    #[test]
    fn test_state_round_trip() {
        let db = setup_db();
        let keys = StateKeys::default();
        let state = CollectionState::from_parts(7, ["b".into(), "a".into()]);
        StateStore::save(&db, &keys, &state).unwrap();
        assert_eq!(StateStore::load(&db, &keys), state);
        assert_eq!(
            db.get("seenSnoopys").unwrap().as_deref(),
            Some(r#"["a","b"]"#)
        );
    }

    #[test]
    fn test_open_or_recover_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        let db = SqliteStore::open_or_recover(&path).unwrap();
        db.set("k", "v").unwrap();
        assert!(!corrupt_path(&path).exists());
    }

    #[test]
    fn test_corrupt_database_moved_aside() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.db");
        let garbage = "this is not a sqlite database\n".repeat(64);
        std::fs::write(&path, &garbage).unwrap();

        let db = SqliteStore::open_or_recover(&path).unwrap();
        assert_eq!(db.get("dropCount").unwrap(), None);
        db.set("dropCount", "1").unwrap();

        let aside = dir.path().join("state.db.corrupt");
        assert_eq!(std::fs::read_to_string(aside).unwrap(), garbage);
    }

    #[test]
    fn test_open_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.db");
        let db = SqliteStore::open(&path).unwrap();
        db.init().unwrap();
        db.set("x", "y").unwrap();
        drop(db);

        let db = SqliteStore::open(&path).unwrap();
        assert_eq!(db.get("x").unwrap().as_deref(), Some("y"));
    }
}
