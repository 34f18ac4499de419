// SQLite persistence for the raw text of the last successfully loaded
// datasets.
//
// The cache is a plain key/value store: dataset text goes in under a fixed
// storage key and is read back on the next session start. Parsing always
// happens from the cached raw text, never from parsed records, so the cache
// and the live record set can never disagree.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};

/// Fixed storage key for the domestic players dataset.
pub const PLAYERS_KEY: &str = "war-birthplace-players";
/// Fixed storage key for the state population dataset.
pub const POPULATION_KEY: &str = "war-birthplace-population";

/// SQLite-backed cache of raw dataset text.
pub struct DatasetCache {
    conn: Mutex<Connection>,
}

impl DatasetCache {
    /// Open (or create) the cache database at `path` and ensure the schema
    /// exists. Pass `":memory:"` for an ephemeral cache (useful for tests).
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("failed to open dataset cache at {path}"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )
        .context("failed to set dataset cache pragmas")?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS datasets (
                key        TEXT PRIMARY KEY,
                body       TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
            );",
        )
        .context("failed to create dataset cache schema")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Default on-disk location for the cache database.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "warmap")
            .context("could not determine a data directory for the dataset cache")?;
        let dir = dirs.data_dir();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        Ok(dir.join("datasets.db"))
    }

    /// Acquire the connection.
    ///
    /// Panics if the mutex is poisoned (another thread panicked while
    /// holding the lock). This should never happen in normal operation.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().expect("dataset cache mutex poisoned")
    }

    /// Store dataset text under a key, replacing any previous value.
    pub fn store(&self, key: &str, body: &str) -> Result<()> {
        self.conn()
            .execute(
                "INSERT INTO datasets (key, body) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET
                     body = excluded.body,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![key, body],
            )
            .with_context(|| format!("failed to store dataset '{key}'"))?;
        Ok(())
    }

    /// Load the dataset text stored under a key, if any.
    pub fn load(&self, key: &str) -> Result<Option<String>> {
        self.conn()
            .query_row(
                "SELECT body FROM datasets WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .with_context(|| format!("failed to load dataset '{key}'"))
    }

    /// Remove all stored datasets.
    pub fn clear(&self) -> Result<()> {
        self.conn()
            .execute("DELETE FROM datasets", [])
            .context("failed to clear dataset cache")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_and_load_roundtrip() {
        let cache = DatasetCache::open(":memory:").unwrap();
        assert_eq!(cache.load(PLAYERS_KEY).unwrap(), None);

        cache.store(PLAYERS_KEY, "player_id,birth_year\n").unwrap();
        assert_eq!(
            cache.load(PLAYERS_KEY).unwrap().as_deref(),
            Some("player_id,birth_year\n")
        );
    }

    #[test]
    fn store_replaces_previous_value() {
        let cache = DatasetCache::open(":memory:").unwrap();
        cache.store(POPULATION_KEY, "old").unwrap();
        cache.store(POPULATION_KEY, "new").unwrap();
        assert_eq!(cache.load(POPULATION_KEY).unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn keys_are_independent() {
        let cache = DatasetCache::open(":memory:").unwrap();
        cache.store(PLAYERS_KEY, "players").unwrap();
        cache.store(POPULATION_KEY, "populations").unwrap();
        assert_eq!(cache.load(PLAYERS_KEY).unwrap().as_deref(), Some("players"));
        assert_eq!(
            cache.load(POPULATION_KEY).unwrap().as_deref(),
            Some("populations")
        );
    }

    #[test]
    fn clear_removes_everything() {
        let cache = DatasetCache::open(":memory:").unwrap();
        cache.store(PLAYERS_KEY, "players").unwrap();
        cache.clear().unwrap();
        assert_eq!(cache.load(PLAYERS_KEY).unwrap(), None);
    }
}
