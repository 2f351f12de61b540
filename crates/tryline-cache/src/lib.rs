//! # tryline-cache
//!
//! Persistent session-token storage for tryline.
//!
//! A single SQLite-backed key/value table holds the reusable session
//! token. There is no expiry logic here: staleness is detected downstream
//! when the provider rejects the token, and the resolver reacts by calling
//! [`TokenCache::delete`] so the next resolution re-authenticates.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};
use tryline_core::{Error, Result};

/// Cache key the session token is stored under.
pub const TOKEN_KEY: &str = "NRLTOKEN";

/// SQLite-backed store for the session token.
pub struct TokenCache {
    /// `SQLite` database connection.
    db: Arc<Mutex<Connection>>,
    /// Cache directory path.
    cache_dir: PathBuf,
}

impl TokenCache {
    /// Create a token cache at the platform cache directory.
    pub fn new() -> Result<Self> {
        let project_dirs = directories::ProjectDirs::from("com", "tryline", "tryline")
            .ok_or_else(|| Error::Cache("Failed to determine cache directory".to_string()))?;

        Self::with_path(project_dirs.cache_dir().to_path_buf())
    }

    /// Create a token cache at a custom path.
    pub fn with_path(cache_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&cache_dir)
            .map_err(|e| Error::Cache(format!("Failed to create cache directory: {e}")))?;

        let db_path = cache_dir.join("tokens.db");
        let db = Connection::open(&db_path)
            .map_err(|e| Error::Cache(format!("Failed to open database: {e}")))?;

        db.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS tokens (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                cached_at TEXT NOT NULL
            );
            ",
        )
        .map_err(|e| Error::Cache(format!("Failed to initialize database: {e}")))?;

        info!("Token cache initialized at {}", cache_dir.display());

        Ok(Self {
            db: Arc::new(Mutex::new(db)),
            cache_dir,
        })
    }

    /// Get the cache directory path.
    pub const fn cache_dir(&self) -> &PathBuf {
        &self.cache_dir
    }

    /// Get the stored session token, if any.
    pub fn get(&self) -> Result<Option<String>> {
        let db = self.db.lock();
        db.query_row(
            "SELECT value FROM tokens WHERE key = ?",
            [TOKEN_KEY],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map_err(|e| Error::Cache(format!("Failed to read token: {e}")))
    }

    /// Store the session token, replacing any previous value.
    pub fn set(&self, token: &str) -> Result<()> {
        let db = self.db.lock();
        db.execute(
            "INSERT OR REPLACE INTO tokens (key, value, cached_at) VALUES (?, ?, ?)",
            rusqlite::params![TOKEN_KEY, token, Utc::now().to_rfc3339()],
        )
        .map_err(|e| Error::Cache(format!("Failed to store token: {e}")))?;

        debug!("Session token stored");
        Ok(())
    }

    /// Remove the stored session token.
    pub fn delete(&self) -> Result<()> {
        let db = self.db.lock();
        db.execute("DELETE FROM tokens WHERE key = ?", [TOKEN_KEY])
            .map_err(|e| Error::Cache(format!("Failed to delete token: {e}")))?;

        debug!("Session token deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cache() -> (tempfile::TempDir, TokenCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = TokenCache::with_path(dir.path().to_path_buf()).unwrap();
        (dir, cache)
    }

    #[test]
    fn test_get_empty() {
        let (_dir, cache) = cache();
        assert_eq!(cache.get().unwrap(), None);
    }

    #[test]
    fn test_set_get_roundtrip() {
        let (_dir, cache) = cache();
        cache.set("abc123").unwrap();
        assert_eq!(cache.get().unwrap().as_deref(), Some("abc123"));
    }

    #[test]
    fn test_set_replaces_previous_token() {
        let (_dir, cache) = cache();
        cache.set("old").unwrap();
        cache.set("new").unwrap();
        assert_eq!(cache.get().unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_delete() {
        let (_dir, cache) = cache();
        cache.set("abc123").unwrap();
        cache.delete().unwrap();
        assert_eq!(cache.get().unwrap(), None);
    }

    #[test]
    fn test_delete_when_empty_is_ok() {
        let (_dir, cache) = cache();
        cache.delete().unwrap();
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let cache = TokenCache::with_path(dir.path().to_path_buf()).unwrap();
            cache.set("survives").unwrap();
        }
        let cache = TokenCache::with_path(dir.path().to_path_buf()).unwrap();
        assert_eq!(cache.get().unwrap().as_deref(), Some("survives"));
    }
}
