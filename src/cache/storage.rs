//! Key-value storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A stored value and when it was written.
#[derive(Debug, Clone)]
pub struct StoredBlob {
  pub value: Vec<u8>,
  pub stored_at: DateTime<Utc>,
}

/// Trait for blob storage backends.
pub trait BlobStorage: Send + Sync {
  /// Get the blob stored under `key`, `None` if nothing was stored.
  fn get(&self, key: &str) -> Result<Option<StoredBlob>>;

  /// Store a blob, replacing any previous value.
  fn put(&self, key: &str, value: &[u8]) -> Result<()>;

  /// Remove the blob under `key`. Removing a missing key is not an error.
  fn remove(&self, key: &str) -> Result<()>;
}

/// Storage implementation that doesn't persist anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl BlobStorage for NoopStorage {
  fn get(&self, _key: &str) -> Result<Option<StoredBlob>> {
    Ok(None) // Always miss
  }

  fn put(&self, _key: &str, _value: &[u8]) -> Result<()> {
    Ok(()) // Discard
  }

  fn remove(&self, _key: &str) -> Result<()> {
    Ok(())
  }
}

/// Schema for the key-value table.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS kv_store (
    key TEXT PRIMARY KEY,
    value BLOB NOT NULL,
    stored_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

/// SQLite-based key-value storage.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open the store at `path`, or at the default location if `None`.
  pub fn open(path: Option<&Path>) -> Result<Self> {
    let path = match path {
      Some(p) => p.to_path_buf(),
      None => Self::default_path()?,
    };

    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(&path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    tracing::debug!(path = %path.display(), "Opened cache database");
    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    conn
      .execute_batch(SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(Self {
      conn: Mutex::new(conn),
    })
  }

  /// Get the default database path.
  pub fn default_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .ok_or_else(|| eyre!("Could not determine data directory"))?;

    Ok(data_dir.join("roster").join("cache.db"))
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self.conn.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl BlobStorage for SqliteStorage {
  fn get(&self, key: &str) -> Result<Option<StoredBlob>> {
    let conn = self.lock()?;

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT value, stored_at FROM kv_store WHERE key = ?",
        params![key],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read {}: {}", key, e))?;

    match row {
      Some((value, stored_at)) => Ok(Some(StoredBlob {
        value,
        stored_at: parse_datetime(&stored_at)?,
      })),
      None => Ok(None),
    }
  }

  fn put(&self, key: &str, value: &[u8]) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute(
        "INSERT OR REPLACE INTO kv_store (key, value, stored_at)
         VALUES (?, ?, datetime('now'))",
        params![key, value],
      )
      .map_err(|e| eyre!("Failed to write {}: {}", key, e))?;

    Ok(())
  }

  fn remove(&self, key: &str) -> Result<()> {
    let conn = self.lock()?;

    conn
      .execute("DELETE FROM kv_store WHERE key = ?", params![key])
      .map_err(|e| eyre!("Failed to remove {}: {}", key, e))?;

    Ok(())
  }
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn temp_storage() -> (tempfile::TempDir, SqliteStorage) {
    let dir = tempfile::tempdir().unwrap();
    let storage = SqliteStorage::open(Some(&dir.path().join("nested").join("cache.db"))).unwrap();
    (dir, storage)
  }

  #[test]
  fn test_put_get_replace() {
    let (_dir, storage) = temp_storage();
    assert!(storage.get("k").unwrap().is_none());

    storage.put("k", b"first").unwrap();
    storage.put("k", b"second").unwrap();

    let blob = storage.get("k").unwrap().unwrap();
    assert_eq!(blob.value, b"second");
    assert!(Utc::now() - blob.stored_at < chrono::Duration::minutes(5));
  }

  #[test]
  fn test_remove() {
    let (_dir, storage) = temp_storage();
    storage.put("k", b"value").unwrap();
    storage.remove("k").unwrap();
    assert!(storage.get("k").unwrap().is_none());

    // Missing key is fine
    storage.remove("k").unwrap();
  }

  #[test]
  fn test_reopen_keeps_data() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    SqliteStorage::open(Some(&path)).unwrap().put("k", b"kept").unwrap();

    let reopened = SqliteStorage::open(Some(&path)).unwrap();
    assert_eq!(reopened.get("k").unwrap().unwrap().value, b"kept");
  }

  #[test]
  fn test_parse_datetime() {
    let dt = parse_datetime("2024-03-01 12:30:00").unwrap();
    assert_eq!(dt.to_rfc3339(), "2024-03-01T12:30:00+00:00");
    assert!(parse_datetime("yesterday").is_err());
  }
}
