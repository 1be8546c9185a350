//! The student snapshot stored on top of a `BlobStorage`.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;

use super::storage::BlobStorage;
use crate::roster::Student;

/// Key the student snapshot is stored under
pub const STUDENTS_KEY: &str = "students";

/// Outcome of reading the snapshot.
///
/// `Empty` and `Failed` are kept apart so callers can tell "nothing cached
/// yet" from "the cache could not be read".
#[derive(Debug, Clone)]
pub enum CacheLoad {
  /// A non-empty snapshot
  Hit {
    students: Vec<Student>,
    stored_at: DateTime<Utc>,
  },
  /// Nothing stored, or an empty list stored
  Empty,
  /// The backend or the decoder failed
  Failed(String),
}

/// Cache for the accumulated student list.
#[derive(Clone)]
pub struct StudentCache {
  storage: Arc<dyn BlobStorage>,
}

impl StudentCache {
  pub fn new(storage: impl BlobStorage + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  #[cfg(test)]
  pub fn from_shared(storage: Arc<dyn BlobStorage>) -> Self {
    Self { storage }
  }

  /// Replace the snapshot with `students`.
  pub fn save(&self, students: &[Student]) -> Result<()> {
    let data =
      serde_json::to_vec(students).map_err(|e| eyre!("Failed to serialize students: {}", e))?;
    self.storage.put(STUDENTS_KEY, &data)?;

    tracing::debug!(count = students.len(), bytes = data.len(), "Saved student snapshot");
    Ok(())
  }

  /// Read the snapshot.
  pub fn load(&self) -> CacheLoad {
    let blob = match self.storage.get(STUDENTS_KEY) {
      Ok(Some(blob)) => blob,
      Ok(None) => return CacheLoad::Empty,
      Err(e) => return CacheLoad::Failed(e.to_string()),
    };

    match serde_json::from_slice::<Vec<Student>>(&blob.value) {
      Ok(students) if students.is_empty() => CacheLoad::Empty,
      Ok(students) => CacheLoad::Hit {
        students,
        stored_at: blob.stored_at,
      },
      Err(e) => CacheLoad::Failed(format!("Failed to decode student snapshot: {}", e)),
    }
  }

  /// Drop the snapshot.
  pub fn clear(&self) -> Result<()> {
    self.storage.remove(STUDENTS_KEY)?;
    tracing::debug!("Cleared student snapshot");
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{NoopStorage, SqliteStorage, StoredBlob};
  use crate::roster::MockSource;
  use std::time::Duration;

  struct BrokenStorage;

  impl BlobStorage for BrokenStorage {
    fn get(&self, _key: &str) -> Result<Option<StoredBlob>> {
      Err(eyre!("disk I/O error"))
    }

    fn put(&self, _key: &str, _value: &[u8]) -> Result<()> {
      Err(eyre!("disk I/O error"))
    }

    fn remove(&self, _key: &str) -> Result<()> {
      Err(eyre!("disk I/O error"))
    }
  }

  fn sqlite_cache() -> (tempfile::TempDir, StudentCache, Arc<SqliteStorage>) {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(SqliteStorage::open(Some(&dir.path().join("cache.db"))).unwrap());
    let cache = StudentCache::from_shared(storage.clone());
    (dir, cache, storage)
  }

  fn students(count: usize) -> Vec<Student> {
    MockSource::new(1, Duration::ZERO).generate(0, count)
  }

  #[test]
  fn test_round_trip() {
    let (_dir, cache, _) = sqlite_cache();
    let saved = students(15);
    cache.save(&saved).unwrap();

    match cache.load() {
      CacheLoad::Hit { students, .. } => assert_eq!(students, saved),
      other => panic!("expected hit, got {:?}", other),
    }
  }

  #[test]
  fn test_save_replaces_snapshot() {
    let (_dir, cache, _) = sqlite_cache();
    cache.save(&students(20)).unwrap();
    cache.save(&students(10)).unwrap();

    match cache.load() {
      CacheLoad::Hit { students, .. } => assert_eq!(students.len(), 10),
      other => panic!("expected hit, got {:?}", other),
    }
  }

  #[test]
  fn test_never_saved_is_empty() {
    let (_dir, cache, _) = sqlite_cache();
    assert!(matches!(cache.load(), CacheLoad::Empty));
  }

  #[test]
  fn test_empty_list_is_empty() {
    let (_dir, cache, _) = sqlite_cache();
    cache.save(&[]).unwrap();
    assert!(matches!(cache.load(), CacheLoad::Empty));
  }

  #[test]
  fn test_clear() {
    let (_dir, cache, _) = sqlite_cache();
    cache.save(&students(3)).unwrap();
    cache.clear().unwrap();
    assert!(matches!(cache.load(), CacheLoad::Empty));
  }

  #[test]
  fn test_corrupt_blob_is_failure_not_empty() {
    let (_dir, cache, storage) = sqlite_cache();
    storage.put(STUDENTS_KEY, b"{not json").unwrap();

    match cache.load() {
      CacheLoad::Failed(reason) => assert!(reason.contains("decode")),
      other => panic!("expected failure, got {:?}", other),
    }
  }

  #[test]
  fn test_backend_failure_is_reported() {
    let cache = StudentCache::new(BrokenStorage);
    assert!(matches!(cache.load(), CacheLoad::Failed(_)));
    assert!(cache.save(&students(1)).is_err());
    assert!(cache.clear().is_err());
  }

  #[test]
  fn test_noop_storage_never_hits() {
    let cache = StudentCache::new(NoopStorage);
    cache.save(&students(5)).unwrap();
    assert!(matches!(cache.load(), CacheLoad::Empty));
  }

  #[test]
  fn test_blob_is_plain_json_array() {
    let (_dir, cache, storage) = sqlite_cache();
    cache.save(&students(2)).unwrap();

    let blob = storage.get(STUDENTS_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_slice(&blob.value).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 2);
    assert_eq!(array[0]["id"], "student-1");
    assert!(array[0]["courses"][0]["category"].is_string());
  }
}
