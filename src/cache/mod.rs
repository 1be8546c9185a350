//! On-device persistence for fetched students.
//!
//! The whole accumulated list lives as one JSON blob under a fixed key in a
//! small key-value store. Every write replaces the previous snapshot.

mod storage;
mod students;

pub use storage::{BlobStorage, NoopStorage, SqliteStorage, StoredBlob};
pub use students::{CacheLoad, StudentCache, STUDENTS_KEY};
