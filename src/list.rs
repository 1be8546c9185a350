//! Paginated student list with cache synchronization.
//!
//! `StudentList` owns the in-memory list and a phase machine:
//!
//! ```text
//! Idle ──focus──▶ LoadingInitial ──▶ Ready
//! Ready ──end reached──▶ LoadingMore ──▶ Ready
//! Ready | LoadingMore ──refresh──▶ Refreshing ──▶ Ready
//! ```
//!
//! Each operation runs as a spawned task and reports back over a channel.
//! The owner applies completions with `poll()` on every tick (or awaits
//! `next_update()`), so state is only ever mutated from one place. A request
//! made from a phase that does not allow it is ignored.
//!
//! Every spawned operation is tagged with a generation. A refresh bumps it,
//! so a load-more still in flight is discarded when it lands and never
//! touches the list or the cache.

use chrono::{DateTime, Utc};
use color_eyre::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cache::{CacheLoad, StudentCache};
use crate::roster::{Student, StudentSource, TOTAL_STUDENTS};

pub const LOAD_FAILED: &str = "Failed to load students";
pub const LOAD_MORE_FAILED: &str = "Failed to load more students";
pub const REFRESH_FAILED: &str = "Failed to refresh students";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListPhase {
  /// Nothing requested yet
  Idle,
  LoadingInitial,
  Ready,
  LoadingMore,
  Refreshing,
}

/// Where the current list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
  /// Restored from the on-device snapshot written at the given time
  Cache(DateTime<Utc>),
  Source,
}

enum InitialLoad {
  Cached {
    students: Vec<Student>,
    stored_at: DateTime<Utc>,
  },
  Fetched(Vec<Student>),
}

enum Completion {
  Initial(Result<InitialLoad, String>),
  More(Result<Vec<Student>, String>),
  Refresh(Result<Vec<Student>, String>),
}

/// Controller for the infinite-scroll student list.
pub struct StudentList<D: StudentSource> {
  source: Arc<D>,
  cache: StudentCache,
  page_size: usize,

  phase: ListPhase,
  students: Vec<Student>,
  /// Next page to request from the source
  page: usize,
  has_more: bool,
  origin: Option<Origin>,
  alert: Option<String>,
  /// Completions tagged with an older generation are stale
  generation: u64,

  tx: mpsc::UnboundedSender<(u64, Completion)>,
  rx: mpsc::UnboundedReceiver<(u64, Completion)>,
}

impl<D: StudentSource> StudentList<D> {
  /// A page size of zero is treated as one.
  pub fn new(source: Arc<D>, cache: StudentCache, page_size: usize) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      source,
      cache,
      page_size: page_size.max(1),
      phase: ListPhase::Idle,
      students: Vec::new(),
      page: 0,
      has_more: true,
      origin: None,
      alert: None,
      generation: 0,
      tx,
      rx,
    }
  }

  /// The list screen gained focus. Starts the initial load if the list is
  /// still empty.
  pub fn on_focus(&mut self) -> bool {
    let eligible = match self.phase {
      ListPhase::Idle => true,
      ListPhase::Ready => self.students.is_empty(),
      _ => false,
    };
    if !eligible {
      return false;
    }

    self.phase = ListPhase::LoadingInitial;
    tracing::info!(page_size = self.page_size, "Loading students");

    let source = Arc::clone(&self.source);
    let cache = self.cache.clone();
    let page_size = self.page_size;
    self.spawn(async move {
      let result = load_initial(&*source, &cache, page_size).await;
      Completion::Initial(result.map_err(|e| e.to_string()))
    });
    true
  }

  /// Scrolling reached the end of the list. Fetches the next page unless one
  /// is already in flight or the source is exhausted.
  pub fn on_end_reached(&mut self) -> bool {
    if self.phase != ListPhase::Ready || !self.has_more {
      return false;
    }

    self.phase = ListPhase::LoadingMore;
    tracing::debug!(page = self.page, "Loading more students");

    let source = Arc::clone(&self.source);
    let page = self.page;
    let page_size = self.page_size;
    self.spawn(async move {
      let result = source.fetch(page, page_size).await;
      Completion::More(result.map_err(|e| e.to_string()))
    });
    true
  }

  /// Drop the snapshot and start over from the first page. A load-more in
  /// flight is superseded.
  pub fn refresh(&mut self) -> bool {
    match self.phase {
      ListPhase::Ready => {}
      ListPhase::LoadingMore => {
        tracing::debug!(page = self.page, "Refresh supersedes pending load");
        self.generation += 1;
      }
      _ => return false,
    }

    self.phase = ListPhase::Refreshing;
    tracing::info!("Refreshing students");

    let source = Arc::clone(&self.source);
    let cache = self.cache.clone();
    let page_size = self.page_size;
    self.spawn(async move {
      let result = reload(&*source, &cache, page_size).await;
      Completion::Refresh(result.map_err(|e| e.to_string()))
    });
    true
  }

  /// Apply a finished operation, if any.
  ///
  /// Returns `true` if the state changed. Call this in the event loop tick.
  pub fn poll(&mut self) -> bool {
    while let Ok((generation, completion)) = self.rx.try_recv() {
      if self.apply(generation, completion) {
        return true;
      }
    }
    false
  }

  /// Wait for the in-flight operation to finish and apply it.
  ///
  /// Returns `false` immediately when nothing is in flight.
  #[cfg(test)]
  pub async fn next_update(&mut self) -> bool {
    while self.is_busy() {
      match self.rx.recv().await {
        Some((generation, completion)) => {
          if self.apply(generation, completion) {
            return true;
          }
        }
        None => return false,
      }
    }
    false
  }

  fn spawn<F>(&self, task: F)
  where
    F: std::future::Future<Output = Completion> + Send + 'static,
  {
    let tx = self.tx.clone();
    let generation = self.generation;
    tokio::spawn(async move {
      // Ignore send errors - the list may have been dropped
      let _ = tx.send((generation, task.await));
    });
  }

  /// Returns `false` for a stale completion, which is dropped untouched.
  fn apply(&mut self, generation: u64, completion: Completion) -> bool {
    if generation != self.generation {
      tracing::debug!(generation, current = self.generation, "Dropping stale completion");
      return false;
    }

    match completion {
      Completion::Initial(Ok(InitialLoad::Cached {
        students,
        stored_at,
      })) => {
        self.page = students.len() / self.page_size;
        self.has_more = students.len() < TOTAL_STUDENTS;
        tracing::info!(count = students.len(), page = self.page, "Restored students from cache");
        self.students = students;
        self.origin = Some(Origin::Cache(stored_at));
      }
      Completion::Initial(Ok(InitialLoad::Fetched(students))) => {
        self.replace_with_first_page(students);
      }
      Completion::Refresh(Ok(students)) => {
        self.replace_with_first_page(students);
      }
      Completion::More(Ok(students)) => {
        if students.len() < self.page_size {
          tracing::info!(total = self.students.len() + students.len(), "No more students");
          self.has_more = false;
        }
        if !students.is_empty() {
          self.page += 1;
          self.append(students);
          persist(&self.cache, &self.students);
        }
      }
      Completion::Initial(Err(e)) => self.fail(LOAD_FAILED, &e),
      Completion::More(Err(e)) => self.fail(LOAD_MORE_FAILED, &e),
      Completion::Refresh(Err(e)) => self.fail(REFRESH_FAILED, &e),
    }
    self.phase = ListPhase::Ready;
    true
  }

  fn replace_with_first_page(&mut self, students: Vec<Student>) {
    self.page = 1;
    self.has_more = students.len() == self.page_size;
    self.students = students;
    self.origin = Some(Origin::Source);
  }

  /// Append a page, skipping students already listed. A snapshot whose
  /// length is not a multiple of the page size overlaps the next page.
  fn append(&mut self, students: Vec<Student>) {
    let known: HashSet<String> = self.students.iter().map(|s| s.id.clone()).collect();
    let before = self.students.len();
    self
      .students
      .extend(students.into_iter().filter(|s| !known.contains(&s.id)));
    tracing::debug!(added = self.students.len() - before, total = self.students.len(), "Appended page");
  }

  fn fail(&mut self, message: &str, error: &str) {
    tracing::error!(error, "{}", message);
    self.alert = Some(message.to_string());
  }

  pub fn students(&self) -> &[Student] {
    &self.students
  }

  pub fn phase(&self) -> ListPhase {
    self.phase
  }

  pub fn is_busy(&self) -> bool {
    matches!(
      self.phase,
      ListPhase::LoadingInitial | ListPhase::LoadingMore | ListPhase::Refreshing
    )
  }

  /// Next page index the source will be asked for
  pub fn page(&self) -> usize {
    self.page
  }

  pub fn has_more(&self) -> bool {
    self.has_more
  }

  pub fn origin(&self) -> Option<Origin> {
    self.origin
  }

  /// Message for a failed fetch, shown until dismissed
  pub fn alert(&self) -> Option<&str> {
    self.alert.as_deref()
  }

  pub fn dismiss_alert(&mut self) {
    self.alert = None;
  }
}

/// True when `selected` is within `threshold` rows of the last row.
pub fn near_end(selected: usize, len: usize, threshold: usize) -> bool {
  len > 0 && selected.saturating_add(threshold) + 1 >= len
}

async fn load_initial<D: StudentSource>(
  source: &D,
  cache: &StudentCache,
  page_size: usize,
) -> Result<InitialLoad> {
  match cache.load() {
    CacheLoad::Hit {
      students,
      stored_at,
    } => return Ok(InitialLoad::Cached {
      students,
      stored_at,
    }),
    CacheLoad::Empty => {}
    CacheLoad::Failed(reason) => {
      tracing::warn!(%reason, "Could not read student cache, fetching from source");
    }
  }

  let students = source.fetch(0, page_size).await?;
  persist(cache, &students);
  Ok(InitialLoad::Fetched(students))
}

async fn reload<D: StudentSource>(
  source: &D,
  cache: &StudentCache,
  page_size: usize,
) -> Result<Vec<Student>> {
  if let Err(e) = cache.clear() {
    tracing::warn!(error = %e, "Failed to clear student cache");
  }

  let students = source.fetch(0, page_size).await?;
  persist(cache, &students);
  Ok(students)
}

/// Best effort: a failed write is logged and otherwise ignored.
fn persist(cache: &StudentCache, students: &[Student]) {
  if let Err(e) = cache.save(students) {
    tracing::warn!(error = %e, count = students.len(), "Failed to save students");
  }
}
