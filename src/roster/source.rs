//! Synthetic student data source.
//!
//! Stands in for a paginated network API: pages are slices of a fixed
//! universe of `TOTAL_STUDENTS` records, and every fetch waits out a
//! configurable latency before answering.

use color_eyre::Result;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::time::Duration;

use super::types::{Course, CourseCategory, Student};

/// Size of the synthetic universe
pub const TOTAL_STUDENTS: usize = 100;

const MIN_COURSES: usize = 3;
const MAX_COURSES: usize = 8;
const AVATAR_VARIANTS: usize = 70;

/// Page-at-a-time access to student records.
///
/// Exhaustion is an empty `Ok`, not an error.
pub trait StudentSource: Send + Sync + 'static {
  fn fetch(
    &self,
    page: usize,
    page_size: usize,
  ) -> impl Future<Output = Result<Vec<Student>>> + Send;
}

/// (id, title, duration, category)
const CATALOG: &[(&str, &str, &str, CourseCategory)] = &[
  ("1", "React Native Fundamentals", "8 weeks", CourseCategory::Programming),
  ("2", "JavaScript ES6+", "6 weeks", CourseCategory::Programming),
  ("3", "Node.js Backend Development", "10 weeks", CourseCategory::Programming),
  ("4", "Python for Beginners", "12 weeks", CourseCategory::Programming),
  ("5", "TypeScript Mastery", "4 weeks", CourseCategory::Programming),
  ("6", "UI/UX Design Principles", "8 weeks", CourseCategory::Design),
  ("7", "Adobe Photoshop Basics", "6 weeks", CourseCategory::Design),
  ("8", "Figma for Designers", "4 weeks", CourseCategory::Design),
  ("9", "Graphic Design Theory", "10 weeks", CourseCategory::Design),
  ("10", "Calculus I", "16 weeks", CourseCategory::Math),
  ("11", "Linear Algebra", "14 weeks", CourseCategory::Math),
  ("12", "Statistics and Probability", "12 weeks", CourseCategory::Math),
  ("13", "Discrete Mathematics", "10 weeks", CourseCategory::Math),
  ("14", "Physics I", "16 weeks", CourseCategory::Science),
  ("15", "Chemistry Fundamentals", "14 weeks", CourseCategory::Science),
  ("16", "Biology Basics", "12 weeks", CourseCategory::Science),
  ("17", "Spanish for Beginners", "20 weeks", CourseCategory::Languages),
  ("18", "French Conversation", "16 weeks", CourseCategory::Languages),
  ("19", "German Grammar", "18 weeks", CourseCategory::Languages),
];

/// In-process data source generating students on demand.
///
/// Course enrollment is random but seeded per student index, so the same
/// seed always yields the same universe.
#[derive(Debug, Clone)]
pub struct MockSource {
  seed: u64,
  latency: Duration,
}

impl MockSource {
  pub fn new(seed: u64, latency: Duration) -> Self {
    Self { seed, latency }
  }

  /// Source with a random seed
  pub fn random(latency: Duration) -> Self {
    Self::new(rand::random(), latency)
  }

  pub fn seed(&self) -> u64 {
    self.seed
  }

  /// Build the records for `[start, start + count)` without any delay.
  pub fn generate(&self, start: usize, count: usize) -> Vec<Student> {
    (start..start + count).map(|i| self.student(i)).collect()
  }

  fn student(&self, index: usize) -> Student {
    let number = index + 1;
    Student {
      id: format!("student-{}", number),
      name: format!("Student {}", number),
      email: format!("student{}@university.edu", number),
      avatar: format!(
        "https://i.pravatar.cc/150?img={}",
        (number % AVATAR_VARIANTS) + 1
      ),
      courses: self.courses_for(index),
    }
  }

  fn courses_for(&self, index: usize) -> Vec<Course> {
    let mut rng = StdRng::seed_from_u64(mix(self.seed, index as u64));
    let count = rng.gen_range(MIN_COURSES..=MAX_COURSES);

    CATALOG
      .choose_multiple(&mut rng, count)
      .map(|(id, title, duration, category)| Course {
        id: id.to_string(),
        title: title.to_string(),
        duration: duration.to_string(),
        category: *category,
      })
      .collect()
  }

  /// The slice of the universe a page covers, if any.
  fn page_range(page: usize, page_size: usize) -> Option<(usize, usize)> {
    let start = page.checked_mul(page_size)?;
    if page_size == 0 || start >= TOTAL_STUDENTS {
      return None;
    }
    Some((start, page_size.min(TOTAL_STUDENTS - start)))
  }
}

impl StudentSource for MockSource {
  async fn fetch(&self, page: usize, page_size: usize) -> Result<Vec<Student>> {
    tokio::time::sleep(self.latency).await;

    let students = match Self::page_range(page, page_size) {
      Some((start, count)) => self.generate(start, count),
      None => Vec::new(),
    };

    tracing::debug!(page, page_size, returned = students.len(), "Fetched page");
    Ok(students)
  }
}

/// Spread the per-student seed so neighbouring indexes diverge.
fn mix(seed: u64, index: u64) -> u64 {
  seed ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  fn source() -> MockSource {
    MockSource::new(7, Duration::ZERO)
  }

  #[tokio::test]
  async fn test_full_pages_until_exhaustion() {
    let source = source();

    for page in 0..10 {
      let students = source.fetch(page, 10).await.unwrap();
      assert_eq!(students.len(), 10, "page {}", page);
      assert_eq!(students[0].id, format!("student-{}", page * 10 + 1));
    }

    assert!(source.fetch(10, 10).await.unwrap().is_empty());
    assert!(source.fetch(11, 10).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_final_page_is_short() {
    let source = source();

    // 100 = 3 * 30 + 10
    assert_eq!(source.fetch(2, 30).await.unwrap().len(), 30);
    let last = source.fetch(3, 30).await.unwrap();
    assert_eq!(last.len(), 10);
    assert_eq!(last.last().unwrap().id, "student-100");
    assert!(source.fetch(4, 30).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_zero_page_size_and_overflow_are_empty() {
    let source = source();
    assert!(source.fetch(0, 0).await.unwrap().is_empty());
    assert!(source.fetch(usize::MAX, 2).await.unwrap().is_empty());
  }

  #[test]
  fn test_student_shape() {
    let student = &source().generate(69, 1)[0];
    assert_eq!(student.id, "student-70");
    assert_eq!(student.name, "Student 70");
    assert_eq!(student.email, "student70@university.edu");
    assert_eq!(student.avatar, "https://i.pravatar.cc/150?img=1");
  }

  #[test]
  fn test_courses_are_distinct_and_bounded() {
    for student in source().generate(0, TOTAL_STUDENTS) {
      let count = student.courses.len();
      assert!((MIN_COURSES..=MAX_COURSES).contains(&count));

      let ids: HashSet<_> = student.courses.iter().map(|c| c.id.as_str()).collect();
      assert_eq!(ids.len(), count, "duplicate course for {}", student.id);
    }
  }

  #[test]
  fn test_same_seed_same_universe() {
    assert_eq!(source().generate(0, 20), source().generate(0, 20));
    assert_eq!(source().generate(5, 1)[0], source().generate(0, 10)[5]);
  }
}
