//! Course search and grouping for the student detail view.

use std::cmp::Ordering;
use std::collections::HashMap;

use super::types::{Course, CourseCategory, CourseSection};

/// Filter courses by a case-insensitive title substring and group them by
/// category.
///
/// Groups are ordered by category label and courses within a group by title.
/// Empty groups are never produced.
pub fn group_courses(courses: &[Course], query: &str) -> Vec<CourseSection> {
  let needle = query.to_lowercase();

  let mut grouped: HashMap<CourseCategory, Vec<Course>> = HashMap::new();
  for course in courses
    .iter()
    .filter(|c| c.title.to_lowercase().contains(&needle))
  {
    grouped
      .entry(course.category)
      .or_default()
      .push(course.clone());
  }

  let mut sections: Vec<CourseSection> = grouped
    .into_iter()
    .map(|(category, mut courses)| {
      courses.sort_by(|a, b| compare_titles(&a.title, &b.title));
      CourseSection { category, courses }
    })
    .collect();

  sections.sort_by(|a, b| a.category.label().cmp(b.category.label()));
  sections
}

/// Case-insensitive first, raw order as tie-break so the result is total.
fn compare_titles(a: &str, b: &str) -> Ordering {
  a.to_lowercase()
    .cmp(&b.to_lowercase())
    .then_with(|| a.cmp(b))
}
