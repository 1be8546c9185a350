use serde::{Deserialize, Serialize};

/// A student and the courses they are enrolled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub id: String,
  pub name: String,
  pub email: String,
  /// Avatar image URI
  pub avatar: String,
  pub courses: Vec<Course>,
}

impl Student {
  /// "3 courses enrolled" / "1 course enrolled"
  pub fn enrollment_label(&self) -> String {
    format!("{} enrolled", course_count_label(self.courses.len()))
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
  pub id: String,
  pub title: String,
  /// Free-text length of the course, e.g. "8 weeks"
  pub duration: String,
  pub category: CourseCategory,
}

/// Closed set of course categories. Serialized as the display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CourseCategory {
  Programming,
  Design,
  Math,
  Science,
  Languages,
}

impl CourseCategory {
  pub fn label(&self) -> &'static str {
    match self {
      CourseCategory::Programming => "Programming",
      CourseCategory::Design => "Design",
      CourseCategory::Math => "Math",
      CourseCategory::Science => "Science",
      CourseCategory::Languages => "Languages",
    }
  }
}

impl std::fmt::Display for CourseCategory {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.label())
  }
}

/// One category group in the student detail view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseSection {
  pub category: CourseCategory,
  pub courses: Vec<Course>,
}

impl CourseSection {
  pub fn count_label(&self) -> String {
    course_count_label(self.courses.len())
  }
}

fn course_count_label(count: usize) -> String {
  if count == 1 {
    "1 course".to_string()
  } else {
    format!("{} courses", count)
  }
}
