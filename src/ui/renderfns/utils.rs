use crate::roster::CourseCategory;
use ratatui::prelude::Color;

/// Truncate a string to at most `max_len` characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Badge color for a course category
pub fn category_color(category: CourseCategory) -> Color {
  match category {
    CourseCategory::Programming => Color::Green,
    CourseCategory::Design => Color::LightRed,
    CourseCategory::Math => Color::Blue,
    CourseCategory::Science => Color::Magenta,
    CourseCategory::Languages => Color::Red,
  }
}
