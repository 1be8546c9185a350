pub mod sections;
pub mod source;
pub mod types;

pub use sections::group_courses;
pub use source::{MockSource, StudentSource, TOTAL_STUDENTS};
pub use types::{Course, CourseCategory, CourseSection, Student};
