//! Records persisted by the learner state and catalog shapes it reads.
mod certificate;
mod course;
mod quiz;
mod user;

pub use certificate::*;
pub use course::*;
pub use quiz::*;
pub use user::*;

/// Catalog identifier of a course.
pub type CourseId = u32;
