//! Record keys.

use crate::model::CourseId;

/// Current user record, in exactly one scope.
pub const CURRENT_USER: &str = "currentUser";
/// Cached authorization token.
pub const TOKEN: &str = "token";

pub fn profile_image(user_id: &str) -> String {
    format!("user_{user_id}_profile_image")
}

pub fn progress(course_id: CourseId) -> String {
    format!("course_{course_id}_progress")
}

pub fn quiz_results(course_id: CourseId) -> String {
    format!("course_{course_id}_quiz_results")
}

pub fn notes(course_id: CourseId) -> String {
    format!("course_{course_id}_notes")
}
