//! Lesson completion per course.

use serde::{Deserialize, Serialize};

use crate::model::{Course, CourseId, LessonId};
use crate::storage::{Scope, SessionStore, keys};

/// Completion counters of a course.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// Rounded half-up, 0 for a course without lessons.
    pub percentage: u32,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        Self {
            completed,
            total,
            percentage: rounded_percentage(completed, total),
        }
    }

    /// Strict count match. A course without lessons is never complete.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Latest completed lesson, for "continue where you left off".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastLesson {
    pub title: String,
    pub module_title: String,
}

/// `round(part / whole * 100)` with halves rounded up.
pub fn rounded_percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (part as u64, whole as u64);
    ((part * 200 + whole) / (whole * 2)) as u32
}

#[derive(Clone, Debug)]
pub struct ProgressTracker {
    store: SessionStore,
}

impl ProgressTracker {
    /// Create a new [`ProgressTracker`].
    pub fn new(store: SessionStore) -> Self {
        Self { store }
    }

    /// Completed lesson ids, oldest first.
    pub async fn completed_lessons(&self, course_id: CourseId) -> Vec<LessonId> {
        self.store
            .read(Scope::Durable, &keys::progress(course_id))
            .await
            .unwrap_or_default()
    }

    /// Flip completion of `lesson_id` and persist. Returns the new set.
    pub async fn toggle_lesson(&self, course_id: CourseId, lesson_id: LessonId) -> Vec<LessonId> {
        let mut completed = self.completed_lessons(course_id).await;

        let done = match completed.iter().position(|id| id == &lesson_id) {
            Some(index) => {
                completed.remove(index);
                false
            },
            None => {
                completed.push(lesson_id.clone());
                true
            },
        };

        if self
            .store
            .write(Scope::Durable, &keys::progress(course_id), &completed)
            .await
        {
            metrics::counter!("learner_lessons_toggled_total").increment(1);
            tracing::debug!(course_id, lesson_id = %lesson_id, done, "lesson toggled");
        }

        completed
    }

    pub async fn progress(&self, course_id: CourseId, course: &Course) -> Progress {
        let completed = self.completed_lessons(course_id).await.len();
        Progress::new(completed, course.total_lessons())
    }

    pub async fn is_course_completed(&self, course_id: CourseId, course: &Course) -> bool {
        self.progress(course_id, course).await.is_complete()
    }

    /// Resolve the most recent completion against the course tree. Ids no
    /// longer in the course resolve to nothing.
    pub async fn last_completed_lesson(
        &self,
        course_id: CourseId,
        course: &Course,
    ) -> Option<LastLesson> {
        let completed = self.completed_lessons(course_id).await;
        let last = completed.last()?;

        course.find_lesson(last).map(|(module, lesson)| LastLesson {
            title: lesson.title.clone(),
            module_title: module.title.clone(),
        })
    }

    /// Free-form notes of the learner for a course.
    pub async fn notes(&self, course_id: CourseId) -> String {
        self.store
            .read(Scope::Durable, &keys::notes(course_id))
            .await
            .unwrap_or_default()
    }

    pub async fn save_notes(&self, course_id: CourseId, notes: &str) -> bool {
        self.store
            .write(Scope::Durable, &keys::notes(course_id), &notes)
            .await
    }
}
