//! Quiz scoring and result persistence.
mod session;
mod timer;

pub use session::*;
pub use timer::*;

use std::sync::Arc;

use crate::clock::Clock;
use crate::model::{Answers, CourseId, Quiz, QuizResult, QuizScore};
use crate::progress::rounded_percentage;
use crate::storage::{Scope, SessionStore, keys};

/// Score `answers` against `quiz`.
///
/// Unanswered questions and out-of-range options count as incorrect.
pub fn score(quiz: &Quiz, answers: &Answers) -> QuizScore {
    let total = quiz.questions.len();
    let correct = quiz
        .questions
        .iter()
        .filter(|question| answers.get(&question.id) == Some(&question.correct_answer))
        .count();

    let score = rounded_percentage(correct, total);
    QuizScore {
        score,
        correct_answers: correct as u32,
        total_questions: total as u32,
        passed: score >= quiz.passing_score,
    }
}

#[derive(Clone)]
pub struct QuizEngine {
    store: SessionStore,
    clock: Arc<dyn Clock>,
}

impl QuizEngine {
    /// Create a new [`QuizEngine`].
    pub fn new(store: SessionStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Persist an attempt, replacing any previous one for the course.
    pub async fn submit(
        &self,
        course_id: CourseId,
        score: QuizScore,
        answers: Answers,
        time_spent: u64,
    ) -> Option<QuizResult> {
        let result = QuizResult {
            score: score.score,
            correct_answers: score.correct_answers,
            total_questions: score.total_questions,
            passed: score.passed,
            time_spent,
            answers,
            timestamp: self.clock.now(),
            completed: true,
            certificate_id: None,
        };

        if !self.save_result(course_id, &result).await {
            return None;
        }

        tracing::info!(
            course_id,
            score = result.score,
            passed = result.passed,
            time_spent,
            "quiz submitted"
        );
        Some(result)
    }

    pub async fn prior_result(&self, course_id: CourseId) -> Option<QuizResult> {
        self.store
            .read(Scope::Durable, &keys::quiz_results(course_id))
            .await
    }

    /// Overwrite the stored result as is.
    pub async fn save_result(&self, course_id: CourseId, result: &QuizResult) -> bool {
        self.store
            .write(Scope::Durable, &keys::quiz_results(course_id), result)
            .await
    }
}
