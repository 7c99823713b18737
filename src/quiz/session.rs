//! One timed quiz attempt.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::OnceCell;
use tokio::time::Instant;

use crate::model::{Answers, CourseId, Quiz, QuizResult};
use crate::quiz::{QuizEngine, QuizTimer, score};

const SECONDS_PER_MINUTE: u64 = 60;

struct Attempt {
    course_id: CourseId,
    quiz: Quiz,
    engine: QuizEngine,
    answers: Mutex<Answers>,
    submitted: AtomicBool,
    outcome: OnceCell<Option<QuizResult>>,
    started: Instant,
}

impl Attempt {
    fn answers(&self) -> Answers {
        match self.answers.lock() {
            Ok(answers) => answers.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Score and persist once. Later calls wait for the first one and get
    /// its result.
    async fn submit(&self, automatic: bool) -> Option<QuizResult> {
        self.outcome.get_or_init(|| self.record(automatic)).await.clone()
    }

    async fn record(&self, automatic: bool) -> Option<QuizResult> {
        self.submitted.store(true, Ordering::SeqCst);

        let answers = self.answers();
        let outcome = score(&self.quiz, &answers);
        metrics::counter!(
            "learner_quiz_submissions_total",
            "passed" => outcome.passed.to_string(),
            "auto" => automatic.to_string()
        )
        .increment(1);

        if automatic {
            tracing::info!(
                course_id = self.course_id,
                answered = answers.len(),
                "time limit reached, submitting quiz"
            );
        }

        self.engine
            .submit(self.course_id, outcome, answers, self.started.elapsed().as_secs())
            .await
    }
}

/// Active quiz attempt. Submits by itself when the time limit runs out;
/// dropping it before then abandons the attempt. An automatic submit that
/// has started is always saved, even if the session is dropped meanwhile.
pub struct QuizSession {
    attempt: Arc<Attempt>,
    timer: Option<QuizTimer>,
}

impl QuizSession {
    /// Start an attempt. A quiz with a zero time limit is untimed.
    pub fn start(engine: QuizEngine, course_id: CourseId, quiz: Quiz, tick: Duration) -> Self {
        let seconds = u64::from(quiz.time_limit) * SECONDS_PER_MINUTE;
        let attempt = Arc::new(Attempt {
            course_id,
            quiz,
            engine,
            answers: Mutex::new(Answers::new()),
            submitted: AtomicBool::new(false),
            outcome: OnceCell::new(),
            started: Instant::now(),
        });

        let timer = (seconds > 0).then(|| {
            let attempt = Arc::clone(&attempt);
            QuizTimer::start(seconds, tick, move || async move {
                attempt.submit(true).await;
            })
        });

        tracing::debug!(course_id, seconds, "quiz started");
        Self { attempt, timer }
    }

    pub fn course_id(&self) -> CourseId {
        self.attempt.course_id
    }

    pub fn quiz(&self) -> &Quiz {
        &self.attempt.quiz
    }

    /// Seconds left, `None` when untimed.
    pub fn remaining_seconds(&self) -> Option<u64> {
        self.timer.as_ref().map(QuizTimer::remaining)
    }

    pub fn is_submitted(&self) -> bool {
        self.attempt.submitted.load(Ordering::SeqCst)
    }

    pub fn answers(&self) -> Answers {
        self.attempt.answers()
    }

    /// Select `option` for `question_id`. Refused once submitted or when the
    /// question or option does not exist.
    pub fn select(&self, question_id: u32, option: usize) -> bool {
        if self.is_submitted() {
            return false;
        }

        let exists = self
            .quiz()
            .questions
            .iter()
            .any(|question| question.id == question_id && option < question.options.len());
        if !exists {
            return false;
        }

        match self.attempt.answers.lock() {
            Ok(mut answers) => {
                answers.insert(question_id, option);
                true
            },
            Err(_) => false,
        }
    }

    /// Submit now. When the countdown got there first, wait for its write
    /// and return that result instead. `None` only when saving failed.
    pub async fn finish(mut self) -> Option<QuizResult> {
        drop(self.timer.take());
        self.attempt.submit(false).await
    }
}

impl std::fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizSession")
            .field("course_id", &self.course_id())
            .field("remaining_seconds", &self.remaining_seconds())
            .field("submitted", &self.is_submitted())
            .finish()
    }
}
