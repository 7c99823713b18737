//! Quiz attempt, once every lesson of the course is completed.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::model::{Answers, CourseId, QuizResult};
use crate::quiz::QuizSession;
use crate::router::{Valid, course, require_access};
use crate::{AppState, ServerError};

/// Question without its answer.
#[derive(Debug, Serialize, Deserialize)]
pub struct Question {
    id: u32,
    question: String,
    options: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attempt {
    course_id: CourseId,
    title: String,
    description: String,
    passing_score: u32,
    time_limit: u32,
    /// `None` when untimed.
    remaining_seconds: Option<u64>,
    questions: Vec<Question>,
    answers: Answers,
}

impl From<&QuizSession> for Attempt {
    fn from(session: &QuizSession) -> Self {
        let quiz = session.quiz();
        Self {
            course_id: session.course_id(),
            title: quiz.title.clone(),
            description: quiz.description.clone(),
            passing_score: quiz.passing_score,
            time_limit: quiz.time_limit,
            remaining_seconds: session.remaining_seconds(),
            questions: quiz
                .questions
                .iter()
                .map(|question| Question {
                    id: question.id,
                    question: question.question.clone(),
                    options: question.options.clone(),
                })
                .collect(),
            answers: session.answers(),
        }
    }
}

#[derive(Debug, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Answer {
    question_id: u32,
    option: usize,
}

/// Start a new attempt. Any attempt in progress is abandoned.
pub async fn start(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Attempt>, ServerError> {
    let course = course(&state, course_id)?;
    require_access(&state, course_id).await?;

    let quiz = state
        .catalog
        .quiz(course_id)
        .ok_or(ServerError::NotAvailable("quiz"))?;

    if !state.progress().is_course_completed(course_id, course).await {
        return Err(ServerError::Forbidden {
            reason: "complete every lesson before taking the quiz",
            redirect: Some(format!("/courses/{course_id}")),
        });
    }

    let session = QuizSession::start(state.quizzes(), course_id, quiz.clone(), state.quiz_tick());
    let attempt = Attempt::from(&session);
    *state.quiz.lock().await = Some(session);

    Ok(Json(attempt))
}

pub async fn answer(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
    Valid(body): Valid<Answer>,
) -> Result<Json<Attempt>, ServerError> {
    let guard = state.quiz.lock().await;
    let session = guard
        .as_ref()
        .filter(|session| session.course_id() == course_id && !session.is_submitted())
        .ok_or(ServerError::Conflict("no quiz attempt in progress"))?;

    if !session.select(body.question_id, body.option) {
        let mut errors = ValidationErrors::new();
        errors.add(
            "option",
            ValidationError::new("option").with_message("Question or option does not exist.".into()),
        );
        return Err(errors.into());
    }

    Ok(Json(Attempt::from(session)))
}

/// Submit the attempt in progress. An attempt the countdown already
/// submitted answers with the stored result.
pub async fn submit(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<QuizResult>, ServerError> {
    let mut guard = state.quiz.lock().await;
    let session = guard
        .take_if(|session| session.course_id() == course_id)
        .ok_or(ServerError::Conflict("no quiz attempt in progress"))?;
    drop(guard);

    session
        .finish()
        .await
        .map(Json)
        .ok_or(ServerError::internal("quiz result could not be saved"))
}

/// Latest stored attempt.
pub async fn result(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<QuizResult>, ServerError> {
    course(&state, course_id)?;
    require_access(&state, course_id).await?;

    state
        .quizzes()
        .prior_result(course_id)
        .await
        .map(Json)
        .ok_or(ServerError::NotAvailable("quiz result"))
}
