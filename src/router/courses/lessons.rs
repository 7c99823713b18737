//! Lesson completion and notes, behind course access.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::{CourseId, LessonId};
use crate::progress::{LastLesson, Progress};
use crate::router::{Valid, course, require_access};
use crate::{AppState, ServerError};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    #[serde(flatten)]
    progress: Progress,
    completed_lessons: Vec<LessonId>,
    course_completed: bool,
    last_lesson: Option<LastLesson>,
}

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Notes {
    #[validate(length(max = 20000, message = "Notes are too long."))]
    notes: String,
}

async fn response(state: &AppState, course_id: CourseId) -> Result<Response, ServerError> {
    let course = course(state, course_id)?;
    let tracker = state.progress();

    let progress = tracker.progress(course_id, course).await;
    Ok(Response {
        progress,
        completed_lessons: tracker.completed_lessons(course_id).await,
        course_completed: progress.is_complete(),
        last_lesson: tracker.last_completed_lesson(course_id, course).await,
    })
}

pub async fn progress(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Response>, ServerError> {
    course(&state, course_id)?;
    require_access(&state, course_id).await?;

    Ok(Json(response(&state, course_id).await?))
}

pub async fn toggle(
    State(state): State<AppState>,
    Path((course_id, lesson_id)): Path<(CourseId, String)>,
) -> Result<Json<Response>, ServerError> {
    let lesson_id = LessonId::new(lesson_id);
    if course(&state, course_id)?.find_lesson(&lesson_id).is_none() {
        return Err(ServerError::NotAvailable("lesson"));
    }
    require_access(&state, course_id).await?;

    state.progress().toggle_lesson(course_id, lesson_id).await;

    Ok(Json(response(&state, course_id).await?))
}

pub async fn notes(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Notes>, ServerError> {
    course(&state, course_id)?;
    require_access(&state, course_id).await?;

    Ok(Json(Notes {
        notes: state.progress().notes(course_id).await,
    }))
}

pub async fn save_notes(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
    Valid(body): Valid<Notes>,
) -> Result<StatusCode, ServerError> {
    course(&state, course_id)?;
    require_access(&state, course_id).await?;

    if state.progress().save_notes(course_id, &body.notes).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::internal("notes could not be saved"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::tests::{json, sign_in, state};
    use crate::*;

    async fn enroll(state: &AppState, course_id: CourseId) {
        assert!(state.enrollment().enroll(course_id).await);
    }

    #[tokio::test]
    async fn test_locked_without_enrollment() {
        let state = state();
        sign_in(&state).await;

        let response =
            make_request(app(state), Method::GET, "/courses/1/progress", String::default()).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body: serde_json::Value = json(response).await;
        assert_eq!(body["instance"], "/courses/1");
    }

    #[tokio::test]
    async fn test_toggle_lessons() {
        let state = state();
        sign_in(&state).await;
        enroll(&state, 1).await;

        let mut last = None;
        for lesson in ["1-1", "2-1", "1-2"] {
            let path = format!("/courses/1/lessons/{lesson}/toggle");
            let response =
                make_request(app(state.clone()), Method::POST, &path, String::default()).await;
            assert_eq!(response.status(), StatusCode::OK);
            last = Some(json::<Response>(response).await);
        }

        let body = last.unwrap();
        assert_eq!(body.progress, Progress::new(3, 3));
        assert!(body.course_completed);
        assert_eq!(
            body.last_lesson,
            Some(LastLesson {
                title: "Cargo".into(),
                module_title: "Getting started".into(),
            })
        );

        // Toggling again un-completes.
        let response = make_request(
            app(state),
            Method::POST,
            "/courses/1/lessons/2-1/toggle",
            String::default(),
        )
        .await;
        let body: Response = json(response).await;
        assert_eq!(body.progress.percentage, 67);
        assert!(!body.course_completed);
        assert_eq!(body.completed_lessons, vec![LessonId::new("1-1"), LessonId::new("1-2")]);
    }

    #[tokio::test]
    async fn test_unknown_lesson_refused() {
        let state = state();
        sign_in(&state).await;
        enroll(&state, 1).await;

        for lesson in ["x", "y", "z"] {
            let path = format!("/courses/1/lessons/{lesson}/toggle");
            let response =
                make_request(app(state.clone()), Method::POST, &path, String::default()).await;
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }

        let response =
            make_request(app(state.clone()), Method::GET, "/courses/1/progress", String::default())
                .await;
        let body: Response = json(response).await;
        assert_eq!(body.progress, Progress::new(0, 3));
        assert!(body.completed_lessons.is_empty());
        assert!(!body.course_completed);

        let response =
            make_request(app(state), Method::POST, "/courses/1/quiz/start", String::default())
                .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_notes() {
        let state = state();
        sign_in(&state).await;
        enroll(&state, 1).await;

        let body = serde_json::json!({ "notes": "borrow checker is a friend" });
        let response =
            make_request(app(state.clone()), Method::PUT, "/courses/1/notes", body.to_string())
                .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response =
            make_request(app(state), Method::GET, "/courses/1/notes", String::default()).await;
        let body: Notes = json(response).await;
        assert_eq!(body.notes, "borrow checker is a friend");
    }
}
