use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::model::{Certificate, CourseId, User};
use crate::router::course;
use crate::{AppState, ServerError};

/// Certificate of a completed course with a passed quiz. Anything else
/// sends the learner back to the course page.
pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Certificate>, ServerError> {
    let course = course(&state, course_id)?;

    state
        .certificates()
        .issue(course_id, course, &user)
        .await
        .map(Json)
        .ok_or_else(|| ServerError::Forbidden {
            reason: "certificate requires a completed course and a passed quiz",
            redirect: Some(format!("/courses/{course_id}")),
        })
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::model::{LessonId, QuizScore};
    use crate::router::tests::{json, sign_in, state};
    use crate::*;

    async fn get(state: &AppState) -> axum::http::Response<axum::body::Body> {
        make_request(
            app(state.clone()),
            Method::GET,
            "/courses/1/certificate",
            String::default(),
        )
        .await
    }

    #[tokio::test]
    async fn test_not_eligible() {
        let state = state();
        sign_in(&state).await;

        let response = get(&state).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let body: serde_json::Value = json(response).await;
        assert_eq!(body["instance"], "/courses/1");
    }

    #[tokio::test]
    async fn test_certificate_is_stable() {
        let state = state();
        sign_in(&state).await;
        for lesson in ["1-1", "1-2", "2-1"] {
            state.progress().toggle_lesson(1, LessonId::new(lesson)).await;
        }
        let score = QuizScore {
            score: 100,
            correct_answers: 3,
            total_questions: 3,
            passed: true,
        };
        state
            .quizzes()
            .submit(1, score, Default::default(), 42)
            .await
            .unwrap();

        let first: Certificate = json(get(&state).await).await;
        assert!(first.certificate_id.starts_with("CERT-1-ada42-"));
        assert_eq!(first.issued_to, "Ada Lovelace");
        assert_eq!(first.course_title, "Rust for Beginners");
        assert_eq!(first.score, 100);
        assert_eq!(first.completion_date, "October 19, 2026");

        let second: Certificate = json(get(&state).await).await;
        assert_eq!(second, first);
    }
}
