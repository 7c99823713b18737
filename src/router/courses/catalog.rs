use axum::extract::{Path, State};
use axum::{Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{CourseId, User};
use crate::router::course;
use crate::{AppState, ServerError};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    id: CourseId,
    title: String,
    instructor: Option<String>,
    total_lessons: usize,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    course_id: CourseId,
    enrolled_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Access {
    allowed: bool,
    enrolled: bool,
    subscribed: bool,
}

pub async fn list(State(state): State<AppState>) -> Json<Vec<Summary>> {
    Json(
        state
            .catalog
            .courses()
            .iter()
            .map(|course| Summary {
                id: course.id,
                title: course.title.clone(),
                instructor: course.instructor.clone(),
                total_lessons: course.total_lessons(),
            })
            .collect(),
    )
}

pub async fn enrolled(State(state): State<AppState>) -> Json<Vec<CourseId>> {
    Json(state.enrollment().enrolled_course_ids().await)
}

pub async fn enroll(
    State(state): State<AppState>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Enrollment>, ServerError> {
    course(&state, course_id)?;

    let enrollment = state.enrollment();
    if !enrollment.enroll(course_id).await {
        return Err(ServerError::internal("enrollment could not be saved"));
    }

    Ok(Json(Enrollment {
        course_id,
        enrolled_at: enrollment.enrollment_date(course_id).await,
    }))
}

pub async fn access(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(course_id): Path<CourseId>,
) -> Result<Json<Access>, ServerError> {
    course(&state, course_id)?;

    let enrollment = state.enrollment();
    Ok(Json(Access {
        allowed: enrollment.can_access(course_id).await,
        enrolled: user.is_enrolled(course_id),
        subscribed: enrollment.has_active_subscription().await,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::router::tests::{json, sign_in, state};
    use crate::*;

    #[tokio::test]
    async fn test_list_without_user() {
        let response =
            make_request(app(state()), Method::GET, "/courses", String::default()).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body: Vec<Summary> = json(response).await;
        assert_eq!(body.len(), 2);
        assert_eq!(body[0].title, "Rust for Beginners");
        assert_eq!(body[0].total_lessons, 3);
        assert_eq!(body[1].total_lessons, 0);
    }

    #[tokio::test]
    async fn test_enroll_twice() {
        let state = state();
        sign_in(&state).await;

        for _ in 0..2 {
            let response = make_request(
                app(state.clone()),
                Method::POST,
                "/courses/1/enroll",
                String::default(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::OK);

            let body: Enrollment = json(response).await;
            assert_eq!(body.enrolled_at, Some(state.clock.now()));
        }

        let response = make_request(
            app(state.clone()),
            Method::GET,
            "/courses/enrolled",
            String::default(),
        )
        .await;
        let body: Vec<CourseId> = json(response).await;
        assert_eq!(body, vec![1]);

        let response =
            make_request(app(state), Method::GET, "/courses/1/access", String::default()).await;
        let body: Access = json(response).await;
        assert!(body.allowed);
        assert!(body.enrolled);
        assert!(!body.subscribed);
    }

    #[tokio::test]
    async fn test_enroll_unknown_course() {
        let state = state();
        sign_in(&state).await;

        let response =
            make_request(app(state), Method::POST, "/courses/99/enroll", String::default()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_enroll_requires_user() {
        let response =
            make_request(app(state()), Method::POST, "/courses/1/enroll", String::default()).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
