//! Catalog, enrollment and everything behind course access.
mod catalog;
mod certificate;
mod lessons;
mod quiz;

use axum::routing::{get, post, put};
use axum::{Router, middleware};

use crate::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    let learner = Router::new()
        // `GET /courses/enrolled` goes to `enrolled`.
        .route("/enrolled", get(catalog::enrolled))
        .route("/{course_id}/enroll", post(catalog::enroll))
        .route("/{course_id}/access", get(catalog::access))
        .route("/{course_id}/progress", get(lessons::progress))
        .route("/{course_id}/lessons/{lesson_id}/toggle", post(lessons::toggle))
        .route("/{course_id}/notes", get(lessons::notes).put(lessons::save_notes))
        .route("/{course_id}/quiz/start", post(quiz::start))
        .route("/{course_id}/quiz/answers", put(quiz::answer))
        .route("/{course_id}/quiz/submit", post(quiz::submit))
        .route("/{course_id}/quiz/result", get(quiz::result))
        .route("/{course_id}/certificate", get(certificate::handler))
        .route_layer(middleware::from_fn_with_state(state, crate::router::signed_in));

    Router::new()
        // `GET /courses` goes to `list`. No sign-in required.
        .route("/", get(catalog::list))
        .merge(learner)
}
