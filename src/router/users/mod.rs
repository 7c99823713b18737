//! Profile of the signed-in learner.
mod avatar;
mod get;
mod subscription;
mod update;

use std::collections::BTreeMap;

use axum::routing::{get, put};
use axum::{Router, middleware};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::model::{CourseId, Subscription, User};

/// User record as shown to the learner, password left out.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub subscription: Option<Subscription>,
    pub has_active_subscription: bool,
    pub enrolled_courses: Vec<CourseId>,
    pub enrollment_dates: BTreeMap<CourseId, DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Profile {
    pub async fn new(state: &AppState, user: User) -> Self {
        Self {
            has_active_subscription: state.enrollment().has_active_subscription().await,
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            subscription: user.subscription,
            enrolled_courses: user.enrolled_courses,
            enrollment_dates: user.enrollment_dates,
            last_updated: user.last_updated,
        }
    }
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // `GET /users/@me` goes to `get`, `PATCH /users/@me` to `update`.
        .route("/@me", get(get::handler).patch(update::handler))
        // `PUT /users/@me/subscription` goes to `subscription`.
        .route("/@me/subscription", put(subscription::handler))
        .route("/@me/avatar", get(avatar::get).put(avatar::put))
        .route_layer(middleware::from_fn_with_state(state, crate::router::signed_in))
}
