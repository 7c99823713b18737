use axum::extract::State;
use axum::{Extension, Json};

use super::Profile;
use crate::AppState;
use crate::model::User;

pub async fn handler(State(state): State<AppState>, Extension(user): Extension<User>) -> Json<Profile> {
    Json(Profile::new(&state, user).await)
}
