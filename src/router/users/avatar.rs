//! Profile picture, kept as a data URI.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::events::ProfileEvent;
use crate::model::User;
use crate::router::Valid;
use crate::{AppState, ServerError};

const DATA_URI_PREFIX: &str = "data:image/";

#[derive(Debug, Validate, Serialize, Deserialize)]
pub struct Body {
    #[validate(custom(function = "validate_data_uri"))]
    pub image: String,
}

fn validate_data_uri(image: &str) -> Result<(), ValidationError> {
    if image.starts_with(DATA_URI_PREFIX) {
        Ok(())
    } else {
        Err(ValidationError::new("image").with_message("Image must be an image data URI.".into()))
    }
}

pub async fn get(State(state): State<AppState>) -> Result<Json<Body>, ServerError> {
    state
        .users()
        .profile_image()
        .await
        .map(|image| Json(Body { image }))
        .ok_or(ServerError::NotAvailable("profile image"))
}

pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(body): Valid<Body>,
) -> Result<StatusCode, ServerError> {
    if !state.users().set_profile_image(&body.image).await {
        return Err(ServerError::internal("profile image could not be saved"));
    }
    state.events.publish(ProfileEvent::Updated { user_id: user.id });

    Ok(StatusCode::NO_CONTENT)
}
