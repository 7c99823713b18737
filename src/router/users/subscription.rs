//! Plan purchase.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::Profile;
use crate::model::{BillingPeriod, SubscriptionPlan};
use crate::router::Valid;
use crate::{AppState, ServerError};

#[derive(Debug, Validate, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    #[validate(length(min = 1, message = "Plan ID is required."))]
    plan_id: String,
    #[validate(length(min = 1, max = 100, message = "Title must be 1 to 100 characters long."))]
    title: String,
    #[validate(range(min = 0.0, message = "Price cannot be negative."))]
    price: f64,
    #[serde(default)]
    period: BillingPeriod,
    #[serde(default)]
    featured: bool,
}

/// Replace any previous subscription with an active one.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Json<Profile>, ServerError> {
    let plan = SubscriptionPlan {
        plan_id: body.plan_id,
        title: body.title,
        price: body.price,
        period: body.period,
        featured: body.featured,
    };

    let users = state.users();
    if !users.add_subscription(plan).await {
        return Err(ServerError::internal("subscription could not be saved"));
    }

    let user = users.current_user().await.ok_or(ServerError::Unauthorized)?;
    Ok(Json(Profile::new(&state, user).await))
}
