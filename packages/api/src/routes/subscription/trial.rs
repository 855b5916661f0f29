use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    billing,
    entity::{restaurant, transaction},
    error::ApiError,
    mail::{EmailMessage, templates},
    middleware::jwt::AuthOwner,
    state::AppState,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct TrialResponse {
    pub status: u8,
    pub msg: String,
    #[schema(value_type = Object)]
    pub transaction: transaction::Model,
    #[schema(value_type = Object)]
    pub restaurant: restaurant::Model,
}

#[utoipa::path(
    post,
    path = "/subscription/{restaurant_id}/trial",
    tag = "subscription",
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant to start the trial for")
    ),
    responses(
        (status = 200, description = "Trial started, restaurant activated", body = TrialResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
#[tracing::instrument(name = "POST /subscription/{restaurant_id}/trial", skip(state, owner))]
pub async fn start_trial(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthOwner>,
    Path(restaurant_id): Path<i32>,
) -> Result<Json<TrialResponse>, ApiError> {
    let db_owner = owner.get_owner(&state).await?;

    let today = Utc::now().date_naive();
    let outcome = billing::start_trial(&state.db, restaurant_id, owner.id, today).await?;

    let mut sent = false;
    if let Some(end_date) = outcome.transaction.subscription_end_date {
        let (html, text) =
            templates::trial_started(&db_owner.first_name, &outcome.restaurant.name, end_date);
        sent = state
            .mailer
            .send_logged(
                EmailMessage {
                    to: db_owner.email.clone(),
                    subject: format!("Notification for {}", outcome.restaurant.name),
                    body_html: Some(html),
                    body_text: Some(text),
                },
                &format!("trial started for {}", outcome.restaurant.name),
            )
            .await;
    }

    let msg = if sent {
        "Your trial has started! A notification email has been sent to you".to_string()
    } else {
        "Your trial has started, but we were unable to send a notification email".to_string()
    };

    Ok(Json(TrialResponse {
        status: 1,
        msg,
        transaction: outcome.transaction,
        restaurant: outcome.restaurant,
    }))
}
