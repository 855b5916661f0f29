use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{entity::transaction, error::ApiError, ledger, state::AppState};

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentSubscriptionResponse {
    pub status: u8,
    /// The settled transaction backing the ledger, `null` when the restaurant
    /// has never had a subscription.
    #[schema(value_type = Option<Object>)]
    pub transaction: Option<transaction::Model>,
}

#[utoipa::path(
    get,
    path = "/subscription/{restaurant_id}",
    tag = "subscription",
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant to look up")
    ),
    responses(
        (status = 200, description = "Current subscription state", body = CurrentSubscriptionResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
#[tracing::instrument(name = "GET /subscription/{restaurant_id}", skip(state))]
pub async fn current_subscription(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i32>,
) -> Result<Json<CurrentSubscriptionResponse>, ApiError> {
    let transaction = ledger::latest_settled(&state.db, restaurant_id).await?;
    Ok(Json(CurrentSubscriptionResponse {
        status: 1,
        transaction,
    }))
}
