//! Subscription lifecycle routes: ledger lookup, trial, checkout, confirmation

use std::time::Duration;

use axum::{
    Router,
    routing::{get, post},
};

use crate::{error::ApiError, state::AppState};

pub mod checkout;
pub mod confirm;
pub mod current;
pub mod trial;

/// Upper bound on a single payment-gateway call.
pub(crate) const GATEWAY_TIMEOUT: Duration = Duration::from_secs(20);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{restaurant_id}", get(current::current_subscription))
        .route("/{restaurant_id}/trial", post(trial::start_trial))
        .route(
            "/{restaurant_id}/checkout",
            post(checkout::create_checkout_session),
        )
        .route("/{restaurant_id}/confirm", post(confirm::confirm_payment))
}

/// Run one gateway call under [`GATEWAY_TIMEOUT`], collapsing transport errors
/// and timeouts into rejections the frontend can show.
pub(crate) async fn gateway_call<T>(
    fut: impl Future<Output = Result<T, stripe::StripeError>>,
    failure_msg: &'static str,
) -> Result<T, ApiError> {
    match tokio::time::timeout(GATEWAY_TIMEOUT, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            tracing::warn!("Payment gateway call failed: {}", e);
            Err(ApiError::rejected(failure_msg))
        }
        Err(_) => Err(ApiError::rejected(
            "The payment provider did not respond in time",
        )),
    }
}
