use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{billing, error::ApiError, internal, rejected, state::AppState};

use super::gateway_call;

#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub status: u8,
    /// Gateway-hosted payment page the frontend redirects to
    pub session_url: String,
}

#[utoipa::path(
    post,
    path = "/subscription/{restaurant_id}/checkout",
    tag = "subscription",
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant the payment is for")
    ),
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
#[tracing::instrument(name = "POST /subscription/{restaurant_id}/checkout", skip(state))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Path(restaurant_id): Path<i32>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let Some(stripe_client) = state.stripe_client.as_ref() else {
        return Err(rejected!("Payments are not currently available"));
    };

    let transaction = billing::open_pending_transaction(&state.db, restaurant_id).await?;
    let success_url =
        billing::build_success_url(&state.config.front_domain, transaction.id, restaurant_id);
    let cancel_url = billing::build_cancel_url(&state.config.front_domain);

    let mut params = stripe::CreateCheckoutSession::new();
    params.mode = Some(stripe::CheckoutSessionMode::Payment);
    params.payment_method_types = Some(vec![
        stripe::CreateCheckoutSessionPaymentMethodTypes::Card,
    ]);
    params.line_items = Some(vec![stripe::CreateCheckoutSessionLineItems {
        price_data: Some(stripe::CreateCheckoutSessionLineItemsPriceData {
            currency: stripe::Currency::USD,
            product_data: Some(stripe::CreateCheckoutSessionLineItemsPriceDataProductData {
                name: "Monthly Subscription".to_string(),
                ..Default::default()
            }),
            unit_amount: Some(state.config.subscription_price_cents),
            ..Default::default()
        }),
        quantity: Some(1),
        ..Default::default()
    }]);
    params.success_url = Some(&success_url);
    params.cancel_url = Some(&cancel_url);

    // On failure the pending row stays behind; abandoned checkouts are never
    // reaped, and later reads ignore them.
    let session = gateway_call(
        stripe::CheckoutSession::create(stripe_client, params),
        "Error creating the checkout session",
    )
    .await?;

    let session_url = session
        .url
        .ok_or_else(|| internal!("Checkout session {} has no redirect URL", session.id))?;

    tracing::info!(
        restaurant_id,
        transaction_id = transaction.id,
        session_id = %session.id,
        "checkout session created"
    );

    Ok(Json(CheckoutResponse {
        status: 1,
        session_url,
    }))
}
