use std::str::FromStr;

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::{NaiveDate, Utc};
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    billing::{self, CardFacts, Settlement},
    entity::prelude::*,
    error::ApiError,
    internal,
    mail::{EmailMessage, templates},
    middleware::jwt::AuthOwner,
    rejected,
    state::AppState,
};

use super::gateway_call;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConfirmPaymentRequest {
    /// Session id substituted into the success redirect by the gateway
    pub session_id: String,
    pub transaction_id: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfirmPaymentResponse {
    pub status: u8,
    pub msg: String,
    pub subscription_end_date: NaiveDate,
}

#[utoipa::path(
    post,
    path = "/subscription/{restaurant_id}/confirm",
    tag = "subscription",
    params(
        ("restaurant_id" = i32, Path, description = "Restaurant the payment was for")
    ),
    request_body = ConfirmPaymentRequest,
    responses(
        (status = 200, description = "Payment reconciled, subscription extended", body = ConfirmPaymentResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
#[tracing::instrument(
    name = "POST /subscription/{restaurant_id}/confirm",
    skip(state, owner, request)
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    Extension(owner): Extension<AuthOwner>,
    Path(restaurant_id): Path<i32>,
    Json(request): Json<ConfirmPaymentRequest>,
) -> Result<Json<ConfirmPaymentResponse>, ApiError> {
    let Some(stripe_client) = state.stripe_client.as_ref() else {
        return Err(rejected!("Payments are not currently available"));
    };

    let db_owner = owner.get_owner(&state).await?;
    let settlement = fetch_settlement(stripe_client, &request.session_id).await?;

    let today = Utc::now().date_naive();
    let end_date = billing::apply_settlement(
        &state.db,
        request.transaction_id,
        restaurant_id,
        &settlement,
        today,
    )
    .await?;
    billing::activate_restaurant(&state.db, restaurant_id, owner.id).await?;

    let restaurant = Restaurant::find_by_id(restaurant_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| internal!("Restaurant {} vanished after activation", restaurant_id))?;

    let amount_cents = settlement
        .amount_total
        .unwrap_or(state.config.subscription_price_cents);
    let (html, text) = templates::payment_confirmation(
        &db_owner.first_name,
        &restaurant.name,
        end_date,
        amount_cents,
    );
    let sent = state
        .mailer
        .send_logged(
            EmailMessage {
                to: db_owner.email.clone(),
                subject: format!("Notification for {}", restaurant.name),
                body_html: Some(html),
                body_text: Some(text),
            },
            &format!("payment confirmation for {}", restaurant.name),
        )
        .await;

    let msg = if sent {
        "Thank you for your payment! A confirmation email has been sent to you".to_string()
    } else {
        "Thank you for your payment! We were unable to send a confirmation email".to_string()
    };

    Ok(Json(ConfirmPaymentResponse {
        status: 1,
        msg,
        subscription_end_date: end_date,
    }))
}

/// Pull the settlement facts for a checkout session: the session itself, its
/// payment intent, and the card on the payment method.
async fn fetch_settlement(
    client: &stripe::Client,
    session_id: &str,
) -> Result<Settlement, ApiError> {
    let id = stripe::CheckoutSessionId::from_str(session_id)
        .map_err(|_| ApiError::rejected("Invalid checkout session reference"))?;
    let session = gateway_call(
        stripe::CheckoutSession::retrieve(client, &id, &[]),
        "Unable to verify the payment with the payment provider",
    )
    .await?;

    let intent_id = session
        .payment_intent
        .as_ref()
        .map(|intent| intent.id())
        .ok_or_else(|| ApiError::rejected("This checkout session has not been paid"))?;
    let intent = gateway_call(
        stripe::PaymentIntent::retrieve(client, &intent_id, &[]),
        "Unable to verify the payment with the payment provider",
    )
    .await?;

    let card = match intent.payment_method.as_ref() {
        Some(method) => {
            let method = gateway_call(
                stripe::PaymentMethod::retrieve(client, &method.id(), &[]),
                "Unable to verify the payment with the payment provider",
            )
            .await?;
            method.card.map(|card| CardFacts {
                brand: card.brand,
                exp_month: card.exp_month as i32,
                exp_year: card.exp_year as i32,
                last_four: card.last4,
            })
        }
        None => None,
    };

    let customer = session.customer_details.as_ref();
    Ok(Settlement {
        session_id: session.id.to_string(),
        session_status: session.status.map(|s| s.to_string()),
        payment_status: session.payment_status.to_string(),
        amount_total: session.amount_total,
        payment_intent: Some(intent_id.to_string()),
        payer_email: customer.and_then(|c| c.email.clone()),
        payer_name: customer.and_then(|c| c.name.clone()),
        payer_postal_code: customer
            .and_then(|c| c.address.as_ref())
            .and_then(|a| a.postal_code.clone()),
        card,
    })
}
