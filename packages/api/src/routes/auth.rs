//! Owner registration, email verification and login
//!
//! Every response is the standard envelope: `status: 1` plus payload on
//! success, `status: 0` plus `msg` on rejection. The database work lives in
//! free functions so the flows can be exercised without an HTTP stack.

use axum::routing::post;
use axum::{Extension, Json, Router, extract::State};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    SqlErr, sea_query::Expr,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    entity::{owner, prelude::*},
    error::ApiError,
    internal,
    mail::{EmailMessage, templates},
    middleware::jwt::AuthOwner,
    state::AppState,
    token::{self, TokenPurpose},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/verify-email", post(verify_email))
        .route("/login", post(login))
}

/// Routes that sit behind the session-token middleware.
pub fn protected_routes() -> Router<AppState> {
    Router::new().route("/validate", post(validate))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub status: u8,
    pub msg: String,
}

#[utoipa::path(
    post,
    path = "/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "Owner created and verification email attempted", body = RegisterResponse)
    )
)]
#[tracing::instrument(name = "POST /auth/register", skip(state, request))]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, ApiError> {
    let owner = create_owner(
        &state.db,
        &request.first_name,
        &request.last_name,
        &request.email,
        &request.password,
    )
    .await?;

    let token = token::sign(
        &state.config.jwt_secret,
        owner.id,
        &owner.email,
        TokenPurpose::EmailVerification,
    )?;
    let verify_url = format!(
        "{}/verify-email?token={}",
        state.config.front_domain, token
    );
    let (html, text) = templates::verification(&owner.first_name, &verify_url);

    let sent = state
        .mailer
        .send_logged(
            EmailMessage {
                to: owner.email.clone(),
                subject: "Please verify your email address".to_string(),
                body_html: Some(html),
                body_text: Some(text),
            },
            "owner needs to verify the email address",
        )
        .await;

    let msg = if sent {
        "An email has been sent to you".to_string()
    } else {
        "The registration was successful, but we were unable to send the verification email"
            .to_string()
    };

    Ok(Json(RegisterResponse { status: 1, msg }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct VerifyEmailRequest {
    pub token: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyEmailResponse {
    pub status: u8,
    pub msg: String,
}

#[utoipa::path(
    post,
    path = "/auth/verify-email",
    tag = "auth",
    request_body = VerifyEmailRequest,
    responses(
        (status = 200, description = "Email address marked as verified", body = VerifyEmailResponse)
    )
)]
#[tracing::instrument(name = "POST /auth/verify-email", skip(state, request))]
pub async fn verify_email(
    State(state): State<AppState>,
    Json(request): Json<VerifyEmailRequest>,
) -> Result<Json<VerifyEmailResponse>, ApiError> {
    if request.token.trim().is_empty() {
        return Err(ApiError::rejected("No token was provided"));
    }

    // A verification link is not a session, so failures stay plain rejections.
    let claims = token::verify(
        &state.config.jwt_secret,
        request.token.trim(),
        TokenPurpose::EmailVerification,
    )
    .map_err(|_| ApiError::rejected("Invalid token"))?;

    mark_email_verified(&state.db, claims.sub, &claims.email).await?;

    Ok(Json(VerifyEmailResponse {
        status: 1,
        msg: "Your email address has been verified successfully".to_string(),
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub status: u8,
    pub token: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session token issued", body = LoginResponse)
    )
)]
#[tracing::instrument(name = "POST /auth/login", skip(state, request))]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let owner = authenticate_owner(&state.db, &request.email, &request.password).await?;
    let token = token::sign(
        &state.config.jwt_secret,
        owner.id,
        &owner.email,
        TokenPurpose::Session,
    )?;

    Ok(Json(LoginResponse { status: 1, token }))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValidateResponse {
    pub status: u8,
    pub msg: String,
}

#[utoipa::path(
    post,
    path = "/auth/validate",
    tag = "auth",
    responses(
        (status = 200, description = "Presented session token is valid", body = ValidateResponse),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
#[tracing::instrument(name = "POST /auth/validate", skip(owner))]
pub async fn validate(Extension(owner): Extension<AuthOwner>) -> Json<ValidateResponse> {
    tracing::debug!(owner_id = owner.id, "session token validated");
    Json(ValidateResponse {
        status: 1,
        msg: "Token has been validated successfully".to_string(),
    })
}

/// Insert a new owner with a hashed password. Duplicate email addresses are
/// surfaced as a rejection, everything else as an internal fault.
pub async fn create_owner(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
) -> Result<owner::Model, ApiError> {
    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    let result = owner::ActiveModel {
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        email: Set(email.to_string()),
        email_verified: Set(false),
        password_hash: Set(password_hash),
        created_at: Set(chrono::Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await;

    match result {
        Ok(owner) => {
            tracing::info!(owner_id = owner.id, "owner registered");
            Ok(owner)
        }
        Err(e) => match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                Err(ApiError::rejected("Email address is already in use"))
            }
            _ => Err(e.into()),
        },
    }
}

/// Check credentials and verification state, returning the owner row on success.
/// The same rejection covers unknown email and wrong password.
pub async fn authenticate_owner(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> Result<owner::Model, ApiError> {
    let owner = Owner::find()
        .filter(owner::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::rejected("Invalid email or password"))?;

    if !bcrypt::verify(password, &owner.password_hash)? {
        return Err(ApiError::rejected("Invalid email or password"));
    }
    if !owner.email_verified {
        return Err(ApiError::rejected(
            "Verify your email address to continue",
        ));
    }

    Ok(owner)
}

/// Flip `email_verified` for the owner a verification token points at.
pub async fn mark_email_verified(
    db: &DatabaseConnection,
    owner_id: i32,
    email: &str,
) -> Result<(), ApiError> {
    let owner = Owner::find_by_id(owner_id)
        .filter(owner::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or_else(|| ApiError::rejected("Unable to authenticate the token"))?;

    if owner.email_verified {
        return Err(ApiError::rejected(
            "This email address has already been verified",
        ));
    }

    let result = Owner::update_many()
        .col_expr(owner::Column::EmailVerified, Expr::value(true))
        .filter(owner::Column::Id.eq(owner_id))
        .filter(owner::Column::Email.eq(email))
        .exec(db)
        .await?;

    if result.rows_affected != 1 {
        return Err(internal!(
            "email verification affected {} rows for owner {}",
            result.rows_affected,
            owner_id
        ));
    }

    tracing::info!(owner_id, "owner email verified");
    Ok(())
}
